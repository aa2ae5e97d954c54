use chrono::{DateTime, Utc};
use sea_orm::Set;
use uuid::Uuid;

use crate::entity::user;
use crate::store::{Entry, MayOwnAttachment, TableEntry, UniqueKeyed};

pub type User = user::Model;

pub struct UserFields {
    pub name: String,
    pub age: i32,
}

#[derive(Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
}

impl UniqueKeyed for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn business_key(&self) -> &str {
        &self.email
    }

    fn set_business_key(&mut self, key: String) {
        self.email = key;
    }
}

impl MayOwnAttachment for User {}

impl Entry for User {
    type Fields = UserFields;
    type FieldsPatch = UserPatch;

    const KIND: &'static str = "User";
    const COLLECTION: &'static str = "users";

    fn build(
        id: Uuid,
        key: String,
        fields: UserFields,
        _attachment: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: key,
            name: fields.name,
            age: fields.age,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), String> {
        super::require_text(&self.name, "Name")?;
        if self.age < 0 {
            return Err("Age must be >= 0".into());
        }
        Ok(())
    }
}

impl TableEntry for User {
    type Table = user::Entity;
    type Active = user::ActiveModel;

    fn id_column() -> user::Column {
        user::Column::Id
    }

    fn key_column() -> user::Column {
        user::Column::Email
    }

    fn created_column() -> user::Column {
        user::Column::CreatedAt
    }

    fn to_active(&self) -> user::ActiveModel {
        user::ActiveModel {
            id: Set(self.id),
            email: Set(self.email.clone()),
            name: Set(self.name.clone()),
            age: Set(self.age),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
        }
    }
}
