use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::records::{User, UserFields, UserPatch};
use crate::store::Patch;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Ada")]
    pub name: String,
    #[schema(example = 36)]
    pub age: i32,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(m: User) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            age: m.age,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl CreateUserRequest {
    pub fn into_parts(self) -> (String, UserFields) {
        (
            self.email,
            UserFields {
                name: self.name,
                age: self.age,
            },
        )
    }
}

impl From<UpdateUserRequest> for Patch<User> {
    fn from(req: UpdateUserRequest) -> Self {
        Patch {
            business_key: req.email,
            fields: UserPatch {
                name: req.name,
                age: req.age,
            },
            attachment: None,
        }
    }
}
