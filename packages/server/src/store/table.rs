use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use super::{Entry, EntryBackend, StoreError};

/// An [`Entry`] that is the model of a sea-orm entity.
///
/// The table must declare the business key column `unique`; the database
/// constraint is what keeps keys unique across processes.
pub trait TableEntry: Entry + FromQueryResult {
    type Table: EntityTrait<Model = Self, ActiveModel = Self::Active>;
    type Active: ActiveModelTrait<Entity = Self::Table> + ActiveModelBehavior + Send + Sync;

    fn id_column() -> <Self::Table as EntityTrait>::Column;
    fn key_column() -> <Self::Table as EntityTrait>::Column;
    fn created_column() -> <Self::Table as EntityTrait>::Column;

    /// Active model with every column set, ready for insert or full update.
    fn to_active(&self) -> Self::Active;
}

/// Relational backend over a sea-orm connection.
pub struct SeaOrmBackend<E> {
    db: DatabaseConnection,
    _entry: PhantomData<fn() -> E>,
}

impl<E> SeaOrmBackend<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entry: PhantomData,
        }
    }
}

/// Turn a unique-index violation on write into a typed conflict.
fn map_write_err<E: Entry>(err: DbErr, key: &str) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::conflict(E::KIND, key),
        _ => err.into(),
    }
}

#[async_trait]
impl<E> EntryBackend<E> for SeaOrmBackend<E>
where
    E: TableEntry + IntoActiveModel<E::Active>,
{
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let rows = E::Table::find()
            .order_by_asc(E::created_column())
            .order_by_asc(E::id_column())
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>, StoreError> {
        let row = E::Table::find()
            .filter(E::id_column().eq(id))
            .one(&self.db)
            .await?;
        Ok(row)
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<E>, StoreError> {
        let row = E::Table::find()
            .filter(E::key_column().eq(key))
            .one(&self.db)
            .await?;
        Ok(row)
    }

    async fn insert(&self, entry: E) -> Result<E, StoreError> {
        E::Table::insert(entry.to_active())
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| map_write_err::<E>(e, entry.business_key()))?;
        Ok(entry)
    }

    async fn replace(&self, entry: E) -> Result<E, StoreError> {
        match entry.to_active().update(&self.db).await {
            Ok(model) => Ok(model),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::not_found(E::KIND)),
            Err(e) => Err(map_write_err::<E>(e, entry.business_key())),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<Option<E>, StoreError> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let result = E::Table::delete_many()
            .filter(E::id_column().eq(id))
            .exec(&self.db)
            .await?;

        Ok((result.rows_affected > 0).then_some(existing))
    }
}
