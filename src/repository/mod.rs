//! Data access seams. Handlers only see these traits; [`mongo`] backs them in
//! production.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::error::AppError;
use crate::models::{Food, FoodFields, PageWindow, PriceOrder, StockUpdate, UpdateAck};

#[cfg(test)]
pub mod memory;
pub mod mongo;

#[async_trait]
pub trait FoodRepository: Send + Sync {
    /// Natural order, optionally windowed.
    async fn list(&self, window: Option<PageWindow>) -> Result<Vec<Food>, AppError>;

    /// Fast estimate from collection metadata.
    async fn estimated_count(&self) -> Result<u64, AppError>;

    /// Case-insensitive literal substring match on `name`.
    async fn search_by_name(&self, text: &str) -> Result<Vec<Food>, AppError>;

    async fn list_by_price(&self, order: PriceOrder) -> Result<Vec<Food>, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Food>, AppError>;

    /// Highest `count` first, at most `limit` items.
    async fn best_sellers(&self, limit: i64) -> Result<Vec<Food>, AppError>;

    async fn list_by_owner(&self, email: &str) -> Result<Vec<Food>, AppError>;

    async fn insert(&self, fields: FoodFields) -> Result<ObjectId, AppError>;

    /// Overwrites only `count` and `quantity`.
    async fn update_stock(&self, id: ObjectId, stock: StockUpdate) -> Result<UpdateAck, AppError>;

    /// Overwrites every domain field.
    async fn replace_fields(&self, id: ObjectId, fields: FoodFields)
        -> Result<UpdateAck, AppError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn list_by_email(&self, email: &str) -> Result<Vec<Document>, AppError>;

    async fn insert(&self, order: Document) -> Result<ObjectId, AppError>;

    /// Returns the number of removed documents.
    async fn delete(&self, id: ObjectId) -> Result<u64, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: Document) -> Result<ObjectId, AppError>;
}
