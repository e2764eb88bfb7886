use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::FindOptions;
use mongodb::Collection;

use super::{FoodRepository, OrderRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Food, FoodFields, PageWindow, PriceOrder, StockUpdate, UpdateAck};

pub struct MongoFoods {
    collection: Collection<Food>,
}

impl MongoFoods {
    pub fn new(collection: Collection<Food>) -> Self {
        MongoFoods { collection }
    }

    async fn find_all(
        &self,
        filter: Option<Document>,
        options: Option<FindOptions>,
    ) -> Result<Vec<Food>, AppError> {
        let cursor = self.collection.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl FoodRepository for MongoFoods {
    async fn list(&self, window: Option<PageWindow>) -> Result<Vec<Food>, AppError> {
        self.find_all(None, window.map(page_options)).await
    }

    async fn estimated_count(&self) -> Result<u64, AppError> {
        Ok(self.collection.estimated_document_count(None).await?)
    }

    async fn search_by_name(&self, text: &str) -> Result<Vec<Food>, AppError> {
        self.find_all(Some(name_search_filter(text)), None).await
    }

    async fn list_by_price(&self, order: PriceOrder) -> Result<Vec<Food>, AppError> {
        let options = price_sort(order).map(|sort| FindOptions::builder().sort(sort).build());
        self.find_all(None, options).await
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Food>, AppError> {
        Ok(self.collection.find_one(id_filter(id), None).await?)
    }

    async fn best_sellers(&self, limit: i64) -> Result<Vec<Food>, AppError> {
        self.find_all(None, Some(best_seller_options(limit))).await
    }

    async fn list_by_owner(&self, email: &str) -> Result<Vec<Food>, AppError> {
        self.find_all(Some(email_filter(email)), None).await
    }

    async fn insert(&self, fields: FoodFields) -> Result<ObjectId, AppError> {
        let document = mongodb::bson::to_document(&fields)?;
        insert_with_new_id(&self.collection.clone_with_type(), document).await
    }

    async fn update_stock(&self, id: ObjectId, stock: StockUpdate) -> Result<UpdateAck, AppError> {
        let result = self
            .collection
            .update_one(id_filter(id), stock_update_doc(stock), None)
            .await?;
        Ok(UpdateAck::new(result.matched_count, result.modified_count))
    }

    async fn replace_fields(
        &self,
        id: ObjectId,
        fields: FoodFields,
    ) -> Result<UpdateAck, AppError> {
        let update = replace_update_doc(&fields)?;
        let result = self
            .collection
            .update_one(id_filter(id), update, None)
            .await?;
        Ok(UpdateAck::new(result.matched_count, result.modified_count))
    }
}

pub struct MongoOrders {
    collection: Collection<Document>,
}

impl MongoOrders {
    pub fn new(collection: Collection<Document>) -> Self {
        MongoOrders { collection }
    }
}

#[async_trait]
impl OrderRepository for MongoOrders {
    async fn list_by_email(&self, email: &str) -> Result<Vec<Document>, AppError> {
        let cursor = self.collection.find(email_filter(email), None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, order: Document) -> Result<ObjectId, AppError> {
        insert_with_new_id(&self.collection, order).await
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, AppError> {
        let result = self.collection.delete_one(id_filter(id), None).await?;
        Ok(result.deleted_count)
    }
}

pub struct MongoUsers {
    collection: Collection<Document>,
}

impl MongoUsers {
    pub fn new(collection: Collection<Document>) -> Self {
        MongoUsers { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUsers {
    async fn insert(&self, user: Document) -> Result<ObjectId, AppError> {
        insert_with_new_id(&self.collection, user).await
    }
}

/// Assigns a fresh `_id`, replacing any identifier the client supplied.
async fn insert_with_new_id(
    collection: &Collection<Document>,
    mut document: Document,
) -> Result<ObjectId, AppError> {
    let id = ObjectId::new();
    document.insert("_id", id);
    collection.insert_one(document, None).await?;
    Ok(id)
}

pub(crate) fn id_filter(id: ObjectId) -> Document {
    doc! { "_id": id }
}

/// Owner scoping shared by food and order listings.
pub(crate) fn email_filter(email: &str) -> Document {
    doc! { "email": email }
}

/// Touches stock fields only; everything else on the document is left alone.
pub(crate) fn stock_update_doc(stock: StockUpdate) -> Document {
    doc! { "$set": { "count": stock.count, "quantity": stock.quantity } }
}

/// Sets every domain field while keeping `_id`.
pub(crate) fn replace_update_doc(fields: &FoodFields) -> Result<Document, AppError> {
    let replacement = mongodb::bson::to_document(fields)?;
    Ok(doc! { "$set": replacement })
}

pub(crate) fn page_options(window: PageWindow) -> FindOptions {
    FindOptions::builder()
        .skip(window.skip)
        .limit(window.limit)
        .build()
}

pub(crate) fn price_sort(order: PriceOrder) -> Option<Document> {
    match order {
        PriceOrder::LowToHigh => Some(doc! { "price": 1 }),
        PriceOrder::HighToLow => Some(doc! { "price": -1 }),
        PriceOrder::Natural => None,
    }
}

pub(crate) fn best_seller_options(limit: i64) -> FindOptions {
    FindOptions::builder()
        .sort(doc! { "count": -1 })
        .limit(limit)
        .build()
}

pub(crate) fn name_search_filter(text: &str) -> Document {
    doc! { "name": { "$regex": escape_regex(text), "$options": "i" } }
}

/// Escapes regex metacharacters so the text matches literally.
pub(crate) fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
