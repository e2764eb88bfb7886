//! In-process repositories for handler tests. They keep insertion order as
//! the natural order, as a fresh MongoDB collection does.

use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use super::{FoodRepository, OrderRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Food, FoodFields, PageWindow, PriceOrder, StockUpdate, UpdateAck};

#[derive(Default)]
pub struct MemoryFoods {
    items: Mutex<Vec<Food>>,
}

impl MemoryFoods {
    pub fn snapshot(&self) -> Vec<Food> {
        self.items.lock().unwrap().clone()
    }

    fn update(&self, id: ObjectId, apply: impl FnOnce(&mut Food)) -> UpdateAck {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|food| food.id == id) {
            Some(food) => {
                let before = food.clone();
                apply(food);
                UpdateAck::new(1, u64::from(*food != before))
            }
            None => UpdateAck::new(0, 0),
        }
    }
}

#[async_trait]
impl FoodRepository for MemoryFoods {
    async fn list(&self, window: Option<PageWindow>) -> Result<Vec<Food>, AppError> {
        let items = self.snapshot();
        Ok(match window {
            Some(window) => items
                .into_iter()
                .skip(window.skip as usize)
                .take(window.limit as usize)
                .collect(),
            None => items,
        })
    }

    async fn estimated_count(&self) -> Result<u64, AppError> {
        Ok(self.items.lock().unwrap().len() as u64)
    }

    async fn search_by_name(&self, text: &str) -> Result<Vec<Food>, AppError> {
        let needle = text.to_lowercase();
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|food| food.name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn list_by_price(&self, order: PriceOrder) -> Result<Vec<Food>, AppError> {
        let mut items = self.snapshot();
        match order {
            PriceOrder::LowToHigh => items.sort_by(|a, b| a.price.total_cmp(&b.price)),
            PriceOrder::HighToLow => items.sort_by(|a, b| b.price.total_cmp(&a.price)),
            PriceOrder::Natural => {}
        }
        Ok(items)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Food>, AppError> {
        Ok(self.snapshot().into_iter().find(|food| food.id == id))
    }

    async fn best_sellers(&self, limit: i64) -> Result<Vec<Food>, AppError> {
        let mut items = self.snapshot();
        items.sort_by(|a, b| b.count.cmp(&a.count));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn list_by_owner(&self, email: &str) -> Result<Vec<Food>, AppError> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|food| food.email == email)
            .collect())
    }

    async fn insert(&self, fields: FoodFields) -> Result<ObjectId, AppError> {
        let id = ObjectId::new();
        self.items
            .lock()
            .unwrap()
            .push(Food::from_fields(id, fields));
        Ok(id)
    }

    async fn update_stock(&self, id: ObjectId, stock: StockUpdate) -> Result<UpdateAck, AppError> {
        Ok(self.update(id, |food| {
            food.count = stock.count;
            food.quantity = stock.quantity;
        }))
    }

    async fn replace_fields(
        &self,
        id: ObjectId,
        fields: FoodFields,
    ) -> Result<UpdateAck, AppError> {
        Ok(self.update(id, |food| *food = Food::from_fields(id, fields)))
    }
}

#[derive(Default)]
pub struct MemoryDocuments {
    documents: Mutex<Vec<Document>>,
}

impl MemoryDocuments {
    pub fn snapshot(&self) -> Vec<Document> {
        self.documents.lock().unwrap().clone()
    }

    fn push(&self, mut document: Document) -> ObjectId {
        let id = ObjectId::new();
        document.insert("_id", id);
        self.documents.lock().unwrap().push(document);
        id
    }
}

#[async_trait]
impl OrderRepository for MemoryDocuments {
    async fn list_by_email(&self, email: &str) -> Result<Vec<Document>, AppError> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|doc| doc.get_str("email").map_or(false, |e| e == email))
            .collect())
    }

    async fn insert(&self, order: Document) -> Result<ObjectId, AppError> {
        Ok(self.push(order))
    }

    async fn delete(&self, id: ObjectId) -> Result<u64, AppError> {
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|doc| doc.get_object_id("_id").map_or(true, |own| own != id));
        Ok((before - documents.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for MemoryDocuments {
    async fn insert(&self, user: Document) -> Result<ObjectId, AppError> {
        Ok(self.push(user))
    }
}
