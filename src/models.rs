use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string, Document};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A stored food item. Reads are lenient so legacy documents with absent or
/// mistyped fields still list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Food {
    #[serde(
        rename = "_id",
        serialize_with = "serialize_object_id_as_hex_string",
        deserialize_with = "lenient::object_id"
    )]
    pub id: ObjectId,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub origin: String,
    #[serde(deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(deserialize_with = "lenient::integer")]
    pub quantity: i64,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::float")]
    pub price: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub ingredients: String,
    #[serde(deserialize_with = "lenient::text")]
    pub image: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::integer")]
    pub count: i64,
}

/// Field readers for documents written by older clients.
mod lenient {
    use mongodb::bson::{oid::ObjectId, Bson};
    use serde::{Deserialize, Deserializer};

    pub fn object_id<'de, D: Deserializer<'de>>(d: D) -> Result<ObjectId, D::Error> {
        Ok(match Bson::deserialize(d)? {
            Bson::ObjectId(id) => id,
            Bson::String(hex) => ObjectId::parse_str(hex.trim()).unwrap_or_default(),
            _ => ObjectId::default(),
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Bson::deserialize(d)? {
            Bson::String(s) => s,
            Bson::Int32(n) => n.to_string(),
            Bson::Int64(n) => n.to_string(),
            Bson::Double(n) => n.to_string(),
            Bson::Boolean(b) => b.to_string(),
            _ => String::new(),
        })
    }

    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(match Bson::deserialize(d)? {
            Bson::Int32(n) => i64::from(n),
            Bson::Int64(n) => n,
            Bson::Double(n) => whole(n),
            Bson::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .unwrap_or_else(|_| s.parse::<f64>().map(whole).unwrap_or_default())
            }
            _ => 0,
        })
    }

    fn whole(n: f64) -> i64 {
        if n.is_finite() {
            n.trunc() as i64
        } else {
            0
        }
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(match Bson::deserialize(d)? {
            Bson::Double(n) => n,
            Bson::Int32(n) => f64::from(n),
            Bson::Int64(n) => n as f64,
            Bson::String(s) => s.trim().parse::<f64>().unwrap_or_default(),
            _ => 0.0,
        })
    }
}

impl Food {
    pub fn from_fields(id: ObjectId, fields: FoodFields) -> Self {
        Food {
            id,
            name: fields.name,
            origin: fields.origin,
            category: fields.category,
            quantity: fields.quantity,
            description: fields.description,
            price: fields.price,
            ingredients: fields.ingredients,
            image: fields.image,
            email: fields.email,
            count: fields.count,
        }
    }
}

/// Every domain field of a food item; used for creation and full replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodFields {
    pub name: String,
    pub origin: String,
    pub category: String,
    pub quantity: i64,
    pub description: String,
    pub price: f64,
    pub ingredients: String,
    pub image: String,
    pub email: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub count: i64,
    pub quantity: i64,
}

/// Skip/limit pair applied to the natural order of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl PageQuery {
    /// `None` when `size` is missing, non-numeric or zero: the whole
    /// collection is returned. A bad `page` counts as the first page.
    pub fn window(&self) -> Option<PageWindow> {
        let size = self
            .size
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|size| *size > 0)?;
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Some(PageWindow {
            skip: u64::from(page) * u64::from(size),
            limit: i64::from(size),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(rename = "filterType")]
    pub filter_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrder {
    LowToHigh,
    HighToLow,
    Natural,
}

impl PriceOrder {
    pub fn from_filter(filter_type: Option<&str>) -> Self {
        match filter_type {
            Some("lowToHigh") => PriceOrder::LowToHigh,
            Some("highToLow") => PriceOrder::HighToLow,
            _ => PriceOrder::Natural,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub inserted_id: ObjectId,
}

impl InsertAck {
    pub fn new(inserted_id: ObjectId) -> Self {
        InsertAck {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateAck {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        UpdateAck {
            acknowledged: true,
            matched_count,
            modified_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> Self {
        DeleteAck {
            acknowledged: true,
            deleted_count,
        }
    }
}

pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::BadRequest(format!("invalid identifier: {raw}")))
}

/// Converts a client JSON object into a BSON document for schemaless
/// collections.
pub fn payload_to_document(payload: serde_json::Value) -> Result<Document, AppError> {
    match payload {
        serde_json::Value::Object(map) => Document::try_from(map)
            .map_err(|e| AppError::BadRequest(format!("invalid payload: {e}"))),
        _ => Err(AppError::BadRequest(
            "request body must be a JSON object".to_string(),
        )),
    }
}

/// Renders a stored document as plain JSON, with `_id` as a hex string.
pub fn document_to_json(mut doc: Document) -> serde_json::Value {
    if let Ok(id) = doc.get_object_id("_id") {
        doc.insert("_id", id.to_hex());
    }
    mongodb::bson::Bson::Document(doc).into_relaxed_extjson()
}
