use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{
    parse_object_id, EmailQuery, FilterQuery, FoodFields, InsertAck, PageQuery, PriceOrder,
    SearchQuery, StockUpdate,
};
use crate::repository::FoodRepository;

pub const BEST_SELLER_LIMIT: i64 = 6;

type Foods = web::Data<dyn FoodRepository>;

pub async fn list_foods(
    foods: Foods,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let items = foods.list(query.window()).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn count_foods(foods: Foods) -> Result<HttpResponse, AppError> {
    let count = foods.estimated_count().await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

pub async fn search_foods(
    foods: Foods,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let text = query.q.as_deref().unwrap_or_default();
    let items = foods.search_by_name(text).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn filter_foods(
    foods: Foods,
    query: web::Query<FilterQuery>,
) -> Result<HttpResponse, AppError> {
    let order = PriceOrder::from_filter(query.filter_type.as_deref());
    let items = foods.list_by_price(order).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn single_food(foods: Foods, id: web::Path<String>) -> Result<HttpResponse, AppError> {
    // Malformed ids are rejected before touching the database
    let id = parse_object_id(&id)?;
    match foods.find_by_id(id).await? {
        Some(food) => Ok(HttpResponse::Ok().json(food)),
        // No document with that id
        None => Err(AppError::NotFound("Food item not found")),
    }
}

pub async fn best_sellers(foods: Foods) -> Result<HttpResponse, AppError> {
    let items = foods.best_sellers(BEST_SELLER_LIMIT).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn added_foods(
    foods: Foods,
    identity: Identity,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, AppError> {
    // The requested email must be the one inside the token
    let email = identity.authorize(query.email.as_deref())?;
    let items = foods.list_by_owner(email).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn create_food(
    foods: Foods,
    new_food: web::Json<FoodFields>,
) -> Result<HttpResponse, AppError> {
    let id = foods.insert(new_food.into_inner()).await?;
    log::info!("Food item {} created", id);
    Ok(HttpResponse::Created().json(InsertAck::new(id)))
}

pub async fn update_stock(
    foods: Foods,
    id: web::Path<String>,
    stock: web::Json<StockUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&id)?;
    // Only count and quantity change; a missing food reports zero matches
    let ack = foods.update_stock(id, stock.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ack))
}

pub async fn update_food(
    foods: Foods,
    id: web::Path<String>,
    new_food: web::Json<FoodFields>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&id)?;
    let ack = foods.replace_fields(id, new_food.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ack))
}
