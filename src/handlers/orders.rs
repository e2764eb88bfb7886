use actix_web::{web, HttpResponse};

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::{
    document_to_json, parse_object_id, payload_to_document, DeleteAck, EmailQuery, InsertAck,
};
use crate::repository::OrderRepository;

type Orders = web::Data<dyn OrderRepository>;

pub async fn list_orders(
    orders: Orders,
    identity: Identity,
    query: web::Query<EmailQuery>,
) -> Result<HttpResponse, AppError> {
    // The requested email must be the one inside the token
    let email = identity.authorize(query.email.as_deref())?;

    // Orders are schemaless, so render them as plain JSON
    let items: Vec<_> = orders
        .list_by_email(email)
        .await?
        .into_iter()
        .map(document_to_json)
        .collect();
    Ok(HttpResponse::Ok().json(items))
}

pub async fn create_order(
    orders: Orders,
    ordered_data: web::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let order = payload_to_document(ordered_data.into_inner())?;
    let id = orders.insert(order).await?;
    log::info!("Order {} placed", id);
    Ok(HttpResponse::Created().json(InsertAck::new(id)))
}

pub async fn delete_order(
    orders: Orders,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&id)?;
    // Deleting an unknown order is not an error; the count says what happened
    let deleted = orders.delete(id).await?;
    Ok(HttpResponse::Ok().json(DeleteAck::new(deleted)))
}
