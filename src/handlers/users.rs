use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::{payload_to_document, InsertAck};
use crate::repository::UserRepository;

pub async fn create_user(
    users: web::Data<dyn UserRepository>,
    user_data: web::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let user = payload_to_document(user_data.into_inner())?;
    let id = users.insert(user).await?;
    log::info!("User {} created", id);
    Ok(HttpResponse::Created().json(InsertAck::new(id)))
}
