use actix_web::{web, HttpResponse};
use serde_json::{json, Map, Value};

use crate::auth::TokenService;
use crate::error::AppError;

/// Signs whatever identity the client sends and stores it in the `token`
/// cookie.
pub async fn issue_token(
    tokens: web::Data<TokenService>,
    user: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, AppError> {
    // Sign the payload with a one hour expiry
    let token = tokens.issue(user.into_inner())?;

    // Respond with the token in an HttpOnly cookie
    Ok(HttpResponse::Ok()
        .cookie(tokens.session_cookie(token))
        .json(json!({ "success": true })))
}

pub async fn logout(tokens: web::Data<TokenService>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(tokens.cleared_cookie())
        .json(json!({ "success": true }))
}
