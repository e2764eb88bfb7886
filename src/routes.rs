use std::sync::Arc;

use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::auth::TokenService;
use crate::error::AppError;
use crate::handlers::{foods, health, orders, session, users};
use crate::middleware::AuthMiddleware;
use crate::repository::{FoodRepository, OrderRepository, UserRepository};

/// Handles shared by every worker.
#[derive(Clone)]
pub struct AppState {
    foods: web::Data<dyn FoodRepository>,
    orders: web::Data<dyn OrderRepository>,
    users: web::Data<dyn UserRepository>,
    tokens: web::Data<TokenService>,
}

impl AppState {
    pub fn new(
        foods: Arc<dyn FoodRepository>,
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        tokens: TokenService,
    ) -> Self {
        AppState {
            foods: web::Data::from(foods),
            orders: web::Data::from(orders),
            users: web::Data::from(users),
            tokens: web::Data::new(tokens),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.foods.clone())
        .app_data(state.orders.clone())
        .app_data(state.users.clone())
        .app_data(state.tokens.clone())
        .app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| bad_request(err)))
        .route("/", web::get().to(health::liveness))
        .service(
            web::resource("/foods")
                .route(web::get().to(foods::list_foods))
                .route(web::post().to(foods::create_food)),
        )
        .route("/foodsCount", web::get().to(foods::count_foods))
        .route("/searchFoods", web::get().to(foods::search_foods))
        .route("/filterFoods", web::get().to(foods::filter_foods))
        .route("/SingleFood/{id}", web::get().to(foods::single_food))
        .route("/bestSell", web::get().to(foods::best_sellers))
        .service(
            web::resource("/addedFoods")
                .wrap(AuthMiddleware::new(state.tokens.clone()))
                .route(web::get().to(foods::added_foods)),
        )
        .route("/foods/{id}", web::patch().to(foods::update_stock))
        .route("/updateFood/{id}", web::patch().to(foods::update_food))
        .service(
            web::resource("/orders")
                .wrap(AuthMiddleware::new(state.tokens.clone()))
                .route(web::get().to(orders::list_orders)),
        )
        .route("/orderedFoods", web::post().to(orders::create_order))
        .route("/orders/{id}", web::delete().to(orders::delete_order))
        .route("/users", web::post().to(users::create_user))
        .route("/jwt", web::post().to(session::issue_token))
        .route("/logout", web::post().to(session::logout));
}

pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    log::debug!("No route for {} {}", req.method(), req.path());
    Err(AppError::NotFound("route not found"))
}

fn bad_request(err: impl std::fmt::Display) -> error::Error {
    AppError::BadRequest(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::Value;

    use super::{configure, not_found};
    use crate::handlers::testing::TestState;

    #[actix_web::test]
    async fn unknown_route_gets_json_404() {
        let state = TestState::new();
        let app = test::init_service(
            App::new()
                .configure(|cfg| configure(cfg, &state.app_state()))
                .default_service(web::to(not_found)),
        )
        .await;

        let req = test::TestRequest::get().uri("/menu").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "route not found");
    }

    #[actix_web::test]
    async fn wrong_method_on_known_path_is_not_routed() {
        let state = TestState::new();
        let app = test::init_service(
            App::new()
                .configure(|cfg| configure(cfg, &state.app_state()))
                .default_service(web::to(not_found)),
        )
        .await;

        let req = test::TestRequest::put().uri("/bestSell").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}
