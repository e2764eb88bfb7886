use actix_web::{HttpResponse, Responder};

pub async fn liveness() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("server is running")
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};

    use crate::handlers::testing::{test_app, TestState};

    #[actix_web::test]
    async fn root_reports_liveness() {
        let state = TestState::new();
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, "server is running");
    }
}
