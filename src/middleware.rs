use actix_service::{forward_ready, Service};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::{TokenService, TOKEN_COOKIE};
use crate::error::{AppError, AuthError};

/// Rejects requests without a valid `token` cookie and hands the decoded
/// [`Identity`](crate::auth::Identity) to the wrapped service.
pub struct AuthMiddleware {
    tokens: web::Data<TokenService>,
}

impl AuthMiddleware {
    pub fn new(tokens: web::Data<TokenService>) -> Self {
        AuthMiddleware { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();

    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: web::Data<TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let tokens = self.tokens.clone();
        let service = self.service.clone();

        Box::pin(async move {
            // An empty cookie is what logout leaves behind.
            let verified = req
                .cookie(TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_owned())
                .filter(|value| !value.is_empty())
                .ok_or(AuthError::Missing)
                .and_then(|token| tokens.verify(&token));

            match verified {
                Ok(identity) => {
                    // The wrapped service only runs once the token has verified.
                    req.extensions_mut().insert(identity);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(cause) => {
                    log::debug!("Rejected {}: {}", req.path(), cause);
                    let response = AppError::from(cause).error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
