use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde_json::{Map, Value};

use crate::error::{AppError, AuthError};

pub const TOKEN_COOKIE: &str = "token";

/// Token and cookie lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Identity decoded from a verified token; inserted into request extensions
/// by the auth gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub email: Option<String>,
    pub claims: Map<String, Value>,
}

impl Identity {
    fn from_claims(claims: Map<String, Value>) -> Self {
        let email = claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Identity { email, claims }
    }

    /// Owner-scoped routes only serve the caller's own email.
    pub fn authorize<'a>(&self, requested: Option<&'a str>) -> Result<&'a str, AppError> {
        match (requested, self.email.as_deref()) {
            (Some(requested), Some(own)) if requested == own => Ok(requested),
            _ => Err(AppError::Forbidden),
        }
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .cloned()
                .ok_or(AppError::Unauthorized(AuthError::Missing)),
        )
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    secure_cookies: bool,
}

impl TokenService {
    pub fn new(secret: &str, secure_cookies: bool) -> Self {
        TokenService {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            secure_cookies,
        }
    }

    /// Signs the caller's payload with `iat`/`exp` claims added.
    pub fn issue(&self, mut payload: Map<String, Value>) -> Result<String, AppError> {
        let issued_at = chrono::Utc::now().timestamp();
        payload.insert("iat".to_string(), Value::from(issued_at));
        payload.insert("exp".to_string(), Value::from(issued_at + TOKEN_TTL_SECS));

        Ok(encode(&Header::default(), &payload, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        decode::<Map<String, Value>>(token, &self.decoding, &self.validation)
            .map(|data| Identity::from_claims(data.claims))
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        self.cookie(token, Duration::seconds(TOKEN_TTL_SECS))
    }

    pub fn cleared_cookie(&self) -> Cookie<'static> {
        self.cookie(String::new(), Duration::ZERO)
    }

    fn cookie(&self, value: String, max_age: Duration) -> Cookie<'static> {
        // Browsers drop SameSite=None cookies that are not Secure.
        let same_site = if self.secure_cookies {
            SameSite::None
        } else {
            SameSite::Lax
        };
        Cookie::build(TOKEN_COOKIE, value)
            .path("/")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(same_site)
            .max_age(max_age)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn signed_with(secret: &str, claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_verifies_with_email() {
        let tokens = TokenService::new(SECRET, true);
        let token = tokens
            .issue(payload(json!({ "email": "chef@kitchen.test" })))
            .unwrap();

        let identity = tokens.verify(&token).unwrap();
        assert_eq!(identity.email.as_deref(), Some("chef@kitchen.test"));
        let iat = identity.claims["iat"].as_i64().unwrap();
        let exp = identity.claims["exp"].as_i64().unwrap();
        assert_eq!(exp - iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn rejects_expired_token() {
        let tokens = TokenService::new(SECRET, true);
        let token = signed_with(SECRET, json!({ "email": "a@b.c", "exp": 1_000_000 }));
        assert_eq!(tokens.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn rejects_foreign_signature() {
        let tokens = TokenService::new(SECRET, true);
        let exp = chrono::Utc::now().timestamp() + 600;
        let token = signed_with("another-secret", json!({ "email": "a@b.c", "exp": exp }));
        assert_eq!(tokens.verify(&token), Err(AuthError::Invalid));
    }

    #[test]
    fn rejects_garbage() {
        let tokens = TokenService::new(SECRET, true);
        assert_eq!(tokens.verify("not-a-jwt"), Err(AuthError::Invalid));
    }

    #[test]
    fn authorize_requires_matching_email() {
        let identity = Identity::from_claims(payload(json!({ "email": "a@b.c" })));
        assert_eq!(identity.authorize(Some("a@b.c")).unwrap(), "a@b.c");
        assert!(matches!(
            identity.authorize(Some("x@y.z")),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(identity.authorize(None), Err(AppError::Forbidden)));

        let anonymous = Identity::from_claims(payload(json!({ "name": "no email" })));
        assert!(matches!(
            anonymous.authorize(Some("a@b.c")),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn session_cookie_is_cross_site_http_only() {
        let cookie = TokenService::new(SECRET, true).session_cookie("abc".into());
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(Duration::hours(1)));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cookie = TokenService::new(SECRET, false).cleared_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
