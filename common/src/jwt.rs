use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, dev::Payload, dev::ServiceRequest};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    env_config::JwtConfig,
    error::{AppError, Res},
};

/// Claims carried by an access token from the managed auth provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    /// The user id.
    pub sub: Uuid,
    pub aud: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// The verified caller. Handlers and guards receive it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<&JwtClaims> for AuthUser {
    fn from(claims: &JwtClaims) -> Self {
        AuthUser {
            id: claims.sub,
            email: claims.email.clone(),
        }
    }
}

/// Signs a token the way the auth provider does. Used by tooling and tests.
pub fn generate_jwt(claims: &JwtClaims, config: &JwtConfig) -> Res<String> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(AppError::from)
}

/// Extracts claims object from JWT token.
/// Checks signature, expiry and audience.
pub fn validate_jwt(token: &str, config: &JwtConfig) -> Res<JwtClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);
    let token_data = jsonwebtoken::decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

pub fn get_jwt_claims_or_error(req: &ServiceRequest) -> Result<JwtClaims, HttpResponse> {
    if let Some(jwt_claims_res) = req.extensions().get::<Res<JwtClaims>>() {
        match jwt_claims_res {
            Ok(claims) => Ok(claims.clone()),
            Err(app_error) => Err(app_error.to_http_response()),
        }
    } else {
        Err(
            AppError::Unauthorized("No authorization token provided".to_string())
                .to_http_response(),
        )
    }
}

/// Returns the caller when the request carried a valid token.
pub fn get_auth_user(req: &ServiceRequest) -> Option<AuthUser> {
    get_jwt_claims_or_error(req).ok().map(|claims| AuthUser::from(&claims))
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = match req.extensions().get::<Res<JwtClaims>>() {
            Some(Ok(claims)) => Ok(AuthUser::from(claims)),
            Some(Err(_)) => Err(AppError::Unauthorized("Invalid token".to_string())),
            None => Err(AppError::Unauthorized(
                "No authorization token provided".to_string(),
            )),
        };
        ready(user)
    }
}
