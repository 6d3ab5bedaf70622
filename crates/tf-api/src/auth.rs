use axum::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clap::ValueEnum;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use tf_common::workflow::Actor;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum AuthMode {
    ApiKey,
    Jwt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum JwtAlgorithm {
    Hs256,
    Hs512,
    Rs256,
}

pub enum JwtKeyKind {
    Secret,
    Public,
}

impl JwtAlgorithm {
    pub fn key_kind(&self) -> JwtKeyKind {
        match self {
            JwtAlgorithm::Hs256 | JwtAlgorithm::Hs512 => JwtKeyKind::Secret,
            JwtAlgorithm::Rs256 => JwtKeyKind::Public,
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            JwtAlgorithm::Hs256 => Algorithm::HS256,
            JwtAlgorithm::Hs512 => Algorithm::HS512,
            JwtAlgorithm::Rs256 => Algorithm::RS256,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub api_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_public_key: Option<String>,
    pub jwt_algorithm: JwtAlgorithm,
}

/// The authenticated caller. `elevated` gates workflow deletion and
/// cross-owner edits.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
    pub elevated: bool,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor {
            subject: self.subject.clone(),
            elevated: self.elevated,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: Option<usize>,
    #[serde(default)]
    elevated: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);

        match config.mode {
            AuthMode::ApiKey => authorize_api_key(parts, &config),
            AuthMode::Jwt => authorize_jwt(parts, &config),
        }
    }
}

fn authorize_api_key(parts: &Parts, config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let expected = config
        .api_key
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("missing TF_API_KEY".into()))?;

    let provided = parts
        .headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing X-API-Key header".into()))?;

    if provided != expected {
        return Err(ApiError::Unauthorized("invalid API key".into()));
    }

    // API-key callers are trusted service integrations.
    Ok(AuthUser {
        subject: "api_key".to_string(),
        elevated: true,
    })
}

fn authorize_jwt(parts: &Parts, config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("expected Bearer token".into()))?;

    let key = match config.jwt_algorithm.key_kind() {
        JwtKeyKind::Secret => {
            let secret = config
                .jwt_secret
                .as_deref()
                .ok_or_else(|| ApiError::Unauthorized("missing JWT_SECRET".into()))?;
            DecodingKey::from_secret(secret.as_bytes())
        }
        JwtKeyKind::Public => {
            let pem = config
                .jwt_public_key
                .as_deref()
                .ok_or_else(|| ApiError::Unauthorized("missing JWT_PUBLIC_KEY".into()))?;
            DecodingKey::from_rsa_pem(pem.as_bytes())
                .map_err(|err| ApiError::Unauthorized(format!("invalid public key: {err}")))?
        }
    };

    let validation = Validation::new(config.jwt_algorithm.algorithm());

    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|err| ApiError::Unauthorized(format!("invalid token: {err}")))?;

    Ok(AuthUser {
        subject: data.claims.sub,
        elevated: data.claims.elevated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: usize,
        elevated: bool,
    }

    fn parts_with_headers(headers: &[(&str, String)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn api_key_config(key: &str) -> AuthConfig {
        AuthConfig {
            mode: AuthMode::ApiKey,
            api_key: Some(key.into()),
            jwt_secret: None,
            jwt_public_key: None,
            jwt_algorithm: JwtAlgorithm::Hs256,
        }
    }

    #[test]
    fn api_key_callers_are_elevated() {
        let parts = parts_with_headers(&[("x-api-key", "k1".into())]);
        let user = authorize_api_key(&parts, &api_key_config("k1")).unwrap();
        assert!(user.elevated);
        assert_eq!(user.subject, "api_key");
    }

    #[test]
    fn wrong_api_key_is_unauthorized() {
        let parts = parts_with_headers(&[("x-api-key", "nope".into())]);
        assert!(authorize_api_key(&parts, &api_key_config("k1")).is_err());
    }

    #[test]
    fn jwt_carries_subject_and_elevation() {
        let secret = "jwt-secret";
        let token = encode(
            &Header::default(),
            &TestClaims {
                sub: "recruiter-7".into(),
                exp: usize::MAX,
                elevated: false,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let config = AuthConfig {
            mode: AuthMode::Jwt,
            api_key: None,
            jwt_secret: Some(secret.into()),
            jwt_public_key: None,
            jwt_algorithm: JwtAlgorithm::Hs256,
        };
        let parts = parts_with_headers(&[("authorization", format!("Bearer {token}"))]);
        let user = authorize_jwt(&parts, &config).unwrap();

        assert_eq!(user.subject, "recruiter-7");
        assert!(!user.elevated);
        assert_eq!(user.actor().subject, "recruiter-7");
    }
}
