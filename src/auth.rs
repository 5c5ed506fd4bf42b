use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    error::{AppError, Result},
    models::User,
    services::user_service,
};

/// Claims of a session token issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // identity provider user id
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub sid: Option<String>, // session id
}

pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    /// A PEM public key verifies RS256 tokens; anything else is used as an
    /// HS256 shared secret (local development).
    pub fn new(key: &str) -> Result<Self> {
        let pem = key.replace("\\n", "\n");
        let (key, algorithm) = if pem.trim_start().starts_with("-----BEGIN") {
            (DecodingKey::from_rsa_pem(pem.trim().as_bytes())?, Algorithm::RS256)
        } else {
            (DecodingKey::from_secret(key.as_bytes()), Algorithm::HS256)
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = 5;

        Ok(Self { key, validation })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let token_data = decode::<SessionClaims>(token, &self.key, &self.validation)?;
        Ok(token_data.claims)
    }
}

async fn session_claims(parts: &mut Parts, state: &AppState) -> Result<SessionClaims> {
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::Authentication("Missing authorization header".to_string()))?;

    state.sessions.verify(bearer.token())
}

/// Signed-in user, provisioned in the content store on first use.
#[derive(Debug)]
pub struct AuthUser {
    pub user: User,
}

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let claims = session_claims(parts, state).await?;
        let user = user_service::ensure_user(&state.content, &state.identity, &claims.sub).await?;

        tracing::debug!(
            "Session {} verified for {}",
            claims.sid.as_deref().unwrap_or("-"),
            user.id
        );

        Ok(AuthUser { user })
    }
}

// Optional viewer id (for read endpoints that show the caller's own votes).
// Does not provision the user.
#[derive(Debug)]
pub struct OptionalAuthUser(pub Option<String>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match session_claims(parts, state).await {
            Ok(claims) => Ok(OptionalAuthUser(Some(claims.sub))),
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn token(secret: &str, sub: &str, exp: i64) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            exp,
            iat: Some(chrono::Utc::now().timestamp()),
            sid: Some("sess_1".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verifies_shared_secret_tokens() {
        let verifier = SessionVerifier::new("dev-secret").unwrap();
        let exp = chrono::Utc::now().timestamp() + 600;

        let claims = verifier.verify(&token("dev-secret", "user_1", exp)).unwrap();

        assert_eq!(claims.sub, "user_1");
        assert_eq!(claims.sid.as_deref(), Some("sess_1"));
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let verifier = SessionVerifier::new("dev-secret").unwrap();
        let now = chrono::Utc::now().timestamp();

        assert!(verifier.verify(&token("other", "user_1", now + 600)).is_err());
        assert!(verifier.verify(&token("dev-secret", "user_1", now - 600)).is_err());
        assert!(verifier.verify("not-a-token").is_err());
    }
}
