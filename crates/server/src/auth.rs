//! Bearer-token authentication and credential hashing.
//!
//! Tokens are HS256 JWTs whose `sub` claim carries the account id. Passwords
//! are stored as `salt || sha256(salt || password)`.

use std::time::Duration;

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use engine::{AccountId, Engine, EngineError};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use api_types::auth::{AuthRequest, AuthResponse};

use crate::{ServerError, server::ServerState};

const SALT_LEN: usize = 16;
const HASH_LEN: usize = SALT_LEN + 32;

/// Id of the authenticated caller, inserted into request extensions by
/// [`require_bearer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallerId(pub AccountId);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct Authenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl Authenticator {
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    pub fn issue(&self, account_id: AccountId) -> Result<String, ServerError> {
        let ttl = i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: account_id.to_string(),
            exp: Utc::now().timestamp().saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| ServerError::Internal(format!("failed to sign token: {err}")))
    }

    pub fn verify(&self, token: &str) -> Result<AccountId, ServerError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|err| ServerError::Unauthorized(format!("invalid token: {err}")))?;
        data.claims
            .sub
            .parse()
            .map_err(|_| ServerError::Unauthorized("invalid token subject".to_string()))
    }
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

/// Salted SHA-256 of `password`, salt first.
pub fn hash_password(password: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut stored = salt.to_vec();
    stored.extend_from_slice(&digest(&salt, password));
    stored
}

/// Compare `password` against a value produced by [`hash_password`].
///
/// Anything of the wrong length (such as the shop's empty credential) never
/// matches.
pub fn verify_password(password: &str, stored: &[u8]) -> bool {
    if stored.len() != HASH_LEN {
        return false;
    }
    let (salt, expected) = stored.split_at(SALT_LEN);
    digest(salt, password)
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Resolve the account for `username`, registering it on first login.
///
/// Every store call shares `deadline`.
async fn login(
    engine: &Engine,
    username: &str,
    password: &str,
    deadline: Instant,
) -> Result<AccountId, EngineError> {
    let deadline = Some(deadline);
    let account = match engine.account_by_name(username, deadline).await {
        Ok(account) => account,
        Err(EngineError::UserNotFound(_)) => {
            match engine.register(username, &hash_password(password), deadline).await {
                Ok(id) => return Ok(id),
                // Registered concurrently: fall through to the password check.
                Err(EngineError::ExistingKey(_)) => {
                    engine.account_by_name(username, deadline).await?
                }
                Err(err) => return Err(err),
            }
        }
        Err(err) => return Err(err),
    };

    if !verify_password(password, &account.credential_hash) {
        return Err(EngineError::Unauthorized("wrong password".to_string()));
    }
    Ok(account.id)
}

/// `POST /api/auth`
pub async fn authenticate(
    State(state): State<ServerState>,
    Json(payload): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ServerError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ServerError::Generic(
            "username and password are required".to_string(),
        ));
    }

    let account_id = login(&state.engine, username, &payload.password, state.deadline()).await?;
    let token = state.auth.issue(account_id)?;
    Ok(Json(AuthResponse { token }))
}

/// Middleware resolving the bearer token into a [`CallerId`].
pub async fn require_bearer(
    header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = header else {
        return Err(ServerError::Unauthorized(
            "missing bearer token".to_string(),
        ));
    };

    let account_id = state.auth.verify(bearer.token())?;
    request.extensions_mut().insert(CallerId(account_id));
    Ok(next.run(request).await)
}
