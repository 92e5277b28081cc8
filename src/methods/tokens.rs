use chrono::{DateTime, Utc};
use diesel::prelude::*;
use secrets::Secret;
use std::ops::Add;
use warp::http::StatusCode;
use warp::Rejection;
use warp::Reply;

use crate::helper_model::{DriveshareError, ErrorResponse};
use crate::model::{AccessToken, NewAccessToken};
use crate::POOL;

fn generate_unique_token() -> Vec<u8> {
    loop {
        // Secure random 32-byte token
        let token_vec = Secret::<[u8; 32]>::random(|s| s.to_vec());
        let token_to_return = token_vec.clone();

        let token_exists = {
            let mut pool = match POOL.get() {
                Ok(pool) => pool,
                Err(e) => {
                    eprintln!("Pool error generating token: {:?}", e);
                    continue;
                }
            };
            use crate::schema::access_tokens::dsl::*;
            diesel::select(diesel::dsl::exists(
                access_tokens.filter(token.eq(token_vec)),
            ))
            .get_result::<bool>(&mut pool)
            // Treat a DB error as if the token exists, to force a retry.
            .unwrap_or(true)
        };

        if !token_exists {
            return token_to_return;
        }
    }
}

/// Web sessions get a sliding ten minute window; the mobile app keeps a
/// token for 28 days.
fn expiry_for(user_agent: &str) -> DateTime<Utc> {
    if user_agent.contains("DriveshareApp") {
        Utc::now().add(chrono::Duration::days(28))
    } else {
        Utc::now().add(chrono::Duration::seconds(600))
    }
}

pub fn gen_token_object(user_id: &i32, user_agent: &str) -> NewAccessToken {
    NewAccessToken {
        user_id: *user_id,
        token: generate_unique_token(),
        exp: expiry_for(user_agent),
    }
}

/// Look up the token for this user and reject anything expired. The hex
/// decode failure is its own error so the caller can answer with the
/// format-specific reply.
pub fn verify_user_token(
    user_id_in: &i32,
    token_data: &str,
) -> Result<AccessToken, DriveshareError> {
    let binary_token = hex::decode(token_data).map_err(|_| DriveshareError::TokenFormatError)?;
    use crate::schema::access_tokens::dsl::*;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    let token_row = access_tokens
        .filter(user_id.eq(user_id_in))
        .filter(token.eq(binary_token))
        .first::<AccessToken>(&mut pool)
        .optional()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?
        .ok_or(DriveshareError::InvalidToken)?;
    if token_row.exp < Utc::now() {
        return Err(DriveshareError::InvalidToken);
    }
    Ok(token_row)
}

pub fn extend_token(token_row: AccessToken, user_agent: &str) -> Result<bool, DriveshareError> {
    use crate::schema::access_tokens::dsl::*;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    let updated = diesel::update(access_tokens.find(token_row.id))
        .set(exp.eq(expiry_for(user_agent)))
        .execute(&mut pool)
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    Ok(updated == 1)
}

pub fn rm_token_by_binary(token_bit: Vec<u8>) -> Option<AccessToken> {
    use crate::schema::access_tokens::dsl::*;
    let mut pool = POOL.get().ok()?;
    diesel::delete(access_tokens.filter(token.eq(token_bit)))
        .get_result::<AccessToken>(&mut pool)
        .ok()
}

pub fn token_not_hex_warp_return() -> Result<(warp::reply::Response,), Rejection> {
    let msg = ErrorResponse {
        title: String::from("Invalid Token"),
        message: String::from("Token is malformed. Please sign in again."),
    };
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::UNAUTHORIZED)
        .into_response(),))
}

pub fn token_invalid_return() -> Result<(warp::reply::Response,), Rejection> {
    let msg = ErrorResponse {
        title: String::from("Invalid Token"),
        message: String::from("Your session has expired. Please sign in again."),
    };
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::UNAUTHORIZED)
        .into_response(),))
}
