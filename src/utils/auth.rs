use crate::models::user::{Claims, User};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::env;

pub(crate) const DEV_SECRET: &str = "dev-session-secret-change-in-production";

/// Session validity window.
const SESSION_HOURS: i64 = 24;

pub(crate) fn session_secret() -> String {
    env::var("SESSION_SECRET").unwrap_or_else(|_| DEV_SECRET.to_string())
}

/// Hash a password using Argon2 with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify a password against a stored hash (constant-time comparison
/// inside the argon2 crate)
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Mint a signed session token carrying the user's id and the profile
/// fields as they are right now. The claims stay cached in the token
/// until a new one is minted at login or profile update.
pub fn create_session_token(user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::hours(SESSION_HOURS))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        age: user.age,
        phone: user.phone.clone(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(session_secret().as_ref()),
    )
}

/// Decode and validate a session token. Signature and expiry are the
/// only validity criteria; there is no server-side session state.
pub fn decode_session_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(session_secret().as_ref()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}
