use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::config::Config;
use crate::entity::sea_orm_active_enums::UserRole;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repositories::UserRepository;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const TEMPORARY_PASSWORD_LENGTH: usize = 12;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // payroll number
    pub role: UserRole,
    pub name: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

pub struct AuthService;

impl AuthService {
    /// Hash a password using Argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let result = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();

        Ok(result)
    }

    /// Random alphanumeric password handed out on creation or reset
    pub fn generate_temporary_password() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TEMPORARY_PASSWORD_LENGTH)
            .map(char::from)
            .collect()
    }

    pub fn validate_new_password(password: &str) -> AppResult<()> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }

    /// Generate a JWT token for a user
    pub fn generate_token(user: &User, config: &Config) -> AppResult<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::hours(config.jwt_expiration_hours);

        let claims = Claims {
            sub: user.payroll_number.clone(),
            role: user.role,
            name: user.name.clone(),
            exp: exp.unix_timestamp(),
            iat: now.unix_timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(token)
    }

    /// Verify and decode a JWT token
    pub fn verify_token(token: &str, config: &Config) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Check credentials and mint a token
    pub async fn login<C>(
        db: &C,
        config: &Config,
        payroll_number: &str,
        password: &str,
    ) -> AppResult<(String, User)>
    where
        C: ConnectionTrait,
    {
        let user = UserRepository::find_optional(db, payroll_number.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            tracing::warn!(payroll_number = %user.payroll_number, "Rejected login");
            return Err(AppError::InvalidCredentials);
        }

        let token = Self::generate_token(&user, config)?;
        tracing::info!(payroll_number = %user.payroll_number, "User logged in");

        Ok((token, user))
    }

    /// Replace a password after checking the current one
    pub async fn change_password<C>(
        db: &C,
        payroll_number: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<User>
    where
        C: ConnectionTrait,
    {
        let user = UserRepository::find_optional(db, payroll_number)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", payroll_number)))?;

        if !Self::verify_password(current_password, &user.password_hash)? {
            tracing::warn!(payroll_number, "Password change with wrong current password");
            return Err(AppError::InvalidCredentials);
        }
        Self::validate_new_password(new_password)?;
        if current_password == new_password {
            return Err(AppError::Validation(
                "New password must differ from the current password".to_string(),
            ));
        }

        let hash = Self::hash_password(new_password)?;
        let user = UserRepository::set_password(db, payroll_number, &hash, false).await?;
        tracing::info!(payroll_number, "Password changed");

        Ok(user)
    }

    /// Issue a temporary password; the user must change it at next login
    pub async fn reset_password<C>(db: &C, payroll_number: &str) -> AppResult<(User, String)>
    where
        C: ConnectionTrait,
    {
        let temporary_password = Self::generate_temporary_password();
        let hash = Self::hash_password(&temporary_password)?;

        let user = UserRepository::set_password(db, payroll_number, &hash, true).await?;
        tracing::info!(payroll_number, "Password reset to a temporary password");

        Ok((user, temporary_password))
    }
}
