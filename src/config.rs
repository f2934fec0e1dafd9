use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub db_max_connections: u32,

    // JWT
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,

    // Tracking
    pub overdue_after_days: i64,

    // First administrator, created only when the users table is empty
    pub bootstrap_admin: Option<BootstrapAdmin>,

    // Server
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub payroll_number: String,
    pub name: String,
    pub password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if exists

        Ok(Self {
            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 20)?,

            // JWT
            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            jwt_expiration_hours: parse_or("JWT_EXPIRATION_HOURS", 24)?,

            // Tracking
            overdue_after_days: parse_or("OVERDUE_AFTER_DAYS", 30)?,

            bootstrap_admin: BootstrapAdmin::from_env()?,

            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000)?,
        })
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl BootstrapAdmin {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(payroll_number) = env::var("BOOTSTRAP_ADMIN_PAYROLL") else {
            return Ok(None);
        };
        let password = env::var("BOOTSTRAP_ADMIN_PASSWORD")
            .map_err(|_| ConfigError::Missing("BOOTSTRAP_ADMIN_PASSWORD"))?;

        Ok(Some(Self {
            payroll_number,
            name: env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            password,
        }))
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable: {0}")]
    Invalid(&'static str),
}
