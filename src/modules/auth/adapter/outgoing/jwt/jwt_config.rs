use crate::config::ConfigError;

pub const DEFAULT_ISSUER: &str = "reviews-api";
pub const DEFAULT_ACCESS_EXPIRY: i64 = 86400;
const MAX_ACCESS_EXPIRY: i64 = 604800;
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret_key: String,
    pub issuer: String,
    pub access_token_expiry: i64, // Expiration in seconds
}

impl JwtConfig {
    /// Reads `JWT_SECRET`, `JWT_ISSUER` and `JWT_ACCESS_EXPIRY` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        // HS256 requires at least 32 bytes
        if secret_key.len() < MIN_SECRET_LEN {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                "must be at least 32 characters long for HS256",
            ));
        }

        let access_token_expiry = match lookup("JWT_ACCESS_EXPIRY") {
            None => DEFAULT_ACCESS_EXPIRY,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|e| ConfigError::invalid("JWT_ACCESS_EXPIRY", e.to_string()))?,
        };

        if !(1..=MAX_ACCESS_EXPIRY).contains(&access_token_expiry) {
            return Err(ConfigError::invalid(
                "JWT_ACCESS_EXPIRY",
                "must be between 1 and 604800 seconds (7 days)",
            ));
        }

        let issuer = lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string());

        Ok(Self {
            secret_key,
            issuer,
            access_token_expiry,
        })
    }
}
