use std::collections::HashMap;
use std::env;

use crate::auth::adapter::outgoing::jwt::JwtConfig;

pub const DEFAULT_CONFIRMATION_CODE_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Where confirmation emails go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailConfig {
    /// Messages are written to the log instead of being delivered.
    Log,
    Smtp {
        server: String,
        username: String,
        password: String,
        from: String,
    },
    /// Unauthenticated relay (Mailpit, MailHog) used by the test environment.
    LocalSmtp { host: String, port: u16, from: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub confirmation_code_length: usize,
    pub email: EmailConfig,
    pub run_migrations: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    /// Loads `.env.{RUST_ENV}` (falling back to `.env`) and reads the process environment.
    #[cfg(not(tarpaulin_include))]
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());

        let env_file = format!(".env.{}", environment);
        if dotenvy::from_filename(&env_file).is_err() {
            dotenvy::dotenv().ok();
        }

        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_map(&vars)
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let environment = lookup("RUST_ENV").unwrap_or_else(|| "development".to_string());

        let port = required("PORT")?
            .parse::<u16>()
            .map_err(|e| ConfigError::invalid("PORT", e.to_string()))?;

        let confirmation_code_length = match lookup("CONFIRMATION_CODE_LENGTH") {
            None => DEFAULT_CONFIRMATION_CODE_LENGTH,
            Some(raw) => {
                let len = raw
                    .parse::<usize>()
                    .map_err(|e| ConfigError::invalid("CONFIRMATION_CODE_LENGTH", e.to_string()))?;
                if !(4..=32).contains(&len) {
                    return Err(ConfigError::invalid(
                        "CONFIRMATION_CODE_LENGTH",
                        "must be between 4 and 32",
                    ));
                }
                len
            }
        };

        let local_environment = matches!(environment.as_str(), "development" | "test");
        let backend = match lookup("EMAIL_BACKEND") {
            Some(backend) => backend,
            None if local_environment => "log".to_string(),
            None => return Err(ConfigError::Missing("EMAIL_BACKEND")),
        };

        let email = match backend.as_str() {
            "log" if local_environment => EmailConfig::Log,
            "log" => {
                return Err(ConfigError::invalid(
                    "EMAIL_BACKEND",
                    format!(
                        "'log' is only allowed in development or test, not '{}'",
                        environment
                    ),
                ))
            }
            "smtp" if environment == "test" => EmailConfig::LocalSmtp {
                host: lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: lookup("SMTP_PORT")
                    .unwrap_or_else(|| "1025".to_string())
                    .parse()
                    .map_err(|_| ConfigError::invalid("SMTP_PORT", "not a port number"))?,
                from: required("EMAIL_FROM")?,
            },
            "smtp" => EmailConfig::Smtp {
                server: required("SMTP_SERVER")?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                from: required("EMAIL_FROM")?,
            },
            other => {
                return Err(ConfigError::invalid(
                    "EMAIL_BACKEND",
                    format!("unknown backend '{}', expected 'smtp' or 'log'", other),
                ))
            }
        };

        let run_migrations = match lookup("RUN_MIGRATIONS").as_deref() {
            None => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(_) => {
                return Err(ConfigError::invalid(
                    "RUN_MIGRATIONS",
                    "expected true or false",
                ))
            }
        };

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_USERNAME"),
            lookup("BOOTSTRAP_ADMIN_EMAIL"),
        ) {
            (Some(username), Some(email)) => Some(BootstrapAdmin { username, email }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BOOTSTRAP_ADMIN_EMAIL")),
            (None, Some(_)) => return Err(ConfigError::Missing("BOOTSTRAP_ADMIN_USERNAME")),
        };

        Ok(Self {
            environment,
            database_url: required("DATABASE_URL")?,
            host: required("HOST")?,
            port,
            jwt: JwtConfig::from_lookup(lookup)?,
            confirmation_code_length,
            email,
            run_migrations,
            bootstrap_admin,
        })
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
