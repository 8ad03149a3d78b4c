use std::env;
use std::fmt;

use crate::error::AppError;
use crate::security::is_valid_role;

/// Deployment stage. Only `Local` and `Development` disclose the message of
/// unexpected errors to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Local,
    Development,
    Staging,
    Production,
}

impl Stage {
    /// Parses a `STAGE` value. Anything unrecognised is treated as production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Stage::Local,
            "development" | "dev" => Stage::Development,
            "staging" | "stage" => Stage::Staging,
            _ => Stage::Production,
        }
    }

    pub fn discloses_internal_errors(self) -> bool {
        matches!(self, Stage::Local | Stage::Development)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Local => "local",
            Stage::Development => "development",
            Stage::Staging => "staging",
            Stage::Production => "production",
        };
        f.write_str(name)
    }
}

/// Settings the auth gate needs on every request.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// HS256 signing secret. Absence is reported per request as an internal
    /// error rather than refusing to start.
    pub jwt_secret: Option<String>,
    /// Expected `aud` claim; the claim is not checked when unset.
    pub jwt_audience: Option<String>,
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
            jwt_audience: None,
        }
    }
}

/// Process-wide configuration, built once at startup and passed explicitly to
/// the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_role: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    pub server_host: String,
    pub server_port: u16,
    pub auth: AuthConfig,
    pub stage: Stage,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| AppError::Internal("DATABASE_URL must be set".into()))?;

        let database_role = var("DATABASE_ROLE");
        if let Some(role) = &database_role {
            if !is_valid_role(role) {
                return Err(AppError::Internal(format!(
                    "DATABASE_ROLE '{}' is not a valid role name",
                    role
                )));
            }
        }

        let database_max_connections = parse_or(
            var("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            5,
        )?;
        let run_migrations = parse_or(var("RUN_MIGRATIONS"), "RUN_MIGRATIONS", false)?;
        let server_port = parse_or(var("SERVER_PORT"), "SERVER_PORT", 8080)?;

        Ok(Self {
            database_url,
            database_role,
            database_max_connections,
            run_migrations,
            server_host: var("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port,
            auth: AuthConfig {
                jwt_secret: var("JWT_SECRET"),
                jwt_audience: var("JWT_AUDIENCE"),
            },
            stage: var("STAGE")
                .map(|stage| Stage::parse(&stage))
                .unwrap_or(Stage::Production),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Internal(format!("{} has an invalid value: '{}'", key, raw))),
        None => Ok(default),
    }
}
