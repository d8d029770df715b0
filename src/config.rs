use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // CORS
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Database
            database_url: required_env("DATABASE_URL")?,

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("PORT", 5000)?,

            // CORS
            cors_allow_origin: optional_env("CORS_ALLOW_ORIGIN"),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.web_port == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PORT".to_string(),
                message: "must be between 1 and 65535".to_string(),
            });
        }
        if let Some(origin) = &self.cors_allow_origin {
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::InvalidValue {
                    name: "CORS_ALLOW_ORIGIN".to_string(),
                    message: format!("not a valid origin: '{origin}'"),
                });
            }
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(database_url: &str, web_port: u16) -> Config {
        Config {
            database_url: database_url.to_string(),
            web_host: "127.0.0.1".to_string(),
            web_port,
            cors_allow_origin: None,
        }
    }

    #[test]
    fn test_parse_u16_default() {
        assert_eq!(parse_env_u16("BLOG_NONEXISTENT_VAR", 5000).unwrap(), 5000);
    }

    #[test]
    fn test_optional_env_missing() {
        assert!(optional_env("BLOG_NONEXISTENT_VAR").is_none());
    }

    #[test]
    fn test_validate() {
        assert!(config("sqlite://blog.sqlite", 5000).validate().is_ok());
        assert!(matches!(
            config("  ", 5000).validate(),
            Err(ConfigError::InvalidValue { name, .. }) if name == "DATABASE_URL"
        ));
        assert!(matches!(
            config("sqlite://blog.sqlite", 0).validate(),
            Err(ConfigError::InvalidValue { name, .. }) if name == "PORT"
        ));

        let mut with_origin = config("sqlite://blog.sqlite", 5000);
        with_origin.cors_allow_origin = Some("https://blog.example.com".to_string());
        assert!(with_origin.validate().is_ok());
        with_origin.cors_allow_origin = Some("bad\norigin".to_string());
        assert!(with_origin.validate().is_err());
    }
}
