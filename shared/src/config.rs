use crate::error::ConfigError;

pub const TABLE_VAR: &str = "TABLE";
pub const BUCKET_VAR: &str = "BUCKET";
pub const THUMBNAIL_BUCKET_VAR: &str = "THUMBBUCKET";

/// Resource names injected at deploy time
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub table_name: String,
    pub bucket_name: String,
    pub thumbnail_bucket_name: String,
}

impl AppConfig {
    pub fn new(
        table_name: impl Into<String>,
        bucket_name: impl Into<String>,
        thumbnail_bucket_name: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            bucket_name: bucket_name.into(),
            thumbnail_bucket_name: thumbnail_bucket_name.into(),
        }
    }

    /// Read the configuration from the process environment.
    /// Called once per cold start; handlers receive the validated value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        Ok(Self {
            table_name: required(TABLE_VAR)?,
            bucket_name: required(BUCKET_VAR)?,
            thumbnail_bucket_name: required(THUMBNAIL_BUCKET_VAR)?,
        })
    }
}
