//! Configuration validation.
//!
//! Every config section implements [`Validate`]; [`Config::validate`] collects
//! the failures of all sections.

use thiserror::Error;

use crate::config::{
    Config, EmbeddingConfig, MemoryConfig, ObservabilityConfig, RedisConfig, SearchConfig,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port {port} for {field}: must be between 1 and 65535")]
    InvalidPort { port: u16, field: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let sections: [&dyn Validate; 4] = [
            &self.redis,
            &self.memory,
            &self.search,
            &self.observability,
        ];

        let mut errors: Vec<ValidationError> = sections
            .iter()
            .filter_map(|section| section.validate().err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "redis.host".into(),
            });
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort {
                port: self.port,
                field: "redis.port".into(),
            });
        }
        if self.db < 0 {
            return Err(ValidationError::InvalidValue {
                field: "redis.db".into(),
                reason: format!("database index {} is negative", self.db),
            });
        }
        Ok(())
    }
}

impl Validate for MemoryConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.max_messages == 0 {
            return Err(ValidationError::InvalidValue {
                field: "memory.max_messages".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.display_window == 0 {
            return Err(ValidationError::InvalidValue {
                field: "memory.display_window".into(),
                reason: "must be at least 1".into(),
            });
        }
        // A display window wider than what is retained can never be filled.
        if self.display_window > self.max_messages {
            return Err(ValidationError::Conflict {
                reason: format!(
                    "memory.display_window ({}) exceeds memory.max_messages ({})",
                    self.display_window, self.max_messages
                ),
            });
        }
        Ok(())
    }
}

impl Validate for SearchConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.collection.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "search.collection".into(),
            });
        }
        if !self.qdrant_url.starts_with("http://") && !self.qdrant_url.starts_with("https://") {
            return Err(ValidationError::InvalidValue {
                field: "search.qdrant_url".into(),
                reason: "must start with http:// or https://".into(),
            });
        }
        for (field, weight) in [
            ("search.vector_weight", self.vector_weight),
            ("search.keyword_weight", self.keyword_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: format!("{weight} is outside 0.0..=1.0"),
                });
            }
        }
        if self.vector_weight + self.keyword_weight <= 0.0 {
            return Err(ValidationError::Conflict {
                reason: "search weights must not both be zero".into(),
            });
        }
        if self.default_limit == 0 {
            return Err(ValidationError::InvalidValue {
                field: "search.default_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        self.embedding.validate()
    }
}

impl Validate for EmbeddingConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "search.embedding.model".into(),
            });
        }
        if self.dimensions == 0 {
            return Err(ValidationError::InvalidValue {
                field: "search.embedding.dimensions".into(),
                reason: "must be non-zero".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("expected one of {LEVELS:?}"),
            });
        }
        if self.log_format != "json" && self.log_format != "pretty" {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: "expected \"json\" or \"pretty\"".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_display_window_larger_than_retention() {
        let memory = MemoryConfig {
            max_messages: 5,
            display_window: 8,
        };
        let err = memory.validate().unwrap_err();
        assert!(matches!(err, ValidationError::Conflict { .. }));
    }

    #[test]
    fn test_zero_windows_rejected() {
        let memory = MemoryConfig {
            max_messages: 0,
            display_window: 0,
        };
        assert!(matches!(
            memory.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_redis_port_zero() {
        let redis = RedisConfig {
            port: 0,
            ..RedisConfig::default()
        };
        assert!(matches!(
            redis.validate(),
            Err(ValidationError::InvalidPort { port: 0, .. })
        ));
    }

    #[test]
    fn test_search_weights_out_of_range() {
        let search = SearchConfig {
            vector_weight: 1.5,
            ..SearchConfig::default()
        };
        assert!(search.validate().is_err());
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.redis.host = String::new();
        config.observability.log_format = "xml".into();

        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }
}
