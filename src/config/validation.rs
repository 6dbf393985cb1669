//! Configuration validation module

use crate::config::{CacheConfig, PipelineConfig, RemoteConfig};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Cache configuration error: {message}")]
    Cache { message: String },

    #[error("Pipeline configuration error: {message}")]
    Pipeline { message: String },

    #[error("Remote configuration error: {message}")]
    Remote { message: String },
}

impl ValidationError {
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::Pipeline {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_entries == 0 {
            return Err(ValidationError::cache(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if self.ttl_hours == 0 {
            return Err(ValidationError::cache(
                "Cache TTL must be greater than 0 hours".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 {
            return Err(ValidationError::pipeline(
                "queue_capacity must be greater than 0".to_string(),
            ));
        }

        if self.producers == 0 {
            return Err(ValidationError::pipeline(
                "producers must be greater than 0".to_string(),
            ));
        }

        if self.consumers == 0 {
            return Err(ValidationError::pipeline(
                "consumers must be greater than 0".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(ValidationError::pipeline(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for RemoteConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::remote(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ValidationError::remote(
                "timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.max_results == 0 {
            return Err(ValidationError::remote(
                "max_results must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
