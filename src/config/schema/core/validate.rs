use super::Config;
use crate::error::ConfigError;
use crate::transport::gateway::REQUEST_TIMEOUT_SECS;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.verify.score_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Validation(format!(
                "verify.score_threshold must be within [0.0, 1.0], got {threshold}"
            )));
        }

        if self.verify.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "verify.timeout_secs must be greater than zero".into(),
            ));
        }

        if self.verify.timeout_secs >= REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "verify.timeout_secs must be < {REQUEST_TIMEOUT_SECS} (request timeout), got {}",
                self.verify.timeout_secs
            )));
        }

        url::Url::parse(&self.verify.siteverify_url).map_err(|e| {
            ConfigError::Validation(format!("verify.siteverify_url is not a valid URL: {e}"))
        })?;

        if !self.gateway.verify_route.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "gateway.verify_route must start with '/', got {:?}",
                self.gateway.verify_route
            )));
        }

        if self.gateway.verify_route == "/health" {
            return Err(ConfigError::Validation(
                "gateway.verify_route must not shadow /health".into(),
            ));
        }

        if self.form.submit_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "form.submit_timeout_ms must be greater than zero".into(),
            ));
        }

        if self.form.action.trim().is_empty() {
            return Err(ConfigError::Validation("form.action must not be empty".into()));
        }

        url::Url::parse(&self.form.endpoint_url).map_err(|e| {
            ConfigError::Validation(format!("form.endpoint_url is not a valid URL: {e}"))
        })?;

        Ok(())
    }
}
