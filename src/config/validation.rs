use crate::config::types::{Config, CrawlerConfig, HttpConfig, OutputConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};

/// Upper bound on concurrent fetches accepted from a configuration file
pub const MAX_CONCURRENCY_LIMIT: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
///
/// A configuration file is additionally capped at [`MAX_CONCURRENCY_LIMIT`].
pub fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    validate_limits(config.max_concurrency, config.max_pages)?;

    if config.max_concurrency > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY_LIMIT, config.max_concurrency
        )));
    }

    Ok(())
}

/// Validates the two crawl limits: both must be at least 1
///
/// Checked by every crawl run, whatever the source of the limits.
pub fn validate_limits(max_concurrency: usize, max_pages: usize) -> ConfigResult<()> {
    if max_concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be >= 1, got {}",
            max_concurrency
        )));
    }

    if max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            max_pages
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP session configuration
fn validate_http_config(config: &HttpConfig) -> ConfigResult<()> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > config.request_timeout_secs
    {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and request_timeout_secs ({}), got {}",
            config.request_timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.report_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "report_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
