use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_delay_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "request_delay_ms must be >= 1ms, got {}ms",
            config.request_delay_ms
        )));
    }

    if config.max_fetch_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_fetch_attempts must be >= 1, got {}",
            config.max_fetch_attempts
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    // country_limit of 0 means "no cap", any value is valid

    Ok(())
}

/// Validates the remote endpoint URLs
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_endpoint_url("users_url", &config.users_url)?;
    validate_endpoint_url("collection_url", &config.collection_url)?;
    Ok(())
}

fn validate_endpoint_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} must use http or https scheme, got '{}'",
            name,
            url.scheme()
        )));
    }

    // The paginator appends `/page/{n}` path segments, which only works for
    // URLs that can serve as a base.
    if url.cannot_be_a_base() {
        return Err(ConfigError::Validation(format!(
            "{} cannot be used as a base URL: '{}'",
            name, value
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
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

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    // Validate contact email (basic validation)
    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.ratings_path.is_empty() {
        return Err(ConfigError::Validation(
            "ratings_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation: one '@' with non-empty local part and a dotted domain
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();

    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid contact_email: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid contact_email domain: '{}'",
            email
        )));
    }

    Ok(())
}
