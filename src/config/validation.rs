//! Semantic checks run after the TOML has been parsed
//!
//! Errors name the offending key the way it is spelled in the config file.

use crate::config::types::{
    Config, CrawlerConfig, DelayRange, InputConfig, OutputConfig, RegionEntry, SelectorConfig,
    UserAgentConfig,
};
use crate::region::OTHER_REGION;
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    validate_regions(&config.regions)?;
    Ok(())
}

fn invalid(key: &str, message: impl std::fmt::Display) -> ConfigError {
    ConfigError::Validation(format!("{}: {}", key, message))
}

fn in_range(key: &str, value: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(invalid(
            key,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

fn non_empty(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(key, "cannot be empty"));
    }
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    in_range("crawler.workers", config.workers, 1, 64)?;
    in_range("crawler.target-reviews", config.target_reviews, 1, u32::MAX)?;
    in_range("crawler.max-scroll-attempts", config.max_scroll_attempts, 1, 100)?;

    validate_delay("crawler.settle-delay", &config.settle_delay)?;
    validate_delay("crawler.scroll-pause", &config.scroll_pause)?;
    validate_delay("crawler.politeness-pause", &config.politeness_pause)?;

    Ok(())
}

fn validate_delay(key: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if range.min_ms > range.max_ms {
        return Err(invalid(
            key,
            format!(
                "min-ms ({}) must not exceed max-ms ({})",
                range.min_ms, range.max_ms
            ),
        ));
    }
    Ok(())
}

/// Every part ends up in the `User-Agent` header sent with each page load
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    let token = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');

    non_empty("user-agent.crawler-name", &config.crawler_name)?;
    if !config.crawler_name.chars().all(token) {
        return Err(invalid(
            "user-agent.crawler-name",
            format!("'{}' is not a header token", config.crawler_name),
        ));
    }

    non_empty("user-agent.crawler-version", &config.crawler_version)?;
    if !config.crawler_version.chars().all(token) {
        return Err(invalid(
            "user-agent.crawler-version",
            format!("'{}' is not a header token", config.crawler_version),
        ));
    }

    Url::parse(&config.contact_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("user-agent.contact-url: {}", e))
    })?;

    validate_email(&config.contact_email)
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    non_empty("input.url-list", &config.url_list)
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    non_empty("output.dataset-dir", &config.dataset_dir)?;
    non_empty("output.history-path", &config.history_path)
}

/// Every selector must be accepted by the HTML parser
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("review-item", &config.review_item),
        ("author", &config.author),
        ("text", &config.text),
        ("score", &config.score),
    ] {
        Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
            name: name.to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

/// Validates the region table
fn validate_regions(regions: &[RegionEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in regions {
        non_empty("region.name", &entry.name)?;

        // Shard names end up in file names
        if !entry
            .name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid(
                "region.name",
                format!("'{}' may only use letters, digits, '-' and '_'", entry.name),
            ));
        }

        if entry.name == OTHER_REGION {
            return Err(invalid(
                "region.name",
                format!("'{}' is reserved for unmatched localities", OTHER_REGION),
            ));
        }

        if !seen.insert(entry.name.as_str()) {
            return Err(invalid(
                "region.name",
                format!("'{}' is declared more than once", entry.name),
            ));
        }

        if entry.localities.is_empty() {
            return Err(invalid(
                "region.localities",
                format!("region '{}' lists no locality", entry.name),
            ));
        }

        if entry.localities.iter().any(|l| l.is_empty() || l.contains('/')) {
            return Err(invalid(
                "region.localities",
                format!(
                    "region '{}' has an empty locality or one containing '/'",
                    entry.name
                ),
            ));
        }
    }

    Ok(())
}

/// Accepts `local@domain.tld`; anything subtler is left to the mail server
fn validate_email(email: &str) -> Result<(), ConfigError> {
    const KEY: &str = "user-agent.contact-email";

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid(KEY, format!("'{}' has no '@'", email)))?;

    let domain_ok = !domain.contains('@')
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.');

    if local.is_empty() || !domain_ok {
        return Err(invalid(KEY, format!("'{}' is not an email address", email)));
    }

    Ok(())
}
