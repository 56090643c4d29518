//! Configuration validation.
//!
//! Collects every error before returning so a broken file can be fixed in
//! one pass.

use crate::config::types::{
    parse_word, DomainConfig, EventsConfig, ObservabilityConfig, ProtocolConfig, StorageBackend,
    StorageConfig,
};
use crate::errors::ConfigError;

/// Largest accepted broadcast buffer.
const MAX_CHANNEL_CAPACITY: usize = 1 << 16;

const VALID_LEVELS: [&str; 7] = ["trace", "debug", "info", "warn", "warning", "error", "off"];
const VALID_FORMATS: [&str; 4] = ["json", "pretty", "text", "human"];

/// Validate the entire configuration.
pub fn validate_config(config: &ProtocolConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_domain_config(&config.domain, &mut errors);
    validate_storage_config(&config.storage, &mut errors);
    validate_events_config(&config.events, &mut errors);
    validate_observability_config(&config.observability, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(errors))
    }
}

fn validate_domain_config(config: &DomainConfig, errors: &mut Vec<String>) {
    if config.words.is_empty() {
        errors.push("domain.words must contain at least one word".to_string());
    }
    for (i, word) in config.words.iter().enumerate() {
        if let Err(e) = parse_word(i, word) {
            errors.push(e);
        }
    }
}

fn validate_storage_config(config: &StorageConfig, errors: &mut Vec<String>) {
    let path_empty = config.path.as_deref().map_or(true, str::is_empty);
    match config.backend {
        StorageBackend::Journal if path_empty => {
            errors.push("storage.path is required for the journal backend".to_string());
        }
        StorageBackend::Memory if config.path.is_some() => {
            errors.push("storage.path is only valid for the journal backend".to_string());
        }
        _ => {}
    }
}

fn validate_events_config(config: &EventsConfig, errors: &mut Vec<String>) {
    if config.channel_capacity == 0 {
        errors.push("events.channel_capacity must be greater than 0".to_string());
    }
    if config.channel_capacity > MAX_CHANNEL_CAPACITY {
        errors.push(format!(
            "events.channel_capacity must be at most {MAX_CHANNEL_CAPACITY}"
        ));
    }
}

fn validate_observability_config(config: &ObservabilityConfig, errors: &mut Vec<String>) {
    if !VALID_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "observability.log_level '{}' is invalid. Valid levels: trace, debug, info, warn, error, off",
            config.log_level
        ));
    }

    if !VALID_FORMATS.contains(&config.log_format.to_lowercase().as_str()) {
        errors.push(format!(
            "observability.log_format '{}' is invalid. Valid formats: json, pretty",
            config.log_format
        ));
    }
}
