use crate::utils::error::{AggregatorError, Result};
use std::net::SocketAddr;
use url::Url;

pub const BROKER_SCHEMES: &[&str] = &["nats", "tls", "ws", "wss"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_broker_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AggregatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => {
            if !BROKER_SCHEMES.contains(&url.scheme()) {
                return Err(AggregatorError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: url_str.to_string(),
                    reason: format!(
                        "Unsupported URL scheme: {}. Allowed schemes: {}",
                        url.scheme(),
                        BROKER_SCHEMES.join(", ")
                    ),
                });
            }
            if url.host_str().map_or(true, str::is_empty) {
                return Err(AggregatorError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: url_str.to_string(),
                    reason: "URL has no host".to_string(),
                });
            }
            Ok(())
        }
        Err(e) => Err(AggregatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_socket_addr(field_name: &str, addr: &str) -> Result<SocketAddr> {
    addr.parse()
        .map_err(|e| AggregatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: addr.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AggregatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
