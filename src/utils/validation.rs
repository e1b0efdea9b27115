use crate::utils::error::{EtlError, Result};
use url::Url;

/// Longest pause the lookup loop accepts between provider calls, in seconds.
pub const MAX_PAUSE_SECONDS: f64 = 2.0;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 不會通過任何比較
    let in_range = value >= min && value <= max;
    if !in_range {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_pause(field_name: &str, seconds: f64) -> Result<()> {
    validate_range(field_name, seconds, 0.0, MAX_PAUSE_SECONDS)
}

/// The API key must be present and non-blank; the value itself is never echoed back.
pub fn validate_api_key(field_name: &str, key: Option<&str>) -> Result<String> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k.to_string()),
        _ => Err(EtlError::MissingConfigError {
            field: field_name.to_string(),
        }),
    }
}

pub fn validate_delimiter(field_name: &str, delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() && delimiter != '"' && delimiter != '\n' && delimiter != '\r' {
        Ok(delimiter as u8)
    } else {
        Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: delimiter.escape_default().to_string(),
            reason: "Delimiter must be a single ASCII character other than a quote or newline"
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoint", "https://example.com").is_ok());
        assert!(validate_url("endpoint", "http://127.0.0.1:8080/json").is_ok());
        assert!(validate_url("endpoint", "").is_err());
        assert!(validate_url("endpoint", "invalid-url").is_err());
        assert!(validate_url("endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_pause_bounds() {
        assert!(validate_pause("pause", 0.0).is_ok());
        assert!(validate_pause("pause", 0.1).is_ok());
        assert!(validate_pause("pause", 2.0).is_ok());
        assert!(validate_pause("pause", -0.1).is_err());
        assert!(validate_pause("pause", 2.5).is_err());
        assert!(validate_pause("pause", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_api_key() {
        assert_eq!(validate_api_key("key", Some("  abc  ")).unwrap(), "abc");
        assert!(matches!(
            validate_api_key("GOOGLE_MAPS_API_KEY", Some("   ")),
            Err(EtlError::MissingConfigError { .. })
        ));
        assert!(validate_api_key("GOOGLE_MAPS_API_KEY", None).is_err());
    }

    #[test]
    fn test_validate_delimiter() {
        assert_eq!(validate_delimiter("delimiter", ';').unwrap(), b';');
        assert_eq!(validate_delimiter("delimiter", '\t').unwrap(), b'\t');
        assert!(validate_delimiter("delimiter", '"').is_err());
        assert!(validate_delimiter("delimiter", 'é').is_err());
    }
}
