use crate::utils::error::{GemsError, Result};
use url::Url;

pub const POSTAL_CODE_LENGTH: usize = 5;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Drops every character that is not an ASCII digit, the way the search box
/// cleans input as it is typed.
pub fn sanitize_postal_code(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Cleans `input` and accepts it only if exactly five digits remain.
pub fn validate_postal_code(input: &str) -> Result<String> {
    let cleaned = sanitize_postal_code(input);
    if cleaned.len() != POSTAL_CODE_LENGTH {
        return Err(GemsError::validation(
            "zip_code",
            input,
            "Please enter a valid 5-digit ZIP code.",
        ));
    }
    Ok(cleaned)
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(GemsError::validation(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(GemsError::validation(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(GemsError::validation(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GemsError::validation(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(GemsError::validation(
            field_name,
            path,
            "Path contains null bytes",
        ));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(GemsError::validation(
            field_name,
            value.to_string(),
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GemsError::validation(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(GemsError::validation(
            field_name,
            value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_postal_code() {
        assert_eq!(sanitize_postal_code("90-210"), "90210");
        assert_eq!(sanitize_postal_code(" 1a2b3 "), "123");
        assert_eq!(sanitize_postal_code(""), "");
    }

    #[test]
    fn test_validate_postal_code() {
        assert_eq!(validate_postal_code("90210").unwrap(), "90210");
        assert_eq!(validate_postal_code("ZIP 02134").unwrap(), "02134");
        assert!(validate_postal_code("1234").is_err());
        assert!(validate_postal_code("123456").is_err());
        assert!(validate_postal_code("abcde").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("gemini.endpoint", "https://example.com").is_ok());
        assert!(validate_url("gemini.endpoint", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("gemini.endpoint", "").is_err());
        assert!(validate_url("gemini.endpoint", "invalid-url").is_err());
        assert!(validate_url("gemini.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("gemini.temperature", 0.2, 0.0, 2.0).is_ok());
        assert!(validate_range("gemini.temperature", 2.5, 0.0, 2.0).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("gemini.timeout_seconds", 30, 1).is_ok());
        assert!(validate_positive_number("gemini.timeout_seconds", 0, 1).is_err());
    }
}
