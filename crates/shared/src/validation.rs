//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum size of a single uploaded image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image file extensions, lowercase.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

lazy_static! {
    static ref UA_PHONE: Regex = Regex::new(r"^\+380\d{9}$").unwrap();
    static ref PHONE_NOISE: Regex = Regex::new(r"[^\d+]").unwrap();
}

/// Normalizes a Ukrainian phone number to `+380XXXXXXXXX`.
///
/// Everything except digits and `+` is stripped first. A leading `0` is
/// replaced by `+380` and a bare `380` prefix gets a `+`.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let cleaned = PHONE_NOISE.replace_all(raw.trim(), "");

    let normalized = if let Some(rest) = cleaned.strip_prefix('0') {
        format!("+380{}", rest)
    } else if cleaned.starts_with("380") {
        format!("+{}", cleaned)
    } else {
        cleaned.into_owned()
    };

    if UA_PHONE.is_match(&normalized) {
        Ok(normalized)
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone number must be in +380XXXXXXXXX format".into());
        Err(err)
    }
}

/// Validator hook for DTO fields carrying a phone number.
pub fn validate_phone(raw: &str) -> Result<(), ValidationError> {
    normalize_phone(raw).map(|_| ())
}

/// Checks the file extension of an uploaded image, case-insensitively.
pub fn validate_image_extension(file_name: &str) -> Result<(), ValidationError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("image_extension");
        err.message = Some(
            format!(
                "File '{}' has an unsupported format, allowed: .jpg, .jpeg, .png",
                file_name
            )
            .into(),
        );
        Err(err)
    }
}

/// Checks the size of an uploaded image.
pub fn validate_image_size(file_name: &str, size: usize) -> Result<(), ValidationError> {
    if size <= MAX_IMAGE_BYTES {
        Ok(())
    } else {
        let mut err = ValidationError::new("image_size");
        err.message = Some(format!("File '{}' exceeds the 5 MB limit", file_name).into());
        Err(err)
    }
}
