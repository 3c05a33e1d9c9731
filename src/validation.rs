use regex::Regex;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("zone name is empty")]
    Empty,
    #[error("zone name label '{0}' too long (max 63 characters)")]
    LabelTooLong(String),
    #[error("zone name too long (max 253 characters)")]
    NameTooLong,
    #[error("zone name label '{0}' contains whitespace or control characters")]
    InvalidCharacters(String),
    #[error("zone kind is required when creating a zone")]
    MissingKind,
    #[error("Slave zones require at least one master")]
    MissingMasters,
    #[error("unknown metadata key '{0}'")]
    UnknownMetadata(String),
    #[error("metadata key '{key}' expects {expected}")]
    InvalidMetadataValue { key: String, expected: &'static str },
    #[error("malformed desired state document: {0}")]
    Document(#[from] serde_json::Error),
}

lazy_static::lazy_static! {
    /// Anything PowerDNS can serve, e.g. RFC 2317 labels like `0/25`.
    static ref LABEL_RE: Regex = Regex::new(r"^[^\s\x00-\x1F\x7F]+$").unwrap();
}

fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.is_empty() {
        return Err(ValidationError::Empty);
    }
    if label.len() > 63 {
        return Err(ValidationError::LabelTooLong(label.to_string()));
    }
    if !LABEL_RE.is_match(label) {
        return Err(ValidationError::InvalidCharacters(label.to_string()));
    }
    Ok(())
}

/// Canonical PowerDNS form of a zone name: lowercase, trailing dot.
pub fn normalize_zone_name(name: &str) -> Result<String, ValidationError> {
    let d = name.trim().trim_end_matches('.').to_ascii_lowercase();
    if d.is_empty() {
        return Err(ValidationError::Empty);
    }
    if d.len() > 253 {
        return Err(ValidationError::NameTooLong);
    }
    for label in d.split('.') {
        validate_label(label)?;
    }
    Ok(format!("{d}."))
}
