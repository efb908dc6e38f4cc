use thiserror::Error;

/// Errors a sanitizer can raise for a single item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Missing required attribute '{0}'")]
    MissingAttribute(String),
    #[error("Attribute '{attribute}' is a {found}, expected {expected}")]
    UnexpectedType {
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        assert_eq!(
            TransformError::MissingAttribute("role".to_string()).to_string(),
            "Missing required attribute 'role'"
        );
        assert_eq!(
            TransformError::UnexpectedType {
                attribute: "category".to_string(),
                expected: "string",
                found: "number",
            }
            .to_string(),
            "Attribute 'category' is a number, expected string"
        );
    }
}
