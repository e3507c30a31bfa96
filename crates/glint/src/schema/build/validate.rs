use crate::{MAX_FIELD_NAME_LEN, MAX_RESOURCE_NAME_LEN};

/// Ensure a field/association/view identifier is well-formed.
pub(crate) fn validate_ident(ident: &str) -> Result<(), String> {
    if ident.is_empty() {
        return Err("ident is empty".to_string());
    }
    if ident.len() > MAX_FIELD_NAME_LEN {
        return Err(format!(
            "ident '{ident}' exceeds max length {MAX_FIELD_NAME_LEN}"
        ));
    }
    if !ident.is_ascii() {
        return Err(format!("ident '{ident}' must be ASCII"));
    }

    Ok(())
}

/// Ensure resource kind names are non-empty, ASCII, and within the maximum
/// length.
pub(crate) fn validate_resource_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("resource name is empty".to_string());
    }
    if name.len() > MAX_RESOURCE_NAME_LEN {
        return Err(format!(
            "resource name '{name}' exceeds max length {MAX_RESOURCE_NAME_LEN}"
        ));
    }
    if !name.is_ascii() {
        return Err(format!("resource name '{name}' must be ASCII"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_non_ascii_idents() {
        assert!(validate_ident("").is_err(), "empty identifiers should fail");
        assert!(validate_ident("tìtle").is_err(), "non-ASCII should fail");
        assert!(validate_ident(&"x".repeat(65)).is_err());
    }

    #[test]
    fn accepts_plain_snake_case() {
        assert!(validate_ident("viewer_can_edit").is_ok());
        assert!(validate_resource_name("Comment").is_ok());
    }
}
