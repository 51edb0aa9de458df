//! Input normalization shared by the admin actions.

use journal_auth::{Permission, is_valid_permission};
use journal_core::{DomainError, DomainResult};

const MAX_NAME_LEN: usize = 120;

pub fn name(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trimmed and lower-cased; needs a local part and a domain around a single '@'.
pub fn email(value: &str) -> DomainResult<String> {
    let email = value.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::validation(format!("'{}' is not a valid email", value.trim())));
    }
    Ok(email)
}

/// Parse permission tokens, rejecting the whole list if any is outside the
/// catalog. Duplicates are dropped, first occurrence wins.
pub fn permissions(tokens: &[String]) -> DomainResult<Vec<Permission>> {
    let unknown: Vec<&str> = tokens
        .iter()
        .map(|t| t.trim())
        .filter(|t| !is_valid_permission(t))
        .collect();
    if !unknown.is_empty() {
        return Err(DomainError::validation(format!(
            "unknown permission(s): {}",
            unknown.join(", ")
        )));
    }

    let mut out: Vec<Permission> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let permission = Permission::new(token.trim().to_string());
        if !out.contains(&permission) {
            out.push(permission);
        }
    }
    Ok(out)
}
