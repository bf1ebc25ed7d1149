//! Input checks that run before any write reaches the store.
//!
//! The store itself accepts empty strings; these rules are what keep empty
//! titles and folder names out of it.

use thiserror::Error;

/// A user-correctable input problem. The write is never attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("folder name must not be empty")]
    EmptyFolderName,
}

/// Trim a memo title and reject it if nothing is left.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Trim a folder name and reject it if nothing is left.
pub fn validate_folder_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyFolderName);
    }
    Ok(trimmed.to_string())
}

/// Memo bodies may be empty; they are only trimmed.
pub fn normalize_content(content: &str) -> String {
    content.trim().to_string()
}
