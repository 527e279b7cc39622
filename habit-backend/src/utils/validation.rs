// src/utils/validation.rs

use validator::ValidationError;

pub mod action {
    pub const TITLE_MIN_LENGTH: u64 = 1;
    pub const TITLE_MAX_LENGTH: u64 = 200;
    pub const NOTES_MAX_LENGTH: u64 = 1000;
}

pub mod password {
    pub const MIN_LENGTH: u64 = 6;
    pub const MAX_LENGTH: u64 = 128;
}

/// 空白のみのタイトルを拒否する
pub fn validate_action_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut error = ValidationError::new("blank_title");
        error.message = Some("Action title cannot be blank".into());
        return Err(error);
    }
    Ok(())
}
