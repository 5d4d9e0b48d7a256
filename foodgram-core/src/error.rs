use std::path::PathBuf;

use thiserror::Error;

use crate::types::SavePurpose;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Font file {path} is unavailable: {source}")]
    FontUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Font {font} cannot be embedded: {reason}")]
    InvalidFont { font: String, reason: String },

    #[error("Font has no glyph for {ch:?} in {text:?}")]
    MissingGlyph { ch: char, text: String },

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Rejection returned by the guard functions in [`crate::guards`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Only the author or an administrator can change this recipe")]
    NotAuthor,

    #[error("You cannot subscribe to yourself")]
    SelfFollow,

    #[error("You are already subscribed to this author")]
    AlreadyFollowing,

    #[error("Recipe is already in your {}", .0.label())]
    AlreadySaved(SavePurpose),

    #[error("Amount must be between {min} and {max}, got {got}")]
    AmountOutOfRange { min: i32, max: i32, got: i32 },

    #[error("Cooking time must be between {min} and {max} minutes, got {got}")]
    CookingTimeOutOfRange { min: i32, max: i32, got: i32 },

    #[error("{field} cannot be empty")]
    Blank { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must contain at least one letter")]
    NoLetters { field: &'static str },

    #[error("At least one {0} is required")]
    Missing(&'static str),

    #[error("Duplicate {0} in recipe")]
    Duplicate(&'static str),

    #[error("Username \"me\" is reserved")]
    ReservedUsername,
}

impl GuardError {
    /// Whether the rejection is about who is asking rather than what was sent.
    pub fn is_permission(&self) -> bool {
        matches!(self, GuardError::NotAuthor)
    }
}
