use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A target destination for repurposed copy.
///
/// Ordering is significant: generation runs and the Word document renders
/// in this declaration order, LinkedIn (the long-form article) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    LinkedIn,
    Twitter,
    Xiaohongshu,
    Reddit,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::LinkedIn,
        Platform::Twitter,
        Platform::Xiaohongshu,
        Platform::Reddit,
    ];

    /// Display name used in the UI and as the section heading in the
    /// generated Word document.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::Twitter => "Twitter",
            Platform::Xiaohongshu => "Xiaohongshu",
            Platform::Reddit => "Reddit",
        }
    }

    /// Parses the form-field value sent by the UI (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "twitter" => Ok(Platform::Twitter),
            "xiaohongshu" => Ok(Platform::Xiaohongshu),
            "reddit" => Ok(Platform::Reddit),
            other => Err(AppError::Validation(format!(
                "Unknown platform '{other}' (expected one of: linkedin, twitter, xiaohongshu, reddit)"
            ))),
        }
    }
}
