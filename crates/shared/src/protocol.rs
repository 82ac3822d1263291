use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Events a front end sends to the entry session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EntryCommand {
    SubmitLine { text: String },
    RequestReport,
    EraseAll,
    Restart,
}

impl EntryCommand {
    pub fn submit(text: impl Into<String>) -> Self {
        Self::SubmitLine { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-facing feedback attached to a command result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
            code: None,
        }
    }

    pub fn warning(code: ErrorCode, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
            code: Some(code),
        }
    }

    pub fn error(code: ErrorCode, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
            code: Some(code),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_use_tagged_representation() {
        let json = serde_json::to_value(EntryCommand::submit("TV001")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"type": "submit_line", "payload": {"text": "TV001"}})
        );

        let erase: EntryCommand =
            serde_json::from_str(r#"{"type":"erase_all"}"#).expect("deserialize");
        assert_eq!(erase, EntryCommand::EraseAll);
    }

    #[test]
    fn info_notice_omits_code() {
        let json = serde_json::to_value(Notice::info("ok")).expect("serialize");
        assert_eq!(json, serde_json::json!({"level": "info", "text": "ok"}));
        assert!(Notice::error(ErrorCode::Validation, "x").is_error());
    }
}
