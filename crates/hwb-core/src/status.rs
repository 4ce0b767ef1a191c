//! Homework status codes and the notification text built from them.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::StatusError;

/// Sent when a record cannot be looked into at all (not a JSON object).
pub const STATUS_ABSENT: &str = "Статус домашней работы отсутствует";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Wire code used by the API.
    pub fn code(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// Build the notification text for one homework record.
///
/// The status is checked before the name, so a record with an unknown status
/// and no name reports the status.
pub fn parse_status(homework: &Value) -> Result<String, StatusError> {
    let Some(record) = homework.as_object() else {
        return Ok(STATUS_ABSENT.to_string());
    };

    let status = match record.get("status") {
        Some(v) => HomeworkStatus::deserialize(v)
            .map_err(|_| StatusError::UnknownStatus(Some(display_value(v))))?,
        None => return Err(StatusError::UnknownStatus(None)),
    };

    let name = record
        .get("homework_name")
        .ok_or(StatusError::MissingHomeworkName)?;

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        display_value(name),
        status.verdict()
    ))
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
