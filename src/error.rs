//! Error types for the appointment scheduler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error codes exposed to presentation adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotFound = 2,
    BadValue = 3,
    InvalidDateTimePeriod = 10,
    InvalidStatusForArchivedRecord = 11,
    RecordIsArchived = 12,
    InvalidRecordId = 13,
    PeriodIsLocked = 20,
    DateTimePeriodIsOccupied = 21,
    AnotherAppointmentIsAlreadyScheduled = 22,
    InvalidAppointmentStatusForCancel = 23,
    UnknownDayType = 30,
    FailedToCompileMatchExpression = 31,
    BadConfiguration = 32,
}

/// Broad classification of an error, used by callers to pick a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Contract violation, never retried
    Validation,
    /// Expected business condition, the user may retry with other input
    Conflict,
    /// Bad calendar or break setup data
    Configuration,
    Other,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid date time period")]
    InvalidDateTimePeriod,

    #[error("invalid status for archived record")]
    InvalidStatusForArchivedRecord,

    #[error("record is archived")]
    RecordIsArchived,

    #[error("invalid record id")]
    InvalidRecordId,

    #[error("period is locked")]
    PeriodIsLocked,

    #[error("date time period is occupied")]
    DateTimePeriodIsOccupied,

    #[error("another appointment is already scheduled")]
    AnotherAppointmentIsAlreadyScheduled,

    #[error("invalid appointment status for cancel")]
    InvalidAppointmentStatusForCancel,

    #[error("unknown day type: {0}")]
    UnknownDayType(String),

    #[error("failed to compile match expression '{expression}': {source}")]
    FailedToCompileMatchExpression {
        expression: String,
        #[source]
        source: regex::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// The innermost error, skipping every `Context` wrapper
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            AppError::InvalidDateTimePeriod
            | AppError::InvalidStatusForArchivedRecord
            | AppError::RecordIsArchived
            | AppError::InvalidRecordId
            | AppError::Validation(_) => ErrorKind::Validation,
            AppError::PeriodIsLocked
            | AppError::DateTimePeriodIsOccupied
            | AppError::AnotherAppointmentIsAlreadyScheduled
            | AppError::InvalidAppointmentStatusForCancel => ErrorKind::Conflict,
            AppError::UnknownDayType(_)
            | AppError::FailedToCompileMatchExpression { .. }
            | AppError::Config(_) => ErrorKind::Configuration,
            _ => ErrorKind::Other,
        }
    }

    fn code(&self) -> ErrorCode {
        match self.root() {
            AppError::InvalidDateTimePeriod => ErrorCode::InvalidDateTimePeriod,
            AppError::InvalidStatusForArchivedRecord => ErrorCode::InvalidStatusForArchivedRecord,
            AppError::RecordIsArchived => ErrorCode::RecordIsArchived,
            AppError::InvalidRecordId => ErrorCode::InvalidRecordId,
            AppError::PeriodIsLocked => ErrorCode::PeriodIsLocked,
            AppError::DateTimePeriodIsOccupied => ErrorCode::DateTimePeriodIsOccupied,
            AppError::AnotherAppointmentIsAlreadyScheduled => {
                ErrorCode::AnotherAppointmentIsAlreadyScheduled
            }
            AppError::InvalidAppointmentStatusForCancel => {
                ErrorCode::InvalidAppointmentStatusForCancel
            }
            AppError::UnknownDayType(_) => ErrorCode::UnknownDayType,
            AppError::FailedToCompileMatchExpression { .. } => {
                ErrorCode::FailedToCompileMatchExpression
            }
            AppError::Config(_) => ErrorCode::BadConfiguration,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Validation(_) => ErrorCode::BadValue,
            _ => ErrorCode::Failure,
        }
    }
}

/// Attach static context to a failed collaborator call
pub trait ResultExt<T> {
    fn context(self, context: &'static str) -> AppResult<T>;
}

impl<T> ResultExt<T> for AppResult<T> {
    fn context(self, context: &'static str) -> AppResult<T> {
        self.map_err(|source| AppError::Context {
            context,
            source: Box::new(source),
        })
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = match (self.kind(), self.root()) {
            (_, AppError::NotFound(_)) => StatusCode::NOT_FOUND,
            (ErrorKind::Validation, _) => StatusCode::BAD_REQUEST,
            (ErrorKind::Conflict, _) => StatusCode::CONFLICT,
            (ErrorKind::Configuration, _) => {
                tracing::error!("Configuration error: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            (ErrorKind::Other, _) => {
                tracing::error!("Internal error: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
