//! Conversions from external infrastructure errors into domain errors.

use rusqlite::Error as SqlError;
use supportdesk_domain::SupportDeskError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SupportDeskError);

impl From<InfraError> for SupportDeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SupportDeskError> for InfraError {
    fn from(value: SupportDeskError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSupportDeskError {
    fn into_supportdesk(self) -> SupportDeskError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SupportDeskError */
/* -------------------------------------------------------------------------- */

impl IntoSupportDeskError for SqlError {
    fn into_supportdesk(self) -> SupportDeskError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SupportDeskError::Dependency("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SupportDeskError::Dependency("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        SupportDeskError::Dependency("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        SupportDeskError::Dependency("foreign key constraint violation".into())
                    }
                    _ => SupportDeskError::Dependency(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                SupportDeskError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                SupportDeskError::Dependency(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                SupportDeskError::Dependency(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                SupportDeskError::Dependency("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                SupportDeskError::Dependency(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => SupportDeskError::Dependency(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => SupportDeskError::Dependency("invalid SQL query".into()),
            other => SupportDeskError::Dependency(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_supportdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → SupportDeskError */
/* -------------------------------------------------------------------------- */

impl IntoSupportDeskError for r2d2::Error {
    fn into_supportdesk(self) -> SupportDeskError {
        SupportDeskError::Dependency(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_supportdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → SupportDeskError */
/* -------------------------------------------------------------------------- */

impl IntoSupportDeskError for std::io::Error {
    fn into_supportdesk(self) -> SupportDeskError {
        SupportDeskError::Dependency(format!("filesystem error: {self}"))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_supportdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → SupportDeskError */
/* -------------------------------------------------------------------------- */

impl IntoSupportDeskError for JoinError {
    fn into_supportdesk(self) -> SupportDeskError {
        SupportDeskError::Internal(format!("background task failed: {self}"))
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(value.into_supportdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
