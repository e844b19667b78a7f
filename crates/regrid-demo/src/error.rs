use regrid::{DropZoneError, ListMutationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("regrid error: {0}")]
    Regrid(#[from] regrid::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid log filter {filter:?}: {message}")]
    LogFilter { filter: String, message: String },

    #[error("grid not on the board: {id}")]
    UnknownGrid { id: String },

    #[error("drag of {grid}[{index}] finished without a change")]
    Unfinished { grid: String, index: usize },
}

impl From<DropZoneError> for DemoError {
    fn from(err: DropZoneError) -> Self {
        Self::Regrid(err.into())
    }
}

impl From<ListMutationError> for DemoError {
    fn from(err: ListMutationError) -> Self {
        Self::Regrid(err.into())
    }
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LogFilter { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DemoError;
    use regrid::ListMutationError;

    #[test]
    fn list_errors_wrap_through_facade() {
        let err: DemoError = ListMutationError::IndexOutOfRange { index: 9, len: 3 }.into();
        assert_eq!(
            err.to_string(),
            "regrid error: index 9 out of range for list of length 3"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn bad_filter_exits_with_usage_code() {
        let err = DemoError::LogFilter {
            filter: "[".to_string(),
            message: "unbalanced".to_string(),
        };
        assert_eq!(err.exit_code(), 2);
    }
}
