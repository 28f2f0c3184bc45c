//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        Self::from(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Infra(InfraError::ThreadPool { .. }) => exitcode::OSERR,
            CliError::Infra(InfraError::Application(e)) => application_exit_code(e),
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(DomainError::UnknownSimilarity(_)) => exitcode::USAGE,
        ApplicationError::Domain(_) => exitcode::SOFTWARE,
        ApplicationError::FrameCountMismatch { .. } | ApplicationError::InvalidTreeFile { .. } => {
            exitcode::DATAERR
        }
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::OperationFailed { source, .. } => {
            if source.is::<std::io::Error>() {
                exitcode::IOERR
            } else {
                exitcode::SOFTWARE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unknown_similarity_when_mapping_exit_code_then_usage() {
        let err = CliError::from(DomainError::UnknownSimilarity("manhattan".into()));
        assert_eq!(err.exit_code(), exitcode::USAGE);
        assert!(err.to_string().contains("manhattan"));
    }

    #[test]
    fn given_io_failure_when_mapping_exit_code_then_ioerr() {
        let err = CliError::from(ApplicationError::OperationFailed {
            context: "read tree file: x.json".into(),
            source: Box::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
        });
        assert_eq!(err.exit_code(), exitcode::IOERR);
    }

    #[test]
    fn given_bad_tree_file_when_mapping_exit_code_then_dataerr() {
        let err = CliError::from(ApplicationError::InvalidTreeFile {
            path: "x.json".into(),
            message: "frame 0: expected exactly one root, found 2".into(),
        });
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_thread_pool_failure_when_mapping_exit_code_then_oserr() {
        let err = CliError::from(InfraError::ThreadPool {
            message: "global pool already initialized".into(),
        });
        assert_eq!(err.exit_code(), exitcode::OSERR);
    }

    #[test]
    fn given_serialization_failure_when_mapping_exit_code_then_software() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = CliError::from(ApplicationError::OperationFailed {
            context: "serialize trees".into(),
            source: Box::new(source),
        });
        assert_eq!(err.exit_code(), exitcode::SOFTWARE);
    }
}
