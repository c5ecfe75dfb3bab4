use crate::provision::ProvisioningError;
use rustyline::error::ReadlineError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),
    #[error("input error: {0}")]
    Readline(String),
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cancelled")]
    Cancelled,
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        match err {
            ReadlineError::Interrupted | ReadlineError::Eof => CliError::Cancelled,
            ReadlineError::Io(e) => CliError::Io(e),
            e => CliError::Readline(e.to_string()),
        }
    }
}
