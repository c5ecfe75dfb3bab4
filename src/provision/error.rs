use super::request::{Dialect, Operation};

pub type Result<T> = std::result::Result<T, ProvisioningError>;

#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("unsupported database type: '{0}'")]
    UnsupportedDialect(String),
    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),
    #[error("{operation} is not supported for {dialect}")]
    UnsupportedOperation {
        operation: Operation,
        dialect: Dialect,
    },
    #[error("no usernames were given")]
    EmptyUserList,
    #[error("{dialect} {operation} requires at least one schema name")]
    MissingRequiredSchema {
        operation: Operation,
        dialect: Dialect,
    },
    #[error("a service user needs a password")]
    MissingServicePassword,
    #[error("only one service user can be added at a time, got {0}")]
    TooManyServiceUsers(usize),
    #[error("could not connect to the database: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("`{statement}` failed: {cause}")]
    Execution {
        statement: String,
        #[source]
        cause: sqlx::Error,
    },
    #[error("could not echo statement: {0}")]
    Audit(#[from] std::io::Error),
}
