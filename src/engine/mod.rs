//! Drives one user-management operation against a live connection.
//!
//! The engine normalizes the request with the dialect's policy, then pulls
//! statements one at a time: execute, echo, next. The first failure ends the
//! run and nothing already applied is undone.

use crate::executor::StatementExecutor;
use crate::provision::{OperationRequest, ProvisioningError, Result, policy_for};
use std::io::Write;
use tracing::{debug, error, info};

pub struct ProvisioningEngine<E, W> {
    executor: E,
    // receives the text of every statement that succeeded
    echo: W,
}

impl<E: StatementExecutor, W: Write> ProvisioningEngine<E, W> {
    pub fn new(executor: E, echo: W) -> Self {
        Self { executor, echo }
    }

    /// Runs `request` to completion or to the first failing statement.
    pub async fn run(&mut self, request: OperationRequest) -> Result<()> {
        let policy = policy_for(request.dialect);
        let request = request.normalize(policy)?;
        info!(
            operation = %request.operation(),
            dialect = %request.dialect(),
            users = request.users().len(),
            all_tables = request.all_flag(),
            "starting"
        );

        let mut executed = 0usize;
        for stmt in policy.generate(&request)? {
            debug!(kind = ?stmt.kind, index = executed, "executing statement");
            let result = self.executor.execute(&stmt.text).await;
            match result {
                Ok(rows) => {
                    debug!(rows, "statement applied");
                }
                Err(cause) => {
                    error!(kind = ?stmt.kind, applied = executed, "statement failed, aborting");
                    return Err(ProvisioningError::Execution {
                        statement: stmt.text,
                        cause,
                    });
                }
            }
            writeln!(self.echo, "{}", stmt)?;
            executed += 1;
        }
        self.echo.flush()?;

        info!(statements = executed, "done");
        Ok(())
    }

    pub fn into_parts(self) -> (E, W) {
        (self.executor, self.echo)
    }
}
