/// Sends one statement over an open connection.
///
/// Calls are strictly sequential; the engine awaits each one before building
/// the next statement.
#[allow(async_fn_in_trait)]
pub trait StatementExecutor {
    /// Returns the number of rows affected.
    async fn execute(&mut self, statement: &str) -> Result<u64, sqlx::Error>;
}

/// Accepts every statement without touching a database.
#[derive(Debug, Default)]
pub struct DryRun {
    pub seen: usize,
}

impl StatementExecutor for DryRun {
    async fn execute(&mut self, _statement: &str) -> Result<u64, sqlx::Error> {
        self.seen += 1;
        Ok(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_accepts_everything() {
        let mut exec = DryRun::default();
        assert_eq!(exec.execute("DROP USER alice;").await.unwrap(), 0);
        assert_eq!(exec.execute("not even sql").await.unwrap(), 0);
        assert_eq!(exec.seen, 2);
    }
}
