use crate::executor::StatementExecutor;
use crate::provision::{Dialect, ProvisioningError};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{ConnectOptions, Connection};
use tracing::info;

pub const MYSQL_PORT: u16 = 3306;
pub const POSTGRES_PORT: u16 = 54320;

pub const DEFAULT_MASTER_USER: &str = "attentive";
pub const DEFAULT_DATABASE: &str = "attentive";

/// Where and as whom to connect. Built once from the operator's answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub dialect: Dialect,
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl ConnectionConfig {
    pub fn port(&self) -> u16 {
        match self.dialect {
            Dialect::MySql => MYSQL_PORT,
            Dialect::Postgres => POSTGRES_PORT,
        }
    }

    /// Connection string in the driver's usual form, password masked.
    pub fn redacted_dsn(&self) -> String {
        self.render("****")
    }

    fn render(&self, password: &str) -> String {
        match self.dialect {
            Dialect::MySql => format!(
                "{}:{}@tcp({}:{})/{}",
                self.username,
                password,
                self.endpoint,
                self.port(),
                self.database
            ),
            Dialect::Postgres => format!(
                "host={} port={} user={} password={} dbname={} sslmode=disable",
                self.endpoint,
                self.port(),
                self.username,
                password,
                self.database
            ),
        }
    }

    pub async fn connect(&self) -> crate::provision::Result<DbConnection> {
        let conn = match self.dialect {
            Dialect::MySql => MySqlConnectOptions::new()
                .host(&self.endpoint)
                .port(self.port())
                .username(&self.username)
                .password(&self.password)
                .database(&self.database)
                .connect()
                .await
                .map(DbConnection::MySql),
            Dialect::Postgres => PgConnectOptions::new()
                .host(&self.endpoint)
                .port(self.port())
                .username(&self.username)
                .password(&self.password)
                .database(&self.database)
                .ssl_mode(PgSslMode::Disable)
                .connect()
                .await
                .map(DbConnection::Postgres),
        }
        .map_err(ProvisioningError::Connection)?;
        info!(dsn = %self.redacted_dsn(), "connected");
        Ok(conn)
    }
}

/// The single connection a run uses for every statement.
pub enum DbConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
}

impl DbConnection {
    pub async fn close(self) -> Result<(), sqlx::Error> {
        match self {
            DbConnection::MySql(conn) => conn.close().await,
            DbConnection::Postgres(conn) => conn.close().await,
        }
    }
}

impl StatementExecutor for DbConnection {
    // Raw text goes through the simple-query path, so the two-statement
    // Postgres CREATE ROLE line runs as one call.
    async fn execute(&mut self, statement: &str) -> Result<u64, sqlx::Error> {
        let rows = match self {
            DbConnection::MySql(conn) => sqlx::Executor::execute(&mut *conn, statement)
                .await?
                .rows_affected(),
            DbConnection::Postgres(conn) => sqlx::Executor::execute(&mut *conn, statement)
                .await?
                .rows_affected(),
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(dialect: Dialect) -> ConnectionConfig {
        ConnectionConfig {
            dialect,
            endpoint: "db.example.internal".to_string(),
            username: DEFAULT_MASTER_USER.to_string(),
            password: "hunter2".to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    #[test]
    fn test_mysql_dsn() {
        let cfg = config(Dialect::MySql);
        assert_eq!(cfg.port(), 3306);
        assert_eq!(
            cfg.redacted_dsn(),
            "attentive:****@tcp(db.example.internal:3306)/attentive"
        );
    }

    #[test]
    fn test_postgres_dsn() {
        let cfg = config(Dialect::Postgres);
        assert_eq!(cfg.port(), 54320);
        assert_eq!(
            cfg.redacted_dsn(),
            "host=db.example.internal port=54320 user=attentive password=**** dbname=attentive sslmode=disable"
        );
        assert!(!cfg.redacted_dsn().contains("hunter2"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        let cfg = ConnectionConfig {
            endpoint: "127.0.0.1".to_string(),
            ..config(Dialect::Postgres)
        };
        let err = cfg.connect().await.err().unwrap();
        assert!(matches!(err, ProvisioningError::Connection(_)));
        assert!(err.to_string().starts_with("could not connect to the database"));
    }
}
