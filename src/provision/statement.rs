//! Statement templates.
//!
//! Every statement text is rendered here, one function per kind, so that the
//! policies only decide *which* statements run and in what order. Identifiers
//! are interpolated as given.

use std::fmt::Display;

/// Fixed credential for every regular MySQL user.
pub const MYSQL_PLACEHOLDER_PASSWORD: &str = "password";

/// Privileges every MySQL service user receives on the whole database.
pub const SERVICE_USER_PRIVILEGES: [&str; 5] = ["SELECT", "INSERT", "UPDATE", "DELETE", "SHOW VIEW"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateUser,
    DropUser,
    GrantUsage,
    GrantPrivileges,
    RevokePrivileges,
    RevokeSchema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStatement {
    pub kind: StatementKind,
    pub text: String,
}

impl GeneratedStatement {
    fn new(kind: StatementKind, text: String) -> Self {
        Self { kind, text }
    }
}

impl Display for GeneratedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn mysql_create_user(user: &str, password: &str) -> GeneratedStatement {
    GeneratedStatement::new(
        StatementKind::CreateUser,
        format!("CREATE USER IF NOT EXISTS {user} IDENTIFIED BY '{password}';"),
    )
}

pub fn mysql_drop_users<S: AsRef<str>>(users: &[S]) -> GeneratedStatement {
    GeneratedStatement::new(
        StatementKind::DropUser,
        format!("DROP USER IF EXISTS {};", join(users)),
    )
}

pub fn grant_on<S: AsRef<str>>(permissions: &[S], target: &str, user: &str) -> GeneratedStatement {
    GeneratedStatement::new(
        StatementKind::GrantPrivileges,
        format!("GRANT {} ON {target} TO {user};", join(permissions)),
    )
}

pub fn mysql_grant_database<S: AsRef<str>>(
    permissions: &[S],
    database: &str,
    user: &str,
) -> GeneratedStatement {
    grant_on(permissions, &format!("{database}.*"), user)
}

pub fn postgres_create_role(user: &str) -> GeneratedStatement {
    GeneratedStatement::new(
        StatementKind::CreateUser,
        format!("CREATE ROLE {user} WITH LOGIN; GRANT rds_iam TO {user};"),
    )
}

pub fn postgres_grant_usage(schema: &str, user: &str) -> GeneratedStatement {
    GeneratedStatement::new(
        StatementKind::GrantUsage,
        format!("GRANT USAGE ON SCHEMA {schema} TO {user};"),
    )
}

pub fn postgres_grant_all_tables<S: AsRef<str>>(
    permissions: &[S],
    schema: &str,
    user: &str,
) -> GeneratedStatement {
    grant_on(permissions, &format!("ALL TABLES IN SCHEMA {schema}"), user)
}

pub fn postgres_revoke_all_tables(schema: &str, user: &str) -> GeneratedStatement {
    GeneratedStatement::new(
        StatementKind::RevokePrivileges,
        format!("REVOKE ALL PRIVILEGES ON ALL TABLES IN SCHEMA {schema} FROM {user};"),
    )
}

pub fn postgres_revoke_schema(schema: &str, user: &str) -> GeneratedStatement {
    GeneratedStatement::new(
        StatementKind::RevokeSchema,
        format!("REVOKE ALL PRIVILEGES ON SCHEMA {schema} FROM {user};"),
    )
}

pub fn postgres_drop_user(user: &str) -> GeneratedStatement {
    GeneratedStatement::new(StatementKind::DropUser, format!("DROP USER {user};"))
}
