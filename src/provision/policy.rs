use super::error::{ProvisioningError, Result};
use super::request::{Dialect, NormalizedRequest, Operation};
use super::statement::{self, GeneratedStatement, MYSQL_PLACEHOLDER_PASSWORD, SERVICE_USER_PRIVILEGES};
use std::iter;

/// Lazily rendered statement sequence. A statement is only built once the
/// previous one has been pulled, so nothing past a failure is ever rendered.
pub type Statements<'a> = Box<dyn Iterator<Item = GeneratedStatement> + 'a>;

/// Per-dialect defaults and statement ordering.
pub trait DialectPolicy: Sync {
    fn dialect(&self) -> Dialect;

    /// Permissions used when the operator leaves the list empty.
    fn default_permissions(&self) -> &'static [&'static str];

    fn requires_schemas(&self, operation: Operation) -> bool;

    fn supports_service_user(&self) -> bool {
        false
    }

    fn generate_add<'a>(&self, request: &'a NormalizedRequest) -> Statements<'a>;

    fn generate_remove<'a>(&self, request: &'a NormalizedRequest) -> Statements<'a>;

    fn generate_service_user<'a>(&self, _request: &'a NormalizedRequest) -> Result<Statements<'a>> {
        Err(ProvisioningError::UnsupportedOperation {
            operation: Operation::AddServiceUser,
            dialect: self.dialect(),
        })
    }

    fn generate<'a>(&self, request: &'a NormalizedRequest) -> Result<Statements<'a>> {
        match request.operation() {
            Operation::AddUser => Ok(self.generate_add(request)),
            Operation::AddServiceUser => self.generate_service_user(request),
            Operation::RemoveUser => Ok(self.generate_remove(request)),
        }
    }
}

pub struct MySqlPolicy;

pub struct PostgresPolicy;

pub fn policy_for(dialect: Dialect) -> &'static dyn DialectPolicy {
    match dialect {
        Dialect::MySql => &MySqlPolicy,
        Dialect::Postgres => &PostgresPolicy,
    }
}

impl DialectPolicy for MySqlPolicy {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn default_permissions(&self) -> &'static [&'static str] {
        &["SELECT", "INSERT", "UPDATE", "SHOW VIEW"]
    }

    fn requires_schemas(&self, _operation: Operation) -> bool {
        false
    }

    fn supports_service_user(&self) -> bool {
        true
    }

    fn generate_add<'a>(&self, request: &'a NormalizedRequest) -> Statements<'a> {
        let permissions = request.permissions();
        Box::new(request.users().iter().flat_map(move |user| {
            let grants = request
                .tables()
                .targets()
                .into_iter()
                .map(move |table| statement::grant_on(permissions, table, user));
            iter::once_with(move || statement::mysql_create_user(user, MYSQL_PLACEHOLDER_PASSWORD))
                .chain(grants)
        }))
    }

    // One DROP for the whole list.
    fn generate_remove<'a>(&self, request: &'a NormalizedRequest) -> Statements<'a> {
        Box::new(iter::once_with(move || statement::mysql_drop_users(request.users())))
    }

    fn generate_service_user<'a>(&self, request: &'a NormalizedRequest) -> Result<Statements<'a>> {
        let user = request
            .users()
            .first()
            .ok_or(ProvisioningError::EmptyUserList)?;
        let password = request
            .service_password()
            .ok_or(ProvisioningError::MissingServicePassword)?;
        let database = request.database();
        Ok(Box::new(
            iter::once_with(move || statement::mysql_create_user(user, password)).chain(
                iter::once_with(move || {
                    statement::mysql_grant_database(&SERVICE_USER_PRIVILEGES, database, user)
                }),
            ),
        ))
    }
}

impl DialectPolicy for PostgresPolicy {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn default_permissions(&self) -> &'static [&'static str] {
        &["SELECT", "INSERT", "UPDATE"]
    }

    fn requires_schemas(&self, operation: Operation) -> bool {
        matches!(operation, Operation::AddUser | Operation::RemoveUser)
    }

    fn generate_add<'a>(&self, request: &'a NormalizedRequest) -> Statements<'a> {
        let permissions = request.permissions();
        Box::new(request.users().iter().flat_map(move |user| {
            let grants: Statements<'a> = if request.all_flag() {
                // Only the first schema gets USAGE + the all-tables grant; the
                // remaining schemas are skipped for this user.
                Box::new(request.schemas().first().into_iter().flat_map(move |schema| {
                    iter::once_with(move || statement::postgres_grant_usage(schema, user)).chain(
                        iter::once_with(move || {
                            statement::postgres_grant_all_tables(permissions, schema, user)
                        }),
                    )
                }))
            } else {
                let usage = request
                    .schemas()
                    .iter()
                    .map(move |schema| statement::postgres_grant_usage(schema, user));
                let tables = request
                    .tables()
                    .targets()
                    .into_iter()
                    .map(move |table| statement::grant_on(permissions, table, user));
                Box::new(usage.chain(tables))
            };
            iter::once_with(move || statement::postgres_create_role(user)).chain(grants)
        }))
    }

    // Revokes per schema, then drops each user on its own.
    fn generate_remove<'a>(&self, request: &'a NormalizedRequest) -> Statements<'a> {
        Box::new(request.users().iter().flat_map(move |user| {
            request
                .schemas()
                .iter()
                .flat_map(move |schema| {
                    iter::once_with(move || statement::postgres_revoke_all_tables(schema, user))
                        .chain(iter::once_with(move || {
                            statement::postgres_revoke_schema(schema, user)
                        }))
                })
                .chain(iter::once_with(move || statement::postgres_drop_user(user)))
        }))
    }
}
