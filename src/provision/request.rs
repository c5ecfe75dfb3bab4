use super::error::{ProvisioningError, Result};
use super::policy::DialectPolicy;
use std::fmt::Display;
use std::str::FromStr;

/// Table list entry that stands for every table in scope.
pub const ALL_TABLES: &str = "*";

/// Separator the operator uses between list entries.
pub const LIST_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddUser,
    AddServiceUser,
    RemoveUser,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::AddUser,
        Operation::AddServiceUser,
        Operation::RemoveUser,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::AddUser => "add-user",
            Operation::AddServiceUser => "add-service-user",
            Operation::RemoveUser => "remove-user",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::AddUser => "Add users to a database",
            Operation::AddServiceUser => "Add a Service user to a database (MySQL only)",
            Operation::RemoveUser => "Remove users from a database",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ProvisioningError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s.trim())
            .ok_or_else(|| ProvisioningError::UnknownOperation(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Postgres,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::MySql, Dialect::Postgres];

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ProvisioningError;

    fn from_str(s: &str) -> Result<Self> {
        Dialect::ALL
            .into_iter()
            .find(|dialect| dialect.as_str() == s.trim())
            .ok_or_else(|| ProvisioningError::UnsupportedDialect(s.to_string()))
    }
}

/// Splits a comma separated answer. Empty input yields `[""]`, which
/// normalization reads as "unspecified".
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR).map(String::from).collect()
}

fn is_unspecified(list: &[String]) -> bool {
    match list {
        [] => true,
        [only] => only.is_empty(),
        _ => false,
    }
}

/// Which tables a grant covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableScope {
    All,
    Named(Vec<String>),
}

impl TableScope {
    pub fn from_list(tables: Vec<String>) -> Self {
        if is_unspecified(&tables) || tables == [ALL_TABLES] {
            TableScope::All
        } else {
            TableScope::Named(tables)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, TableScope::All)
    }

    /// Grant targets in order; the sentinel renders as `*`.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            TableScope::All => vec![ALL_TABLES],
            TableScope::Named(tables) => tables.iter().map(String::as_str).collect(),
        }
    }
}

/// Operator answers for one invocation, before any defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub operation: Operation,
    pub dialect: Dialect,
    pub database: String,
    pub users: Vec<String>,
    pub permissions: Vec<String>,
    pub tables: Vec<String>,
    pub schemas: Vec<String>,
    pub service_password: Option<String>,
}

impl OperationRequest {
    pub fn new(operation: Operation, dialect: Dialect, database: impl Into<String>) -> Self {
        Self {
            operation,
            dialect,
            database: database.into(),
            users: Vec::new(),
            permissions: Vec::new(),
            tables: Vec::new(),
            schemas: Vec::new(),
            service_password: None,
        }
    }

    pub fn users(mut self, users: Vec<String>) -> Self {
        self.users = users;
        self
    }

    pub fn permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    pub fn schemas(mut self, schemas: Vec<String>) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn service_password(mut self, password: impl Into<String>) -> Self {
        self.service_password = Some(password.into());
        self
    }

    /// Validates the answers and applies the dialect's defaults.
    pub fn normalize(self, policy: &dyn DialectPolicy) -> Result<NormalizedRequest> {
        let operation = self.operation;
        let dialect = policy.dialect();
        if operation == Operation::AddServiceUser && !policy.supports_service_user() {
            return Err(ProvisioningError::UnsupportedOperation { operation, dialect });
        }
        if is_unspecified(&self.users) {
            return Err(ProvisioningError::EmptyUserList);
        }

        let schemas = if policy.requires_schemas(operation) {
            if is_unspecified(&self.schemas) {
                return Err(ProvisioningError::MissingRequiredSchema { operation, dialect });
            }
            self.schemas
        } else {
            Vec::new()
        };

        let service_password = if operation == Operation::AddServiceUser {
            if self.users.len() > 1 {
                return Err(ProvisioningError::TooManyServiceUsers(self.users.len()));
            }
            match self.service_password {
                Some(password) if !password.is_empty() => Some(password),
                _ => return Err(ProvisioningError::MissingServicePassword),
            }
        } else {
            None
        };

        let permissions = if is_unspecified(&self.permissions) {
            policy
                .default_permissions()
                .iter()
                .map(|p| p.to_string())
                .collect()
        } else {
            self.permissions
        };

        Ok(NormalizedRequest {
            operation,
            dialect,
            database: self.database,
            users: self.users,
            permissions,
            tables: TableScope::from_list(self.tables),
            schemas,
            service_password,
        })
    }
}

/// Request after defaulting. Read-only from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    operation: Operation,
    dialect: Dialect,
    database: String,
    users: Vec<String>,
    permissions: Vec<String>,
    tables: TableScope,
    schemas: Vec<String>,
    service_password: Option<String>,
}

impl NormalizedRequest {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn tables(&self) -> &TableScope {
        &self.tables
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    pub fn service_password(&self) -> Option<&str> {
        self.service_password.as_deref()
    }

    pub fn all_flag(&self) -> bool {
        self.tables.is_all()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::provision::policy::policy_for;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("alice, bob"), list(&["alice", "bob"]));
        assert_eq!(split_list(""), list(&[""]));
        // only comma-space separates
        assert_eq!(split_list("a,b"), list(&["a,b"]));
    }

    #[test]
    fn test_parse_operation_and_dialect() {
        assert_eq!("add-user".parse::<Operation>().unwrap(), Operation::AddUser);
        assert_eq!(
            "add-service-user".parse::<Operation>().unwrap(),
            Operation::AddServiceUser
        );
        assert_eq!("remove-user".parse::<Operation>().unwrap(), Operation::RemoveUser);
        assert!(matches!(
            "rename-user".parse::<Operation>(),
            Err(ProvisioningError::UnknownOperation(_))
        ));
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!(matches!(
            "oracle".parse::<Dialect>(),
            Err(ProvisioningError::UnsupportedDialect(name)) if name == "oracle"
        ));
    }

    #[test]
    fn test_default_permissions_mysql() {
        let req = OperationRequest::new(Operation::AddUser, Dialect::MySql, "app")
            .users(list(&["alice"]))
            .permissions(split_list(""))
            .normalize(policy_for(Dialect::MySql))
            .unwrap();
        assert_eq!(
            req.permissions(),
            list(&["SELECT", "INSERT", "UPDATE", "SHOW VIEW"]).as_slice()
        );
    }

    #[test]
    fn test_default_permissions_postgres() {
        let req = OperationRequest::new(Operation::AddUser, Dialect::Postgres, "app")
            .users(list(&["alice"]))
            .schemas(list(&["public"]))
            .normalize(policy_for(Dialect::Postgres))
            .unwrap();
        assert_eq!(req.permissions(), list(&["SELECT", "INSERT", "UPDATE"]).as_slice());
    }

    #[test]
    fn test_explicit_permissions_kept() {
        let req = OperationRequest::new(Operation::AddUser, Dialect::MySql, "app")
            .users(list(&["alice"]))
            .permissions(list(&["SELECT"]))
            .normalize(policy_for(Dialect::MySql))
            .unwrap();
        assert_eq!(req.permissions(), list(&["SELECT"]).as_slice());
    }

    #[test]
    fn test_all_flag() {
        assert!(TableScope::from_list(split_list("")).is_all());
        assert!(TableScope::from_list(list(&["*"])).is_all());
        assert!(TableScope::from_list(Vec::new()).is_all());
        assert!(!TableScope::from_list(list(&["orders"])).is_all());
        assert!(!TableScope::from_list(list(&["*", "orders"])).is_all());

        let req = OperationRequest::new(Operation::AddUser, Dialect::MySql, "app")
            .users(list(&["alice"]))
            .tables(list(&["orders", "items"]))
            .normalize(policy_for(Dialect::MySql))
            .unwrap();
        assert!(!req.all_flag());
        assert_eq!(req.tables().targets(), vec!["orders", "items"]);
    }

    #[test]
    fn test_empty_user_list() {
        let err = OperationRequest::new(Operation::AddUser, Dialect::MySql, "app")
            .users(split_list(""))
            .normalize(policy_for(Dialect::MySql))
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::EmptyUserList));
    }

    #[test]
    fn test_duplicate_users_kept() {
        let req = OperationRequest::new(Operation::RemoveUser, Dialect::MySql, "app")
            .users(list(&["alice", "alice"]))
            .normalize(policy_for(Dialect::MySql))
            .unwrap();
        assert_eq!(req.users().len(), 2);
    }

    #[test]
    fn test_postgres_requires_schemas() {
        for operation in [Operation::AddUser, Operation::RemoveUser] {
            let err = OperationRequest::new(operation, Dialect::Postgres, "app")
                .users(list(&["alice"]))
                .schemas(split_list(""))
                .normalize(policy_for(Dialect::Postgres))
                .unwrap_err();
            assert!(matches!(err, ProvisioningError::MissingRequiredSchema { .. }));
        }
    }

    #[test]
    fn test_mysql_ignores_schemas() {
        let req = OperationRequest::new(Operation::AddUser, Dialect::MySql, "app")
            .users(list(&["alice"]))
            .schemas(list(&["public"]))
            .normalize(policy_for(Dialect::MySql))
            .unwrap();
        assert!(req.schemas().is_empty());
    }

    #[test]
    fn test_service_user_validation() {
        let mysql = policy_for(Dialect::MySql);
        let err = OperationRequest::new(Operation::AddServiceUser, Dialect::MySql, "app")
            .users(list(&["svc"]))
            .normalize(mysql)
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::MissingServicePassword));

        let err = OperationRequest::new(Operation::AddServiceUser, Dialect::MySql, "app")
            .users(list(&["svc", "other"]))
            .service_password("hunter2")
            .normalize(mysql)
            .unwrap_err();
        assert!(matches!(err, ProvisioningError::TooManyServiceUsers(2)));

        let err = OperationRequest::new(Operation::AddServiceUser, Dialect::Postgres, "app")
            .users(list(&["svc"]))
            .service_password("hunter2")
            .normalize(policy_for(Dialect::Postgres))
            .unwrap_err();
        assert!(matches!(
            err,
            ProvisioningError::UnsupportedOperation {
                operation: Operation::AddServiceUser,
                dialect: Dialect::Postgres,
            }
        ));
    }
}
