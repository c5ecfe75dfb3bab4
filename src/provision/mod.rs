pub mod error;
pub mod policy;
pub mod request;
pub mod statement;

pub use error::{ProvisioningError, Result};
pub use policy::{DialectPolicy, policy_for};
pub use request::{Dialect, NormalizedRequest, Operation, OperationRequest, split_list};
pub use statement::{GeneratedStatement, StatementKind};
