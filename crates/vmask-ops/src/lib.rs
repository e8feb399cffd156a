//! Typed operation surface for scripting and automation.
//!
//! Everything an embedding agent can ask this core to do is one of a
//! closed set of operations. Each operation is a concrete type declaring
//! its parameter schema at compile time; a registry maps operation names
//! to instances for callers that must invoke by string name. There is no
//! reflection: an unknown name is an error, and parameters that do not
//! match the declared schema are rejected before any work starts.

pub mod context;
pub mod error;
pub mod operation;
pub mod operations;

pub use context::OpsContext;
pub use error::{OpsError, OpsResult};
pub use operation::{Operation, OperationRegistry};
