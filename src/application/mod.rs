// Application layer - use cases and orchestration.
// Reports read through the TransactionSource trait so they can run against
// any store; the service wires them to the SQLite repository.

pub mod error;
pub mod reporting;
pub mod service;
pub mod source;

pub use error::*;
pub use reporting::*;
pub use service::*;
pub use source::*;
