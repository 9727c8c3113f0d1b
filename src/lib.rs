pub mod application;
pub mod cli;
pub mod domain;
pub mod storage;

pub use application::{FinanceService, Reporter, TransactionSource};
pub use domain::*;
pub use storage::Repository;
