mod aggregation;
mod balance;
mod breakdown;
mod category;
mod comparison;
mod money;
mod period;
mod report;
mod transaction;
mod transfer;
mod wallet;

pub use aggregation::*;
pub use balance::*;
pub use breakdown::*;
pub use category::*;
pub use comparison::*;
pub use money::*;
pub use period::*;
pub use report::*;
pub use transaction::*;
pub use transfer::*;
pub use wallet::*;
