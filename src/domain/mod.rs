mod company;
mod customer;
mod national_id;
mod transaction;

pub use company::*;
pub use customer::*;
pub use national_id::*;
pub use transaction::*;
