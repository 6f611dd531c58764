mod datetime;
mod money;
mod transfer;

pub use datetime::*;
pub use money::*;
pub use transfer::*;
