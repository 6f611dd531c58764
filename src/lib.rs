pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod mcp;
pub mod storage;
pub mod tools;

pub use domain::*;
pub use storage::Repository;
