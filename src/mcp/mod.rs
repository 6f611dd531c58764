//! Model Context Protocol server over stdio.

pub mod protocol;
mod server;

pub use server::*;
