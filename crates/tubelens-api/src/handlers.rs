//! Request handlers.

pub mod health;
pub mod tasks;
pub mod videos;

pub use health::*;
pub use tasks::*;
pub use videos::*;
