//! CLI command implementations.

mod ask;
mod chat;
mod doctor;
mod init;
mod tools;

pub use ask::run_ask;
pub use chat::run_chat;
pub use doctor::run_doctor;
pub use init::run_init;
pub use tools::run_tools;
