//! Library surface of kubetop_agent, used by the binary and by integration tests.

pub mod bus;
pub mod collector;
pub mod config;
pub mod error;
pub mod report;
pub mod source;
pub mod state;
pub mod types;
pub mod ws;
