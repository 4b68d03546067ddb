//! Library surface of the kubetop subscriber (arg parsing, websocket plumbing, recording).

pub mod args;
pub mod record;
pub mod ws;
