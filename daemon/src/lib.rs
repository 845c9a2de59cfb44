// Earn Daemon Library
// Exposes the engine, storage and RPC modules for the binary and for tests

#![warn(clippy::correctness)]
#![allow(clippy::type_complexity)]
#![allow(clippy::uninlined_format_args)]

extern crate log;

pub mod config;
pub mod core;
pub mod rpc;
