pub mod config;
pub mod earning;
pub mod error;
pub mod storage;
