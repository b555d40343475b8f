pub mod clock;
pub mod config;
pub mod engine;
pub mod error_convert;
pub mod notify;
pub mod office;
pub mod storage;
pub mod telemetry;
pub mod templates;

pub use office::{Office, OfficeDeps};
