pub mod calculator;
pub mod clock;
pub mod config;
pub mod log;
pub mod punch;
pub mod store;
pub mod timeclock;
pub mod triggers;
