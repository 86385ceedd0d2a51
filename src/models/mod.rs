pub mod clock_event;
pub mod location;
pub mod session;
pub mod task;
