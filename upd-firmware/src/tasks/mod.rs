//! Embassy async tasks
//!
//! Two tasks share the work: capture turns bus traffic into frames, the
//! main loop consumes them and serves the host.

pub mod capture;
pub mod main_loop;

pub use capture::capture_task;
pub use main_loop::main_loop_task;
