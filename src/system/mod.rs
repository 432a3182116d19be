//! # System Interaction Layer
//!
//! The boundary between the resolution pipeline and the operating system.
//!
//! - **`executor`**: spawns the prepared command as a child process attached to
//!   the current terminal and reports how it ended.

pub mod executor;
