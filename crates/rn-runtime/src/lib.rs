//! Async driver for the navigation core
//!
//! [`NavigatorRuntime`] owns the [`rn_core::Navigator`] on a single task.
//! Rendering collaborators talk to it through a cloneable
//! [`NavigatorHandle`] and read state from a snapshot watch channel.

pub mod handle;
pub mod runtime;

use thiserror::Error;

pub use handle::{Command, NavigatorHandle};
pub use runtime::NavigatorRuntime;

/// Errors surfaced to runtime callers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("navigator runtime has shut down")]
    Closed,
}
