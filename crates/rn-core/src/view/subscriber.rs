//! View subscriber trait

use super::ViewCommand;
use crate::state::MapSnapshot;

/// Trait for rendering collaborators that consume view output
pub trait ViewSubscriber: Send + Sync {
    /// Called for every camera command the core emits
    fn on_view_command(&self, command: &ViewCommand);

    /// Called after each processed event with the full renderable state
    fn on_snapshot(&self, _snapshot: &MapSnapshot) {}
}
