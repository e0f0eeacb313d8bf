use tokio::sync::{mpsc, watch};
use rn_core::{Destination, LatLng, MapSnapshot, MapStyle, NavEvent};

use crate::RuntimeError;

/// Messages accepted by the runtime loop
#[derive(Debug)]
pub enum Command {
    /// Feed an event to the navigator
    Event(NavEvent),

    /// Stop the loop after the current iteration
    Shutdown,
}

/// Cloneable event sink and snapshot reader for a running navigator
#[derive(Clone)]
pub struct NavigatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<MapSnapshot>,
}

impl NavigatorHandle {
    pub(crate) fn new(commands: mpsc::UnboundedSender<Command>, snapshots: watch::Receiver<MapSnapshot>) -> Self {
        Self { commands, snapshots }
    }

    /// Submit any navigator event
    pub fn send(&self, event: NavEvent) -> Result<(), RuntimeError> {
        self.commands
            .send(Command::Event(event))
            .map_err(|_| RuntimeError::Closed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> MapSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver notified on every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<MapSnapshot> {
        self.snapshots.clone()
    }

    pub fn query(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(NavEvent::Query(text.into()))
    }

    pub fn select_suggestion(&self, id: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(NavEvent::SelectSuggestion(id.into()))
    }

    pub fn select_destination(&self, destination: Destination) -> Result<(), RuntimeError> {
        self.send(NavEvent::SelectDestination(destination))
    }

    pub fn select_current_location(&self) -> Result<(), RuntimeError> {
        self.send(NavEvent::SelectCurrentLocation)
    }

    pub fn confirm_route(&self) -> Result<(), RuntimeError> {
        self.send(NavEvent::ConfirmRoute)
    }

    pub fn cancel(&self) -> Result<(), RuntimeError> {
        self.send(NavEvent::Cancel)
    }

    pub fn map_click(&self, coords: LatLng) -> Result<(), RuntimeError> {
        self.send(NavEvent::MapClick(coords))
    }

    pub fn confirm_map_click(&self) -> Result<(), RuntimeError> {
        self.send(NavEvent::ConfirmMapClick)
    }

    /// Drag-start or zoom-start on the map surface
    pub fn interaction(&self) -> Result<(), RuntimeError> {
        self.send(NavEvent::Interaction)
    }

    pub fn activate_control(&self) -> Result<(), RuntimeError> {
        self.send(NavEvent::ActivateControl)
    }

    pub fn drag_start(&self) -> Result<(), RuntimeError> {
        self.send(NavEvent::DragStart)
    }

    pub fn drag_move(&self, dx: f32, dy: f32) -> Result<(), RuntimeError> {
        self.send(NavEvent::DragMove { dx, dy })
    }

    pub fn drag_end(&self) -> Result<(), RuntimeError> {
        self.send(NavEvent::DragEnd)
    }

    pub fn set_map_style(&self, style: MapStyle) -> Result<(), RuntimeError> {
        self.send(NavEvent::SetMapStyle(style))
    }

    /// Ask the runtime loop to exit
    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.commands
            .send(Command::Shutdown)
            .map_err(|_| RuntimeError::Closed)
    }

    /// Whether the runtime loop is still accepting commands
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}
