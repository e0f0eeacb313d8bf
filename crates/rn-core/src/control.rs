//! Floating recenter control
//!
//! Two independent state machines: [`ControlVisibility`] (shown on
//! interaction, hidden by a deadline or explicit activation) and
//! [`DragHandle`] (relative repositioning). They only meet in
//! [`ControlAffordance`], the value handed to the renderer.

use std::time::{Duration, Instant};
use serde::{Serialize, Deserialize};

/// Timer-driven visibility
#[derive(Debug, Clone)]
pub struct ControlVisibility {
    hide_after: Duration,
    visible: bool,
    hide_deadline: Option<Instant>,
}

impl ControlVisibility {
    /// Create a visible control with no hide timer yet
    pub fn new(hide_after: Duration) -> Self {
        Self {
            hide_after,
            visible: true,
            hide_deadline: None,
        }
    }

    /// Start the one-shot hide timer that runs after mount
    pub fn mount(&mut self, now: Instant) {
        self.visible = true;
        self.hide_deadline = Some(now + self.hide_after);
    }

    /// Any drag-start or zoom-start on the map surface
    pub fn on_interaction(&mut self, now: Instant) {
        self.visible = true;
        self.hide_deadline = Some(now + self.hide_after);
    }

    /// The user activated the control
    pub fn dismiss(&mut self) {
        self.visible = false;
        self.hide_deadline = None;
    }

    /// Hide the control if its deadline has passed; returns whether it changed
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.hide_deadline {
            Some(deadline) if deadline <= now => {
                self.hide_deadline = None;
                let changed = self.visible;
                self.visible = false;
                changed
            }
            _ => false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_deadline
    }
}

/// Screen-space offset of the control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenOffset {
    pub x: f32,
    pub y: f32,
}

/// Drag-to-reposition state
#[derive(Debug, Clone)]
pub struct DragHandle {
    dragging: bool,
    offset: ScreenOffset,
}

impl DragHandle {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            dragging: false,
            offset: ScreenOffset { x, y },
        }
    }

    pub fn drag_start(&mut self) {
        self.dragging = true;
    }

    /// Add a relative pointer movement; ignored unless dragging
    pub fn drag_move(&mut self, dx: f32, dy: f32) -> bool {
        if !self.dragging {
            return false;
        }
        self.offset.x += dx;
        self.offset.y += dy;
        true
    }

    pub fn drag_end(&mut self) {
        self.dragging = false;
    }

    pub fn offset(&self) -> ScreenOffset {
        self.offset
    }
}

/// What the renderer needs to draw the control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlAffordance {
    pub visible: bool,
    pub position: ScreenOffset,
}

impl ControlAffordance {
    pub fn compose(visibility: &ControlVisibility, drag: &DragHandle) -> Self {
        Self {
            visible: visibility.is_visible(),
            position: drag.offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIDE: Duration = Duration::from_millis(5_000);

    #[test]
    fn test_hides_after_mount_if_untouched() {
        let mut control = ControlVisibility::new(HIDE);
        let t0 = Instant::now();
        control.mount(t0);

        assert!(!control.expire(t0 + Duration::from_millis(4_999)));
        assert!(control.is_visible());
        assert!(control.expire(t0 + HIDE));
        assert!(!control.is_visible());
    }

    #[test]
    fn test_interaction_resets_deadline() {
        let mut control = ControlVisibility::new(HIDE);
        let t0 = Instant::now();
        control.mount(t0);
        control.on_interaction(t0);
        control.on_interaction(t0 + Duration::from_secs(3));

        assert_eq!(control.hide_deadline(), Some(t0 + Duration::from_millis(8_000)));
        control.expire(t0 + Duration::from_millis(7_999));
        assert!(control.is_visible());
        control.expire(t0 + Duration::from_millis(8_000));
        assert!(!control.is_visible());
    }

    #[test]
    fn test_interaction_reshows_hidden_control() {
        let mut control = ControlVisibility::new(HIDE);
        let t0 = Instant::now();
        control.mount(t0);
        control.expire(t0 + HIDE);

        control.on_interaction(t0 + Duration::from_secs(10));
        assert!(control.is_visible());
        assert_eq!(control.hide_deadline(), Some(t0 + Duration::from_secs(15)));
    }

    #[test]
    fn test_dismiss_cancels_deadline() {
        let mut control = ControlVisibility::new(HIDE);
        let t0 = Instant::now();
        control.on_interaction(t0);
        control.dismiss();

        assert!(!control.is_visible());
        assert!(control.hide_deadline().is_none());
        assert!(!control.expire(t0 + HIDE));
    }

    #[test]
    fn test_drag_is_relative() {
        let mut drag = DragHandle::new(20.0, 20.0);
        drag.drag_start();
        drag.drag_move(5.0, 5.0);
        drag.drag_move(-2.0, 0.0);
        drag.drag_end();

        assert_eq!(drag.offset(), ScreenOffset { x: 23.0, y: 25.0 });
    }

    #[test]
    fn test_move_without_drag_ignored() {
        let mut drag = DragHandle::new(0.0, 0.0);
        assert!(!drag.drag_move(10.0, 10.0));
        assert_eq!(drag.offset(), ScreenOffset { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_drag_does_not_touch_visibility() {
        let mut control = ControlVisibility::new(HIDE);
        let mut drag = DragHandle::new(20.0, 20.0);
        let t0 = Instant::now();
        control.mount(t0);
        control.dismiss();

        drag.drag_start();
        drag.drag_move(1.0, 1.0);

        let affordance = ControlAffordance::compose(&control, &drag);
        assert!(!affordance.visible);
        assert_eq!(affordance.position, ScreenOffset { x: 21.0, y: 21.0 });
    }
}
