//! Replays a fixed script of position readings

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use rn_core::{LatLng, Position, PositionError, PositionOptions, PositionReading, PositionSource, WatchHandle};

/// One step of a position script
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// Report a fix at these coordinates
    Fix(LatLng),
    /// Report an error
    Fail(PositionError),
    /// Report nothing this interval
    Gap,
}

/// Position source that emits one script step per interval
///
/// When the time since the last fix reaches the subscription's timeout the
/// source reports [`PositionError::Timeout`] once, until the next fix.
/// `watch` must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct ScriptedPositionSource {
    steps: Vec<ScriptStep>,
    interval: Duration,
}

impl ScriptedPositionSource {
    /// Create a new scripted source
    pub fn new(steps: Vec<ScriptStep>, interval: Duration) -> Self {
        Self { steps, interval }
    }

    /// Script of fixes along a path
    pub fn along(path: &[LatLng], interval: Duration) -> Self {
        Self::new(path.iter().copied().map(ScriptStep::Fix).collect(), interval)
    }
}

impl PositionSource for ScriptedPositionSource {
    fn watch(&self, options: PositionOptions, sink: mpsc::UnboundedSender<PositionReading>) -> WatchHandle {
        let steps = self.steps.clone();
        let interval = self.interval;
        let timeout = Duration::from_millis(options.timeout_ms);

        tracing::debug!(
            "Replaying {} scripted readings every {:?} (high accuracy: {})",
            steps.len(), interval, options.high_accuracy
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_fix = Instant::now();
            let mut timed_out = false;

            for step in steps {
                ticker.tick().await;

                let reading = match step {
                    ScriptStep::Fix(coords) => {
                        last_fix = Instant::now();
                        timed_out = false;
                        Ok(Position::now(coords))
                    }
                    ScriptStep::Fail(error) => Err(error),
                    ScriptStep::Gap => {
                        if timed_out || last_fix.elapsed() < timeout {
                            continue;
                        }
                        timed_out = true;
                        Err(PositionError::Timeout(options.timeout_ms))
                    }
                };

                if sink.send(reading).is_err() {
                    break;
                }
            }
        });

        WatchHandle::new(move || task.abort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_replays_script_in_order() {
        let source = ScriptedPositionSource::new(
            vec![
                ScriptStep::Fix(LatLng::new(1.0, 1.0)),
                ScriptStep::Fail(PositionError::PermissionDenied),
                ScriptStep::Fix(LatLng::new(2.0, 2.0)),
            ],
            Duration::from_secs(1),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = source.watch(PositionOptions::default(), tx);

        assert_eq!(rx.recv().await.unwrap().unwrap().coords, LatLng::new(1.0, 1.0));
        assert_eq!(rx.recv().await.unwrap(), Err(PositionError::PermissionDenied));
        assert_eq!(rx.recv().await.unwrap().unwrap().coords, LatLng::new(2.0, 2.0));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gap_reports_timeout_once() {
        let mut steps = vec![ScriptStep::Fix(LatLng::new(1.0, 1.0))];
        steps.extend(std::iter::repeat(ScriptStep::Gap).take(8));
        let source = ScriptedPositionSource::new(steps, Duration::from_secs(1));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = source.watch(PositionOptions::default(), tx);

        assert!(rx.recv().await.unwrap().is_ok());
        assert_eq!(rx.recv().await.unwrap(), Err(PositionError::Timeout(5_000)));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_replay() {
        let source = ScriptedPositionSource::along(
            &[LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)],
            Duration::from_secs(1),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = source.watch(PositionOptions::default(), tx);

        assert!(rx.recv().await.unwrap().is_ok());
        handle.cancel();
        handle.cancel();

        assert!(!handle.is_active());
        assert!(rx.recv().await.is_none());
    }
}
