//! Single-task event loop around the navigator
//!
//! The loop waits on three things at once: commands from handles,
//! completions from spawned lookups, and the navigator's next deadline.
//! Lookups never touch navigator state; they post a completion event and
//! the loop applies it like any other input.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use rn_core::{Effect, Geocoder, MapSnapshot, NavEvent, Navigator, RouteProvider};

use crate::handle::{Command, NavigatorHandle};

/// Owns a [`Navigator`] and drives it from async inputs
pub struct NavigatorRuntime {
    navigator: Navigator,
    geocoder: Arc<dyn Geocoder>,
    router: Arc<dyn RouteProvider>,
    commands: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<NavEvent>,
    completions_rx: mpsc::UnboundedReceiver<NavEvent>,
    snapshots: watch::Sender<MapSnapshot>,
}

fn clock_now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

impl NavigatorRuntime {
    /// Create a runtime and the handle used to talk to it
    pub fn new(
        navigator: Navigator,
        geocoder: Arc<dyn Geocoder>,
        router: Arc<dyn RouteProvider>,
    ) -> (Self, NavigatorHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(navigator.snapshot());

        let runtime = Self {
            navigator,
            geocoder,
            router,
            commands,
            completions_tx,
            completions_rx,
            snapshots,
        };

        (runtime, NavigatorHandle::new(commands_tx, snapshot_rx))
    }

    /// Run until shutdown is requested or every handle is dropped
    pub async fn run(mut self) -> Navigator {
        tracing::info!("Navigator runtime started");
        self.navigator.mount(clock_now());
        self.publish();

        loop {
            let deadline = self.navigator.next_deadline().map(tokio::time::Instant::from_std);
            let timer = async move {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Event(event)) => self.dispatch(event),
                    Some(Command::Shutdown) | None => break,
                },
                Some(event) = self.completions_rx.recv() => self.dispatch(event),
                _ = timer => {
                    let effects = self.navigator.on_deadline(clock_now());
                    self.execute(effects);
                }
            }

            self.publish();
        }

        tracing::info!("Navigator runtime stopped");
        self.navigator
    }

    fn dispatch(&mut self, event: NavEvent) {
        let effects = self.navigator.handle(event, clock_now());
        self.execute(effects);
    }

    fn execute(&self, effects: Vec<Effect>) {
        for effect in effects {
            let completions = self.completions_tx.clone();

            match effect {
                Effect::Search(request) => {
                    let geocoder = self.geocoder.clone();
                    tokio::spawn(async move {
                        let result = geocoder.search(&request.text, request.limit).await;
                        let _ = completions.send(NavEvent::SuggestionsResolved { seq: request.seq, result });
                    });
                }
                Effect::Route(request) => {
                    let router = self.router.clone();
                    tokio::spawn(async move {
                        let result = router.route(request.origin, request.destination).await;
                        let _ = completions.send(NavEvent::RouteResolved { seq: request.seq, result });
                    });
                }
                Effect::ReverseGeocode { seq, coords } => {
                    let geocoder = self.geocoder.clone();
                    tokio::spawn(async move {
                        let result = geocoder.reverse(coords).await;
                        let _ = completions.send(NavEvent::ReverseGeocoded { seq, result });
                    });
                }
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.navigator.snapshot();
        if *self.snapshots.borrow() == snapshot {
            return;
        }

        self.navigator.view().publish_snapshot(&snapshot);
        self.snapshots.send_replace(snapshot);
    }
}
