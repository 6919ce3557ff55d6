//! Fetch button bindings

use std::sync::Arc;
use std::time::Duration;

use slint::ComponentHandle;

use crate::state::AppState;
use crate::MainWindow;

/// Run-count key for the fetch action.
const FETCH_KEY: &str = "fetch";

pub fn setup_fetch_bindings(window: &MainWindow, state: Arc<AppState>) {
    let launcher = state
        .scope
        .stateful_launcher(&state.counts, FETCH_KEY, || async {
            tracing::info!("fetch started");
            // Emulate a slow network request
            tokio::time::sleep(Duration::from_secs(30)).await;
            tracing::info!("fetch finished");
        });

    // Push is-running changes into the UI as the counter moves
    let window_weak = window.as_weak();
    let mut signal = launcher.signal();
    window.set_is_running(signal.get());
    let subscribed = state.scope.spawn(async move {
        while let Ok(running) = signal.changed().await {
            let _ = window_weak.upgrade_in_event_loop(move |window| {
                window.set_is_running(running);
            });
        }
    });
    if let Err(e) = subscribed {
        tracing::warn!(error = %e, "Failed to subscribe the UI to the run state");
    }

    window.on_fetch(move || launcher.trigger());
}
