//! Tasklight - Stateful launcher demo
//!
//! A desktop demonstration of a reusable UI pattern: a button that launches
//! an asynchronous action and reflects whether any invocation is still in
//! flight, counted per key.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod state;
mod viewmodel;

slint::include_modules!();

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Tasklight");

    // Initialize tokio runtime for async actions
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let _guard = runtime.enter();

    // Initialize application state
    let app_state = Arc::new(state::AppState::new());

    // Create main window
    let main_window = MainWindow::new().unwrap();

    // Set up view model bindings
    viewmodel::setup_bindings(&main_window, app_state.clone());

    // Run the application
    main_window.run().unwrap();

    // Tear down the lifecycle scope, cancelling any outstanding fetches
    app_state.shutdown();
}
