//! View model bindings for Slint UI

mod fetch;

use crate::state::AppState;
use crate::MainWindow;
use std::sync::Arc;

pub fn setup_bindings(window: &MainWindow, state: Arc<AppState>) {
    fetch::setup_fetch_bindings(window, state);
}
