//! Tasklight Core Library
//!
//! Run-count store, lifecycle task scope, and the stateful launcher that
//! ties them together.

pub mod counter;
pub mod error;
pub mod launcher;
pub mod scope;

pub use counter::{IsRunning, RunCounter, RunCounts, DEFAULT_KEY};
pub use error::{Error, Result};
pub use launcher::StatefulLauncher;
pub use scope::TaskScope;
