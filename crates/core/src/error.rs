//! Error types for Tasklight Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Task scope is shut down")]
    ScopeShutDown,

    #[error("Run counter dropped while a watcher was waiting on it")]
    CounterClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
