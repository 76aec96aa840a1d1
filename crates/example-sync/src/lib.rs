pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

pub use app::sync::{Direction, SyncReport};
pub use infra::config::{SyncConfig, Workspace};

pub fn init() {
    infra::logging::init();
}
