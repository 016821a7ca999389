mod engine;

pub use engine::{SyncEngine, SyncOptions};
