pub mod configuration;
pub mod db;
pub mod entity;
pub mod model;
pub mod remote;
pub mod store;
pub mod sync;
pub mod telemetry;
pub mod util;
