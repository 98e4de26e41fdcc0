pub mod background;
pub mod classifier;
pub mod clustering;
pub mod config;
pub mod error;
pub mod input;
pub mod live_status;
pub mod markers;
pub mod pipeline;
pub mod scan;
pub mod session;
pub mod sim;
pub mod tracker;
pub mod types;

pub use config::DatmoConfig;
pub use error::{DatmoError, Result};
pub use pipeline::{CycleOutcome, CycleReport, DatmoPipeline, WaitingFor};
pub use tracker::{SingleTargetTracker, TrackerEvent, TrackerState};
