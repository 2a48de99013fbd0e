pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod input;
pub mod logging;
pub mod menu;
pub mod metrics;
pub mod pipeline;
pub mod prober;
pub mod sink;
pub mod types;

// Ports and their adapters
pub mod app;
pub mod infra;

pub use pipeline::Coordinator;
pub use prober::{ProbeOutcome, Prober};
pub use types::{ActivityState, CandidateLink, InputMode, PremintEvent};
