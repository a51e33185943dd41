// PAYGRADE - Salary Classification Core
// Loads a pre-trained classifier artifact and serves single and batch
// predictions over an HTTP API driven by a hosting UI.

pub mod config;
pub mod frame;
pub mod http;
pub mod ml;
pub mod predict;
pub mod telemetry;
pub mod types;
