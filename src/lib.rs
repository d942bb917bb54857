pub mod api;
pub mod config;
pub mod error;
pub mod matrix;
pub mod optimizer;
pub mod preprocess;
pub mod stats;

pub use error::{SfResult, SuiteError};
