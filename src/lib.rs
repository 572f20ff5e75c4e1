//! Battery cell matching: groups measured cells into fixed-size modules of
//! closely matched resistance, quarantining `st` outliers and recycling
//! whatever the first pass could not place.

pub mod assign;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod state;

pub use config::SortConfig;
pub use error::{Result, SortError};
pub use state::SortState;
