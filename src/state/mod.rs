//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RegionState`: where the crawl driver is within one region
//! - `ErrorStage`: which pipeline stage a recorded scrape failure belongs to

mod error_stage;
mod region_state;

pub use error_stage::ErrorStage;
pub use region_state::RegionState;
