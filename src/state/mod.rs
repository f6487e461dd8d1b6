//! State module for tracking per-URL crawl progress
//!
//! # Components
//!
//! - `UnitState`: the stage a URL has reached inside its worker
//!   (navigating, converging, extracting, ... done or failed)

mod unit_state;

pub use unit_state::UnitState;
