//! Composite economic health score
//!
//! Six component scores, each a weighted average of bucket-scored headline
//! indicators, are combined under regime-adjusted weights into one score in
//! `[0,100]` with a confidence, an interval, key drivers and risk factors.

pub mod cache;
pub mod components;
pub mod confidence;
pub mod scorer;
pub mod weights;

pub use cache::{ScoreCache, DEFAULT_CACHE_TTL_SECS};
pub use components::*;
pub use confidence::*;
pub use scorer::*;
pub use weights::WeightStructure;
