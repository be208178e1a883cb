//! # parkhub-stats
//!
//! Usage statistics derived from place transitions. The engine consumes
//! pre-transition [`PlaceSnapshot`](parkhub_lot::PlaceSnapshot)s and keeps
//! four rank tables (by place, actor, weekday, month) plus the total time
//! places spent occupied. The whole state can be exported and imported for
//! administrative backup/restore.

pub mod engine;
pub mod export;
pub mod rank;
pub mod report;
pub mod store;

pub use engine::StatsEngine;
pub use export::StatsExport;
pub use rank::{RankEntry, RankTable};
pub use report::{RankedEntry, RankedReport};
pub use store::StatsStore;
