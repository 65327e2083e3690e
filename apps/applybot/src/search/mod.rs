//! Job discovery and ranking.

pub mod boards;
pub mod finder;
pub mod prompts;
pub mod ranker;

pub use finder::JobFinder;
pub use ranker::{rank_postings, OracleMatchScorer};
