//! Asterism search algorithms.
//!
//! This module turns per-group candidate sets into a ranked list of guide
//! star asterisms.
//!
//! # Components
//!
//! - [`analyzer`]: Combination enumeration, evaluation and ranking
//! - [`assignment`]: Star to probe assignment and reachability tables
//! - [`combinations`]: Lexicographic k-subset enumeration
//! - [`estimator`]: Quality estimator contract
//! - [`memo`]: Per-selection estimate cache
//! - [`progress`]: Progress reporting and cancellation
//! - [`ranking`]: Final ordering and checksums
//! - [`reachability`]: Probe reachability oracles
//!
//! # Example
//!
//! ```ignore
//! use ags_rust::algorithms::{AlwaysReachable, AsterismAnalyzer};
//! use ags_rust::config::AnalyzerConfig;
//!
//! let analyzer = AsterismAnalyzer::new(AnalyzerConfig::default(), &AlwaysReachable, &estimator);
//! let outcome = analyzer.analyze(&context, &angles, &candidates);
//! println!("best: {:?}", outcome.best());
//! ```

pub mod analyzer;
pub mod assignment;
pub mod combinations;
pub mod estimator;
pub mod memo;
pub mod progress;
pub mod ranking;
pub mod reachability;

pub use analyzer::{AnalysisOutcome, AsterismAnalyzer};
pub use assignment::{assign_flexure, assign_tiptilt, ProbeAssignment, ProbeOrder, ReachTable};
pub use combinations::{binomial, IndexCombinations};
pub use estimator::{strehl_factor, ConditionScaledEstimator, QualityEstimator};
pub use memo::{MemoKey, QualityCache};
pub use progress::{NoProgress, ProgressEvent, ProgressSink};
pub use ranking::{rank, ranking_checksum};
pub use reachability::{AlwaysReachable, PatrolField, PatrolFieldOracle, ReachabilityOracle};
