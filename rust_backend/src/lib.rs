//! AGS Rust backend - guide star asterism selection.
//!
//! Given a base position, per-group search criteria and catalog candidates,
//! finds and ranks the guide star asterisms an adaptive optics system can use.
//!
//! # Modules
//!
//! - [`core`]: Angles, coordinates, magnitudes, guide probes and asterisms
//! - [`catalog`]: Search criteria, matchers, candidate aggregation and catalogs
//! - [`algorithms`]: The asterism analyzer and its collaborators
//! - [`io`]: Star catalog file loading
//! - [`services`]: Async end-to-end search
//! - [`config`]: TOML configuration

pub mod algorithms;
pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod services;

pub use algorithms::{AnalysisOutcome, AsterismAnalyzer, ProgressEvent, ProgressSink, QualityEstimator, ReachabilityOracle};
pub use catalog::{CandidateSet, CatalogQuery, CatalogSearchCriterion, LocalCatalog, Matcher, RadiusLimits, SearchCriterion};
pub use config::{AgsConfig, AnalyzerConfig};
pub use error::{AgsError, AgsResult, EstimatorError};
pub use services::GuideStarSearch;
