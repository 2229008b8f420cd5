//! Guide star candidate search.
//!
//! # Components
//!
//! - [`criterion`]: search criteria and the matchers bound to a base position
//! - [`candidates`]: per-group candidate sets and their aggregation
//! - [`planning`]: merging criteria into catalog queries
//! - [`options`]: criteria for a tiptilt mode
//! - [`local`]: the catalog query seam and an in-memory catalog

pub mod candidates;
pub mod criterion;
pub mod local;
pub mod options;
pub mod planning;

pub use candidates::{
    pair_tiptilt_flexure, CandidateAggregator, CandidateSet, SearchCriterion, SearchKey,
};
pub use criterion::{CatalogSearchCriterion, Matcher, RadiusLimits};
pub use local::{search_catalogs, CatalogQuery, LocalCatalog};
pub use options::{GroupSearchSpec, SearchOptions, TipTiltMode};
pub use planning::{merge_magnitude_limits, merge_radius_limits, plan_queries, CatalogQueryPlan};
