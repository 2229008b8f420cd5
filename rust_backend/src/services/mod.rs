//! Service layer for guide star search orchestration.
//!
//! Services sit between the catalog collaborators and the analyzer: they
//! build criteria, fan out catalog queries and run the blocking analysis.

pub mod guide_star_search;

pub use guide_star_search::GuideStarSearch;
