//! Star catalog file loading.
//!
//! Reads user-supplied star lists into [`SkyObject`](crate::core::SkyObject)s
//! that can back a [`LocalCatalog`](crate::catalog::LocalCatalog).
//!
//! # Example
//!
//! ```no_run
//! use ags_rust::io::loaders::CatalogLoader;
//! use std::path::Path;
//!
//! let result = CatalogLoader::load_from_file(Path::new("stars.json"))
//!     .expect("Failed to load");
//! println!("Loaded {} stars", result.stars.len());
//! ```

pub mod loaders;

pub use loaders::{CatalogLoadResult, CatalogLoader};
