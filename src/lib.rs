//! BookMatch: a graph-based book recommendation engine.
//!
//! Users, books, and genres are nodes; ratings (RATED), genre membership
//! (BELONGS_TO), and book similarity (SIMILAR_TO) are directed, typed
//! edges. The crate turns a sparse rating graph into personalized per-user
//! recommendations and a precomputed book-similarity graph.
//!
//! # Architecture
//!
//! - [`graph`]: in-memory property-graph store with label and edge-type
//!   indexes; the typed query surface everything else is written against.
//! - [`catalog`]: entity lifecycle (users, books, normalized genres) and
//!   the rating upsert, keyed by natural keys (userId, isbn, genre name).
//! - [`engine`]: the recommendation engine (read-only, request-scoped) and
//!   the similarity engine (exclusive batch job that rewrites SIMILAR_TO),
//!   sharing the scoring primitives in [`engine::scoring`].
//!
//! # Example
//!
//! ```rust
//! use bookmatch::{Catalog, NewBook, NewUser, RecommendConfig, SimilarityConfig};
//!
//! let mut catalog = Catalog::new();
//! catalog.create_user(NewUser {
//!     user_id: "u1".into(),
//!     name: "Ana".into(),
//!     email: "ana@example.com".into(),
//! }).unwrap();
//!
//! catalog.create_book(NewBook {
//!     isbn: "978-0441013593".into(),
//!     title: "Dune".into(),
//!     author: "Frank Herbert".into(),
//!     description: None,
//!     page_count: 412,
//!     published_date: Some("1965-08-01".into()),
//!     genres: vec!["sci-fi".into()],
//! }).unwrap();
//! catalog.create_book(NewBook {
//!     isbn: "978-0553293357".into(),
//!     title: "Foundation".into(),
//!     author: "Isaac Asimov".into(),
//!     description: None,
//!     page_count: 255,
//!     published_date: None,
//!     genres: vec!["sci-fi".into()],
//! }).unwrap();
//!
//! catalog.rate_book("u1", "978-0441013593", 5, Some("a classic")).unwrap();
//!
//! let report =
//!     bookmatch::recompute_similarities(&mut catalog, &SimilarityConfig::default()).unwrap();
//! assert_eq!(report.processed, 2);
//!
//! let recs =
//!     bookmatch::generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default())
//!         .unwrap();
//! assert_eq!(recs.data[0].title, "Foundation");
//! ```

#![warn(clippy::all)]

pub mod catalog;
pub mod engine;
pub mod error;
pub mod graph;

pub use catalog::{
    BookFilter, BookProfile, BookRecord, BookUpdate, Catalog, NewBook, NewUser, RatingRecord,
    SimilarBook, UserRecord, UserUpdate,
};
pub use engine::{
    generate_recommendations, recompute_similarities, BookSummary, RecommendConfig,
    Recommendations, SimilarityConfig, SimilarityReport,
};
pub use error::{Error, Result};
pub use graph::{
    Edge, EdgeId, EdgeType, GraphError, GraphResult, GraphStore, Label, Node, NodeId, PropertyMap,
    PropertyValue,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
