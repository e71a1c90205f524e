//! Recommendation and similarity engines.
//!
//! Both engines read the catalog through book snapshots and share the
//! scoring primitives in [`scoring`]. The recommendation engine is a
//! read-only, request-scoped operation; the similarity engine is an
//! exclusive batch job that rewrites the SIMILAR_TO edge set.

pub mod recommend;
pub mod scoring;
pub mod similarity;

pub use recommend::{generate_recommendations, BookSummary, RecommendConfig, Recommendations};
pub use scoring::{
    average_rating, genre_overlap_score, genre_weights, popularity_score, GenreWeights,
};
pub use similarity::{
    recompute_similarities, SimilarityConfig, SimilarityFailure, SimilarityReport,
    SIMILARITY_REASON,
};
