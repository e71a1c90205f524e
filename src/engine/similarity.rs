//! Batch book-similarity engine.
//!
//! Rebuilds the SIMILAR_TO graph from scratch: every existing similarity
//! edge is deleted, then each book gets a directed fan-out to its top-K
//! most similar peers. Scoring is a full O(N²) pairwise scan, run off the
//! request path; per-book pairs are independent, so the scan is
//! parallelized while edge writes stay sequential and deterministic.

use crate::catalog::{BookProfile, Catalog};
use crate::error::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Provenance tag stamped on every generated SIMILAR_TO edge.
pub const SIMILARITY_REASON: &str = "auto_generated";

/// Tuning knobs for pairwise similarity scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Flat bonus when both books share an author.
    pub author_bonus: f64,
    /// Points per shared genre.
    pub genre_weight: f64,
    /// Flat bonus when the books' rating counts are close.
    pub popularity_bonus: f64,
    /// Maximum rating-count distance that still earns the popularity bonus.
    pub popularity_window: i64,
    /// Fan-out per book.
    pub top_k: usize,
    /// Candidates must score strictly above this to produce an edge.
    pub min_score: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            author_bonus: 3.0,
            genre_weight: 2.0,
            popularity_bonus: 1.0,
            popularity_window: 10,
            top_k: 5,
            min_score: 2.0,
        }
    }
}

/// One book whose similarity edges could not be written.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityFailure {
    pub isbn: String,
    pub error: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityReport {
    /// Number of books scanned.
    pub processed: usize,
    /// Number of SIMILAR_TO edges written.
    pub edges_created: usize,
    /// Books whose edge writes failed; the run continues past them.
    pub failures: Vec<SimilarityFailure>,
}

/// Recompute the whole similarity graph.
///
/// Must not run concurrently with itself: the SIMILAR_TO edge set is wiped
/// before repopulation, and readers in between observe an empty (not
/// corrupt) similarity graph. Identical catalog state yields an identical
/// edge set run-to-run; ties between equally scored candidates are broken
/// by isbn.
pub fn recompute_similarities(
    catalog: &mut Catalog,
    config: &SimilarityConfig,
) -> Result<SimilarityReport> {
    let removed = catalog.clear_similarities();
    let profiles = catalog.book_profiles();
    info!(
        books = profiles.len(),
        removed_edges = removed,
        "recomputing book similarity graph"
    );

    // Pure scoring over the snapshot; no store access inside the scan.
    let planned: Vec<(usize, Vec<(usize, f64)>)> = profiles
        .par_iter()
        .enumerate()
        .map(|(i, book)| {
            let mut candidates: Vec<(usize, f64)> = profiles
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(j, other)| (j, similarity_score(book, other, config)))
                .collect();
            candidates.sort_by(|a, b| {
                b.1.total_cmp(&a.1)
                    .then_with(|| profiles[a.0].isbn.cmp(&profiles[b.0].isbn))
            });
            candidates.truncate(config.top_k);
            candidates.retain(|&(_, score)| score > config.min_score);
            (i, candidates)
        })
        .collect();

    let mut edges_created = 0;
    let mut failures = Vec::new();
    for (i, candidates) in planned {
        let from = &profiles[i];
        for (j, weight) in candidates {
            match catalog.add_similarity(from.id, profiles[j].id, weight, SIMILARITY_REASON) {
                Ok(_) => edges_created += 1,
                Err(err) => {
                    warn!(isbn = %from.isbn, error = %err, "failed to write similarity edge");
                    failures.push(SimilarityFailure {
                        isbn: from.isbn.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
    }

    info!(
        processed = profiles.len(),
        edges_created,
        failed = failures.len(),
        "similarity graph rebuilt"
    );
    Ok(SimilarityReport {
        processed: profiles.len(),
        edges_created,
        failures,
    })
}

/// Pairwise similarity: same-author bonus, points per shared genre, and a
/// flat bonus for comparable popularity.
fn similarity_score(book: &BookProfile, other: &BookProfile, config: &SimilarityConfig) -> f64 {
    let mut score = 0.0;
    if !book.author.is_empty() && book.author == other.author {
        score += config.author_bonus;
    }
    score += config.genre_weight * shared_genre_count(&book.genres, &other.genres) as f64;
    let distance = (book.rating_count as i64 - other.rating_count as i64).abs();
    if distance < config.popularity_window {
        score += config.popularity_bonus;
    }
    score
}

/// Count common entries of two sorted genre lists.
fn shared_genre_count(a: &[String], b: &[String]) -> usize {
    let mut shared = 0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    fn profile(isbn: &str, author: &str, genres: &[&str], rating_count: usize) -> BookProfile {
        BookProfile {
            id: NodeId::new(1),
            isbn: isbn.to_string(),
            title: isbn.to_string(),
            author: author.to_string(),
            genres: {
                let mut g: Vec<String> = genres.iter().map(|s| s.to_string()).collect();
                g.sort();
                g
            },
            rating_count,
            scores: Vec::new(),
        }
    }

    #[test]
    fn test_shared_genre_count() {
        let a = profile("a", "x", &["drama", "sci-fi"], 0);
        let b = profile("b", "y", &["sci-fi"], 0);
        let c = profile("c", "z", &["romance"], 0);

        assert_eq!(shared_genre_count(&a.genres, &b.genres), 1);
        assert_eq!(shared_genre_count(&a.genres, &a.genres), 2);
        assert_eq!(shared_genre_count(&a.genres, &c.genres), 0);
    }

    #[test]
    fn test_similarity_score_components() {
        let config = SimilarityConfig::default();
        let base = profile("a", "Frank Herbert", &["sci-fi", "classic"], 20);

        // Same author + 1 shared genre + close popularity: 3 + 2 + 1.
        let close = profile("b", "Frank Herbert", &["sci-fi"], 25);
        assert_eq!(similarity_score(&base, &close, &config), 6.0);

        // Shared genres only, popularity far apart: 2 * 2.
        let far = profile("c", "Other", &["sci-fi", "classic"], 100);
        assert_eq!(similarity_score(&base, &far, &config), 4.0);

        // Nothing in common but comparable popularity: 1.
        let unrelated = profile("d", "Other", &["romance"], 15);
        assert_eq!(similarity_score(&base, &unrelated, &config), 1.0);
    }

    #[test]
    fn test_empty_author_earns_no_author_bonus() {
        let config = SimilarityConfig::default();
        let a = profile("a", "", &[], 0);
        let b = profile("b", "", &[], 0);
        // Only the popularity-proximity bonus applies.
        assert_eq!(similarity_score(&a, &b, &config), 1.0);
    }
}
