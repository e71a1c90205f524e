//! Personalized recommendation engine.
//!
//! Turns a user's positive rating history into a ranked list of unseen
//! books. Genre affinity dominates the score; popularity and average rating
//! are secondary signals. Users without usable history get the global
//! popularity ranking instead.

use super::scoring;
use crate::catalog::{BookProfile, Catalog, EDGE_RATED};
use crate::error::{Error, Result};
use crate::graph::{EdgeType, NodeId};
use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tuning knobs for recommendation scoring.
///
/// The exact constants are policy, not contract, with one rule: the genre
/// weight must dominate the popularity weight, so a candidate sharing
/// genres with the user's liked set always outranks a merely popular one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Minimum score for a rating to count as "liked".
    pub like_threshold: i64,
    /// Weight of the genre-overlap signal.
    pub genre_weight: f64,
    /// Weight of the normalized-popularity signal.
    pub popularity_weight: f64,
    /// Weight of the normalized average-rating signal.
    pub rating_weight: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            like_threshold: 4,
            genre_weight: 0.6,
            popularity_weight: 0.3,
            rating_weight: 0.1,
        }
    }
}

/// One recommended book.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: NodeId,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub genres: Vec<String>,
    /// Incoming rating count.
    pub popularity: usize,
    pub average_rating: f64,
    /// Final score; absent on the popularity-fallback path.
    pub score: Option<f64>,
}

/// A ranked recommendation list.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub data: Vec<BookSummary>,
    pub generated_at: DateTime<Utc>,
}

/// Generate up to `limit` recommendations for a user.
///
/// The user record must resolve; an unknown id is a NotFound error. A known
/// user with no liked books (or whose liked books carry no genre data)
/// falls back to the global popularity ranking and never errors. Books the
/// user has already rated are excluded, whatever score they gave.
pub fn generate_recommendations(
    catalog: &Catalog,
    user_id: &str,
    limit: usize,
    config: &RecommendConfig,
) -> Result<Recommendations> {
    let user = catalog
        .user_node(user_id)
        .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

    let profiles = catalog.book_profiles();
    let by_id: FxHashMap<NodeId, &BookProfile> = profiles.iter().map(|p| (p.id, p)).collect();

    let rated_edges = catalog
        .store()
        .get_outgoing_edges_by_type(user, &EdgeType::new(EDGE_RATED));
    let rated: FxHashSet<NodeId> = rated_edges.iter().map(|e| e.target).collect();
    let liked: Vec<NodeId> = rated_edges
        .iter()
        .filter(|e| e.integer_property("score").unwrap_or(0) >= config.like_threshold)
        .map(|e| e.target)
        .collect();

    let weights = scoring::genre_weights(
        liked
            .iter()
            .filter_map(|id| by_id.get(id))
            .map(|p| &p.genres),
    );

    if weights.is_empty() {
        debug!(user_id, "no usable rating history, using popularity ranking");
        return Ok(respond(popularity_ranking(&profiles, limit)));
    }

    let max_popularity = profiles.iter().map(|p| p.rating_count).max().unwrap_or(0);

    let mut scored: Vec<BookSummary> = profiles
        .iter()
        .filter(|p| !rated.contains(&p.id))
        .filter_map(|profile| {
            let overlap = scoring::genre_overlap_score(&profile.genres, &weights);
            if overlap <= 0.0 {
                // No shared genre: not a recommendation, no matter how popular.
                return None;
            }
            let score = overlap * config.genre_weight
                + scoring::popularity_score(profile.rating_count, max_popularity)
                    * config.popularity_weight
                + (scoring::average_rating(&profile.scores) / 5.0) * config.rating_weight;
            Some(summarize(profile, Some(score)))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .unwrap_or(0.0)
            .total_cmp(&a.score.unwrap_or(0.0))
            .then_with(|| b.popularity.cmp(&a.popularity))
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.isbn.cmp(&b.isbn))
    });
    scored.truncate(limit);

    debug!(user_id, count = scored.len(), "generated recommendations");
    Ok(respond(scored))
}

/// Global popularity ranking: the cold-start answer.
fn popularity_ranking(profiles: &[BookProfile], limit: usize) -> Vec<BookSummary> {
    let mut ranked: Vec<&BookProfile> = profiles.iter().collect();
    ranked.sort_by(|a, b| {
        b.rating_count
            .cmp(&a.rating_count)
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.isbn.cmp(&b.isbn))
    });
    ranked
        .into_iter()
        .take(limit)
        .map(|p| summarize(p, None))
        .collect()
}

fn summarize(profile: &BookProfile, score: Option<f64>) -> BookSummary {
    BookSummary {
        id: profile.id,
        isbn: profile.isbn.clone(),
        title: profile.title.clone(),
        author: profile.author.clone(),
        genres: profile.genres.clone(),
        popularity: profile.rating_count,
        average_rating: scoring::average_rating(&profile.scores),
        score,
    }
}

fn respond(data: Vec<BookSummary>) -> Recommendations {
    Recommendations {
        data,
        generated_at: Utc::now(),
    }
}
