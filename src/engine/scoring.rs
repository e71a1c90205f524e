//! Shared scoring primitives used by both engines.

use indexmap::IndexMap;

/// Genre name -> weight, ordered heaviest first (ties broken by name).
pub type GenreWeights = IndexMap<String, f64>;

/// Accumulate genre weights from the genre lists of liked books.
///
/// A genre's weight is the number of liked books carrying it. The result is
/// sorted by weight descending, then name, so iteration order is stable
/// regardless of input order.
pub fn genre_weights<'a>(genre_lists: impl IntoIterator<Item = &'a Vec<String>>) -> GenreWeights {
    let mut weights = GenreWeights::new();
    for genres in genre_lists {
        for genre in genres {
            *weights.entry(genre.clone()).or_insert(0.0) += 1.0;
        }
    }
    weights.sort_by(|g1, w1, g2, w2| w2.total_cmp(w1).then_with(|| g1.cmp(g2)));
    weights
}

/// Sum of reference weights for genres present in both sets.
pub fn genre_overlap_score(candidate_genres: &[String], reference: &GenreWeights) -> f64 {
    candidate_genres
        .iter()
        .filter_map(|genre| reference.get(genre))
        .copied()
        .sum()
}

/// Rating count normalized against the maximum observed count.
///
/// Monotonic in `rating_count` and bounded to [0, 1], so a configured
/// popularity weight caps how much raw popularity can contribute.
pub fn popularity_score(rating_count: usize, max_rating_count: usize) -> f64 {
    if max_rating_count == 0 {
        0.0
    } else {
        rating_count as f64 / max_rating_count as f64
    }
}

/// Arithmetic mean of 1-5 scores; 0.0 for an empty sequence.
pub fn average_rating(scores: &[i64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<i64>() as f64 / scores.len() as f64
    }
}
