//! Input and output record types for the catalog.

use crate::error::{Error, Result};
use crate::graph::NodeId;
use serde::{Deserialize, Serialize};

/// Input for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation("userId is required".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(Error::Validation("email is required".to_string()));
        }
        Ok(())
    }
}

/// Partial update for a user; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Input for creating a book.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub page_count: i64,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl NewBook {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.isbn.trim().is_empty() {
            return Err(Error::Validation("isbn is required".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        if self.author.trim().is_empty() {
            return Err(Error::Validation("author is required".to_string()));
        }
        if self.page_count < 0 {
            return Err(Error::Validation("pageCount must not be negative".to_string()));
        }
        Ok(())
    }
}

/// Partial update for a book; `None` fields are left untouched.
/// Setting `genres` replaces the book's genre memberships wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub page_count: Option<i64>,
    pub published_date: Option<String>,
    pub genres: Option<Vec<String>>,
}

/// Filters for listing books.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
    /// Exact genre name the book must belong to.
    pub genre: Option<String>,
    /// Case-insensitive substring of the author name.
    pub author: Option<String>,
    pub limit: Option<usize>,
}

/// A user as returned by catalog reads.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: NodeId,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub total_ratings: usize,
    pub created_at: i64,
}

/// A book as returned by catalog reads.
#[derive(Debug, Clone, Serialize)]
pub struct BookRecord {
    pub id: NodeId,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub page_count: i64,
    pub published_date: Option<String>,
    pub genres: Vec<String>,
    pub rating_count: usize,
    pub average_rating: f64,
}

/// One RATED edge, joined with its endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RatingRecord {
    pub user_id: String,
    pub isbn: String,
    pub title: String,
    pub score: i64,
    pub review: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One outgoing SIMILAR_TO edge, joined with the target book.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub weight: f64,
    pub reason: Option<String>,
}

/// Read-only snapshot of one book used by the engines.
///
/// `genres` is sorted; `scores` holds the raw 1-5 scores of all incoming
/// ratings in edge-creation order.
#[derive(Debug, Clone)]
pub struct BookProfile {
    pub id: NodeId,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub genres: Vec<String>,
    pub rating_count: usize,
    pub scores: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_validation() {
        let ok = NewUser {
            user_id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let missing = NewUser {
            user_id: "  ".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
        };
        assert!(matches!(missing.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_new_book_validation() {
        let mut book = NewBook {
            isbn: "978-0441013593".to_string(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            description: None,
            page_count: 412,
            published_date: None,
            genres: vec!["sci-fi".to_string()],
        };
        assert!(book.validate().is_ok());

        book.title = String::new();
        assert!(matches!(book.validate(), Err(Error::Validation(_))));
    }
}
