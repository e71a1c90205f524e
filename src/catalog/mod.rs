//! Domain layer over the graph store.
//!
//! The catalog owns the [`GraphStore`] together with natural-key indexes
//! (userId, isbn, genre name) and exposes the entity lifecycle: users, books,
//! normalized genres, and the rating upsert. All mutation goes through
//! `&mut self`, so check-then-act sequences like re-rating a book are
//! serialized by construction.

pub mod records;

use crate::engine::scoring;
use crate::error::{Error, Result};
use crate::graph::{Edge, EdgeId, EdgeType, GraphStore, NodeId, PropertyMap};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

pub use records::{
    BookFilter, BookProfile, BookRecord, BookUpdate, NewBook, NewUser, RatingRecord, SimilarBook,
    UserRecord, UserUpdate,
};

/// Node labels.
pub const LABEL_USER: &str = "User";
pub const LABEL_BOOK: &str = "Book";
pub const LABEL_GENRE: &str = "Genre";

/// Relationship types.
pub const EDGE_RATED: &str = "RATED";
pub const EDGE_SIMILAR_TO: &str = "SIMILAR_TO";
pub const EDGE_BELONGS_TO: &str = "BELONGS_TO";

/// Book catalog: users, books, genres, and ratings over a property graph.
#[derive(Debug, Default)]
pub struct Catalog {
    store: GraphStore,
    users: FxHashMap<String, NodeId>,
    books: FxHashMap<String, NodeId>,
    genres: FxHashMap<String, NodeId>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the underlying graph, for traversal-level queries.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    // ------------------------------------------------------------
    // Users
    // ------------------------------------------------------------

    /// Create a user. The userId is a natural key; reusing one is a conflict.
    pub fn create_user(&mut self, input: NewUser) -> Result<UserRecord> {
        input.validate()?;
        if self.users.contains_key(&input.user_id) {
            return Err(Error::Conflict(format!(
                "userId {} already exists",
                input.user_id
            )));
        }

        let mut props = PropertyMap::new();
        props.insert("userId".to_string(), input.user_id.clone().into());
        props.insert("name".to_string(), input.name.into());
        props.insert("email".to_string(), input.email.into());

        let id = self.store.create_node_with_properties(LABEL_USER, props);
        self.users.insert(input.user_id.clone(), id);
        debug!(user_id = %input.user_id, node = %id, "created user");

        self.user_record(id)
            .ok_or(Error::UserNotFound(input.user_id))
    }

    /// Fetch a user by userId.
    pub fn get_user(&self, user_id: &str) -> Result<UserRecord> {
        let id = self
            .user_node(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        self.user_record(id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    /// List all users ordered by name.
    pub fn list_users(&self) -> Vec<UserRecord> {
        let mut out: Vec<UserRecord> = self
            .users
            .values()
            .filter_map(|&id| self.user_record(id))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.user_id.cmp(&b.user_id)));
        out
    }

    /// Update a user's mutable fields.
    pub fn update_user(&mut self, user_id: &str, update: UserUpdate) -> Result<UserRecord> {
        let id = self
            .user_node(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

        if let Some(name) = update.name {
            self.store.set_node_property(id, "name", name)?;
        }
        if let Some(email) = update.email {
            self.store.set_node_property(id, "email", email)?;
        }

        self.user_record(id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    /// Delete a user and cascade their RATED edges.
    pub fn delete_user(&mut self, user_id: &str) -> Result<()> {
        let id = self
            .user_node(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        self.store.delete_node(id)?;
        self.users.remove(user_id);
        Ok(())
    }

    // ------------------------------------------------------------
    // Books and genres
    // ------------------------------------------------------------

    /// Create a book. Genres are looked up or created by name and linked via
    /// BELONGS_TO edges; the isbn is a natural key.
    pub fn create_book(&mut self, input: NewBook) -> Result<BookRecord> {
        input.validate()?;
        if self.books.contains_key(&input.isbn) {
            return Err(Error::Conflict(format!("isbn {} already exists", input.isbn)));
        }

        let mut props = PropertyMap::new();
        props.insert("isbn".to_string(), input.isbn.clone().into());
        props.insert("title".to_string(), input.title.into());
        props.insert("author".to_string(), input.author.into());
        props.insert(
            "description".to_string(),
            input.description.unwrap_or_default().into(),
        );
        props.insert("pageCount".to_string(), input.page_count.into());
        props.insert("publishedDate".to_string(), input.published_date.into());

        let id = self.store.create_node_with_properties(LABEL_BOOK, props);
        self.books.insert(input.isbn.clone(), id);
        self.link_genres(id, &input.genres)?;
        debug!(isbn = %input.isbn, node = %id, "created book");

        self.book_record(id).ok_or(Error::BookNotFound(input.isbn))
    }

    /// Fetch a book by isbn.
    pub fn get_book(&self, isbn: &str) -> Result<BookRecord> {
        let id = self
            .book_node(isbn)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))?;
        self.book_record(id)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))
    }

    /// List books ordered by title, optionally filtered by genre and author.
    pub fn list_books(&self, filter: &BookFilter) -> Vec<BookRecord> {
        let author_needle = filter.author.as_deref().map(str::to_lowercase);
        let mut out: Vec<BookRecord> = self
            .books
            .values()
            .filter_map(|&id| self.book_record(id))
            .filter(|record| {
                if let Some(genre) = &filter.genre {
                    if !record.genres.iter().any(|g| g == genre) {
                        return false;
                    }
                }
                if let Some(needle) = &author_needle {
                    if !record.author.to_lowercase().contains(needle) {
                        return false;
                    }
                }
                true
            })
            .collect();
        out.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.isbn.cmp(&b.isbn)));
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        out
    }

    /// Update a book's mutable fields. A `genres` value replaces the book's
    /// genre memberships wholesale.
    pub fn update_book(&mut self, isbn: &str, update: BookUpdate) -> Result<BookRecord> {
        let id = self
            .book_node(isbn)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))?;

        if let Some(title) = update.title {
            self.store.set_node_property(id, "title", title)?;
        }
        if let Some(author) = update.author {
            self.store.set_node_property(id, "author", author)?;
        }
        if let Some(description) = update.description {
            self.store.set_node_property(id, "description", description)?;
        }
        if let Some(page_count) = update.page_count {
            self.store.set_node_property(id, "pageCount", page_count)?;
        }
        if let Some(published_date) = update.published_date {
            self.store.set_node_property(id, "publishedDate", published_date)?;
        }
        if let Some(genres) = update.genres {
            let stale: Vec<EdgeId> = self
                .store
                .get_outgoing_edges_by_type(id, &EdgeType::new(EDGE_BELONGS_TO))
                .iter()
                .map(|e| e.id)
                .collect();
            for edge_id in stale {
                self.store.delete_edge(edge_id)?;
            }
            self.link_genres(id, &genres)?;
        }

        self.book_record(id)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))
    }

    /// Delete a book and cascade its RATED and SIMILAR_TO edges.
    pub fn delete_book(&mut self, isbn: &str) -> Result<()> {
        let id = self
            .book_node(isbn)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))?;
        self.store.delete_node(id)?;
        self.books.remove(isbn);
        Ok(())
    }

    /// Books belonging to a genre, ordered by title.
    pub fn books_in_genre(&self, genre: &str) -> Result<Vec<BookRecord>> {
        let genre_id = self
            .genres
            .get(genre)
            .copied()
            .ok_or_else(|| Error::GenreNotFound(genre.to_string()))?;

        let mut out: Vec<BookRecord> = self
            .store
            .get_incoming_edges_by_type(genre_id, &EdgeType::new(EDGE_BELONGS_TO))
            .iter()
            .filter_map(|e| self.book_record(e.source))
            .collect();
        out.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.isbn.cmp(&b.isbn)));
        Ok(out)
    }

    /// The most-rated books, descending; ties broken by title.
    pub fn most_popular(&self, limit: usize) -> Vec<BookRecord> {
        let mut out: Vec<BookRecord> = self
            .books
            .values()
            .filter_map(|&id| self.book_record(id))
            .collect();
        out.sort_by(|a, b| {
            b.rating_count
                .cmp(&a.rating_count)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.isbn.cmp(&b.isbn))
        });
        out.truncate(limit);
        out
    }

    // ------------------------------------------------------------
    // Ratings
    // ------------------------------------------------------------

    /// Create or update the rating of a book by a user.
    ///
    /// The score is validated before any mutation. At most one RATED edge
    /// exists per (user, book): re-rating updates score, review, and the
    /// update timestamp on the existing edge.
    pub fn rate_book(
        &mut self,
        user_id: &str,
        isbn: &str,
        score: i64,
        review: Option<&str>,
    ) -> Result<RatingRecord> {
        if !(1..=5).contains(&score) {
            return Err(Error::Validation(format!(
                "score must be between 1 and 5, got {score}"
            )));
        }
        let user = self
            .user_node(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        let book = self
            .book_node(isbn)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))?;

        let mut props = PropertyMap::new();
        props.insert("score".to_string(), score.into());
        props.insert("review".to_string(), review.into());

        let edge_id = self.store.upsert_edge(user, book, EDGE_RATED, props)?;
        debug!(user_id, isbn, score, "rated book");

        let edge = self
            .store
            .get_edge(edge_id)
            .ok_or(crate::graph::GraphError::EdgeNotFound(edge_id))?;
        self.rating_record(edge)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))
    }

    /// Remove a user's rating of a book. Returns whether a rating existed;
    /// unrating an unrated book is a no-op, not an error.
    pub fn delete_rating(&mut self, user_id: &str, isbn: &str) -> Result<bool> {
        let user = self
            .user_node(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;
        let book = self
            .book_node(isbn)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))?;

        match self
            .store
            .find_edge(user, book, &EdgeType::new(EDGE_RATED))
            .map(|e| e.id)
        {
            Some(edge_id) => {
                self.store.delete_edge(edge_id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// All ratings by a user, most recent first.
    pub fn user_ratings(&self, user_id: &str) -> Result<Vec<RatingRecord>> {
        let user = self
            .user_node(user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))?;

        let mut out: Vec<RatingRecord> = self
            .store
            .get_outgoing_edges_by_type(user, &EdgeType::new(EDGE_RATED))
            .iter()
            .filter_map(|e| self.rating_record(e))
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.isbn.cmp(&b.isbn)));
        Ok(out)
    }

    /// Ratings with score >= 4, best first.
    pub fn user_favorites(&self, user_id: &str) -> Result<Vec<RatingRecord>> {
        let mut out = self.user_ratings(user_id)?;
        out.retain(|r| r.score >= 4);
        out.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.isbn.cmp(&b.isbn))
        });
        Ok(out)
    }

    // ------------------------------------------------------------
    // Similarity graph access
    // ------------------------------------------------------------

    /// Books similar to the given one, strongest first, following outgoing
    /// SIMILAR_TO edges only. An empty result is normal: the similarity
    /// graph is derived and may be mid-recompute.
    pub fn similar_books(&self, isbn: &str, limit: usize) -> Result<Vec<SimilarBook>> {
        let id = self
            .book_node(isbn)
            .ok_or_else(|| Error::BookNotFound(isbn.to_string()))?;

        let mut out: Vec<SimilarBook> = self
            .store
            .get_outgoing_edges_by_type(id, &EdgeType::new(EDGE_SIMILAR_TO))
            .iter()
            .filter_map(|e| {
                let book = self.store.get_node(e.target)?;
                Some(SimilarBook {
                    isbn: book.string_property("isbn")?.to_string(),
                    title: book.string_property("title").unwrap_or_default().to_string(),
                    author: book.string_property("author").unwrap_or_default().to_string(),
                    weight: e.float_property("weight").unwrap_or(0.0),
                    reason: e.string_property("reason").map(str::to_string),
                })
            })
            .collect();
        out.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.isbn.cmp(&b.isbn)));
        out.truncate(limit);
        Ok(out)
    }

    /// Drop every SIMILAR_TO edge, returning how many were removed.
    pub fn clear_similarities(&mut self) -> usize {
        self.store
            .delete_edges_by_type(&EdgeType::new(EDGE_SIMILAR_TO))
    }

    /// Write one directed SIMILAR_TO edge with its weight and provenance.
    pub fn add_similarity(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: f64,
        reason: &str,
    ) -> Result<EdgeId> {
        let mut props = PropertyMap::new();
        props.insert("weight".to_string(), weight.into());
        props.insert("reason".to_string(), reason.into());
        Ok(self
            .store
            .create_edge_with_properties(from, to, EDGE_SIMILAR_TO, props)?)
    }

    // ------------------------------------------------------------
    // Engine-facing snapshots
    // ------------------------------------------------------------

    /// Snapshot every book for engine consumption, ordered by isbn.
    pub fn book_profiles(&self) -> Vec<BookProfile> {
        let mut entries: Vec<(&String, NodeId)> =
            self.books.iter().map(|(isbn, &id)| (isbn, id)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        entries
            .into_iter()
            .filter_map(|(isbn, id)| {
                let node = self.store.get_node(id)?;
                Some(BookProfile {
                    id,
                    isbn: isbn.clone(),
                    title: node.string_property("title").unwrap_or_default().to_string(),
                    author: node.string_property("author").unwrap_or_default().to_string(),
                    genres: self.book_genres(id),
                    rating_count: self.rating_count(id),
                    scores: self.rating_scores(id),
                })
            })
            .collect()
    }

    /// Resolve a user's node by natural key.
    pub fn user_node(&self, user_id: &str) -> Option<NodeId> {
        self.users.get(user_id).copied()
    }

    /// Resolve a book's node by natural key.
    pub fn book_node(&self, isbn: &str) -> Option<NodeId> {
        self.books.get(isbn).copied()
    }

    /// Sorted genre names of a book.
    pub fn book_genres(&self, id: NodeId) -> Vec<String> {
        let mut genres: Vec<String> = self
            .store
            .get_outgoing_edges_by_type(id, &EdgeType::new(EDGE_BELONGS_TO))
            .iter()
            .filter_map(|e| self.store.get_node(e.target))
            .filter_map(|g| g.string_property("name").map(str::to_string))
            .collect();
        genres.sort();
        genres
    }

    /// Number of incoming RATED edges on a book.
    pub fn rating_count(&self, id: NodeId) -> usize {
        self.store
            .get_incoming_edges_by_type(id, &EdgeType::new(EDGE_RATED))
            .len()
    }

    fn rating_scores(&self, id: NodeId) -> Vec<i64> {
        self.store
            .get_incoming_edges_by_type(id, &EdgeType::new(EDGE_RATED))
            .iter()
            .filter_map(|e| e.integer_property("score"))
            .collect()
    }

    // ------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------

    /// Link a book to genres by name, creating genre nodes on first use.
    fn link_genres(&mut self, book: NodeId, genres: &[String]) -> Result<()> {
        let mut seen = FxHashSet::default();
        for name in genres {
            let name = name.trim();
            if name.is_empty() || !seen.insert(name.to_string()) {
                continue;
            }
            let genre = self.ensure_genre(name);
            self.store.create_edge(book, genre, EDGE_BELONGS_TO)?;
        }
        Ok(())
    }

    fn ensure_genre(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.genres.get(name) {
            return id;
        }
        let mut props = PropertyMap::new();
        props.insert("name".to_string(), name.into());
        let id = self.store.create_node_with_properties(LABEL_GENRE, props);
        self.genres.insert(name.to_string(), id);
        id
    }

    fn user_record(&self, id: NodeId) -> Option<UserRecord> {
        let node = self.store.get_node(id)?;
        Some(UserRecord {
            id,
            user_id: node.string_property("userId")?.to_string(),
            name: node.string_property("name").unwrap_or_default().to_string(),
            email: node.string_property("email").unwrap_or_default().to_string(),
            total_ratings: self
                .store
                .get_outgoing_edges_by_type(id, &EdgeType::new(EDGE_RATED))
                .len(),
            created_at: node.created_at,
        })
    }

    fn book_record(&self, id: NodeId) -> Option<BookRecord> {
        let node = self.store.get_node(id)?;
        let scores = self.rating_scores(id);
        Some(BookRecord {
            id,
            isbn: node.string_property("isbn")?.to_string(),
            title: node.string_property("title").unwrap_or_default().to_string(),
            author: node.string_property("author").unwrap_or_default().to_string(),
            description: node
                .string_property("description")
                .unwrap_or_default()
                .to_string(),
            page_count: node.integer_property("pageCount").unwrap_or(0),
            published_date: node.string_property("publishedDate").map(str::to_string),
            genres: self.book_genres(id),
            rating_count: self.rating_count(id),
            average_rating: scoring::average_rating(&scores),
        })
    }

    fn rating_record(&self, edge: &Edge) -> Option<RatingRecord> {
        let user = self.store.get_node(edge.source)?;
        let book = self.store.get_node(edge.target)?;
        Some(RatingRecord {
            user_id: user.string_property("userId")?.to_string(),
            isbn: book.string_property("isbn")?.to_string(),
            title: book.string_property("title").unwrap_or_default().to_string(),
            score: edge.integer_property("score").unwrap_or(0),
            review: edge
                .get_property("review")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            created_at: edge.created_at,
            updated_at: edge.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .create_user(NewUser {
                user_id: "u1".to_string(),
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
            })
            .unwrap();
        catalog
            .create_book(NewBook {
                isbn: "b1".to_string(),
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                description: None,
                page_count: 412,
                published_date: Some("1965-08-01".to_string()),
                genres: vec!["sci-fi".to_string(), "classic".to_string()],
            })
            .unwrap();
        catalog
    }

    #[test]
    fn test_duplicate_isbn_is_conflict() {
        let mut catalog = seeded();
        let err = catalog
            .create_book(NewBook {
                isbn: "b1".to_string(),
                title: "Other".to_string(),
                author: "Someone".to_string(),
                description: None,
                page_count: 0,
                published_date: None,
                genres: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_genres_are_normalized_nodes() {
        let mut catalog = seeded();
        catalog
            .create_book(NewBook {
                isbn: "b2".to_string(),
                title: "Foundation".to_string(),
                author: "Isaac Asimov".to_string(),
                description: None,
                page_count: 255,
                published_date: None,
                genres: vec!["sci-fi".to_string()],
            })
            .unwrap();

        // Both books point at the same Genre node.
        assert_eq!(catalog.genres.len(), 2);
        let books = catalog.books_in_genre("sci-fi").unwrap();
        assert_eq!(books.len(), 2);
        assert!(matches!(
            catalog.books_in_genre("horror"),
            Err(Error::GenreNotFound(_))
        ));
    }

    #[test]
    fn test_rate_requires_valid_score() {
        let mut catalog = seeded();
        assert!(matches!(
            catalog.rate_book("u1", "b1", 0, None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            catalog.rate_book("u1", "b1", 6, None),
            Err(Error::Validation(_))
        ));
        // Nothing was written.
        assert_eq!(catalog.rating_count(catalog.book_node("b1").unwrap()), 0);
    }

    #[test]
    fn test_rate_unknown_endpoints() {
        let mut catalog = seeded();
        assert!(matches!(
            catalog.rate_book("ghost", "b1", 4, None),
            Err(Error::UserNotFound(_))
        ));
        assert!(matches!(
            catalog.rate_book("u1", "ghost", 4, None),
            Err(Error::BookNotFound(_))
        ));
    }

    #[test]
    fn test_delete_rating_is_tolerant() {
        let mut catalog = seeded();
        assert!(!catalog.delete_rating("u1", "b1").unwrap());

        catalog.rate_book("u1", "b1", 5, None).unwrap();
        assert!(catalog.delete_rating("u1", "b1").unwrap());
        assert!(!catalog.delete_rating("u1", "b1").unwrap());
    }

    #[test]
    fn test_delete_user_cascades_ratings() {
        let mut catalog = seeded();
        catalog.rate_book("u1", "b1", 5, None).unwrap();
        let book = catalog.book_node("b1").unwrap();
        assert_eq!(catalog.rating_count(book), 1);

        catalog.delete_user("u1").unwrap();
        assert_eq!(catalog.rating_count(book), 0);
        assert!(matches!(catalog.get_user("u1"), Err(Error::UserNotFound(_))));
    }

    #[test]
    fn test_update_book_replaces_genres() {
        let mut catalog = seeded();
        catalog
            .update_book(
                "b1",
                BookUpdate {
                    genres: Some(vec!["drama".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();

        let record = catalog.get_book("b1").unwrap();
        assert_eq!(record.genres, vec!["drama".to_string()]);
    }

    #[test]
    fn test_list_books_filters() {
        let mut catalog = seeded();
        catalog
            .create_book(NewBook {
                isbn: "b2".to_string(),
                title: "Foundation".to_string(),
                author: "Isaac Asimov".to_string(),
                description: None,
                page_count: 255,
                published_date: None,
                genres: vec!["sci-fi".to_string()],
            })
            .unwrap();

        let by_genre = catalog.list_books(&BookFilter {
            genre: Some("classic".to_string()),
            ..Default::default()
        });
        assert_eq!(by_genre.len(), 1);
        assert_eq!(by_genre[0].isbn, "b1");

        let by_author = catalog.list_books(&BookFilter {
            author: Some("asimov".to_string()),
            ..Default::default()
        });
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].isbn, "b2");
    }
}
