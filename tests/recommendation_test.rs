use bookmatch::{
    generate_recommendations, Catalog, Error, NewBook, NewUser, RecommendConfig,
};

fn user(catalog: &mut Catalog, id: &str) {
    catalog
        .create_user(NewUser {
            user_id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@example.com"),
        })
        .unwrap();
}

fn book(catalog: &mut Catalog, isbn: &str, title: &str, author: &str, genres: &[&str]) {
    catalog
        .create_book(NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            description: None,
            page_count: 0,
            published_date: None,
            genres: genres.iter().map(|s| s.to_string()).collect(),
        })
        .unwrap();
}

/// Give a book `count` ratings from freshly created filler users.
fn add_raters(catalog: &mut Catalog, isbn: &str, count: usize, prefix: &str) {
    for i in 0..count {
        let id = format!("{prefix}-{i}");
        user(catalog, &id);
        catalog.rate_book(&id, isbn, 4, None).unwrap();
    }
}

#[test]
fn test_cold_start_returns_top_popular_books() {
    let mut catalog = Catalog::new();
    user(&mut catalog, "newcomer");

    book(&mut catalog, "a", "Alpha", "X", &["sci-fi"]);
    book(&mut catalog, "b", "Beta", "Y", &["drama"]);
    book(&mut catalog, "c", "Gamma", "Z", &["romance"]);
    add_raters(&mut catalog, "a", 2, "ra");
    add_raters(&mut catalog, "b", 5, "rb");
    add_raters(&mut catalog, "c", 3, "rc");

    let recs =
        generate_recommendations(&catalog, "newcomer", 2, &RecommendConfig::default()).unwrap();

    let titles: Vec<&str> = recs.data.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Beta", "Gamma"]);
    assert!(recs.data.iter().all(|b| b.score.is_none()));
}

#[test]
fn test_cold_start_never_errors_with_empty_graph() {
    let mut catalog = Catalog::new();
    user(&mut catalog, "newcomer");

    let recs =
        generate_recommendations(&catalog, "newcomer", 10, &RecommendConfig::default()).unwrap();
    assert!(recs.data.is_empty());
}

#[test]
fn test_unknown_user_is_a_distinct_not_found() {
    let mut catalog = Catalog::new();
    book(&mut catalog, "a", "Alpha", "X", &["sci-fi"]);

    let err =
        generate_recommendations(&catalog, "nobody", 10, &RecommendConfig::default()).unwrap_err();
    assert!(matches!(err, Error::UserNotFound(_)));
}

#[test]
fn test_already_rated_books_are_excluded_at_any_score() {
    let mut catalog = Catalog::new();
    user(&mut catalog, "u1");
    book(&mut catalog, "liked", "Liked", "X", &["sci-fi"]);
    book(&mut catalog, "hated", "Hated", "Y", &["sci-fi"]);
    book(&mut catalog, "fresh", "Fresh", "Z", &["sci-fi"]);

    catalog.rate_book("u1", "liked", 5, None).unwrap();
    catalog.rate_book("u1", "hated", 1, None).unwrap();

    let recs = generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default()).unwrap();
    let isbns: Vec<&str> = recs.data.iter().map(|b| b.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["fresh"]);
}

#[test]
fn test_genre_overlap_dominates_at_equal_popularity() {
    let mut catalog = Catalog::new();
    user(&mut catalog, "u1");
    book(&mut catalog, "l1", "Liked One", "X", &["sci-fi", "drama"]);
    book(&mut catalog, "both", "Both Genres", "Y", &["sci-fi", "drama"]);
    book(&mut catalog, "one", "One Genre", "Z", &["sci-fi"]);

    catalog.rate_book("u1", "l1", 5, None).unwrap();
    // Equal popularity for both candidates.
    add_raters(&mut catalog, "both", 3, "rb");
    add_raters(&mut catalog, "one", 3, "ro");

    let recs = generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default()).unwrap();
    let isbns: Vec<&str> = recs.data.iter().map(|b| b.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["both", "one"]);
    assert!(recs.data[0].score.unwrap() > recs.data[1].score.unwrap());
}

#[test]
fn test_weighting_example_ranks_matches_above_popularity() {
    // Books: A(sci-fi+drama, 10 ratings), B(sci-fi, 50), C(drama, 5),
    // D(romance, 40). The user liked only A, so B and C must both beat the
    // more popular zero-overlap D (which is discarded), and B >= C.
    let mut catalog = Catalog::new();
    user(&mut catalog, "u1");
    book(&mut catalog, "a", "A", "WA", &["sci-fi", "drama"]);
    book(&mut catalog, "b", "B", "WB", &["sci-fi"]);
    book(&mut catalog, "c", "C", "WC", &["drama"]);
    book(&mut catalog, "d", "D", "WD", &["romance"]);

    add_raters(&mut catalog, "a", 9, "ra");
    add_raters(&mut catalog, "b", 50, "rb");
    add_raters(&mut catalog, "c", 5, "rc");
    add_raters(&mut catalog, "d", 40, "rd");
    catalog.rate_book("u1", "a", 5, None).unwrap();

    let recs = generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default()).unwrap();
    let isbns: Vec<&str> = recs.data.iter().map(|b| b.isbn.as_str()).collect();
    assert_eq!(isbns, vec!["b", "c"]);
}

#[test]
fn test_liked_books_without_genre_data_use_popularity() {
    let mut catalog = Catalog::new();
    user(&mut catalog, "u1");
    book(&mut catalog, "plain", "Plain", "X", &[]);
    book(&mut catalog, "busy", "Busy", "Y", &[]);
    add_raters(&mut catalog, "busy", 4, "rb");

    catalog.rate_book("u1", "plain", 5, None).unwrap();

    let recs = generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default()).unwrap();
    assert_eq!(recs.data[0].isbn, "busy");
    assert!(recs.data[0].score.is_none());
}

#[test]
fn test_limit_truncates_output() {
    let mut catalog = Catalog::new();
    user(&mut catalog, "u1");
    book(&mut catalog, "l", "Liked", "X", &["sci-fi"]);
    for i in 0..8 {
        book(
            &mut catalog,
            &format!("s{i}"),
            &format!("Sci {i}"),
            "Y",
            &["sci-fi"],
        );
    }
    catalog.rate_book("u1", "l", 5, None).unwrap();

    let recs = generate_recommendations(&catalog, "u1", 3, &RecommendConfig::default()).unwrap();
    assert_eq!(recs.data.len(), 3);
}

#[test]
fn test_equal_scores_break_ties_by_popularity_then_title() {
    let mut catalog = Catalog::new();
    user(&mut catalog, "u1");
    book(&mut catalog, "l", "Liked", "X", &["sci-fi"]);
    catalog.rate_book("u1", "l", 5, None).unwrap();

    // Same single genre, no ratings anywhere: identical scores.
    book(&mut catalog, "zz", "Zebra", "Y", &["sci-fi"]);
    book(&mut catalog, "aa", "Aardvark", "Z", &["sci-fi"]);

    let recs = generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default()).unwrap();
    let titles: Vec<&str> = recs.data.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Aardvark", "Zebra"]);

    // Now give Zebra one rating from another reader: it outranks on the
    // popularity tie-breaker and on score alike.
    add_raters(&mut catalog, "zz", 1, "r");
    let recs = generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default()).unwrap();
    let titles: Vec<&str> = recs.data.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Zebra", "Aardvark"]);
}

#[test]
fn test_output_is_deterministic_across_calls() {
    let mut catalog = Catalog::new();
    user(&mut catalog, "u1");
    book(&mut catalog, "l", "Liked", "X", &["sci-fi", "drama"]);
    for i in 0..6 {
        book(
            &mut catalog,
            &format!("b{i}"),
            &format!("Book {i}"),
            "Y",
            if i % 2 == 0 { &["sci-fi"] } else { &["drama"] },
        );
    }
    catalog.rate_book("u1", "l", 5, None).unwrap();

    let first = generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default()).unwrap();
    let second = generate_recommendations(&catalog, "u1", 10, &RecommendConfig::default()).unwrap();

    let a: Vec<(&str, Option<f64>)> = first.data.iter().map(|b| (b.isbn.as_str(), b.score)).collect();
    let b: Vec<(&str, Option<f64>)> =
        second.data.iter().map(|b| (b.isbn.as_str(), b.score)).collect();
    assert_eq!(a, b);
}
