use anyhow::Result;
use bookmatch::{
    generate_recommendations, recompute_similarities, Catalog, NewBook, NewUser, RecommendConfig,
    SimilarityConfig,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("BookMatch recommendation engine v{}", bookmatch::VERSION);
    println!("=============================================");

    let mut catalog = seed_catalog()?;
    println!(
        "Seeded {} nodes and {} edges",
        catalog.store().node_count(),
        catalog.store().edge_count()
    );

    println!("\n--- Similarity batch ---");
    let report = recompute_similarities(&mut catalog, &SimilarityConfig::default())?;
    println!(
        "Processed {} books, wrote {} SIMILAR_TO edges ({} failures)",
        report.processed,
        report.edges_created,
        report.failures.len()
    );
    for similar in catalog.similar_books("978-0441013593", 3)? {
        println!("  Dune -> {} (weight {})", similar.title, similar.weight);
    }

    println!("\n--- Recommendations for ana (likes sci-fi) ---");
    let recs = generate_recommendations(&catalog, "ana", 5, &RecommendConfig::default())?;
    for book in &recs.data {
        match book.score {
            Some(score) => println!("  {:<24} score {:.3}", book.title, score),
            None => println!("  {:<24} (popular)", book.title),
        }
    }

    println!("\n--- Recommendations for carla (no ratings yet) ---");
    let recs = generate_recommendations(&catalog, "carla", 5, &RecommendConfig::default())?;
    for book in &recs.data {
        println!("  {:<24} {} ratings", book.title, book.popularity);
    }

    println!("\n--- Response payload ---");
    println!("{}", serde_json::to_string_pretty(&recs)?);

    Ok(())
}

fn seed_catalog() -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for (user_id, name) in [("ana", "Ana Souza"), ("bruno", "Bruno Lima"), ("carla", "Carla Dias")]
    {
        catalog.create_user(NewUser {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: format!("{user_id}@example.com"),
        })?;
    }

    let books: &[(&str, &str, &str, &[&str])] = &[
        ("978-0441013593", "Dune", "Frank Herbert", &["sci-fi", "classic"]),
        ("978-0441172696", "Dune Messiah", "Frank Herbert", &["sci-fi"]),
        ("978-0553293357", "Foundation", "Isaac Asimov", &["sci-fi", "classic"]),
        ("978-0553294385", "I, Robot", "Isaac Asimov", &["sci-fi"]),
        ("978-0141439518", "Pride and Prejudice", "Jane Austen", &["romance", "classic"]),
        ("978-0141439587", "Emma", "Jane Austen", &["romance"]),
        ("978-0547928227", "The Hobbit", "J.R.R. Tolkien", &["fantasy", "classic"]),
    ];
    for (isbn, title, author, genres) in books {
        catalog.create_book(NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            description: None,
            page_count: 0,
            published_date: None,
            genres: genres.iter().map(|s| s.to_string()).collect(),
        })?;
    }

    catalog.rate_book("ana", "978-0441013593", 5, Some("still holds up"))?;
    catalog.rate_book("ana", "978-0553293357", 4, None)?;
    catalog.rate_book("ana", "978-0547928227", 2, None)?;
    catalog.rate_book("bruno", "978-0141439518", 5, None)?;
    catalog.rate_book("bruno", "978-0141439587", 4, None)?;
    catalog.rate_book("bruno", "978-0441013593", 3, None)?;

    Ok(catalog)
}
