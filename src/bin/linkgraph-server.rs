//! linkgraph HTTP server binary

use linkgraph::{
    config::ServerConfig, server, Embeddings, GraphStore, HashingEmbeddings, HttpEmbeddings,
    InMemoryBackend, Link, LinkGraphStore, Node,
};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    println!("linkgraph retrieval server");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = ServerConfig::from_env()?;

    // Blocking HTTP clients must be created and dropped outside the runtime
    let embeddings: Arc<dyn Embeddings> = match &config.embeddings_url {
        Some(url) => {
            println!("✓ Embeddings: HTTP service at {}", url);
            let remote = HttpEmbeddings::new(url.clone());
            match remote.health_check() {
                Ok(true) => println!("✓ Embedding service is healthy"),
                Ok(false) => eprintln!("⚠️  Embedding service reported unhealthy"),
                Err(e) => {
                    eprintln!("❌ Failed to connect to embedding service: {}", e);
                    return Err(e);
                }
            }
            Arc::new(remote)
        }
        None => {
            println!("✓ Embeddings: feature hashing ({} dims)", config.embedding_dims);
            println!("   (set LINKGRAPH_EMBEDDINGS_URL to use a remote service)");
            Arc::new(HashingEmbeddings::new(config.embedding_dims))
        }
    };

    let backend = Arc::new(InMemoryBackend::new(embeddings));
    let store = LinkGraphStore::shared(backend);

    if config.demo {
        let ids = store.add_nodes(demo_nodes())?;
        println!("✓ Seeded {} demo documents", ids.len());
    }

    println!("✓ Default search type: {}", config.search_type);
    println!("✓ Starting HTTP server on port {}...", config.port);
    println!();

    let state = server::AppState::new(store.clone(), config.search_type);
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(server::run_server(state, config.port));
    drop(runtime);
    drop(store);
    result
}

/// A small hyperlinked corpus
fn demo_nodes() -> Vec<Node> {
    vec![
        Node::new("Breadth-first traversal visits every node one hop away before going deeper.")
            .with_id("bfs")
            .with_links(vec![
                Link::incoming("hyperlink", "https://linkgraph.dev/bfs"),
                Link::outgoing("hyperlink", "https://linkgraph.dev/graphs"),
            ]),
        Node::new("A graph is a set of nodes connected by edges.")
            .with_id("graphs")
            .with_links(vec![
                Link::incoming("hyperlink", "https://linkgraph.dev/graphs"),
                Link::bidir("keyword", "graph"),
            ]),
        Node::new("Knowledge graphs connect entities with typed relationships.")
            .with_id("knowledge-graphs")
            .with_links(vec![Link::bidir("keyword", "graph")]),
        Node::new("Maximal marginal relevance trades similarity against redundancy.")
            .with_id("mmr")
            .with_links(vec![
                Link::outgoing("hyperlink", "https://linkgraph.dev/bfs"),
                Link::bidir("keyword", "retrieval"),
            ]),
        Node::new("Vector retrieval ranks documents by embedding similarity.")
            .with_id("vector-retrieval")
            .with_links(vec![Link::bidir("keyword", "retrieval")]),
    ]
}
