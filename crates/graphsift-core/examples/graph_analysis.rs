// Runs every algorithm over a small two-cluster network.
//
// Settings come from an optional ./graphsift.toml and GRAPHSIFT_* variables,
// e.g. GRAPHSIFT_SPANNING_TREE__MAX=true or GRAPHSIFT_OUTPUT__SORT_ORDER=descending.

use anyhow::Result;
use graphsift_core::{run, AlgorithmKind, BetweennessCentrality, FinderConfig, Graph, Progress, ProgressLog};

fn network() -> Graph {
    Graph::from_undirected_edges(
        "network",
        &[
            ("alpha", "beta", 4.0),
            ("beta", "gamma", 3.0),
            ("gamma", "alpha", 5.0),
            ("alpha", "delta", 2.0),
            ("gamma", "delta", 1.0),
            ("delta", "epsilon", 0.5),
            ("epsilon", "zeta", 6.0),
            ("zeta", "eta", 2.5),
            ("eta", "epsilon", 3.5),
            ("zeta", "theta", 1.5),
            ("theta", "eta", 4.5),
        ],
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut config = FinderConfig::load()?;
    let route = &mut config.shortest_path;
    route.from_node.get_or_insert_with(|| "alpha".to_string());
    route.to_node.get_or_insert_with(|| "theta".to_string());
    let bundle = config.bundle();
    let graph = network();

    println!("\n{}", graph);
    println!("=====================================\n");

    for kind in AlgorithmKind::ALL {
        let mut log = ProgressLog::new();
        let graphs = run(kind, &graph, &bundle, &mut Progress::new(&mut log))?;
        println!("▶ {} ({} progress updates)", kind, log.fractions.len());
        for result in &graphs {
            println!(
                "   - {}: {} nodes, {} edges, total weight {:.2}",
                result.name(),
                result.node_count(),
                result.edge_count(),
                result.total_weight()
            );
        }
    }

    let scores = BetweennessCentrality::from_bundle(&graph, &bundle, &mut Progress::silent())?;
    println!("\n▶ Betweenness (weighted: {})", scores.is_weighted());
    for (id, score) in scores.ranked_vertices().into_iter().take(3) {
        println!("   - {}: {:.3}", graph.label(id), score);
    }
    if let Some((edge, score)) = scores.max_edge() {
        let e = graph.edge(edge);
        println!(
            "   bridge: {} - {} ({:.3})",
            graph.label(e.source()),
            graph.label(e.target()),
            score
        );
    }
    println!("\n{}", serde_json::to_string_pretty(&scores.to_json())?);

    Ok(())
}
