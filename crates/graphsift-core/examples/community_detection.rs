// Compares FastGreedy and GirvanNewman on a ring of cliques.
//
// Each clique is joined to the next by a single bridge, so both methods
// should recover one community per clique.

use std::time::Instant;

use anyhow::Result;
use graphsift_core::{CommunityOptions, FastGreedy, GirvanNewman, Graph, Progress};

const CLIQUES: usize = 4;
const CLIQUE_SIZE: usize = 5;

fn ring_of_cliques() -> Result<Graph> {
    let mut graph = Graph::new("ring");
    let label = |c: usize, i: usize| format!("c{}n{}", c, i);

    for c in 0..CLIQUES {
        for i in 0..CLIQUE_SIZE {
            graph.add_node(&label(c, i))?;
        }
        for i in 0..CLIQUE_SIZE {
            for j in (i + 1)..CLIQUE_SIZE {
                graph.add_edge(&label(c, i), &label(c, j), 1.0, false)?;
            }
        }
    }
    for c in 0..CLIQUES {
        let next = (c + 1) % CLIQUES;
        graph.add_edge(&label(c, 0), &label(next, CLIQUE_SIZE - 1), 1.0, false)?;
    }
    Ok(graph)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("\n🎯 Community Detection Comparison");
    println!("=====================================\n");

    let graph = ring_of_cliques()?;
    println!("Graph: {} nodes, {} edges\n", graph.node_count(), graph.edge_count());

    let start = Instant::now();
    let greedy = FastGreedy::new(CommunityOptions::default()).detect(&graph, &mut Progress::silent())?;
    println!("FastGreedy ({:?})", start.elapsed());
    println!("   communities: {}", greedy.num_communities);
    println!("   modularity:  {:.4}", greedy.modularity);
    println!("   merges kept: {}", greedy.merges.len());

    let start = Instant::now();
    let divisive = GirvanNewman::new(CommunityOptions::default()).detect(&graph, &mut Progress::silent())?;
    println!("\nGirvanNewman ({:?})", start.elapsed());
    println!("   communities: {}", divisive.num_communities);
    println!("   modularity:  {:.4}", divisive.modularity);

    println!("\nFastGreedy partition:");
    for (index, members) in greedy.communities.iter().enumerate() {
        let labels: Vec<&str> = members.iter().map(|&id| graph.label(id)).collect();
        println!("   {}: {}", index + 1, labels.join(", "));
    }

    println!("\n{}", serde_json::to_string_pretty(&greedy.merges)?);
    Ok(())
}
