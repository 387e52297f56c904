use graphsift_core::{
    run, AlgorithmKind, ArgumentsBundle, Condition, ConditionedGraph, FinderConfig, Graph, GraphError, Progress,
    ProgressLog, SortOrder,
};

/// Builds a bipartite, loop-free, undirected graph through the conditioned
/// wrapper, which must refuse edges inside either side.
fn bipartite_network() -> Graph {
    let conditions = vec![Condition::Bipartite, Condition::Undirected, Condition::LoopFree];
    let mut graph = ConditionedGraph::new("jobs", conditions);
    // a lone node is bipartite, two isolated ones are not, so start with a batch
    let added = graph
        .add_partial(
            &["ana", "bo", "cy", "build", "test", "deploy"],
            &[
                ("ana", "build", 3.0, false),
                ("ana", "test", 1.0, false),
                ("bo", "test", 2.0, false),
                ("cy", "deploy", 5.0, false),
                ("bo", "deploy", 4.0, false),
            ],
        )
        .unwrap();
    assert!(added);

    // would close an odd cycle, then a loop, then a directed edge
    assert!(!graph.add_edge("build", "test", 1.0, false).unwrap());
    assert!(!graph.add_edge("ana", "ana", 1.0, false).unwrap());
    assert!(!graph.add_edge("cy", "build", 1.0, true).unwrap());
    assert!(graph.query_satisfaction());
    graph.into_graph()
}

#[test]
fn test_conditions_guard_construction_and_runs() {
    let graph = bipartite_network();
    assert_eq!(graph.edge_count(), 5);

    let bundle = ArgumentsBundle::new()
        .with_condition(Condition::Bipartite)
        .with_condition(Condition::LoopFree);
    let forests = run(AlgorithmKind::Kruskal, &graph, &bundle, &mut Progress::silent()).unwrap();
    assert_eq!(forests[0].edge_count(), 5);

    let strict = bundle.with_condition(Condition::Clique);
    let err = run(AlgorithmKind::Kruskal, &graph, &strict, &mut Progress::silent()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GraphError>(),
        Some(GraphError::InvalidArgument { .. })
    ));
}

#[test]
fn test_configuration_drives_every_algorithm() {
    let mut config = FinderConfig::default();
    config.spanning_tree.max = true;
    config.output.sort_order = SortOrder::Descending;
    config.output.min_node_count = 2;
    config.shortest_path.from_node = Some("A".into());
    config.shortest_path.to_node = Some("B".into());
    let bundle = config.bundle();

    let graph = Graph::from_undirected_edges(
        "two-parts",
        &[
            ("A", "B", 1.0),
            ("B", "C", 2.0),
            ("C", "A", 3.0),
            ("D", "E", 4.0),
            ("X", "X", 1.0),
        ],
    );

    for kind in AlgorithmKind::ALL {
        let mut log = ProgressLog::new();
        let graphs = run(kind, &graph, &bundle, &mut Progress::new(&mut log)).unwrap();
        assert!(!graphs.is_empty(), "{} produced nothing", kind);
        assert!(graphs.iter().all(|g| g.node_count() >= 2), "{}", kind);
        assert!(
            graphs.windows(2).all(|w| w[0].node_count() >= w[1].node_count()),
            "{} not sorted",
            kind
        );
        assert_eq!(log.last(), Some(1.0), "{}", kind);
        assert!(log.is_monotonic(), "{}", kind);
    }

    let components = run(AlgorithmKind::ConnectedComponents, &graph, &bundle, &mut Progress::silent()).unwrap();
    let sizes: Vec<usize> = components.iter().map(Graph::node_count).collect();
    assert_eq!(sizes, vec![3, 2]);

    let trees = run(AlgorithmKind::Prim, &graph, &bundle, &mut Progress::silent()).unwrap();
    assert_eq!(trees[0].total_weight(), 9.0);
}

#[test]
fn test_searches_grow_subgraphs_under_conditions() {
    let graph = bipartite_network();
    let bundle = ArgumentsBundle::new()
        .with_condition(Condition::Bipartite)
        .with_condition(Condition::Clique);

    // a bipartite clique is a single edge
    let edges = run(AlgorithmKind::BreadthFirstSearch, &graph, &bundle, &mut Progress::silent()).unwrap();
    assert_eq!(edges.len(), 4);
    assert!(edges.iter().all(|g| g.node_count() == 2 && g.edge_count() == 1));

    let unconstrained = run(
        AlgorithmKind::DepthFirstSearch,
        &graph,
        &ArgumentsBundle::new(),
        &mut Progress::silent(),
    )
    .unwrap();
    assert_eq!(unconstrained.len(), 1);
    assert_eq!(unconstrained[0].node_count(), 6);
    assert_eq!(unconstrained[0].edge_count(), 5);
}
