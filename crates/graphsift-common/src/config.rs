use std::path::Path;

use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};

use crate::bundle::{
    ArgumentsBundle, SortOrder, DEFAULT_MIN_NODE_COUNT, DEFAULT_WEIGHT_NAME, KEY_BIPARTITE, KEY_CENTRALITY_WEIGHTED,
    KEY_EDGE_PRESERVATION, KEY_FROM_NODE, KEY_MAX, KEY_MIN_NODE_COUNT, KEY_SORT_ORDER, KEY_START_NODE, KEY_THRESHOLD,
    KEY_TO_NODE, KEY_WEIGHTED, KEY_WEIGHT_NAME,
};
use crate::condition::Condition;
use crate::error::Result;

// --- Constants for Default Configuration ---
pub const DEFAULT_CONFIG_FILE: &str = "graphsift";
pub const DEFAULT_ENV_PREFIX: &str = "GRAPHSIFT";

pub const DEFAULT_SPANNING_TREE_MAX: bool = false;
pub const DEFAULT_COMMUNITY_WEIGHTED: bool = false;
pub const DEFAULT_CENTRALITY_WEIGHTED: bool = false;
pub const DEFAULT_CLIQUES_BIPARTITE: bool = false;
pub const DEFAULT_SEARCH_EDGE_PRESERVATION: bool = false;
pub const DEFAULT_OUTPUT_SORT_ORDER: &str = "none";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanningTreeConfig {
    pub max: bool,
    /// Omitted means "admit every edge".
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub start_node: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityConfig {
    pub weighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityConfig {
    pub weighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliqueConfig {
    pub bipartite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub edge_preservation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortestPathConfig {
    #[serde(default)]
    pub from_node: Option<String>,
    #[serde(default)]
    pub to_node: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub min_node_count: usize,
    pub sort_order: SortOrder,
    pub weight_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    pub spanning_tree: SpanningTreeConfig,
    pub community: CommunityConfig,
    pub centrality: CentralityConfig,
    pub cliques: CliqueConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub shortest_path: ShortestPathConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Default for SpanningTreeConfig {
    fn default() -> Self {
        Self {
            max: DEFAULT_SPANNING_TREE_MAX,
            threshold: None,
            start_node: None,
        }
    }
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            weighted: DEFAULT_COMMUNITY_WEIGHTED,
        }
    }
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            weighted: DEFAULT_CENTRALITY_WEIGHTED,
        }
    }
}

impl Default for CliqueConfig {
    fn default() -> Self {
        Self {
            bipartite: DEFAULT_CLIQUES_BIPARTITE,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            edge_preservation: DEFAULT_SEARCH_EDGE_PRESERVATION,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            min_node_count: DEFAULT_MIN_NODE_COUNT as usize,
            sort_order: SortOrder::None,
            weight_name: DEFAULT_WEIGHT_NAME.to_string(),
        }
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            spanning_tree: SpanningTreeConfig::default(),
            community: CommunityConfig::default(),
            centrality: CentralityConfig::default(),
            cliques: CliqueConfig::default(),
            search: SearchConfig::default(),
            shortest_path: ShortestPathConfig::default(),
            output: OutputConfig::default(),
            conditions: Vec::new(),
        }
    }
}

impl FinderConfig {
    /// Defaults, then an optional `graphsift.toml` in the working directory,
    /// then `GRAPHSIFT_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_with(
            File::with_name(DEFAULT_CONFIG_FILE).required(false),
            DEFAULT_ENV_PREFIX,
        )
    }

    /// Like [`FinderConfig::load`] but reads an explicit, mandatory file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(File::from(path.as_ref()).required(true), DEFAULT_ENV_PREFIX)
    }

    fn load_with<S>(file: S, env_prefix: &str) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Self::defaults()?
            .add_source(file)
            // GRAPHSIFT_SPANNING_TREE__MAX=true -> spanning_tree.max=true
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("conditions"),
            )
            .build()?;

        let loaded: FinderConfig = s.try_deserialize()?;
        tracing::debug!(?loaded, "Loaded finder configuration");
        Ok(loaded)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("spanning_tree.max", DEFAULT_SPANNING_TREE_MAX)?
            .set_default("community.weighted", DEFAULT_COMMUNITY_WEIGHTED)?
            .set_default("centrality.weighted", DEFAULT_CENTRALITY_WEIGHTED)?
            .set_default("cliques.bipartite", DEFAULT_CLIQUES_BIPARTITE)?
            .set_default("search.edge_preservation", DEFAULT_SEARCH_EDGE_PRESERVATION)?
            .set_default("output.min_node_count", DEFAULT_MIN_NODE_COUNT)?
            .set_default("output.sort_order", DEFAULT_OUTPUT_SORT_ORDER)?
            .set_default("output.weight_name", DEFAULT_WEIGHT_NAME)?)
    }

    /// Flattens the configuration into the option bundle algorithms consume.
    pub fn bundle(&self) -> ArgumentsBundle {
        let mut bundle = ArgumentsBundle::new()
            .with_bool(KEY_MAX, self.spanning_tree.max)
            .with_bool(KEY_WEIGHTED, self.community.weighted)
            .with_bool(KEY_CENTRALITY_WEIGHTED, self.centrality.weighted)
            .with_bool(KEY_BIPARTITE, self.cliques.bipartite)
            .with_bool(KEY_EDGE_PRESERVATION, self.search.edge_preservation)
            .with_int(KEY_MIN_NODE_COUNT, self.output.min_node_count as i64)
            .with_object(KEY_SORT_ORDER, self.output.sort_order.as_str())
            .with_object(KEY_WEIGHT_NAME, self.output.weight_name.clone());

        if let Some(threshold) = self.spanning_tree.threshold {
            bundle.put_double(KEY_THRESHOLD, threshold);
        }
        if let Some(start) = &self.spanning_tree.start_node {
            bundle.put_object(KEY_START_NODE, start.clone());
        }
        if let Some(from) = &self.shortest_path.from_node {
            bundle.put_object(KEY_FROM_NODE, from.clone());
        }
        if let Some(to) = &self.shortest_path.to_node {
            bundle.put_object(KEY_TO_NODE, to.clone());
        }
        for condition in &self.conditions {
            bundle.put_condition(*condition);
        }
        bundle
    }
}
