mod load;
mod model;
mod project;
pub mod sample;

pub use load::{load_graph_file, parse_graph_json};
pub use model::{GraphData, GraphLink, GraphNode, LinkType};
pub use project::{FilterSet, ProjectedGraph, ProjectedLink, project};
