use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::model::GraphData;

pub fn parse_graph_json(raw: &str) -> Result<GraphData> {
    serde_json::from_str(raw).context("invalid graph JSON")
}

pub fn load_graph_file(path: &Path) -> Result<GraphData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let data = parse_graph_json(&raw)
        .with_context(|| format!("failed to parse graph file {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = data.node_count(),
        links = data.link_count(),
        "loaded graph"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FilterSet, project};

    #[test]
    fn test_parse_minimal_document() {
        let data = parse_graph_json(
            r#"{
                "nodes": [
                    {"id": "A", "group": "Object", "label": "Account"},
                    {"id": "B", "group": "Flow", "label": "Sync", "level": 1}
                ],
                "links": [{"source": "A", "target": "B", "type": "trigger"}]
            }"#,
        )
        .unwrap();

        assert_eq!(data.node_count(), 2);
        assert_eq!(data.link_count(), 1);
        assert_eq!(data.nodes[1].level(), 1);
    }

    #[test]
    fn test_links_without_nodes_project_empty() {
        let data =
            parse_graph_json(r#"{"nodes": [], "links": [{"source": "A", "target": "B"}]}"#)
                .unwrap();
        assert_eq!(data.link_count(), 1);

        let graph = project(&data, &FilterSet::all_of(&data));
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let error = load_graph_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{error:#}").contains("/definitely/not/here.json"));
    }
}
