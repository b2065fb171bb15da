use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Reference,
    Update,
    Trigger,
    #[default]
    Dependency,
    ProcessStep,
}

impl LinkType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Update => "update",
            Self::Trigger => "trigger",
            Self::Dependency => "dependency",
            Self::ProcessStep => "process_step",
        }
    }
}

/// One entity of the dependency graph as delivered by the data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub group: String,
    #[serde(default)]
    pub label: String,
    /// Sizing hint; only used to order nodes within the node layer.
    #[serde(default = "default_weight", alias = "val")]
    pub weight: f32,
    /// Column index for the layered layout. Absent means column zero.
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

fn default_weight() -> f32 {
    1.0
}

impl GraphNode {
    pub fn new(id: impl Into<String>, group: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            label: label.into(),
            weight: default_weight(),
            level: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn level(&self) -> u32 {
        self.level.unwrap_or(0)
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    /// Case-insensitive containment over the label and every metadata value.
    /// `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        if self.display_label().to_lowercase().contains(needle) {
            return true;
        }

        self.metadata
            .values()
            .any(|value| value.to_lowercase().contains(needle))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(default, rename = "type")]
    pub link_type: LinkType,
}

impl GraphLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub links: Vec<GraphLink>,
}

impl GraphData {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn group_tags(&self) -> BTreeSet<String> {
        self.nodes.iter().map(|node| node.group.clone()).collect()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_accepts_val_alias() {
        let node: GraphNode =
            serde_json::from_str(r#"{"id":"Account","group":"Object","label":"Account","val":20}"#)
                .unwrap();
        assert_eq!(node.weight, 20.0);
        assert_eq!(node.level(), 0);
    }

    #[test]
    fn test_link_type_snake_case() {
        let link: GraphLink =
            serde_json::from_str(r#"{"source":"a","target":"b","type":"process_step"}"#).unwrap();
        assert_eq!(link.link_type, LinkType::ProcessStep);
    }

    #[test]
    fn test_query_matches_label_and_metadata() {
        let node = GraphNode::new("Risk_Score", "Field", "Risk Score")
            .with_metadata("apiName", "Risk_Score__c");

        assert!(node.matches_query("risk"));
        assert!(node.matches_query("__c"));
        assert!(!node.matches_query("opportunity"));
    }

    #[test]
    fn test_group_tags_are_distinct_and_sorted() {
        let data = GraphData {
            nodes: vec![
                GraphNode::new("a", "Flow", "A"),
                GraphNode::new("b", "Object", "B"),
                GraphNode::new("c", "Flow", "C"),
            ],
            links: Vec::new(),
        };

        let tags = data.group_tags().into_iter().collect::<Vec<_>>();
        assert_eq!(tags, vec!["Flow".to_owned(), "Object".to_owned()]);
    }
}
