use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::model::{GraphData, GraphNode, LinkType};

/// Active group tags. Only the interaction layer mutates it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet {
    active: BTreeSet<String>,
}

impl FilterSet {
    pub fn all_of(data: &GraphData) -> Self {
        Self {
            active: data.group_tags(),
        }
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, group: &str) -> bool {
        self.active.contains(group)
    }

    /// Flips membership of `group`. Tags absent from `data` are ignored so the
    /// set never grows beyond what the data carries. Returns whether the set changed.
    pub fn toggle(&mut self, group: &str, data: &GraphData) -> bool {
        if self.active.remove(group) {
            return true;
        }

        if data.nodes.iter().any(|node| node.group == group) {
            self.active.insert(group.to_owned());
            return true;
        }

        false
    }

    /// Drops tags that no longer occur in `data`.
    pub fn retain_present(&mut self, data: &GraphData) {
        let present = data.group_tags();
        self.active.retain(|tag| present.contains(tag));
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectedLink {
    pub source: usize,
    pub target: usize,
    pub link_type: LinkType,
    /// Position of the link in the unfiltered input.
    pub input_index: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ProjectedGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<ProjectedLink>,
    pub index_by_id: HashMap<String, usize>,
    /// Indices into `links` touching each node, in either direction.
    pub incident: Vec<Vec<usize>>,
}

impl ProjectedGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn degree(&self, index: usize) -> usize {
        self.incident.get(index).map_or(0, Vec::len)
    }
}

pub fn project(data: &GraphData, filter: &FilterSet) -> ProjectedGraph {
    let nodes = data
        .nodes
        .iter()
        .filter(|node| filter.contains(&node.group))
        .cloned()
        .collect::<Vec<_>>();

    let mut index_by_id = HashMap::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        index_by_id.entry(node.id.clone()).or_insert(index);
    }

    let mut links = Vec::new();
    let mut incident = vec![Vec::new(); nodes.len()];
    let mut dropped = 0usize;
    for (input_index, link) in data.links.iter().enumerate() {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(&link.source),
            index_by_id.get(&link.target),
        ) else {
            dropped += 1;
            continue;
        };

        let link_index = links.len();
        links.push(ProjectedLink {
            source,
            target,
            link_type: link.link_type,
            input_index,
        });
        incident[source].push(link_index);
        if target != source {
            incident[target].push(link_index);
        }
    }

    debug!(
        nodes = nodes.len(),
        links = links.len(),
        dropped_links = dropped,
        "projected graph"
    );

    ProjectedGraph {
        nodes,
        links,
        index_by_id,
        incident,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::graph::model::{GraphLink, GraphNode};
    use crate::graph::sample::dependency_graph;

    fn two_node_graph() -> GraphData {
        GraphData {
            nodes: vec![
                GraphNode::new("A", "X", "A"),
                GraphNode::new("B", "Y", "B"),
            ],
            links: vec![GraphLink::new("A", "B", LinkType::Dependency)],
        }
    }

    #[test]
    fn test_filter_drops_links_with_hidden_endpoint() {
        let data = two_node_graph();
        let projected = project(&data, &FilterSet::from_tags(["X"]));

        assert_eq!(projected.node_count(), 1);
        assert_eq!(projected.link_count(), 0);
        assert_eq!(projected.nodes[0].id, "A");
    }

    #[test]
    fn test_malformed_links_are_dropped() {
        let mut data = two_node_graph();
        data.links.push(GraphLink::new("A", "Ghost", LinkType::Reference));

        let projected = project(&data, &FilterSet::all_of(&data));
        assert_eq!(projected.link_count(), 1);
        assert_eq!(projected.degree(0), 1);
        assert_eq!(projected.degree(1), 1);
    }

    #[test]
    fn test_unknown_tag_filters_everything_out() {
        let data = dependency_graph();
        let projected = project(&data, &FilterSet::from_tags(["Nope"]));
        assert!(projected.is_empty());
        assert_eq!(projected.link_count(), 0);
    }

    #[test]
    fn test_toggle_ignores_absent_tags() {
        let data = two_node_graph();
        let mut filter = FilterSet::all_of(&data);

        assert!(!filter.toggle("Z", &data));
        assert_eq!(filter.len(), 2);
        assert!(filter.toggle("X", &data));
        assert!(!filter.contains("X"));
        assert!(filter.toggle("X", &data));
        assert!(filter.contains("X"));
    }

    #[test]
    fn test_retain_present_after_reload() {
        let mut filter = FilterSet::from_tags(["Object", "Gone"]);
        filter.retain_present(&dependency_graph());
        assert_eq!(filter.iter().collect::<Vec<_>>(), vec!["Object"]);
    }

    proptest! {
        #[test]
        fn projected_links_have_projected_endpoints(mask in 0u8..32) {
            let data = dependency_graph();
            let tags = ["Object", "Flow", "Trigger", "Field", "Unused"];
            let filter = FilterSet::from_tags(
                tags.iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, tag)| *tag),
            );

            let projected = project(&data, &filter);
            for link in &projected.links {
                prop_assert!(link.source < projected.node_count());
                prop_assert!(link.target < projected.node_count());
                prop_assert!(filter.contains(&projected.nodes[link.source].group));
                prop_assert!(filter.contains(&projected.nodes[link.target].group));
            }
            for node in &projected.nodes {
                prop_assert!(filter.contains(&node.group));
            }
        }
    }
}
