use crate::graph::ProjectedGraph;

pub const DIM_OPACITY: f32 = 0.1;
pub const LINK_OPACITY: f32 = 0.6;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HighlightState {
    #[default]
    None,
    /// Projected index of the hovered node.
    Hover(usize),
    Search(String),
}

impl HighlightState {
    pub fn hovered(&self) -> Option<usize> {
        match self {
            Self::Hover(index) => Some(*index),
            _ => None,
        }
    }

    pub fn is_hover(&self) -> bool {
        self.hovered().is_some()
    }
}

/// How a link is painted under the current highlight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEmphasis {
    Normal,
    Accent,
    Dimmed,
}

/// Owns the highlight state and the masks derived from it. Masks are
/// recomputed only on transitions, never per frame.
#[derive(Debug, Default)]
pub struct Highlighter {
    state: HighlightState,
    query: String,
    lit_nodes: Vec<bool>,
    lit_links: Vec<bool>,
}

impl Highlighter {
    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn hovered(&self) -> Option<usize> {
        self.state.hovered()
    }

    pub fn pointer_enter(&mut self, index: usize, graph: &ProjectedGraph) {
        if index >= graph.node_count() || self.hovered() == Some(index) {
            return;
        }

        self.lit_nodes = vec![false; graph.node_count()];
        self.lit_links = vec![false; graph.link_count()];
        self.lit_nodes[index] = true;
        for &link_index in &graph.incident[index] {
            let link = graph.links[link_index];
            self.lit_links[link_index] = true;
            self.lit_nodes[link.source] = true;
            self.lit_nodes[link.target] = true;
        }
        self.state = HighlightState::Hover(index);
    }

    pub fn pointer_leave(&mut self, graph: &ProjectedGraph) {
        if self.hovered().is_some() {
            self.enter_query_state(graph);
        }
    }

    /// Any non-empty text searches verbatim, whitespace included.
    pub fn set_query(&mut self, query: &str, graph: &ProjectedGraph) {
        self.query = query.to_owned();
        self.enter_query_state(graph);
    }

    /// Called after the projected graph is replaced; hover indices are stale.
    pub fn reset_projection(&mut self, graph: &ProjectedGraph) {
        self.enter_query_state(graph);
    }

    pub fn node_opacity(&self, index: usize) -> f32 {
        match self.state {
            HighlightState::None => 1.0,
            _ if self.lit_nodes.get(index).copied().unwrap_or(false) => 1.0,
            _ => DIM_OPACITY,
        }
    }

    pub fn link_emphasis(&self, index: usize) -> LinkEmphasis {
        match self.state {
            HighlightState::None => LinkEmphasis::Normal,
            HighlightState::Hover(_) if self.lit_links.get(index).copied().unwrap_or(false) => {
                LinkEmphasis::Accent
            }
            _ => LinkEmphasis::Dimmed,
        }
    }

    fn enter_query_state(&mut self, graph: &ProjectedGraph) {
        self.lit_links.clear();
        if self.query.is_empty() {
            self.lit_nodes.clear();
            self.state = HighlightState::None;
            return;
        }

        let needle = self.query.to_lowercase();
        self.lit_nodes = graph
            .nodes
            .iter()
            .map(|node| node.matches_query(&needle))
            .collect();
        self.state = HighlightState::Search(self.query.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FilterSet, GraphData, project, sample};

    fn projected() -> ProjectedGraph {
        let data = sample::dependency_graph();
        project(&data, &FilterSet::all_of(&data))
    }

    fn full_opacity_count(highlighter: &Highlighter, graph: &ProjectedGraph) -> usize {
        (0..graph.node_count())
            .filter(|&index| highlighter.node_opacity(index) == 1.0)
            .count()
    }

    #[test]
    fn test_hover_lights_node_and_neighbors() {
        let graph = projected();
        let mut highlighter = Highlighter::default();
        let hovered = graph.index_of("Account").unwrap();
        let neighbors = graph.incident[hovered]
            .iter()
            .map(|&link| {
                let link = graph.links[link];
                if link.source == hovered { link.target } else { link.source }
            })
            .collect::<std::collections::BTreeSet<_>>();

        highlighter.pointer_enter(hovered, &graph);

        assert_eq!(highlighter.state(), &HighlightState::Hover(hovered));
        assert_eq!(full_opacity_count(&highlighter, &graph), neighbors.len() + 1);
        let accented = (0..graph.link_count())
            .filter(|&index| highlighter.link_emphasis(index) == LinkEmphasis::Accent)
            .collect::<Vec<_>>();
        assert_eq!(accented, graph.incident[hovered]);
    }

    #[test]
    fn test_hover_clear_without_query_restores_everything() {
        let graph = projected();
        let mut highlighter = Highlighter::default();
        highlighter.pointer_enter(0, &graph);
        highlighter.pointer_leave(&graph);

        assert_eq!(highlighter.state(), &HighlightState::None);
        assert_eq!(full_opacity_count(&highlighter, &graph), graph.node_count());
        assert!(
            (0..graph.link_count())
                .all(|index| highlighter.link_emphasis(index) == LinkEmphasis::Normal)
        );
    }

    #[test]
    fn test_hover_leave_falls_back_to_search() {
        let graph = projected();
        let mut highlighter = Highlighter::default();
        highlighter.set_query("flow", &graph);
        highlighter.pointer_enter(0, &graph);
        highlighter.pointer_leave(&graph);

        assert_eq!(highlighter.state(), &HighlightState::Search("flow".to_owned()));
    }

    #[test]
    fn test_search_single_match_and_clear() {
        let graph = projected();
        let mut highlighter = Highlighter::default();

        highlighter.set_query("SYNC ERP", &graph);
        assert_eq!(full_opacity_count(&highlighter, &graph), 1);
        assert!(
            (0..graph.link_count())
                .all(|index| highlighter.link_emphasis(index) == LinkEmphasis::Dimmed)
        );

        highlighter.set_query("", &graph);
        assert_eq!(highlighter.state(), &HighlightState::None);
        assert_eq!(full_opacity_count(&highlighter, &graph), graph.node_count());
    }

    #[test]
    fn test_whitespace_query_searches_verbatim() {
        let graph = projected();
        let mut highlighter = Highlighter::default();

        highlighter.set_query(" ", &graph);
        assert_eq!(highlighter.state(), &HighlightState::Search(" ".to_owned()));
        // Only multi-word labels contain a space.
        assert_eq!(full_opacity_count(&highlighter, &graph), 6);
    }

    #[test]
    fn test_query_change_overrides_hover() {
        let graph = projected();
        let mut highlighter = Highlighter::default();
        highlighter.pointer_enter(0, &graph);
        highlighter.set_query("account", &graph);
        assert!(matches!(highlighter.state(), HighlightState::Search(_)));
    }

    #[test]
    fn test_empty_graph_has_no_highlight() {
        let graph = project(&GraphData::default(), &FilterSet::default());
        let mut highlighter = Highlighter::default();
        highlighter.pointer_enter(0, &graph);
        assert_eq!(highlighter.state(), &HighlightState::None);
    }
}
