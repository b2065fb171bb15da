use eframe::egui::{Pos2, Vec2};

use crate::graph::GraphNode;

/// Identifies a node in outbound events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRef {
    pub id: String,
    pub label: String,
    pub group: String,
}

impl From<&GraphNode> for NodeRef {
    fn from(node: &GraphNode) -> Self {
        Self {
            id: node.id.clone(),
            label: node.display_label().to_owned(),
            group: node.group.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
    NodeClick(NodeRef),
    /// Carries the pointer position in surface coordinates.
    NodeContextMenu(NodeRef, Pos2),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    Node {
        index: usize,
        origin: Pos2,
        dragging: bool,
    },
    Background {
        origin: Pos2,
        last: Pos2,
        dragging: bool,
    },
}

/// Effect of a pointer move while the primary button is held.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragUpdate {
    Idle,
    /// Not yet past the click threshold.
    Pending,
    MoveNode { index: usize, pointer: Pos2 },
    Pan(Vec2),
}

/// Outcome of releasing the primary button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Release {
    /// Node that was held, if the press started on one.
    pub node: Option<usize>,
    /// True when no drag happened between press and release.
    pub click: bool,
}

/// Press, drag and release tracking for the primary button.
#[derive(Debug, Default)]
pub struct GestureTracker {
    gesture: Gesture,
    threshold: f32,
}

impl GestureTracker {
    pub fn new(click_threshold: f32) -> Self {
        Self {
            gesture: Gesture::Idle,
            threshold: click_threshold.max(0.0),
        }
    }

    pub fn press(&mut self, hit: Option<usize>, pointer: Pos2) {
        self.gesture = match hit {
            Some(index) => Gesture::Node {
                index,
                origin: pointer,
                dragging: false,
            },
            None => Gesture::Background {
                origin: pointer,
                last: pointer,
                dragging: false,
            },
        };
    }

    pub fn drag_to(&mut self, pointer: Pos2) -> DragUpdate {
        let threshold_sq = self.threshold * self.threshold;
        match &mut self.gesture {
            Gesture::Idle => DragUpdate::Idle,
            Gesture::Node {
                index,
                origin,
                dragging,
            } => {
                if !*dragging && (pointer - *origin).length_sq() <= threshold_sq {
                    return DragUpdate::Pending;
                }
                *dragging = true;
                DragUpdate::MoveNode {
                    index: *index,
                    pointer,
                }
            }
            Gesture::Background {
                origin,
                last,
                dragging,
            } => {
                if !*dragging && (pointer - *origin).length_sq() <= threshold_sq {
                    return DragUpdate::Pending;
                }
                *dragging = true;
                let delta = pointer - *last;
                *last = pointer;
                DragUpdate::Pan(delta)
            }
        }
    }

    pub fn release(&mut self) -> Release {
        let release = match self.gesture {
            Gesture::Idle => Release::default(),
            Gesture::Node {
                index, dragging, ..
            } => Release {
                node: Some(index),
                click: !dragging,
            },
            Gesture::Background { dragging, .. } => Release {
                node: None,
                click: !dragging,
            },
        };
        self.gesture = Gesture::Idle;
        release
    }

    /// Drops the gesture without producing a release, e.g. when the graph
    /// it referred to is replaced.
    pub fn abort(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn held_node(&self) -> Option<usize> {
        match self.gesture {
            Gesture::Node { index, .. } => Some(index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn test_press_and_release_in_place_is_click() {
        let mut tracker = GestureTracker::new(3.0);
        tracker.press(Some(4), pos2(100.0, 100.0));
        assert_eq!(tracker.drag_to(pos2(101.0, 102.0)), DragUpdate::Pending);

        assert_eq!(
            tracker.release(),
            Release {
                node: Some(4),
                click: true
            }
        );
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_move_past_threshold_is_drag() {
        let mut tracker = GestureTracker::new(3.0);
        tracker.press(Some(1), pos2(0.0, 0.0));
        assert_eq!(
            tracker.drag_to(pos2(10.0, 0.0)),
            DragUpdate::MoveNode {
                index: 1,
                pointer: pos2(10.0, 0.0)
            }
        );
        // Coming back inside the threshold does not turn it into a click.
        assert!(matches!(
            tracker.drag_to(pos2(1.0, 0.0)),
            DragUpdate::MoveNode { .. }
        ));
        assert!(!tracker.release().click);
    }

    #[test]
    fn test_background_drag_pans_by_move_delta() {
        let mut tracker = GestureTracker::new(3.0);
        tracker.press(None, pos2(50.0, 50.0));
        assert_eq!(tracker.drag_to(pos2(60.0, 50.0)), DragUpdate::Pan(vec2(10.0, 0.0)));
        assert_eq!(tracker.drag_to(pos2(60.0, 45.0)), DragUpdate::Pan(vec2(0.0, -5.0)));
        assert_eq!(tracker.release().node, None);
    }

    #[test]
    fn test_idle_moves_do_nothing() {
        let mut tracker = GestureTracker::new(3.0);
        assert_eq!(tracker.drag_to(pos2(5.0, 5.0)), DragUpdate::Idle);
        assert_eq!(tracker.release(), Release::default());
    }
}
