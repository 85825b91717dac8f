use eframe::egui::{Pos2, Vec2};

use super::transform::node_screen_radius;
use super::{GraphView, SelectionNotice};

const CLICK_SLOP: f32 = 4.0;
const HIT_SLOP: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up,
    Leave,
}

/// Gesture state. The starting target decides pan vs drag once, at
/// pointer-down; a gesture never switches modes. A pending settle deadline
/// travels with the gesture so the timed unpin still fires mid-drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum InteractionState {
    Idle,
    Panning {
        pointer_anchor: Pos2,
        offset_anchor: Vec2,
        settle: Option<f32>,
    },
    DraggingNode {
        index: usize,
        pressed: Pos2,
        moved: bool,
        settle: Option<f32>,
    },
    Reorganizing {
        deadline: f32,
    },
}

impl GraphView {
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<SelectionNotice> {
        match event {
            PointerEvent::Down(pos) => {
                self.pointer_down(pos);
                None
            }
            PointerEvent::Move(pos) => {
                self.pointer_move(pos);
                None
            }
            PointerEvent::Up => self.pointer_up(),
            PointerEvent::Leave => {
                self.pointer_leave();
                None
            }
        }
    }

    pub fn zoom_by(&mut self, delta: f32) {
        self.camera.zoom_by(delta);
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    fn pending_settle(&self) -> Option<f32> {
        match self.interaction {
            InteractionState::Reorganizing { deadline } => Some(deadline),
            InteractionState::Panning { settle, .. }
            | InteractionState::DraggingNode { settle, .. } => settle,
            InteractionState::Idle => None,
        }
    }

    fn pointer_down(&mut self, pos: Pos2) {
        self.cursor = Some(pos);
        self.ensure_visible();

        let settle = self.pending_settle();
        self.interaction = match self.hit_test(pos) {
            Some(index) => InteractionState::DraggingNode {
                index,
                pressed: pos,
                moved: false,
                settle,
            },
            None => InteractionState::Panning {
                pointer_anchor: pos,
                offset_anchor: self.camera.offset,
                settle,
            },
        };
    }

    fn pointer_move(&mut self, pos: Pos2) {
        self.cursor = Some(pos);

        match &mut self.interaction {
            InteractionState::Panning {
                pointer_anchor,
                offset_anchor,
                ..
            } => {
                let delta = pos - *pointer_anchor;
                self.camera.offset = *offset_anchor + delta / self.camera.scale;
            }
            InteractionState::DraggingNode {
                index,
                pressed,
                moved,
                ..
            } => {
                if (pos - *pressed).length() > CLICK_SLOP {
                    *moved = true;
                }

                let world = self.camera.screen_to_world(pos);
                let index = *index;
                self.sim[index].pos = world;
                self.sim[index].drag_pin = Some(world);
            }
            InteractionState::Idle | InteractionState::Reorganizing { .. } => {}
        }
    }

    fn pointer_up(&mut self) -> Option<SelectionNotice> {
        match self.interaction {
            InteractionState::DraggingNode {
                index,
                moved,
                settle,
                ..
            } => {
                self.sim[index].drag_pin = None;
                self.interaction = after_gesture(settle);
                if moved { None } else { Some(self.select(index)) }
            }
            InteractionState::Panning { settle, .. } => {
                self.interaction = after_gesture(settle);
                None
            }
            InteractionState::Idle | InteractionState::Reorganizing { .. } => None,
        }
    }

    fn pointer_leave(&mut self) {
        self.cursor = None;

        match self.interaction {
            InteractionState::DraggingNode { index, settle, .. } => {
                self.sim[index].drag_pin = None;
                self.interaction = after_gesture(settle);
            }
            InteractionState::Panning { settle, .. } => {
                self.interaction = after_gesture(settle);
            }
            InteractionState::Idle | InteractionState::Reorganizing { .. } => {}
        }
    }

    pub(super) fn hit_test(&self, screen: Pos2) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for &index in &self.visible {
            let record = &self.graph.nodes[index];
            let pos = self.camera.world_to_screen(self.sim[index].pos);
            let radius = node_screen_radius(record.size, self.camera.scale) + HIT_SLOP;
            let distance = pos.distance(screen);
            if distance <= radius && best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}

fn after_gesture(settle: Option<f32>) -> InteractionState {
    match settle {
        Some(deadline) => InteractionState::Reorganizing { deadline },
        None => InteractionState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use crate::engine::{EngineConfig, GraphView, InteractionState, PointerEvent};
    use crate::graph::{ContentGraph, LinkKind, LinkSpec, NodeKind, NodeMetadata, NodeRecord};

    fn node(id: &str, kind: NodeKind) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            label: id.to_string(),
            kind,
            size: 20.0,
            color: None,
            metadata: NodeMetadata::default(),
        }
    }

    fn pinned_view() -> GraphView {
        let nodes = vec![
            node("a", NodeKind::Entry),
            node("b", NodeKind::Tag),
            node("c", NodeKind::Topic),
        ];
        let links = vec![LinkSpec {
            source: "a".to_string(),
            target: "b".to_string(),
            strength: 0.5,
            kind: LinkKind::Tag,
        }];
        let mut view = GraphView::new(ContentGraph::new(nodes, links), EngineConfig::default());

        // Park the nodes at known spots so hit tests are predictable.
        view.sim[0].pos = vec2(100.0, 100.0);
        view.sim[1].pos = vec2(400.0, 400.0);
        view.sim[2].pos = vec2(700.0, 200.0);
        view
    }

    #[test]
    fn pan_gesture_moves_the_offset_by_delta_over_scale() {
        let mut view = pinned_view();
        view.zoom_by(1.0); // scale 2.0

        view.handle_pointer(PointerEvent::Down(pos2(600.0, 600.0)));
        assert!(matches!(view.interaction, InteractionState::Panning { .. }));

        view.handle_pointer(PointerEvent::Move(pos2(640.0, 580.0)));
        assert_eq!(view.camera.offset, vec2(20.0, -10.0));

        view.handle_pointer(PointerEvent::Up);
        assert!(matches!(view.interaction, InteractionState::Idle));
    }

    #[test]
    fn drag_gesture_pins_the_node_under_the_cursor() {
        let mut view = pinned_view();

        view.handle_pointer(PointerEvent::Down(pos2(100.0, 100.0)));
        assert!(matches!(
            view.interaction,
            InteractionState::DraggingNode { index: 0, .. }
        ));

        view.handle_pointer(PointerEvent::Move(pos2(260.0, 120.0)));
        assert_eq!(view.sim[0].pos, vec2(260.0, 120.0));
        assert_eq!(view.sim[0].drag_pin, Some(vec2(260.0, 120.0)));

        view.handle_pointer(PointerEvent::Up);
        assert!(view.sim[0].drag_pin.is_none());
        assert!(matches!(view.interaction, InteractionState::Idle));
    }

    #[test]
    fn drag_converts_through_the_inverse_transform() {
        let mut view = pinned_view();
        view.zoom_by(1.0); // scale 2.0
        view.camera.offset = vec2(50.0, 30.0);

        // Node a sits at world (100, 100) -> screen (250, 230).
        view.handle_pointer(PointerEvent::Down(pos2(250.0, 230.0)));
        assert!(matches!(
            view.interaction,
            InteractionState::DraggingNode { index: 0, .. }
        ));

        view.handle_pointer(PointerEvent::Move(pos2(270.0, 230.0)));
        assert_eq!(view.sim[0].pos, vec2(110.0, 100.0));
    }

    #[test]
    fn gesture_mode_is_fixed_at_pointer_down() {
        let mut view = pinned_view();

        view.handle_pointer(PointerEvent::Down(pos2(900.0, 700.0)));
        assert!(matches!(view.interaction, InteractionState::Panning { .. }));

        // Sweeping over node b must not turn the pan into a drag.
        view.handle_pointer(PointerEvent::Move(pos2(400.0, 400.0)));
        assert!(matches!(view.interaction, InteractionState::Panning { .. }));
        assert!(view.sim[1].drag_pin.is_none());
    }

    #[test]
    fn click_selects_and_reselection_is_exclusive() {
        let mut view = pinned_view();

        let first = view.handle_pointer(PointerEvent::Down(pos2(100.0, 100.0)));
        assert!(first.is_none());
        let first = view.handle_pointer(PointerEvent::Up);
        assert_eq!(first.unwrap().node.id, "a");
        assert_eq!(view.selected_record().unwrap().id, "a");

        view.handle_pointer(PointerEvent::Down(pos2(400.0, 400.0)));
        let second = view.handle_pointer(PointerEvent::Up);
        assert_eq!(second.unwrap().node.id, "b");
        assert_eq!(view.selected_record().unwrap().id, "b");
    }

    #[test]
    fn dragging_far_enough_suppresses_the_click() {
        let mut view = pinned_view();

        view.handle_pointer(PointerEvent::Down(pos2(100.0, 100.0)));
        view.handle_pointer(PointerEvent::Move(pos2(180.0, 100.0)));
        let notice = view.handle_pointer(PointerEvent::Up);

        assert!(notice.is_none());
        assert!(view.selected_record().is_none());
    }

    #[test]
    fn empty_canvas_click_does_not_clear_selection() {
        let mut view = pinned_view();

        view.handle_pointer(PointerEvent::Down(pos2(100.0, 100.0)));
        view.handle_pointer(PointerEvent::Up);
        assert_eq!(view.selected_record().unwrap().id, "a");

        view.handle_pointer(PointerEvent::Down(pos2(950.0, 700.0)));
        let notice = view.handle_pointer(PointerEvent::Up);
        assert!(notice.is_none());
        assert_eq!(view.selected_record().unwrap().id, "a");

        view.close_selection();
        assert!(view.selected_record().is_none());
    }

    #[test]
    fn pointer_leave_ends_the_gesture() {
        let mut view = pinned_view();

        view.handle_pointer(PointerEvent::Down(pos2(100.0, 100.0)));
        view.handle_pointer(PointerEvent::Move(pos2(150.0, 150.0)));
        view.handle_pointer(PointerEvent::Leave);

        assert!(view.sim[0].drag_pin.is_none());
        assert!(matches!(view.interaction, InteractionState::Idle));
        assert!(view.selected_record().is_none());
    }

    #[test]
    fn dragging_is_allowed_during_the_settle_window() {
        let mut view = pinned_view();

        view.reorganize();
        let InteractionState::Reorganizing { deadline } = view.interaction else {
            panic!("reorganize should enter the settle window");
        };

        // One frame inside the window snaps every node onto its pin.
        view.advance(1.0 / 60.0);

        // Grab the node wherever declutter pinned it.
        let target = view.sim[0].layout_pin.unwrap();
        let screen = view.camera.world_to_screen(target);
        view.handle_pointer(PointerEvent::Down(screen));
        assert!(matches!(
            view.interaction,
            InteractionState::DraggingNode {
                settle: Some(s),
                ..
            } if s == deadline
        ));

        view.handle_pointer(PointerEvent::Move(screen + vec2(60.0, 0.0)));
        assert!(view.sim[0].drag_pin.is_some());

        // The timed unpin still fires mid-drag: layout pins clear, the
        // drag pin keeps holding the grabbed node.
        view.advance(2.0);
        assert!(view.sim.iter().all(|sim| sim.layout_pin.is_none()));
        assert!(view.sim[0].drag_pin.is_some());
        assert!(matches!(
            view.interaction,
            InteractionState::DraggingNode { settle: None, .. }
        ));

        view.handle_pointer(PointerEvent::Up);
        assert!(matches!(view.interaction, InteractionState::Idle));
    }

    #[test]
    fn release_before_the_deadline_returns_to_reorganizing() {
        let mut view = pinned_view();

        view.reorganize();
        let InteractionState::Reorganizing { deadline } = view.interaction else {
            panic!("reorganize should enter the settle window");
        };

        view.advance(1.0 / 60.0);
        let target = view.sim[1].layout_pin.unwrap();
        let screen = view.camera.world_to_screen(target);
        view.handle_pointer(PointerEvent::Down(screen));
        view.handle_pointer(PointerEvent::Up);

        assert!(matches!(
            view.interaction,
            InteractionState::Reorganizing { deadline: d } if d == deadline
        ));

        // Other nodes are still held by their layout pins.
        assert!(view.sim[2].layout_pin.is_some());

        view.advance(2.0);
        assert!(matches!(view.interaction, InteractionState::Idle));
        assert!(view.sim.iter().all(|sim| sim.layout_pin.is_none()));
    }

    #[test]
    fn zoom_round_trip_and_clamp_through_the_engine() {
        let mut view = pinned_view();

        view.zoom_by(0.75);
        view.zoom_by(-0.75);
        assert!((view.camera.scale - 1.0).abs() < f32::EPSILON);

        view.zoom_by(99.0);
        view.handle_pointer(PointerEvent::Down(pos2(10.0, 10.0)));
        view.handle_pointer(PointerEvent::Up);
        view.reset_view();
        assert_eq!(view.camera.scale, 1.0);
        assert_eq!(view.camera.offset, vec2(0.0, 0.0));
    }
}
