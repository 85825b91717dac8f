use std::collections::HashSet;

use eframe::egui::{Pos2, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Deserialize;

use crate::graph::{ContentGraph, NodeKind, NodeRecord};
use crate::util::stable_pair;

mod declutter;
mod interaction;
mod physics;
mod scene;
mod transform;

pub use interaction::PointerEvent;
pub use scene::{FrameScene, LinkSprite, NodeSprite};

use interaction::InteractionState;
use transform::Camera;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ForceTuning {
    pub repel: f32,
    pub center: f32,
    pub link: f32,
    pub damping: f32,
}

impl Default for ForceTuning {
    fn default() -> Self {
        Self {
            repel: 12.0,
            center: 0.003,
            link: 0.015,
            damping: 0.85,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport: Viewport,
    pub initial_filters: Vec<NodeKind>,
    pub forces: ForceTuning,
    pub settle_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            initial_filters: Vec::new(),
            forces: ForceTuning::default(),
            settle_ms: 800,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SimNode {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    pub(crate) drag_pin: Option<Vec2>,
    pub(crate) layout_pin: Option<Vec2>,
}

impl SimNode {
    pub(crate) fn pin(&self) -> Option<Vec2> {
        self.drag_pin.or(self.layout_pin)
    }
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    impulses: Vec<Vec2>,
}

#[derive(Clone, Debug)]
pub struct SelectionNotice {
    pub node: NodeRecord,
}

pub struct GraphView {
    graph: ContentGraph,
    config: EngineConfig,
    sim: Vec<SimNode>,
    camera: Camera,
    filters: HashSet<NodeKind>,
    selected: Option<usize>,
    search: String,
    search_matches: HashSet<usize>,
    interaction: InteractionState,
    cursor: Option<Pos2>,
    clock: f32,
    visible: Vec<usize>,
    visible_mask: Vec<bool>,
    visible_links: Vec<usize>,
    visible_dirty: bool,
    scratch: PhysicsScratch,
}

impl GraphView {
    pub fn new(graph: ContentGraph, config: EngineConfig) -> Self {
        let viewport = vec2(config.viewport.width, config.viewport.height);
        let center = viewport * 0.5;

        let sim = graph
            .nodes
            .iter()
            .map(|record| {
                let (jx, jy) = stable_pair(&record.id);
                let padding = physics::BASE_PADDING + record.size * 0.5;
                let half = vec2(
                    (viewport.x * 0.5 - padding).max(0.0),
                    (viewport.y * 0.5 - padding).max(0.0),
                );
                SimNode {
                    pos: center + vec2(jx * half.x, jy * half.y),
                    ..SimNode::default()
                }
            })
            .collect();

        let filters = config.initial_filters.iter().copied().collect();

        let mut view = Self {
            graph,
            sim,
            camera: Camera::new(),
            filters,
            selected: None,
            search: String::new(),
            search_matches: HashSet::new(),
            interaction: InteractionState::Idle,
            cursor: None,
            clock: 0.0,
            visible: Vec::new(),
            visible_mask: Vec::new(),
            visible_links: Vec::new(),
            visible_dirty: true,
            scratch: PhysicsScratch::default(),
            config,
        };

        view.ensure_visible();
        for _ in 0..physics::WARM_START_TICKS {
            view.tick();
        }

        view
    }

    /// One frame: expire the settle window if due, then run one fixed
    /// simulation step. `dt` only advances the engine clock; the forces are
    /// per-invocation on purpose.
    pub fn advance(&mut self, dt: f32) {
        self.clock += dt.max(0.0);
        self.expire_settle();
        self.ensure_visible();
        self.tick();
    }

    pub fn reorganize(&mut self) {
        if !matches!(
            self.interaction,
            InteractionState::Idle | InteractionState::Reorganizing { .. }
        ) {
            return;
        }

        self.ensure_visible();
        if self.visible.len() < 2 {
            return;
        }

        let nodes = self
            .visible
            .iter()
            .map(|&index| (index, self.graph.nodes[index].size))
            .collect::<Vec<_>>();
        let links = self
            .visible_links
            .iter()
            .map(|&link_index| {
                let link = &self.graph.links[link_index];
                (link.source, link.target)
            })
            .collect::<Vec<_>>();

        let targets = declutter::declutter_layout(&nodes, &links, self.viewport_vec());
        for (index, target) in targets {
            self.sim[index].layout_pin = Some(target);
        }

        self.interaction = InteractionState::Reorganizing {
            deadline: self.clock + self.config.settle_ms as f32 / 1000.0,
        };
    }

    pub fn toggle_filter(&mut self, kind: NodeKind) {
        if !self.filters.insert(kind) {
            self.filters.remove(&kind);
        }
        self.visible_dirty = true;
    }

    pub fn active_filters(&self) -> &HashSet<NodeKind> {
        &self.filters
    }

    pub fn set_search(&mut self, query: &str) {
        if self.search == query {
            return;
        }
        self.search = query.to_string();
        self.search_matches.clear();

        let query = self.search.trim();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        for (index, record) in self.graph.nodes.iter().enumerate() {
            if fuzzy_match_score(&matcher, &record.label, query).is_some() {
                self.search_matches.insert(index);
            }
        }
    }

    pub fn close_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_record(&self) -> Option<&NodeRecord> {
        self.selected.map(|index| &self.graph.nodes[index])
    }

    pub fn graph(&self) -> &ContentGraph {
        &self.graph
    }

    fn viewport_vec(&self) -> Vec2 {
        vec2(self.config.viewport.width, self.config.viewport.height)
    }

    fn tick(&mut self) {
        let viewport = self.viewport_vec();
        physics::step(
            &self.graph.nodes,
            &self.graph.links,
            &self.visible,
            &self.visible_links,
            &mut self.sim,
            &mut self.scratch,
            viewport,
            &self.config.forces,
        );
    }

    fn expire_settle(&mut self) {
        let clock = self.clock;
        let (next, expired) = match self.interaction {
            InteractionState::Reorganizing { deadline } if clock >= deadline => {
                (InteractionState::Idle, true)
            }
            InteractionState::Panning {
                pointer_anchor,
                offset_anchor,
                settle: Some(deadline),
            } if clock >= deadline => (
                InteractionState::Panning {
                    pointer_anchor,
                    offset_anchor,
                    settle: None,
                },
                true,
            ),
            InteractionState::DraggingNode {
                index,
                pressed,
                moved,
                settle: Some(deadline),
            } if clock >= deadline => (
                InteractionState::DraggingNode {
                    index,
                    pressed,
                    moved,
                    settle: None,
                },
                true,
            ),
            state => (state, false),
        };

        if expired {
            self.clear_layout_pins();
        }
        self.interaction = next;
    }

    fn clear_layout_pins(&mut self) {
        for node in &mut self.sim {
            node.layout_pin = None;
        }
    }

    fn ensure_visible(&mut self) {
        if !self.visible_dirty {
            return;
        }

        self.visible.clear();
        self.visible_mask.clear();
        self.visible_mask.resize(self.graph.nodes.len(), false);
        for (index, record) in self.graph.nodes.iter().enumerate() {
            if self.filters.is_empty() || self.filters.contains(&record.kind) {
                self.visible.push(index);
                self.visible_mask[index] = true;
            }
        }

        self.visible_links.clear();
        for (index, link) in self.graph.links.iter().enumerate() {
            if self.visible_mask[link.source] && self.visible_mask[link.target] {
                self.visible_links.push(index);
            }
        }

        self.visible_dirty = false;
    }

    fn select(&mut self, index: usize) -> SelectionNotice {
        self.selected = Some(index);
        SelectionNotice {
            node: self.graph.nodes[index].clone(),
        }
    }
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}
