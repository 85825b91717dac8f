use eframe::egui::{Color32, Pos2};

use crate::graph::LinkKind;

use super::GraphView;
use super::transform::{kind_color, link_stroke_width, node_screen_radius};

#[derive(Clone, Debug)]
pub struct NodeSprite {
    pub id: String,
    pub screen_pos: Pos2,
    pub radius: f32,
    pub color: Color32,
    pub label: String,
    pub hovered: bool,
    pub selected: bool,
    pub matched: bool,
}

#[derive(Clone, Debug)]
pub struct LinkSprite {
    pub start: Pos2,
    pub end: Pos2,
    pub width: f32,
    pub kind: LinkKind,
}

#[derive(Clone, Debug, Default)]
pub struct FrameScene {
    pub nodes: Vec<NodeSprite>,
    pub links: Vec<LinkSprite>,
}

impl GraphView {
    /// Renderable projection of the current frame: screen-space positions and
    /// attributes for every visible node and link. Drawing is the embedder's
    /// job.
    pub fn scene(&mut self) -> FrameScene {
        self.ensure_visible();

        let hovered = self.cursor.and_then(|pos| self.hit_test(pos));

        let nodes = self
            .visible
            .iter()
            .map(|&index| {
                let record = &self.graph.nodes[index];
                NodeSprite {
                    id: record.id.clone(),
                    screen_pos: self.camera.world_to_screen(self.sim[index].pos),
                    radius: node_screen_radius(record.size, self.camera.scale),
                    color: record.color.unwrap_or_else(|| kind_color(record.kind)),
                    label: record.label.clone(),
                    hovered: hovered == Some(index),
                    selected: self.selected == Some(index),
                    matched: self.search_matches.contains(&index),
                }
            })
            .collect();

        let links = self
            .visible_links
            .iter()
            .map(|&link_index| {
                let link = &self.graph.links[link_index];
                LinkSprite {
                    start: self.camera.world_to_screen(self.sim[link.source].pos),
                    end: self.camera.world_to_screen(self.sim[link.target].pos),
                    width: link_stroke_width(link.strength),
                    kind: link.kind,
                }
            })
            .collect();

        FrameScene { nodes, links }
    }
}
