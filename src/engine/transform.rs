use eframe::egui::{Color32, Pos2, Vec2, pos2, vec2};

use crate::graph::NodeKind;

pub(super) const MIN_SCALE: f32 = 0.4;
pub(super) const MAX_SCALE: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Camera {
    pub offset: Vec2,
    pub scale: f32,
}

impl Camera {
    pub(crate) fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }

    pub(crate) fn world_to_screen(&self, world: Vec2) -> Pos2 {
        pos2(
            world.x * self.scale + self.offset.x,
            world.y * self.scale + self.offset.y,
        )
    }

    pub(crate) fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        vec2(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    pub(crate) fn zoom_by(&mut self, delta: f32) {
        self.scale = (self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }
}

pub(crate) fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Entry => Color32::from_rgb(240, 193, 104),
        NodeKind::Tag => Color32::from_rgb(108, 178, 235),
        NodeKind::Topic => Color32::from_rgb(126, 206, 144),
        NodeKind::Date => Color32::from_rgb(186, 140, 222),
    }
}

pub(crate) fn link_stroke_width(strength: f32) -> f32 {
    0.6 + strength.clamp(0.0, 1.0) * 2.4
}

pub(crate) fn node_screen_radius(size: f32, scale: f32) -> f32 {
    (size * 0.5 * scale).max(2.0)
}
