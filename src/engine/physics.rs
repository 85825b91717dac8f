use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::graph::{LinkRecord, NodeRecord};

use super::{ForceTuning, PhysicsScratch, SimNode};

pub(super) const WARM_START_TICKS: usize = 100;
pub(super) const BASE_LINK_DISTANCE: f32 = 110.0;
pub(super) const BASE_PADDING: f32 = 12.0;

// Floors squared distances so coincident nodes never produce infinite force.
const DISTANCE_EPSILON: f32 = 1e-4;

pub(super) fn fallback_direction(index: usize) -> Vec2 {
    let angle = ((index as f32) * 0.618_034 + 0.37) * TAU;
    vec2(angle.cos(), angle.sin())
}

/// One fixed time-step. All impulses are accumulated from the pre-tick
/// position snapshot before any node advances, so the result does not depend
/// on node order.
pub(super) fn step(
    records: &[NodeRecord],
    links: &[LinkRecord],
    visible: &[usize],
    visible_links: &[usize],
    sim: &mut [SimNode],
    scratch: &mut PhysicsScratch,
    viewport: Vec2,
    forces: &ForceTuning,
) {
    if visible.is_empty() {
        return;
    }

    scratch.positions.clear();
    scratch.positions.extend(sim.iter().map(|node| node.pos));
    scratch.impulses.clear();
    scratch.impulses.resize(sim.len(), Vec2::ZERO);

    let positions = &scratch.positions;
    let impulses = &mut scratch.impulses;

    for (slot, &a) in visible.iter().enumerate() {
        for &b in &visible[slot + 1..] {
            let delta = positions[a] - positions[b];
            let distance_sq = delta.length_sq().max(DISTANCE_EPSILON);
            let direction = if delta.length_sq() <= DISTANCE_EPSILON {
                fallback_direction(a + b)
            } else {
                delta / distance_sq.sqrt()
            };

            let push = forces.repel * records[a].size * records[b].size / distance_sq;
            impulses[a] += direction * push;
            impulses[b] -= direction * push;
        }
    }

    let center = viewport * 0.5;
    for &index in visible {
        impulses[index] += (center - positions[index]) * forces.center;
    }

    for &link_index in visible_links {
        let link = &links[link_index];
        let delta = positions[link.target] - positions[link.source];
        let distance_sq = delta.length_sq();
        let (distance, direction) = if distance_sq <= DISTANCE_EPSILON {
            (DISTANCE_EPSILON.sqrt(), fallback_direction(link.source + link.target))
        } else {
            let distance = distance_sq.sqrt();
            (distance, delta / distance)
        };

        let rest = BASE_LINK_DISTANCE + records[link.source].size * 0.5 + records[link.target].size * 0.5;
        let pull = (distance - rest) * link.strength * forces.link;
        impulses[link.source] += direction * pull;
        impulses[link.target] -= direction * pull;
    }

    for &index in visible {
        let node = &mut sim[index];

        if let Some(pin) = node.pin() {
            node.pos = pin;
            node.vel = Vec2::ZERO;
            continue;
        }

        node.vel = (node.vel + impulses[index]) * forces.damping;
        node.pos += node.vel;

        let padding = BASE_PADDING + records[index].size * 0.5;
        node.pos.x = node.pos.x.clamp(padding, (viewport.x - padding).max(padding));
        node.pos.y = node.pos.y.clamp(padding, (viewport.y - padding).max(padding));
    }
}
