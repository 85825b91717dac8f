use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::physics::{BASE_PADDING, fallback_direction};

const CELL_CAP: f32 = 160.0;
const GOLDEN_ANGLE: f32 = TAU * 0.381_966;
const SPIRAL_SCALE: f32 = 0.08;
const SPIRAL_CAP: f32 = 0.3;
const SPACING_FACTOR: f32 = 0.8;
const RELAX_PASSES: usize = 3;
const RELAX_FRACTION: f32 = 0.45;

/// Computes a decluttered target position for every visible node: a
/// degree-ranked grid with a spiral perturbation, followed by a few passes
/// that space out linked nodes that landed too close. Pure; the caller owns
/// pinning and the settle window.
pub(super) fn declutter_layout(
    nodes: &[(usize, f32)],
    links: &[(usize, usize)],
    viewport: Vec2,
) -> Vec<(usize, Vec2)> {
    if nodes.len() < 2 {
        return Vec::new();
    }

    let side = (nodes.len() as f32).sqrt().ceil() as usize;
    let cell = CELL_CAP
        .min(viewport.x / side as f32)
        .min(viewport.y / side as f32);

    let mut degree: HashMap<usize, usize> = HashMap::with_capacity(nodes.len());
    for &(source, target) in links {
        *degree.entry(source).or_default() += 1;
        *degree.entry(target).or_default() += 1;
    }

    let mut ranked = nodes.to_vec();
    ranked.sort_by(|a, b| {
        let degree_a = degree.get(&a.0).copied().unwrap_or(0);
        let degree_b = degree.get(&b.0).copied().unwrap_or(0);
        degree_b.cmp(&degree_a).then_with(|| a.0.cmp(&b.0))
    });

    let rows = nodes.len().div_ceil(side);
    let origin = (viewport - vec2((side - 1) as f32 * cell, (rows - 1) as f32 * cell)) * 0.5;

    let mut positions = Vec::with_capacity(ranked.len());
    let mut slot_by_node = HashMap::with_capacity(ranked.len());
    for (rank, &(index, _size)) in ranked.iter().enumerate() {
        let col = rank % side;
        let row = rank / side;
        let grid = origin + vec2(col as f32 * cell, row as f32 * cell);

        let angle = rank as f32 * GOLDEN_ANGLE;
        let radius = ((rank as f32).sqrt() * SPIRAL_SCALE * cell).min(SPIRAL_CAP * cell);
        let perturbed = grid + vec2(angle.cos(), angle.sin()) * radius;

        slot_by_node.insert(index, rank);
        positions.push(perturbed);
    }

    for _ in 0..RELAX_PASSES {
        relax_pass(&mut positions, &slot_by_node, links, cell * SPACING_FACTOR);
    }

    ranked
        .iter()
        .zip(positions)
        .map(|(&(index, size), pos)| {
            let padding = BASE_PADDING + size * 0.5;
            let clamped = vec2(
                pos.x.clamp(padding, (viewport.x - padding).max(padding)),
                pos.y.clamp(padding, (viewport.y - padding).max(padding)),
            );
            (index, clamped)
        })
        .collect()
}

fn relax_pass(
    positions: &mut [Vec2],
    slot_by_node: &HashMap<usize, usize>,
    links: &[(usize, usize)],
    min_distance: f32,
) {
    for &(source, target) in links {
        let (Some(&a), Some(&b)) = (slot_by_node.get(&source), slot_by_node.get(&target)) else {
            continue;
        };

        let delta = positions[b] - positions[a];
        let distance = delta.length();
        if distance >= min_distance {
            continue;
        }

        let direction = if distance <= f32::EPSILON {
            fallback_direction(a + b)
        } else {
            delta / distance
        };

        let shift = direction * ((min_distance - distance) * RELAX_FRACTION * 0.5);
        positions[a] -= shift;
        positions[b] += shift;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use eframe::egui::{Vec2, vec2};

    use super::{declutter_layout, relax_pass};

    fn viewport() -> Vec2 {
        vec2(900.0, 600.0)
    }

    #[test]
    fn zero_and_one_node_are_no_ops() {
        assert!(declutter_layout(&[], &[], viewport()).is_empty());
        assert!(declutter_layout(&[(3, 20.0)], &[], viewport()).is_empty());
    }

    #[test]
    fn targets_cover_every_node_and_stay_in_bounds() {
        let nodes = (0..11).map(|i| (i, 24.0)).collect::<Vec<_>>();
        let links = vec![(0, 1), (1, 2), (2, 3), (0, 4)];

        let targets = declutter_layout(&nodes, &links, viewport());
        assert_eq!(targets.len(), nodes.len());

        let padding = 12.0 + 12.0;
        for &(_, pos) in &targets {
            assert!(pos.x >= padding && pos.x <= viewport().x - padding);
            assert!(pos.y >= padding && pos.y <= viewport().y - padding);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let nodes = (0..9).map(|i| (i, 20.0)).collect::<Vec<_>>();
        let links = vec![(0, 1), (2, 5), (7, 8)];

        let first = declutter_layout(&nodes, &links, viewport());
        let second = declutter_layout(&nodes, &links, viewport());
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.0, b.0);
            assert_eq!(a.1, b.1);
        }
    }

    #[test]
    fn highest_degree_node_is_placed_first() {
        // Node 5 has three incident links, everything else at most one.
        let nodes = (0..6).map(|i| (i, 20.0)).collect::<Vec<_>>();
        let links = vec![(5, 0), (5, 1), (5, 2)];

        let targets = declutter_layout(&nodes, &links, viewport());
        let by_node: HashMap<usize, _> = targets.into_iter().collect();

        // First grid slot is the top-left corner of the centered grid.
        let hub = by_node[&5];
        for (&index, &pos) in &by_node {
            if index != 5 {
                assert!(hub.x <= pos.x + 1e-3 || hub.y < pos.y);
            }
        }
    }

    #[test]
    fn relax_pass_pushes_close_linked_nodes_apart() {
        let mut positions = vec![vec2(100.0, 100.0), vec2(110.0, 100.0)];
        let slots: HashMap<usize, usize> = [(0, 0), (1, 1)].into_iter().collect();

        relax_pass(&mut positions, &slots, &[(0, 1)], 80.0);

        let after = (positions[1] - positions[0]).length();
        assert!(after > 10.0);
        assert!(after < 80.0, "one pass moves a fraction of the gap, not all of it");
    }

    #[test]
    fn relax_pass_separates_coincident_linked_nodes() {
        let mut positions = vec![vec2(50.0, 50.0), vec2(50.0, 50.0)];
        let slots: HashMap<usize, usize> = [(0, 0), (1, 1)].into_iter().collect();

        relax_pass(&mut positions, &slots, &[(0, 1)], 80.0);

        assert!((positions[1] - positions[0]).length() > 1.0);
    }

    #[test]
    fn relax_pass_leaves_distant_pairs_alone() {
        let mut positions = vec![vec2(0.0, 0.0), vec2(200.0, 0.0)];
        let slots: HashMap<usize, usize> = [(0, 0), (1, 1)].into_iter().collect();

        relax_pass(&mut positions, &slots, &[(0, 1)], 80.0);

        assert_eq!(positions[0], vec2(0.0, 0.0));
        assert_eq!(positions[1], vec2(200.0, 0.0));
    }
}
