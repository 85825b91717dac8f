use anyhow::{Context, Result};
use eframe::egui::Color32;
use serde::Deserialize;

use super::{
    ContentGraph, DEFAULT_LINK_STRENGTH, DEFAULT_NODE_SIZE, LinkKind, LinkSpec, NodeKind,
    NodeMetadata, NodeRecord,
};

#[derive(Clone, Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    size: Option<f32>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    metadata: NodeMetadata,
}

#[derive(Clone, Debug, Deserialize)]
struct RawLink {
    source: String,
    target: String,
    #[serde(default)]
    strength: Option<f32>,
    #[serde(rename = "type", default)]
    kind: Option<LinkKind>,
}

pub fn parse_snapshot(raw: &str) -> Result<ContentGraph> {
    let snapshot: RawSnapshot =
        serde_json::from_str(raw).context("invalid graph snapshot JSON")?;

    let nodes = snapshot
        .nodes
        .into_iter()
        .map(|raw_node| {
            let label = raw_node
                .label
                .filter(|label| !label.trim().is_empty())
                .unwrap_or_else(|| raw_node.id.clone());

            NodeRecord {
                label,
                kind: raw_node.kind,
                size: raw_node.size.unwrap_or(DEFAULT_NODE_SIZE),
                color: raw_node.color.as_deref().and_then(parse_color),
                metadata: raw_node.metadata,
                id: raw_node.id,
            }
        })
        .collect::<Vec<_>>();

    let links = snapshot
        .links
        .into_iter()
        .map(|raw_link| LinkSpec {
            source: raw_link.source,
            target: raw_link.target,
            strength: raw_link.strength.unwrap_or(DEFAULT_LINK_STRENGTH),
            kind: raw_link.kind.unwrap_or(LinkKind::Semantic),
        })
        .collect::<Vec<_>>();

    Ok(ContentGraph::new(nodes, links))
}

fn parse_color(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}
