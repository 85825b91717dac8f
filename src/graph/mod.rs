use std::collections::HashMap;

use eframe::egui::Color32;
use serde::Deserialize;

mod parse;

pub use parse::parse_snapshot;

pub const DEFAULT_NODE_SIZE: f32 = 20.0;
pub const DEFAULT_LINK_STRENGTH: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Entry,
    Tag,
    Topic,
    Date,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [Self::Entry, Self::Tag, Self::Topic, Self::Date];

    pub fn label(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Tag => "tag",
            Self::Topic => "topic",
            Self::Date => "date",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Tag,
    Topic,
    Temporal,
    Semantic,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeMetadata {
    pub date: Option<String>,
    pub snippet: Option<String>,
    pub tags: Vec<String>,
    pub entry_id: Option<String>,
    pub entry_type: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub size: f32,
    pub color: Option<Color32>,
    pub metadata: NodeMetadata,
}

/// Link with endpoints resolved to indices into the node table. Records with
/// endpoints that do not resolve never make it into a `ContentGraph`.
#[derive(Clone, Debug)]
pub struct LinkRecord {
    pub source: usize,
    pub target: usize,
    pub strength: f32,
    pub kind: LinkKind,
}

#[derive(Clone, Debug)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
    pub strength: f32,
    pub kind: LinkKind,
}

#[derive(Clone, Debug)]
pub struct ContentGraph {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
    index_by_id: HashMap<String, usize>,
    dropped_links: usize,
    dropped_nodes: usize,
}

impl ContentGraph {
    pub fn new(records: Vec<NodeRecord>, link_specs: Vec<LinkSpec>) -> Self {
        let mut nodes = Vec::with_capacity(records.len());
        let mut index_by_id = HashMap::with_capacity(records.len());
        let mut dropped_nodes = 0usize;

        for mut record in records {
            if index_by_id.contains_key(&record.id) {
                dropped_nodes += 1;
                continue;
            }

            record.size = sanitize_size(record.size);
            index_by_id.insert(record.id.clone(), nodes.len());
            nodes.push(record);
        }

        let mut links = Vec::with_capacity(link_specs.len());
        let mut dropped_links = 0usize;

        for spec in link_specs {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&spec.source),
                index_by_id.get(&spec.target),
            ) else {
                dropped_links += 1;
                continue;
            };

            if source == target {
                dropped_links += 1;
                continue;
            }

            links.push(LinkRecord {
                source,
                target,
                strength: sanitize_strength(spec.strength),
                kind: spec.kind,
            });
        }

        if dropped_nodes > 0 {
            log::warn!("dropped {dropped_nodes} node(s) with duplicate ids");
        }
        if dropped_links > 0 {
            log::warn!("dropped {dropped_links} link(s) with unresolved or self-referential endpoints");
        }

        Self {
            nodes,
            links,
            index_by_id,
            dropped_links,
            dropped_nodes,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn dropped_links(&self) -> usize {
        self.dropped_links
    }

    pub fn dropped_nodes(&self) -> usize {
        self.dropped_nodes
    }
}

fn sanitize_size(size: f32) -> f32 {
    if size.is_finite() && size >= 0.0 {
        size
    } else {
        DEFAULT_NODE_SIZE
    }
}

fn sanitize_strength(strength: f32) -> f32 {
    if strength.is_finite() {
        strength.clamp(0.0, 1.0)
    } else {
        DEFAULT_LINK_STRENGTH
    }
}
