//! Links are kept only when their Jaccard index is above
//! [`SimilarityOptions::threshold`]. Raising it sparsifies the graph; near 0
//! almost every pair of diseases is connected.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::normalize::DiseaseGoRow;

pub const DEFAULT_THRESHOLD: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityOptions {
    pub threshold: f64,
}

impl Default for SimilarityOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub go_terms: Vec<String>,
    pub total_species_support: i64,
}

impl GraphNode {
    pub fn term_count(&self) -> usize {
        self.go_terms.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub jaccard: f64,
    pub intersection: usize,
    pub union: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimilarityGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl SimilarityGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[derive(Debug, Default)]
struct NodeBuilder {
    name: String,
    terms: IndexSet<String>,
    support: i64,
}

pub fn build_graph(rows: &[DiseaseGoRow], options: SimilarityOptions) -> SimilarityGraph {
    let mut diseases: IndexMap<&str, NodeBuilder> = IndexMap::new();
    for row in rows {
        let entry = diseases
            .entry(row.disease_id.as_str())
            .or_insert_with(|| NodeBuilder {
                name: row.disease_label.clone(),
                ..NodeBuilder::default()
            });
        if !row.go_term.is_empty() {
            entry.terms.insert(row.go_term.clone());
        }
        entry.support = entry.support.saturating_add(row.supporting_species);
    }

    let sets: Vec<(&str, IndexSet<String>)> = diseases
        .iter()
        .map(|(id, builder)| (*id, builder.terms.clone()))
        .collect();

    let mut links = Vec::new();
    for (i, (id_a, set_a)) in sets.iter().enumerate() {
        for (id_b, set_b) in sets.iter().skip(i + 1) {
            let overlap = Overlap::of(set_a, set_b);
            if overlap.jaccard() > options.threshold {
                links.push(GraphLink {
                    source: id_a.to_string(),
                    target: id_b.to_string(),
                    jaccard: overlap.jaccard(),
                    intersection: overlap.intersection,
                    union: overlap.union,
                });
            }
        }
    }

    let nodes = diseases
        .into_iter()
        .map(|(id, builder)| GraphNode {
            id: id.to_string(),
            name: builder.name,
            go_terms: builder.terms.into_iter().collect(),
            total_species_support: builder.support,
        })
        .collect();

    SimilarityGraph { nodes, links }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub intersection: usize,
    pub union: usize,
}

impl Overlap {
    pub fn of(a: &IndexSet<String>, b: &IndexSet<String>) -> Self {
        let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        let intersection = small.iter().filter(|term| large.contains(*term)).count();
        Self {
            intersection,
            union: a.len() + b.len() - intersection,
        }
    }

    pub fn jaccard(&self) -> f64 {
        if self.union == 0 {
            0.0
        } else {
            self.intersection as f64 / self.union as f64
        }
    }
}

pub fn jaccard(a: &IndexSet<String>, b: &IndexSet<String>) -> f64 {
    Overlap::of(a, b).jaccard()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSummary {
    pub most_annotated: Option<NodeHighlight>,
    pub strongest_support: Option<NodeHighlight>,
    pub most_similar_pair: Option<PairHighlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeHighlight {
    pub id: String,
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairHighlight {
    pub source: String,
    pub target: String,
    pub jaccard: f64,
}

impl GraphSummary {
    pub fn from_graph(graph: &SimilarityGraph) -> Self {
        let most_annotated = max_first(&graph.nodes, |node| node.term_count() as i64)
            .map(|node| NodeHighlight {
                id: node.id.clone(),
                name: node.name.clone(),
                value: node.term_count() as i64,
            });
        let strongest_support = max_first(&graph.nodes, |node| node.total_species_support)
            .map(|node| NodeHighlight {
                id: node.id.clone(),
                name: node.name.clone(),
                value: node.total_species_support,
            });
        let mut strongest: Option<&GraphLink> = None;
        for link in &graph.links {
            if strongest.is_none_or(|best| link.jaccard > best.jaccard) {
                strongest = Some(link);
            }
        }
        let name_of = |id: &str| {
            graph
                .node(id)
                .map(|node| node.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        let most_similar_pair = strongest.map(|link| PairHighlight {
            source: name_of(&link.source),
            target: name_of(&link.target),
            jaccard: link.jaccard,
        });
        Self {
            most_annotated,
            strongest_support,
            most_similar_pair,
        }
    }
}

fn max_first<T, F>(items: &[T], key: F) -> Option<&T>
where
    F: Fn(&T) -> i64,
{
    let mut best: Option<&T> = None;
    for item in items {
        if best.is_none_or(|current| key(item) > key(current)) {
            best = Some(item);
        }
    }
    best
}
