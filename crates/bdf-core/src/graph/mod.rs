//! Gene-centred network built from the unified table
//!
//! Every row becomes a `gene` node. Recognised annotation columns add one node per
//! record and an edge from the gene to it; any other column is ignored.

pub mod cytoscape;

use crate::annotators::{
    CHEMBL_DRUGS_COLUMN, DISGENET_COLUMN, GO_PROCESS_COLUMN, OPENTARGETS_DISEASES_COLUMN,
    OPENTARGETS_LOCATION_COLUMN, REACTOME_COLUMN, WIKIPATHWAYS_COLUMN,
};
use crate::model::{Record, UnifiedRow, UnifiedTable};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Kinds of node, also the `node_type` attribute seen in Cytoscape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    #[serde(rename = "gene")]
    Gene,
    #[serde(rename = "disease")]
    Disease,
    #[serde(rename = "gene ontology")]
    GeneOntology,
    #[serde(rename = "reactome pathways")]
    ReactomePathway,
    #[serde(rename = "wikipathways")]
    WikiPathway,
    #[serde(rename = "drug interactions")]
    Drug,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Gene,
        NodeType::Disease,
        NodeType::GeneOntology,
        NodeType::ReactomePathway,
        NodeType::WikiPathway,
        NodeType::Drug,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NodeType::Gene => "gene",
            NodeType::Disease => "disease",
            NodeType::GeneOntology => "gene ontology",
            NodeType::ReactomePathway => "reactome pathways",
            NodeType::WikiPathway => "wikipathways",
            NodeType::Drug => "drug interactions",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    /// Extra attributes copied from the annotation record
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub interaction: String,
}

/// Nodes and edges, both free of duplicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Network {
    /// A network without nodes or without edges is not worth pushing
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.edges.is_empty()
    }

    pub fn nodes_of(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }

    /// Cytoscape.js JSON, accepted by CyREST `POST /v1/networks?format=cyjs`
    pub fn to_cyjs(&self, title: &str) -> Value {
        let nodes: Vec<Value> = self
            .nodes
            .iter()
            .map(|node| {
                let mut data = node.attributes.clone();
                data.insert("id".into(), json!(node.id));
                data.insert("name".into(), json!(node.name));
                data.insert("node_type".into(), json!(node.node_type.label()));
                json!({ "data": data })
            })
            .collect();
        let edges: Vec<Value> = self
            .edges
            .iter()
            .map(|edge| {
                json!({ "data": {
                    "source": edge.source,
                    "target": edge.target,
                    "interaction": edge.interaction,
                }})
            })
            .collect();

        json!({
            "data": { "name": title },
            "elements": { "nodes": nodes, "edges": edges },
        })
    }

    fn add_node(&mut self, seen: &mut HashSet<String>, node: Node) {
        if !node.id.is_empty() && seen.insert(node.id.clone()) {
            self.nodes.push(node);
        }
    }

    fn add_edge(&mut self, seen: &mut HashSet<Edge>, edge: Edge) {
        if !edge.source.is_empty() && !edge.target.is_empty() && seen.insert(edge.clone()) {
            self.edges.push(edge);
        }
    }
}

enum Interaction {
    Fixed(&'static str),
    /// Taken from a record field
    Field(&'static str),
}

/// How one annotation column turns into nodes
struct NodeSource {
    column: &'static str,
    node_type: NodeType,
    id_field: &'static str,
    name_field: &'static str,
    datasource: &'static str,
    interaction: Interaction,
    /// (record field, node attribute)
    attributes: &'static [(&'static str, &'static str)],
}

const NODE_SOURCES: &[NodeSource] = &[
    NodeSource {
        column: DISGENET_COLUMN,
        node_type: NodeType::Disease,
        id_field: "diseaseid",
        name_field: "disease_name",
        datasource: "DisGeNET",
        interaction: Interaction::Fixed("association"),
        attributes: &[
            ("disease_class", "disease_class"),
            ("disease_class_name", "disease_class_name"),
            ("disease_type", "disease_type"),
            ("disease_semantic_type", "disease_semantic_type"),
            ("score", "disgenet_score"),
            ("ei", "ei"),
            ("el", "el"),
            ("source", "source"),
        ],
    },
    NodeSource {
        column: OPENTARGETS_DISEASES_COLUMN,
        node_type: NodeType::Disease,
        id_field: "disease_id",
        name_field: "disease_name",
        datasource: "OpenTargets",
        interaction: Interaction::Fixed("association"),
        attributes: &[("therapeutic_areas", "therapeutic_areas")],
    },
    NodeSource {
        column: GO_PROCESS_COLUMN,
        node_type: NodeType::GeneOntology,
        id_field: "go_id",
        name_field: "go_name",
        datasource: "OpenTargets",
        interaction: Interaction::Fixed("part of"),
        attributes: &[],
    },
    NodeSource {
        column: REACTOME_COLUMN,
        node_type: NodeType::ReactomePathway,
        id_field: "pathway_id",
        name_field: "pathway_name",
        datasource: "OpenTargets",
        interaction: Interaction::Fixed("part of"),
        attributes: &[],
    },
    NodeSource {
        column: WIKIPATHWAYS_COLUMN,
        node_type: NodeType::WikiPathway,
        id_field: "pathway_id",
        name_field: "pathway_label",
        datasource: "WikiPathways",
        interaction: Interaction::Fixed("part of"),
        attributes: &[("pathway_gene_count", "gene_count")],
    },
    NodeSource {
        column: CHEMBL_DRUGS_COLUMN,
        node_type: NodeType::Drug,
        id_field: "chembl_id",
        name_field: "drug_name",
        datasource: "OpenTargets",
        interaction: Interaction::Field("relation"),
        attributes: &[("relation", "drug_gene_relation")],
    },
];

/// Build the gene-centred network of `table`
pub fn build_network(table: &UnifiedTable) -> Network {
    let mut network = Network::default();
    let mut seen_nodes = HashSet::new();
    let mut seen_edges = HashSet::new();

    for row in table.rows() {
        let gene = gene_node(row);
        let gene_id = gene.id.clone();
        network.add_node(&mut seen_nodes, gene);

        for source in NODE_SOURCES {
            let Some(cell) = row.cell(source.column) else {
                continue;
            };
            for record in cell.records() {
                let id = text_field(record, source.id_field);
                let interaction = match source.interaction {
                    Interaction::Fixed(label) => label.to_string(),
                    Interaction::Field(field) => text_field(record, field),
                };

                let mut attributes = Map::new();
                attributes.insert("datasource".into(), json!(source.datasource));
                for (field, attribute) in source.attributes {
                    if let Some(value) = record.get(*field).filter(|v| !is_blank(v)) {
                        attributes.insert(attribute.to_string(), value.clone());
                    }
                }

                network.add_node(
                    &mut seen_nodes,
                    Node {
                        id: id.clone(),
                        name: text_field(record, source.name_field),
                        node_type: source.node_type,
                        attributes,
                    },
                );
                network.add_edge(
                    &mut seen_edges,
                    Edge {
                        source: gene_id.clone(),
                        target: id,
                        interaction,
                    },
                );
            }
        }
    }
    network
}

fn gene_node(row: &UnifiedRow) -> Node {
    let (id, id_source) = match row.primary_target() {
        Some(target) => (target.id.clone(), target.source.clone()),
        None => (String::new(), String::new()),
    };

    let mut attributes = Map::new();
    attributes.insert("id_source".into(), json!(id_source));

    let locations: Vec<Value> = row
        .cell(OPENTARGETS_LOCATION_COLUMN)
        .and_then(|cell| cell.records().first())
        .and_then(|record| record.get("location"))
        .filter(|v| !is_blank(v))
        .cloned()
        .into_iter()
        .collect();
    attributes.insert("gene_location".into(), Value::Array(locations));

    if let Some(first) = row.cell(DISGENET_COLUMN).and_then(|cell| cell.records().first()) {
        for field in ["gene_dsi", "gene_dpi", "gene_pli"] {
            if let Some(value) = first.get(field).filter(|v| !is_blank(v)) {
                attributes.insert(field.to_string(), value.clone());
            }
        }
    }

    Node {
        id,
        name: row.identifier.clone(),
        node_type: NodeType::Gene,
        attributes,
    }
}

fn text_field(record: &Record, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
