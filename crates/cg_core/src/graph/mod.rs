//! # Frame Graphs
//!
//! Node/edge vocabulary shared by the frame graph builder and the
//! possession resolver.
//!
//! ## Node ids
//! - 0..=9: players, in input column order (`player1` .. `player10`)
//! - 10: ball
//! - 11, 12: basket 1, basket 2

pub mod builder;
pub mod spanning;

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::geometry::{euclidean_distance, Point};
use crate::models::{GameClock, TeamId};

pub use builder::{
    Bare, BallLinked, BallNode, Baskets, FrameGraphBuilder, PlayerNodes, Skeleton,
    SpanningForest, TeamEdges,
};
pub use spanning::minimum_spanning_forest;

pub type NodeId = u8;

/// Display identity of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeName {
    /// Player name from the feed
    Player(String),
    /// Ball/basket sentinel (-1, -2, -3 by default)
    Sentinel(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub name: NodeName,
    #[serde(flatten)]
    pub position: Point,
    /// `None` for the ball and baskets; serialized as -1
    #[serde(serialize_with = "team_or_sentinel")]
    pub team: Option<TeamId>,
}

fn team_or_sentinel<S: Serializer>(team: &Option<TeamId>, s: S) -> Result<S::Ok, S::Error> {
    match team {
        Some(team) => s.serialize_str(team.as_str()),
        None => s.serialize_i32(-1),
    }
}

/// Undirected weighted edge, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: f64,
}

impl Edge {
    pub fn touches(&self, id: NodeId) -> bool {
        self.a == id || self.b == id
    }

    /// The endpoint opposite `id`, if the edge touches `id`.
    pub fn other(&self, id: NodeId) -> Option<NodeId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

fn edge_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Mutable node/edge storage owned by one build.
///
/// Nodes keep insertion order; edges are keyed by their unordered endpoint
/// pair, so re-adding an edge overwrites its weight.
#[derive(Debug, Clone, Default)]
pub(crate) struct GraphState {
    nodes: Vec<Node>,
    edges: BTreeMap<(NodeId, NodeId), f64>,
}

impl GraphState {
    pub(crate) fn add_node(&mut self, node: Node) {
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Add an edge weighted by the current distance between its endpoints.
    /// Self-loops and unknown endpoints are ignored.
    pub(crate) fn connect(&mut self, a: NodeId, b: NodeId) -> Option<f64> {
        if a == b {
            return None;
        }
        let pa = self.node(a)?.position;
        let pb = self.node(b)?.position;
        let weight = euclidean_distance(pa, pb);
        self.edges.insert(edge_key(a, b), weight);
        Some(weight)
    }

    pub(crate) fn insert_edge(&mut self, edge: Edge) {
        if edge.a != edge.b {
            self.edges.insert(edge_key(edge.a, edge.b), edge.weight);
        }
    }

    pub(crate) fn edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .map(|(&(a, b), &weight)| Edge { a, b, weight })
            .collect()
    }

    pub(crate) fn clear_edges(&mut self) {
        self.edges.clear();
    }

    pub(crate) fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        let edges = self.edges();
        (self.nodes, edges)
    }
}

/// The finished graph for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    distance_rim: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    quarter: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clock: Option<GameClock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shot_clock: Option<f64>,
}

impl FrameGraph {
    pub(crate) fn from_state(
        state: GraphState,
        distance_rim: f64,
        quarter: Option<u8>,
        clock: Option<GameClock>,
        shot_clock: Option<f64>,
    ) -> Self {
        let (nodes, edges) = state.into_parts();
        Self {
            nodes,
            edges,
            distance_rim,
            quarter,
            clock,
            shot_clock,
        }
    }

    /// Nodes in insertion order (players, ball, baskets).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges sorted by endpoint pair.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let (a, b) = edge_key(a, b);
        self.edges
            .iter()
            .find(|e| e.a == a && e.b == b)
            .map(|e| e.weight)
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.iter().filter_map(move |e| e.other(id))
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).count()
    }

    /// Distance from the ball to its nearer basket.
    pub fn distance_rim(&self) -> f64 {
        self.distance_rim
    }

    pub fn quarter(&self) -> Option<u8> {
        self.quarter
    }

    pub fn clock(&self) -> Option<GameClock> {
        self.clock
    }

    /// Seconds left on the shot clock, when the frame carried one.
    pub fn shot_clock(&self) -> Option<f64> {
        self.shot_clock
    }
}
