//! # Frame Graph Builder
//!
//! Builds one [`FrameGraph`] per frame through a fixed sequence of stages.
//! Each stage is its own type and only exposes the next step, so stages
//! cannot be skipped or reordered:
//!
//! ```text
//! PlayerNodes ─connect_teammates─▶ TeamEdges ─reduce_to_spanning_forest─▶ SpanningForest
//!      │                                                                      │
//!   add_ball (possession path)                                             add_ball
//!      ▼                                                                      ▼
//! BallNode<Bare> ──connect_nearest_player──▶ BallLinked<Bare>     BallNode<Skeleton>
//!                                                                             │
//!                                        BallLinked<Skeleton> ◀─connect_nearest_player
//!                                                │
//!                                           add_baskets ─▶ Baskets ─connect_ball_to_basket─▶ FrameGraph
//! ```

use std::marker::PhantomData;

use tracing::{debug, warn};

use super::spanning::minimum_spanning_forest;
use super::{FrameGraph, GraphState, Node, NodeId, NodeName};
use crate::config::CourtConfig;
use crate::error::{GraphError, Result};
use crate::geometry::{euclidean_distance, Point};
use crate::models::{FrameRecord, Moment, TeamList};

/// Marker: the team skeleton (team edges + spanning forest) was built.
#[derive(Debug)]
pub struct Skeleton;

/// Marker: the team skeleton was skipped (possession path).
#[derive(Debug)]
pub struct Bare;

/// Inputs shared by every stage of one build.
#[derive(Debug, Clone, Copy)]
struct Scope<'a> {
    config: &'a CourtConfig,
    teams: &'a TeamList,
    moment: &'a Moment,
}

/// Entry point: court constants plus the dataset's two teams.
#[derive(Debug, Clone, Copy)]
pub struct FrameGraphBuilder<'a> {
    config: &'a CourtConfig,
    teams: &'a TeamList,
}

impl<'a> FrameGraphBuilder<'a> {
    /// Fails with `InvalidConfig` when the court configuration would let a
    /// ball or basket node replace a player node.
    pub fn new(config: &'a CourtConfig, teams: &'a TeamList) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, teams })
    }

    pub fn config(&self) -> &'a CourtConfig {
        self.config
    }

    pub fn teams(&self) -> &'a TeamList {
        self.teams
    }

    /// Validate a raw record and run every stage on it.
    pub fn build(&self, record: &FrameRecord) -> Result<FrameGraph> {
        let moment = Moment::from_record(record)?;
        self.build_moment(&moment)
    }

    /// Run every stage on an already validated frame.
    pub fn build_moment(&self, moment: &Moment) -> Result<FrameGraph> {
        let graph = self
            .start(moment)
            .connect_teammates()
            .reduce_to_spanning_forest()
            .add_ball()
            .connect_nearest_player()?
            .add_baskets()
            .connect_ball_to_basket();
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            distance_rim = graph.distance_rim(),
            "frame graph built"
        );
        Ok(graph)
    }

    /// Stage 1: one node per player, ids 0..=9 in column order.
    pub fn start<'m>(&self, moment: &'m Moment) -> PlayerNodes<'m>
    where
        'a: 'm,
    {
        let scope = Scope {
            config: self.config,
            teams: self.teams,
            moment,
        };
        let mut state = GraphState::default();
        for (index, player) in moment.players.iter().enumerate() {
            state.add_node(Node {
                id: index as NodeId,
                name: NodeName::Player(player.name.clone()),
                position: player.position,
                team: Some(player.team.clone()),
            });
        }
        PlayerNodes { scope, state }
    }
}

/// Player nodes only.
#[derive(Debug)]
pub struct PlayerNodes<'a> {
    scope: Scope<'a>,
    state: GraphState,
}

impl<'a> PlayerNodes<'a> {
    /// Stage 2: every within-team pair becomes a candidate edge.
    ///
    /// Players whose team is in neither slot of the team list get no edges.
    pub fn connect_teammates(mut self) -> TeamEdges<'a> {
        for team in self.scope.teams.iter() {
            let members: Vec<NodeId> = self
                .state
                .nodes()
                .iter()
                .filter(|n| n.team.as_ref() == Some(team))
                .map(|n| n.id)
                .collect();
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    self.state.connect(a, b);
                }
            }
        }

        for node in self.state.nodes() {
            if let Some(team) = &node.team {
                if !self.scope.teams.contains(team) {
                    warn!(node = node.id, team = %team, "player team not in team list; left unconnected");
                }
            }
        }

        TeamEdges {
            scope: self.scope,
            state: self.state,
        }
    }

    /// Skip the team skeleton and go straight to the ball.
    pub fn add_ball(self) -> BallNode<'a, Bare> {
        BallNode::attach(self.scope, self.state)
    }

    pub fn nodes(&self) -> &[Node] {
        self.state.nodes()
    }
}

/// Players plus all within-team candidate edges.
#[derive(Debug)]
pub struct TeamEdges<'a> {
    scope: Scope<'a>,
    state: GraphState,
}

impl<'a> TeamEdges<'a> {
    pub fn candidate_count(&self) -> usize {
        self.state.edges().len()
    }

    /// Stage 3: keep only the minimum spanning forest of the candidates.
    pub fn reduce_to_spanning_forest(mut self) -> SpanningForest<'a> {
        let ids: Vec<NodeId> = self.state.nodes().iter().map(|n| n.id).collect();
        let candidates = self.state.edges();
        let forest = minimum_spanning_forest(&ids, &candidates);
        debug!(
            candidates = candidates.len(),
            kept = forest.len(),
            "team edges reduced to spanning forest"
        );
        self.state.clear_edges();
        for edge in forest {
            self.state.insert_edge(edge);
        }
        SpanningForest {
            scope: self.scope,
            state: self.state,
        }
    }
}

/// Players connected by one minimum spanning tree per team.
#[derive(Debug)]
pub struct SpanningForest<'a> {
    scope: Scope<'a>,
    state: GraphState,
}

impl<'a> SpanningForest<'a> {
    /// Stage 4: append the ball node.
    pub fn add_ball(self) -> BallNode<'a, Skeleton> {
        BallNode::attach(self.scope, self.state)
    }

    pub fn edges(&self) -> Vec<super::Edge> {
        self.state.edges()
    }
}

/// Graph with the ball node present but not yet connected.
#[derive(Debug)]
pub struct BallNode<'a, S> {
    scope: Scope<'a>,
    state: GraphState,
    ball: Point,
    _stage: PhantomData<S>,
}

impl<'a, S> BallNode<'a, S> {
    fn attach(scope: Scope<'a>, mut state: GraphState) -> Self {
        let ball = scope.moment.ball;
        state.add_node(Node {
            id: scope.config.ball_id,
            name: NodeName::Sentinel(scope.config.ball_name),
            position: ball,
            team: None,
        });
        Self {
            scope,
            state,
            ball,
            _stage: PhantomData,
        }
    }

    /// Stage 5: connect the ball to its nearest node.
    ///
    /// Ties go to the node inserted first, i.e. the lowest player id.
    pub fn connect_nearest_player(mut self) -> Result<BallLinked<'a, S>> {
        let ball_id = self.scope.config.ball_id;
        let mut nearest: Option<(NodeId, f64)> = None;
        for node in self.state.nodes().iter().filter(|n| n.id != ball_id) {
            let d = euclidean_distance(self.ball, node.position);
            match nearest {
                Some((_, best)) if d >= best => {}
                _ => nearest = Some((node.id, d)),
            }
        }
        let (player, distance) = nearest.ok_or(GraphError::NoPlayers)?;
        self.state.connect(player, ball_id);
        debug!(player, distance, "ball linked to nearest player");

        Ok(BallLinked {
            scope: self.scope,
            state: self.state,
            ball: self.ball,
            nearest_player: player,
            _stage: PhantomData,
        })
    }
}

/// Ball connected to its nearest player.
#[derive(Debug)]
pub struct BallLinked<'a, S> {
    scope: Scope<'a>,
    state: GraphState,
    ball: Point,
    nearest_player: NodeId,
    _stage: PhantomData<S>,
}

impl<'a, S> BallLinked<'a, S> {
    pub fn nearest_player(&self) -> NodeId {
        self.nearest_player
    }

    pub(crate) fn into_state(self) -> GraphState {
        self.state
    }
}

impl<'a> BallLinked<'a, Skeleton> {
    /// Stage 6: the two fixed basket nodes.
    pub fn add_baskets(mut self) -> Baskets<'a> {
        let cfg = self.scope.config;
        self.state.add_node(Node {
            id: cfg.basket1_id,
            name: NodeName::Sentinel(cfg.basket1_name),
            position: cfg.basket1,
            team: None,
        });
        self.state.add_node(Node {
            id: cfg.basket2_id,
            name: NodeName::Sentinel(cfg.basket2_name),
            position: cfg.basket2,
            team: None,
        });
        Baskets {
            scope: self.scope,
            state: self.state,
            ball: self.ball,
        }
    }
}

/// Full node set; only the ball-basket edge is missing.
#[derive(Debug)]
pub struct Baskets<'a> {
    scope: Scope<'a>,
    state: GraphState,
    ball: Point,
}

impl<'a> Baskets<'a> {
    /// Stage 7: connect the ball to the nearer basket and finish.
    ///
    /// Basket 1 wins only when strictly nearer; an exact tie goes to basket 2.
    /// `distance_rim` is the smaller distance either way.
    pub fn connect_ball_to_basket(mut self) -> FrameGraph {
        let cfg = self.scope.config;
        let to_basket1 = euclidean_distance(self.ball, cfg.basket1);
        let to_basket2 = euclidean_distance(self.ball, cfg.basket2);
        let distance_rim = to_basket1.min(to_basket2);

        let basket = if to_basket1 < to_basket2 {
            cfg.basket1_id
        } else {
            cfg.basket2_id
        };
        self.state.connect(cfg.ball_id, basket);

        let moment = self.scope.moment;
        FrameGraph::from_state(
            self.state,
            distance_rim,
            moment.quarter,
            moment.clock,
            moment.shot_clock,
        )
    }
}
