//! # Possession Resolver
//!
//! Reads off which team is in contact with the ball in one frame: the team
//! of the player nearest the ball. Uses only the player nodes, the ball node
//! and the ball-to-nearest-player edge; no team skeleton, no baskets.

use serde::Serialize;
use tracing::debug;

use crate::config::CourtConfig;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, FrameGraphBuilder, Node, NodeId};
use crate::models::{player_field, FrameRecord, Moment, TeamId, TeamList};

/// Possession result for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Possession {
    /// Node id of the player nearest the ball
    pub player: NodeId,
    pub team: TeamId,
}

/// Reduced graph for one frame with its possession team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PossessionGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    player_with_ball: NodeId,
    team_possession: TeamId,
}

impl PossessionGraph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node id of the player nearest the ball.
    pub fn player_with_ball(&self) -> NodeId {
        self.player_with_ball
    }

    pub fn team_possession(&self) -> &TeamId {
        &self.team_possession
    }

    pub fn possession(&self) -> Possession {
        Possession {
            player: self.player_with_ball,
            team: self.team_possession.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PossessionResolver<'a> {
    builder: FrameGraphBuilder<'a>,
    ball_id: NodeId,
    teams: &'a TeamList,
}

impl<'a> PossessionResolver<'a> {
    /// Fails with `InvalidConfig` on the same court configurations the
    /// graph builder refuses.
    pub fn new(config: &'a CourtConfig, teams: &'a TeamList) -> Result<Self> {
        Ok(Self {
            builder: FrameGraphBuilder::new(config, teams)?,
            ball_id: config.ball_id,
            teams,
        })
    }

    /// Resolve the possession team for one raw frame.
    pub fn resolve(&self, record: &FrameRecord) -> Result<PossessionGraph> {
        let moment = Moment::from_record(record)?;
        let ball_id = self.ball_id;

        let (nodes, edges) = self
            .builder
            .start(&moment)
            .add_ball()
            .connect_nearest_player()?
            .into_state()
            .into_parts();

        let player = edges
            .iter()
            .find_map(|e| e.other(ball_id))
            .ok_or(GraphError::NoPlayers)?;

        // Node ids map back to the 1-based player columns of the record.
        let team = TeamId(record.text(&player_field(player as usize, "team"))?);
        if !self.teams.contains(&team) {
            return Err(GraphError::UnknownTeam { team: team.0 });
        }
        debug!(player, team = %team, "possession resolved");

        Ok(PossessionGraph {
            nodes,
            edges,
            player_with_ball: player,
            team_possession: team,
        })
    }

    /// Shorthand for `resolve(record)?.team_possession`.
    pub fn team_in_possession(&self, record: &FrameRecord) -> Result<TeamId> {
        self.resolve(record).map(|g| g.team_possession)
    }
}
