//! # cg_core - Court Graphs from Basketball Tracking Data
//!
//! Turns per-frame player/ball coordinates into weighted graphs for
//! downstream learning, and derives ball possession from them.
//!
//! ## Features
//! - One graph per frame: 10 players, ball, 2 baskets, 10 edges
//! - Team skeleton as a minimum spanning forest (one tree per team)
//! - Possession = team of the player nearest the ball
//! - Batch driver with abort/skip policies and optional rayon fan-out
//!
//! ```rust
//! use cg_core::{BatchDriver, FrameRecord};
//!
//! let frames: Vec<FrameRecord> = Vec::new();
//! assert!(BatchDriver::default().build_graphs(frames).is_err()); // no team list
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod models;
pub mod possession;

pub use batch::{BatchDriver, BatchReport, FrameFailure, FrameOutput};
pub use config::{BatchConfig, CourtConfig, FailurePolicy};
pub use error::{GraphError, Result};
pub use geometry::{euclidean_distance, Point};
pub use graph::{Edge, FrameGraph, FrameGraphBuilder, Node, NodeId, NodeName};
pub use models::{FieldValue, FrameRecord, GameClock, Moment, PlayerSample, TeamId, TeamList};
pub use possession::{Possession, PossessionGraph, PossessionResolver};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
