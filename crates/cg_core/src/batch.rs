//! # Batch Driver
//!
//! Runs the frame graph builder (or the possession resolver) over every
//! frame of a dataset and collects the results in input order.
//!
//! ## Failure policy
//! - `Abort`: the first failing frame (lowest index) fails the batch
//! - `SkipAndRecord`: failing frames are dropped from the output and listed
//!   in [`BatchReport::failures`]
//!
//! Batch-level errors (no team list, bad configuration) always abort.

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::config::{BatchConfig, CourtConfig, FailurePolicy};
use crate::error::{GraphError, Result};
use crate::graph::{FrameGraph, FrameGraphBuilder};
use crate::models::{FrameRecord, TeamList};
use crate::possession::{Possession, PossessionResolver};

/// Output for one input frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput<T> {
    /// 0-based index of the frame in the input
    pub frame: usize,
    #[serde(flatten)]
    pub output: T,
}

/// A frame that was skipped under [`FailurePolicy::SkipAndRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameFailure {
    pub frame: usize,
    #[serde(serialize_with = "error_message")]
    pub error: GraphError,
}

fn error_message<S: Serializer>(error: &GraphError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(error)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<T> {
    pub teams: TeamList,
    /// Number of input frames seen
    pub total_frames: usize,
    pub frames: Vec<FrameOutput<T>>,
    pub failures: Vec<FrameFailure>,
}

impl<T> BatchReport<T> {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &T> {
        self.frames.iter().map(|f| &f.output)
    }

    pub fn into_outputs(self) -> Vec<T> {
        self.frames.into_iter().map(|f| f.output).collect()
    }

    pub fn failed_frames(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.frame).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchDriver {
    court: CourtConfig,
    batch: BatchConfig,
}

impl BatchDriver {
    pub fn new(court: CourtConfig, batch: BatchConfig) -> Result<Self> {
        court.validate()?;
        Ok(Self { court, batch })
    }

    pub fn court(&self) -> &CourtConfig {
        &self.court
    }

    pub fn batch_config(&self) -> &BatchConfig {
        &self.batch
    }

    /// Build one graph per frame; the team list comes from the first frame.
    pub fn build_graphs<I>(&self, frames: I) -> Result<BatchReport<FrameGraph>>
    where
        I: IntoIterator<Item = FrameRecord>,
    {
        let mut frames = frames.into_iter().peekable();
        let teams = derive_teams(frames.peek())?;
        self.build_graphs_with_teams(frames, teams)
    }

    pub fn build_graphs_with_teams<I>(
        &self,
        frames: I,
        teams: TeamList,
    ) -> Result<BatchReport<FrameGraph>>
    where
        I: IntoIterator<Item = FrameRecord>,
    {
        let court = &self.court;
        let outputs = {
            let builder = FrameGraphBuilder::new(court, &teams)?;
            self.run(frames, |record| builder.build(record))?
        };
        self.collect(outputs, teams)
    }

    /// Possession team per frame; the team list comes from the first frame.
    pub fn resolve_possessions<I>(&self, frames: I) -> Result<BatchReport<Possession>>
    where
        I: IntoIterator<Item = FrameRecord>,
    {
        let mut frames = frames.into_iter().peekable();
        let teams = derive_teams(frames.peek())?;
        self.resolve_possessions_with_teams(frames, teams)
    }

    pub fn resolve_possessions_with_teams<I>(
        &self,
        frames: I,
        teams: TeamList,
    ) -> Result<BatchReport<Possession>>
    where
        I: IntoIterator<Item = FrameRecord>,
    {
        let outputs = {
            let resolver = PossessionResolver::new(&self.court, &teams)?;
            self.run(frames, |record| resolver.resolve(record).map(|g| g.possession()))?
        };
        self.collect(outputs, teams)
    }

    /// Apply `f` to every frame, in order or on the rayon pool.
    ///
    /// Under `Abort` the sequential path stops at the first error; the
    /// parallel path builds everything and reports the lowest failing index.
    fn run<I, T, F>(&self, frames: I, f: F) -> Result<Vec<(usize, Result<T>)>>
    where
        I: IntoIterator<Item = FrameRecord>,
        T: Send,
        F: Fn(&FrameRecord) -> Result<T> + Sync,
    {
        if self.batch.parallel {
            let frames: Vec<FrameRecord> = frames.into_iter().collect();
            debug!(frames = frames.len(), "building frames in parallel");
            return Ok(frames
                .par_iter()
                .enumerate()
                .map(|(i, record)| (i, f(record)))
                .collect());
        }

        let mut results = Vec::new();
        for (i, record) in frames.into_iter().enumerate() {
            let result = f(&record);
            let stop = result.is_err() && self.batch.policy == FailurePolicy::Abort;
            results.push((i, result));
            if stop {
                break;
            }
        }
        Ok(results)
    }

    fn collect<T>(&self, results: Vec<(usize, Result<T>)>, teams: TeamList) -> Result<BatchReport<T>> {
        let total_frames = results.len();
        let mut frames = Vec::with_capacity(total_frames);
        let mut failures = Vec::new();

        for (frame, result) in results {
            match result {
                Ok(output) => frames.push(FrameOutput { frame, output }),
                Err(error) => {
                    if self.batch.policy == FailurePolicy::Abort || !error.is_frame_local() {
                        return Err(error.at_frame(frame));
                    }
                    warn!(frame, %error, "skipping frame");
                    failures.push(FrameFailure { frame, error });
                }
            }
        }

        info!(
            total = total_frames,
            built = frames.len(),
            skipped = failures.len(),
            "batch finished"
        );
        Ok(BatchReport {
            teams,
            total_frames,
            frames,
            failures,
        })
    }
}

fn derive_teams(first: Option<&FrameRecord>) -> Result<TeamList> {
    let first = first.ok_or_else(|| GraphError::InvalidTeamList {
        reason: "dataset has no frames".to_string(),
    })?;
    TeamList::from_first_frame(first).map_err(|e| match e {
        GraphError::InvalidTeamList { .. } => e,
        other => GraphError::InvalidTeamList {
            reason: format!("first frame: {other}"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{player_field, BALL_X_FIELD, BALL_Y_FIELD, PLAYER_COUNT};

    fn frame(shift: f64) -> FrameRecord {
        let mut record = FrameRecord::new();
        for i in 0..PLAYER_COUNT {
            record.insert(player_field(i, "name"), format!("p{}", i + 1));
            record.insert(player_field(i, "x_coord"), 10.0 + 8.0 * i as f64 + shift);
            record.insert(player_field(i, "y_coord"), if i % 2 == 0 { 12.0 } else { 38.0 });
            record.insert(player_field(i, "team"), if i < 5 { 1_i64 } else { 2_i64 });
        }
        record
            .with(BALL_X_FIELD, 30.0 + shift)
            .with(BALL_Y_FIELD, 20.0)
    }

    fn dataset() -> Vec<FrameRecord> {
        (0..6).map(|i| frame(i as f64)).collect()
    }

    fn broken_dataset() -> Vec<FrameRecord> {
        let mut frames = dataset();
        frames[2].remove("player5_x_coord");
        frames[4].remove(BALL_X_FIELD);
        frames
    }

    fn driver(policy: FailurePolicy, parallel: bool) -> BatchDriver {
        BatchDriver::new(CourtConfig::default(), BatchConfig { policy, parallel }).unwrap()
    }

    #[test]
    fn test_one_graph_per_frame_in_order() {
        let report = BatchDriver::default().build_graphs(dataset()).unwrap();
        assert_eq!(report.len(), 6);
        assert_eq!(report.total_frames, 6);
        let indices: Vec<usize> = report.frames.iter().map(|f| f.frame).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert!(report.outputs().all(|g| g.node_count() == 13 && g.edge_count() == 10));
        assert_eq!(report.teams, TeamList::new("1", "2").unwrap());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = driver(FailurePolicy::Abort, false)
            .build_graphs(dataset())
            .unwrap();
        let parallel = driver(FailurePolicy::Abort, true)
            .build_graphs(dataset())
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_abort_reports_first_failure() {
        for parallel in [false, true] {
            let err = driver(FailurePolicy::Abort, parallel)
                .build_graphs(broken_dataset())
                .unwrap_err();
            match err {
                GraphError::Frame { index, source } => {
                    assert_eq!(index, 2);
                    assert_eq!(*source, GraphError::missing("player5_x_coord"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_skip_records_failures() {
        for parallel in [false, true] {
            let report = driver(FailurePolicy::SkipAndRecord, parallel)
                .build_graphs(broken_dataset())
                .unwrap();
            assert_eq!(report.total_frames, 6);
            assert_eq!(report.len(), 4);
            assert_eq!(report.failed_frames(), vec![2, 4]);
            let indices: Vec<usize> = report.frames.iter().map(|f| f.frame).collect();
            assert_eq!(indices, vec![0, 1, 3, 5]);
        }
    }

    #[test]
    fn test_empty_dataset_has_no_team_list() {
        let err = BatchDriver::default().build_graphs(Vec::new()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidTeamList { .. }));
    }

    #[test]
    fn test_malformed_first_frame_is_batch_error() {
        let mut frames = dataset();
        frames[0].remove("player9_team");
        let err = driver(FailurePolicy::SkipAndRecord, false)
            .build_graphs(frames)
            .unwrap_err();
        assert!(!err.is_frame_local());
    }

    #[test]
    fn test_explicit_teams_with_empty_dataset() {
        let teams = TeamList::new("1", "2").unwrap();
        let report = BatchDriver::default()
            .build_graphs_with_teams(Vec::new(), teams)
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(report.total_frames, 0);
    }

    #[test]
    fn test_possessions_per_frame() {
        let report = BatchDriver::default().resolve_possessions(dataset()).unwrap();
        assert_eq!(report.len(), 6);
        for possession in report.outputs() {
            assert!(report.teams.contains(&possession.team));
        }
    }

    #[test]
    fn test_report_serializes_failures_as_messages() {
        let report = driver(FailurePolicy::SkipAndRecord, false)
            .build_graphs(broken_dataset())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["failures"][0]["frame"], 2);
        assert_eq!(json["failures"][0]["error"], "Missing field: player5_x_coord");
        assert_eq!(json["frames"][0]["frame"], 0);
        assert_eq!(json["frames"][0]["nodes"].as_array().unwrap().len(), 13);
    }
}
