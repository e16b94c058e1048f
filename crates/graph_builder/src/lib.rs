//! Graph Builder Library
//!
//! Tracking frames (CSV or JSON) → per-frame court graphs / possession → JSON

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{bail, Context, Result};
use cg_core::{
    BatchConfig, BatchDriver, BatchReport, CourtConfig, FrameFailure, FrameOutput, FrameRecord,
    TeamList, SCHEMA_VERSION,
};
use serde::Serialize;
use tracing::info;

/// Output file layout shared by the `graphs` and `possession` commands.
#[derive(Debug, Clone, Serialize)]
pub struct ReportFile<'a, T> {
    pub schema_version: u8,
    /// RFC3339 creation time
    pub created_at: String,
    pub teams: &'a TeamList,
    pub total_frames: usize,
    pub frames: &'a [FrameOutput<T>],
    pub failures: &'a [FrameFailure],
}

impl<'a, T> ReportFile<'a, T> {
    pub fn new(report: &'a BatchReport<T>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: chrono::Utc::now().to_rfc3339(),
            teams: &report.teams,
            total_frames: report.total_frames,
            frames: &report.frames,
            failures: &report.failures,
        }
    }
}

/// What a command run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total_frames: usize,
    pub written: usize,
    pub failed_frames: Vec<usize>,
}

impl<T> From<&BatchReport<T>> for RunSummary {
    fn from(report: &BatchReport<T>) -> Self {
        Self {
            total_frames: report.total_frames,
            written: report.len(),
            failed_frames: report.failed_frames(),
        }
    }
}

/// Load frames from a `.csv` (header row = field names) or `.json`
/// (array of objects) file.
pub fn load_frames(path: &Path) -> Result<Vec<FrameRecord>> {
    match extension(path).as_deref() {
        Some("csv") => load_frames_csv(path),
        Some("json") => load_frames_json(path),
        _ => bail!(
            "Unsupported frame file (expected .csv or .json): {}",
            path.display()
        ),
    }
}

pub fn load_frames_csv(path: &Path) -> Result<Vec<FrameRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .clone();

    let mut frames = Vec::new();
    for (row, result) in reader.records().enumerate() {
        // +2: 1-based lines, header on line 1
        let record = result.with_context(|| format!("Failed to read CSV line {}", row + 2))?;
        frames.push(
            headers
                .iter()
                .zip(record.iter())
                .collect::<FrameRecord>(),
        );
    }
    info!(frames = frames.len(), path = %path.display(), "loaded CSV frames");
    Ok(frames)
}

pub fn load_frames_json(path: &Path) -> Result<Vec<FrameRecord>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;
    let frames: Vec<FrameRecord> =
        serde_json::from_str(&json).context("Failed to parse JSON frames")?;
    info!(frames = frames.len(), path = %path.display(), "loaded JSON frames");
    Ok(frames)
}

/// Court configuration from a `.yaml`/`.yml` or `.json` file.
pub fn load_court_config(path: &Path) -> Result<CourtConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = match extension(path).as_deref() {
        Some("yaml") | Some("yml") => CourtConfig::from_yaml_str(&text),
        Some("json") => CourtConfig::from_json_str(&text),
        _ => bail!("Unsupported config file: {}", path.display()),
    };
    config.with_context(|| format!("Invalid court config: {}", path.display()))
}

/// Serialize a report file as pretty JSON, creating parent directories.
pub fn write_report<T: Serialize>(out: &Path, report: &BatchReport<T>) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    let file = fs::File::create(out)
        .with_context(|| format!("Failed to create output file: {}", out.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &ReportFile::new(report))
        .with_context(|| format!("Failed to write output file: {}", out.display()))?;
    Ok(())
}

/// Frames file → graph report file.
pub fn build_graph_file(
    input: &Path,
    out: &Path,
    court: CourtConfig,
    batch: BatchConfig,
) -> Result<RunSummary> {
    let frames = load_frames(input)?;
    let driver = BatchDriver::new(court, batch)?;
    let report = driver
        .build_graphs(frames)
        .context("Failed to build frame graphs")?;
    write_report(out, &report)?;
    Ok(RunSummary::from(&report))
}

/// Frames file → possession report file.
pub fn build_possession_file(
    input: &Path,
    out: &Path,
    court: CourtConfig,
    batch: BatchConfig,
) -> Result<RunSummary> {
    let frames = load_frames(input)?;
    let driver = BatchDriver::new(court, batch)?;
    let report = driver
        .resolve_possessions(frames)
        .context("Failed to resolve possession")?;
    write_report(out, &report)?;
    Ok(RunSummary::from(&report))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::FailurePolicy;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn csv_header() -> String {
        let mut cols = Vec::new();
        for i in 1..=10 {
            for attr in ["name", "x_coord", "y_coord", "team"] {
                cols.push(format!("player{i}_{attr}"));
            }
        }
        cols.push("playerball_x_coord".into());
        cols.push("playerball_y_coord".into());
        cols.push("game_clock".into());
        cols.join(",")
    }

    fn csv_row(shift: f64, drop_ball: bool) -> String {
        let mut cells = Vec::new();
        for i in 0..10 {
            cells.push(format!("Player {}", i + 1));
            cells.push(format!("{}", 10.0 + 7.0 * i as f64 + shift));
            cells.push(if i % 2 == 0 { "15.5".to_string() } else { "34.5".to_string() });
            cells.push(if i < 5 { "1610612760" } else { "1610612761" }.to_string());
        }
        cells.push(if drop_ball { String::new() } else { format!("{}", 40.0 + shift) });
        cells.push("25".to_string());
        cells.push("712.4".to_string());
        cells.join(",")
    }

    fn write_csv(rows: &[String]) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "{}", csv_header())?;
        for row in rows {
            writeln!(file, "{}", row)?;
        }
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_frames_csv() -> Result<()> {
        let file = write_csv(&[csv_row(0.0, false), csv_row(1.0, false)])?;
        let frames = load_frames(file.path())?;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].number("player1_x_coord")?, 11.0);
        assert_eq!(frames[0].text("player10_team")?, "1610612761");
        Ok(())
    }

    #[test]
    fn test_graph_file_round_trip() -> Result<()> {
        let input = write_csv(&[csv_row(0.0, false), csv_row(0.5, false)])?;
        let dir = TempDir::new()?;
        let out = dir.path().join("nested").join("graphs.json");

        let summary = build_graph_file(
            input.path(),
            &out,
            CourtConfig::default(),
            BatchConfig::default(),
        )?;
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.written, 2);

        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
        assert_eq!(written["schema_version"], 1);
        assert_eq!(written["teams"][0], "1610612760");
        let first = &written["frames"][0];
        assert_eq!(first["nodes"].as_array().unwrap().len(), 13);
        assert_eq!(first["edges"].as_array().unwrap().len(), 10);
        assert_eq!(first["nodes"][10]["team"], -1);
        assert_eq!(first["clock"]["minutes"], 11);
        Ok(())
    }

    #[test]
    fn test_skip_malformed_rows() -> Result<()> {
        let input = write_csv(&[
            csv_row(0.0, false),
            csv_row(1.0, true),
            csv_row(2.0, false),
        ])?;
        let out = NamedTempFile::new()?;
        let batch = BatchConfig {
            policy: FailurePolicy::SkipAndRecord,
            parallel: true,
        };
        let summary =
            build_possession_file(input.path(), out.path(), CourtConfig::default(), batch)?;
        assert_eq!(summary.written, 2);
        assert_eq!(summary.failed_frames, vec![1]);

        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.path())?)?;
        assert_eq!(written["failures"][0]["frame"], 1);
        assert_eq!(
            written["failures"][0]["error"],
            "Missing field: playerball_x_coord"
        );
        assert!(written["frames"][0]["team"].is_string());
        Ok(())
    }

    #[test]
    fn test_abort_on_malformed_row() -> Result<()> {
        let input = write_csv(&[csv_row(0.0, false), csv_row(1.0, true)])?;
        let out = NamedTempFile::new()?;
        let err = build_graph_file(
            input.path(),
            out.path(),
            CourtConfig::default(),
            BatchConfig::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("Frame 1"));
        Ok(())
    }

    #[test]
    fn test_load_frames_json() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        write!(file, r#"[{{"player1_name": "A", "player1_x_coord": 1.5}}]"#)?;
        file.flush()?;
        let frames = load_frames(file.path())?;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].number("player1_x_coord")?, 1.5);
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_extension() {
        assert!(load_frames(Path::new("frames.parquet")).is_err());
    }

    #[test]
    fn test_load_yaml_config() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        writeln!(file, "basket1:\n  x: 4.0\n  y: 25.0")?;
        file.flush()?;
        let cfg = load_court_config(file.path())?;
        assert_eq!(cfg.basket1.x, 4.0);
        assert_eq!(cfg.basket2, CourtConfig::default().basket2);
        Ok(())
    }
}
