//! # Frame Records
//!
//! One tracking sample ("moment") as delivered by the ingestion layer, plus
//! its validated, typed form.
//!
//! ## Field contract
//! - `player{1..10}_name`, `player{1..10}_x_coord`, `player{1..10}_y_coord`,
//!   `player{1..10}_team`
//! - `playerball_x_coord`, `playerball_y_coord`
//! - optional: `quarter`, `game_clock`, `shot_clock`
//!
//! Optional clock fields that cannot be read are dropped with a warning;
//! they never reject a frame.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GraphError, Result};
use crate::geometry::Point;

/// Number of on-court players per frame (5 per team).
pub const PLAYER_COUNT: usize = 10;

pub const BALL_X_FIELD: &str = "playerball_x_coord";
pub const BALL_Y_FIELD: &str = "playerball_y_coord";
pub const QUARTER_FIELD: &str = "quarter";
pub const GAME_CLOCK_FIELD: &str = "game_clock";
pub const SHOT_CLOCK_FIELD: &str = "shot_clock";

/// Field name for a player attribute, using the 1-based column convention.
///
/// `player_field(0, "team")` is `"player1_team"`.
pub fn player_field(index: usize, attr: &str) -> String {
    format!("player{}_{}", index + 1, attr)
}

/// A single cell of a frame record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Null,
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", format_number(*n)),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

// Integral ids (team ids, player ids) print without a trailing ".0".
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Raw frame: field name → value, as parsed by the ingestion layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl FrameRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A present, non-blank value. Null and empty text count as missing.
    pub fn require(&self, field: &str) -> Result<&FieldValue> {
        match self.fields.get(field) {
            Some(v) if !v.is_blank() => Ok(v),
            _ => Err(GraphError::missing(field)),
        }
    }

    /// A finite number; numeric text is accepted.
    pub fn number(&self, field: &str) -> Result<f64> {
        let value = self.require(field)?;
        let n = match value {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| GraphError::invalid(field, s))?,
            FieldValue::Null => return Err(GraphError::missing(field)),
        };
        if !n.is_finite() {
            return Err(GraphError::invalid(field, n));
        }
        Ok(n)
    }

    pub fn optional_number(&self, field: &str) -> Result<Option<f64>> {
        match self.fields.get(field) {
            Some(v) if !v.is_blank() => self.number(field).map(Some),
            _ => Ok(None),
        }
    }

    /// Text form of a value; numbers are printed (integral ones without decimals).
    pub fn text(&self, field: &str) -> Result<String> {
        match self.require(field)? {
            FieldValue::Text(s) => Ok(s.trim().to_string()),
            other => Ok(other.to_string()),
        }
    }

    pub fn point(&self, x_field: &str, y_field: &str) -> Result<Point> {
        Ok(Point::new(self.number(x_field)?, self.number(y_field)?))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FrameRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Team identifier as it appears in the tracking feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl TeamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        TeamId(s.to_string())
    }
}

impl From<String> for TeamId {
    fn from(s: String) -> Self {
        TeamId(s)
    }
}

/// The two teams on court, fixed for a whole dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamList([TeamId; 2]);

impl TeamList {
    pub fn new(first: impl Into<TeamId>, second: impl Into<TeamId>) -> Result<Self> {
        let (first, second) = (first.into(), second.into());
        if first == second {
            return Err(GraphError::InvalidTeamList {
                reason: format!("both teams are {}", first),
            });
        }
        Ok(Self([first, second]))
    }

    /// Derive the team list from a dataset's first frame.
    ///
    /// Reads `player2_team` and `player9_team`: the feed lists the five
    /// players of one team first, so these two always sit on opposite sides.
    pub fn from_first_frame(record: &FrameRecord) -> Result<Self> {
        let first = record.text(&player_field(1, "team"))?;
        let second = record.text(&player_field(8, "team"))?;
        Self::new(first, second)
    }

    pub fn contains(&self, team: &TeamId) -> bool {
        self.0.contains(team)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[TeamId] {
        &self.0
    }
}

/// Game clock split for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    pub minutes: u32,
    /// Seconds within the minute, rounded to one decimal
    pub seconds: f64,
}

impl GameClock {
    pub fn from_seconds(clock: f64) -> Result<Self> {
        if !clock.is_finite() || clock < 0.0 {
            return Err(GraphError::invalid(GAME_CLOCK_FIELD, clock));
        }
        let minutes = (clock / 60.0).floor();
        let seconds = ((clock - minutes * 60.0) * 10.0).round() / 10.0;
        Ok(Self {
            minutes: minutes as u32,
            seconds,
        })
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{:04.1}", self.minutes, self.seconds)
    }
}

/// One player's sample within a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSample {
    pub name: String,
    pub position: Point,
    pub team: TeamId,
}

impl PlayerSample {
    fn from_record(record: &FrameRecord, index: usize) -> Result<Self> {
        Ok(Self {
            name: record.text(&player_field(index, "name"))?,
            position: record.point(
                &player_field(index, "x_coord"),
                &player_field(index, "y_coord"),
            )?,
            team: TeamId(record.text(&player_field(index, "team"))?),
        })
    }
}

/// A validated frame: ten players, the ball, and optional clock data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    pub players: [PlayerSample; PLAYER_COUNT],
    pub ball: Point,
    pub quarter: Option<u8>,
    pub clock: Option<GameClock>,
    pub shot_clock: Option<f64>,
}

impl Moment {
    pub fn new(players: [PlayerSample; PLAYER_COUNT], ball: Point) -> Self {
        Self {
            players,
            ball,
            quarter: None,
            clock: None,
            shot_clock: None,
        }
    }

    /// Parse and validate a raw record. Every player and ball field is
    /// required; clock fields are optional and read leniently.
    pub fn from_record(record: &FrameRecord) -> Result<Self> {
        let mut players = Vec::with_capacity(PLAYER_COUNT);
        for index in 0..PLAYER_COUNT {
            players.push(PlayerSample::from_record(record, index)?);
        }
        let players: [PlayerSample; PLAYER_COUNT] = players
            .try_into()
            .map_err(|_| GraphError::missing(player_field(PLAYER_COUNT - 1, "name")))?;

        let ball = record.point(BALL_X_FIELD, BALL_Y_FIELD)?;

        let quarter = lenient(
            QUARTER_FIELD,
            record
                .optional_number(QUARTER_FIELD)
                .and_then(|q| q.map(parse_quarter).transpose()),
        );
        let clock = lenient(
            GAME_CLOCK_FIELD,
            record
                .optional_number(GAME_CLOCK_FIELD)
                .and_then(|c| c.map(GameClock::from_seconds).transpose()),
        );
        let shot_clock = lenient(
            SHOT_CLOCK_FIELD,
            record.optional_number(SHOT_CLOCK_FIELD).and_then(|v| match v {
                Some(v) if v < 0.0 => Err(GraphError::invalid(SHOT_CLOCK_FIELD, v)),
                other => Ok(other),
            }),
        );

        Ok(Self {
            players,
            ball,
            quarter,
            clock,
            shot_clock,
        })
    }
}

fn parse_quarter(q: f64) -> Result<u8> {
    if q >= 0.0 && q <= u8::MAX as f64 && q.fract() == 0.0 {
        Ok(q as u8)
    } else {
        Err(GraphError::invalid(QUARTER_FIELD, q))
    }
}

fn lenient<T>(field: &str, parsed: Result<Option<T>>) -> Option<T> {
    match parsed {
        Ok(value) => value,
        Err(error) => {
            warn!(field, %error, "ignoring unreadable clock field");
            None
        }
    }
}
