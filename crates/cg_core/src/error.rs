use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: String, value: String },

    #[error("No player node available to connect to the ball")]
    NoPlayers,

    #[error("Nearest player belongs to team {team}, which is not in the team list")]
    UnknownTeam { team: String },

    #[error("Invalid team list: {reason}")]
    InvalidTeamList { reason: String },

    #[error("Invalid court configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Frame {index}: {source}")]
    Frame {
        index: usize,
        #[source]
        source: Box<GraphError>,
    },
}

impl GraphError {
    pub fn missing(field: impl Into<String>) -> Self {
        GraphError::MissingField { field: field.into() }
    }

    pub fn invalid(field: impl Into<String>, value: impl ToString) -> Self {
        GraphError::InvalidField {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Attach the frame index this error was raised for.
    pub fn at_frame(self, index: usize) -> Self {
        match self {
            GraphError::Frame { .. } => self,
            other => GraphError::Frame {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Whether the error concerns a single frame only, so a batch may skip it.
    pub fn is_frame_local(&self) -> bool {
        match self {
            GraphError::MissingField { .. } => true,
            GraphError::InvalidField { .. } => true,
            GraphError::NoPlayers => true,
            GraphError::UnknownTeam { .. } => true,
            GraphError::InvalidTeamList { .. } => false,
            GraphError::InvalidConfig { .. } => false,
            GraphError::Frame { source, .. } => source.is_frame_local(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
