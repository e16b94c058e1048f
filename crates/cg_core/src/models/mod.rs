//! Input data models

pub mod frame;

pub use frame::{
    player_field, FieldValue, FrameRecord, GameClock, Moment, PlayerSample, TeamId, TeamList,
    BALL_X_FIELD, BALL_Y_FIELD, GAME_CLOCK_FIELD, PLAYER_COUNT, QUARTER_FIELD, SHOT_CLOCK_FIELD,
};
