//! Game configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use tracing::{debug, info, instrument};

/// How the next turn's selectable boards follow from the cells just touched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ForcedBoard {
    /// The opponent plays on the boards touched this turn.
    #[default]
    SameBoard,
    /// Touching cell N sends the opponent to sub-board N.
    CellIndex,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Nine linked sub-boards instead of one.
    #[serde(default)]
    #[getter(skip)]
    ultimate: bool,

    /// Largest single rotation, per cell and turn.
    #[serde(default = "default_max_angle")]
    max_angle: f64,

    /// Largest controlled rotation.
    #[serde(default = "default_max_controlled_angle")]
    max_controlled_angle: f64,

    /// Completed turns between automatic collapses of every board.
    #[serde(default = "default_turns_until_collapse")]
    turns_until_collapse: u32,

    /// Forced-board rule applied at each turn boundary.
    #[serde(default)]
    forced_board: ForcedBoard,

    /// Deadline for each executor request, in milliseconds.
    #[serde(default)]
    executor_timeout_ms: Option<u64>,

    /// Each step of a turn leaves the board it landed on, while more than
    /// one board is still selectable.
    #[serde(default)]
    distinct_boards_in_turn: bool,
}

#[instrument]
fn default_max_angle() -> f64 {
    std::f64::consts::FRAC_PI_2
}

#[instrument]
fn default_max_controlled_angle() -> f64 {
    std::f64::consts::PI
}

#[instrument]
fn default_turns_until_collapse() -> u32 {
    10
}

impl GameConfig {
    /// Creates a configuration with default limits.
    #[instrument]
    pub fn new(ultimate: bool) -> Self {
        Self {
            ultimate,
            max_angle: default_max_angle(),
            max_controlled_angle: default_max_controlled_angle(),
            turns_until_collapse: default_turns_until_collapse(),
            forced_board: ForcedBoard::default(),
            executor_timeout_ms: None,
            distinct_boards_in_turn: false,
        }
    }

    /// Classic single-board game.
    pub fn classic() -> Self {
        Self::new(false)
    }

    /// Nine sub-boards.
    pub fn ultimate() -> Self {
        Self::new(true)
    }

    /// Sets the single rotation budget.
    pub fn with_max_angle(mut self, angle: f64) -> Self {
        self.max_angle = angle;
        self
    }

    /// Sets the controlled rotation budget.
    pub fn with_max_controlled_angle(mut self, angle: f64) -> Self {
        self.max_controlled_angle = angle;
        self
    }

    /// Sets the number of turns between automatic collapses.
    pub fn with_turns_until_collapse(mut self, turns: u32) -> Self {
        self.turns_until_collapse = turns;
        self
    }

    /// Sets the forced-board rule.
    pub fn with_forced_board(mut self, rule: ForcedBoard) -> Self {
        self.forced_board = rule;
        self
    }

    /// Sets the executor deadline.
    pub fn with_executor_timeout(mut self, timeout: Duration) -> Self {
        self.executor_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Spreads the steps of a turn over different boards.
    pub fn with_distinct_boards_in_turn(mut self, distinct: bool) -> Self {
        self.distinct_boards_in_turn = distinct;
        self
    }

    /// Returns true for the nine-board variant.
    pub fn is_ultimate(&self) -> bool {
        self.ultimate
    }

    /// Number of sub-boards.
    pub fn board_count(&self) -> usize {
        if self.ultimate { 9 } else { 1 }
    }

    /// Executor deadline as a duration.
    pub fn executor_timeout(&self) -> Option<Duration> {
        self.executor_timeout_ms.map(Duration::from_millis)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(ultimate = config.ultimate, "Config loaded successfully");
        Ok(config)
    }

    /// Rejects limits the engine cannot honour.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_angle.is_finite() && self.max_angle > 0.0) {
            return Err(ConfigError::new(format!(
                "max_angle must be positive, got {}",
                self.max_angle
            )));
        }
        if !(self.max_controlled_angle.is_finite() && self.max_controlled_angle > 0.0) {
            return Err(ConfigError::new(format!(
                "max_controlled_angle must be positive, got {}",
                self.max_controlled_angle
            )));
        }
        if self.turns_until_collapse == 0 {
            return Err(ConfigError::new(
                "turns_until_collapse must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert!(!config.is_ultimate());
        assert_eq!(*config.max_angle(), std::f64::consts::FRAC_PI_2);
        assert_eq!(*config.max_controlled_angle(), std::f64::consts::PI);
        assert_eq!(*config.turns_until_collapse(), 10);
        assert_eq!(config.board_count(), 1);
        assert_eq!(config.executor_timeout(), None);
        assert!(!*config.distinct_boards_in_turn());
    }

    #[test]
    fn test_from_file_fills_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("Temp file");
        writeln!(file, "ultimate = true\nturns_until_collapse = 4\nforced_board = \"cell_index\"")
            .expect("Write config");

        let config = GameConfig::from_file(file.path()).expect("Valid config");
        assert!(config.is_ultimate());
        assert_eq!(config.board_count(), 9);
        assert_eq!(*config.turns_until_collapse(), 4);
        assert_eq!(*config.forced_board(), ForcedBoard::CellIndex);
        assert_eq!(*config.max_angle(), std::f64::consts::FRAC_PI_2);
        assert!(!*config.distinct_boards_in_turn());
    }

    #[test]
    fn test_from_file_reads_distinct_boards() {
        let mut file = tempfile::NamedTempFile::new().expect("Temp file");
        writeln!(file, "ultimate = true\ndistinct_boards_in_turn = true").expect("Write config");

        let config = GameConfig::from_file(file.path()).expect("Valid config");
        assert!(*config.distinct_boards_in_turn());
    }

    #[test]
    fn test_from_file_rejects_zero_turns() {
        let mut file = tempfile::NamedTempFile::new().expect("Temp file");
        writeln!(file, "turns_until_collapse = 0").expect("Write config");
        assert!(GameConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = GameConfig::from_file("/nonexistent/qttt.toml").unwrap_err();
        assert!(err.message.contains("Failed to read"));
    }

    #[test]
    fn test_validate_rejects_nan_angle() {
        assert!(GameConfig::classic().with_max_angle(f64::NAN).validate().is_err());
        assert!(GameConfig::classic().with_max_controlled_angle(-1.0).validate().is_err());
    }

    #[test]
    fn test_timeout_round_trip() {
        let config = GameConfig::classic().with_executor_timeout(Duration::from_millis(250));
        assert_eq!(config.executor_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let config = GameConfig::classic().with_executor_timeout(Duration::MAX);
        assert_eq!(*config.executor_timeout_ms(), Some(u64::MAX));
    }
}
