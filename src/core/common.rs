//! Common types for the combat core: identifiers, coordinates, coded
//! validation results and board errors.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Identifier of a participant in a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Identifier of a ship, unique within a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShipId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ship#{}", self.0)
    }
}

/// A grid coordinate. `x` is the column, `y` the row.
///
/// Ordering is row-major (`y` first), which is the scan order used by
/// targeting and placement fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The four orthogonal neighbours that do not under- or overflow. Upper
    /// bounds are left to the caller, which knows the board size.
    pub fn orthogonal_neighbors(&self) -> impl Iterator<Item = Coord> + '_ {
        let left = self.x.checked_sub(1).map(|x| Coord::new(x, self.y));
        let right = self.x.checked_add(1).map(|x| Coord::new(x, self.y));
        let up = self.y.checked_sub(1).map(|y| Coord::new(self.x, y));
        let down = self.y.checked_add(1).map(|y| Coord::new(self.x, y));
        [left, right, up, down].into_iter().flatten()
    }

    /// True for cells on the `(x + y) % 2 == 0` checkerboard.
    pub fn is_even_parity(&self) -> bool {
        self.x.wrapping_add(self.y) % 2 == 0
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Phase of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Setup,
    Active,
    Finished,
}

/// Current status of a game from one player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

/// Player-facing failure codes. These travel inside [`ValidationResult`]
/// and are never raised as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    OutOfBounds,
    NotYourTurn,
    GameNotActive,
    RateLimited,
    TurnTimeExceeded,
    InvalidPlayer,
    InvalidAttacker,
    AbilityNotFound,
    AbilityInactive,
    AbilityDisabled,
    AbilityOnCooldown,
    NoUsesRemaining,
    AbilityPassive,
    RequirementsNotMet,
    ActivationLimitReached,
    GlobalCooldown,
    InvalidTarget,
    EffectAlreadyActive,
    InvalidPlacement,
    UnknownShipType,
    FleetEmpty,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::OutOfBounds => "OUT_OF_BOUNDS",
            ErrorCode::NotYourTurn => "NOT_YOUR_TURN",
            ErrorCode::GameNotActive => "GAME_NOT_ACTIVE",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::TurnTimeExceeded => "TURN_TIME_EXCEEDED",
            ErrorCode::InvalidPlayer => "INVALID_PLAYER",
            ErrorCode::InvalidAttacker => "INVALID_ATTACKER",
            ErrorCode::AbilityNotFound => "ABILITY_NOT_FOUND",
            ErrorCode::AbilityInactive => "ABILITY_INACTIVE",
            ErrorCode::AbilityDisabled => "ABILITY_DISABLED",
            ErrorCode::AbilityOnCooldown => "ABILITY_ON_COOLDOWN",
            ErrorCode::NoUsesRemaining => "NO_USES_REMAINING",
            ErrorCode::AbilityPassive => "ABILITY_PASSIVE",
            ErrorCode::RequirementsNotMet => "REQUIREMENTS_NOT_MET",
            ErrorCode::ActivationLimitReached => "ACTIVATION_LIMIT_REACHED",
            ErrorCode::GlobalCooldown => "GLOBAL_COOLDOWN",
            ErrorCode::InvalidTarget => "INVALID_TARGET",
            ErrorCode::EffectAlreadyActive => "EFFECT_ALREADY_ACTIVE",
            ErrorCode::InvalidPlacement => "INVALID_PLACEMENT",
            ErrorCode::UnknownShipType => "UNKNOWN_SHIP_TYPE",
            ErrorCode::FleetEmpty => "FLEET_EMPTY",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single coded failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
}

/// Verdict of validating an action. Errors block the action; warnings ride
/// along with an otherwise valid result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::default()
    }

    /// Shorthand for a result holding exactly one error.
    pub fn rejected(code: ErrorCode, message: impl Into<String>) -> Self {
        let mut result = Self::default();
        result.error(code, message);
        result
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.errors.push(ValidationError {
            code,
            message: message.into(),
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// First error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.errors.first().map(|e| e.code)
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Coordinate lies outside the board.
    OutOfBounds(Coord),
    /// Ship placement overlaps another ship.
    ShipOverlaps(Coord),
    /// A ship with this id is already on the board.
    ShipAlreadyPlaced(ShipId),
    /// No ship with this id on the board.
    UnknownShip(ShipId),
    /// Board dimensions must be non-zero.
    InvalidDimensions { width: usize, height: usize },
    /// Unable to place ship (random or exhaustive placement failed).
    UnableToPlaceShip,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::OutOfBounds(c) => write!(f, "Coordinate {} is out of bounds", c),
            BoardError::ShipOverlaps(c) => write!(f, "Ship placement overlaps another ship at {}", c),
            BoardError::ShipAlreadyPlaced(id) => write!(f, "{} is already placed on the board", id),
            BoardError::UnknownShip(id) => write!(f, "{} is not on this board", id),
            BoardError::InvalidDimensions { width, height } => {
                write!(f, "Invalid board dimensions {}x{}", width, height)
            }
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
        }
    }
}

impl std::error::Error for BoardError {}
