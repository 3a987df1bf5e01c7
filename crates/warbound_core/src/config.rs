//! Game setup, loaded from RON.
//!
//! The core never touches the filesystem: callers read the text and hand
//! it to [`GameConfig::from_ron`].
//!
//! # Example RON
//!
//! ```ron
//! GameConfig(
//!     rows: 6,
//!     cols: 8,
//!     seed: 42,
//!     terrain: Layout([
//!         "........",
//!         "..MM....",
//!         "........",
//!         "....FF..",
//!         "........",
//!         "........",
//!     ]),
//!     player1_army: ["HAC"],
//!     player2_army: ["VBL"],
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::roster::{Roster, UnitRoster};
use crate::terrain::{check_dimensions, TerrainMap, TerrainProvider};
use crate::unit::Player;

/// Where the board terrain comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainSource {
    /// The built-in ridge-and-forest pattern, sized by `rows` and `cols`.
    Procedural,
    /// Explicit layout lines. Must match `rows` and `cols`.
    Layout(Vec<String>),
}

/// Everything needed to start a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board height.
    pub rows: i64,
    /// Board width.
    pub cols: i64,
    /// Seed for the combat dice.
    #[serde(default)]
    pub seed: u64,
    /// Terrain source.
    pub terrain: TerrainSource,
    /// Player One's army, read top-down from row 0.
    pub player1_army: Vec<String>,
    /// Player Two's army, mirrored onto the bottom rows.
    pub player2_army: Vec<String>,
}

impl Default for GameConfig {
    /// A 20x30 procedural battlefield with a small mixed army per side.
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 30,
            seed: 0,
            terrain: TerrainSource::Procedural,
            player1_army: vec!["#HLMI".to_string(), "#CAVB".to_string()],
            player2_army: vec!["IMLH#".to_string(), "BVAC#".to_string()],
        }
    }
}

impl GameConfig {
    /// Parse a configuration from RON text.
    ///
    /// `source_name` labels the input in error messages.
    ///
    /// # Errors
    ///
    /// [`GameError::DataParseError`] if the text is not a valid config.
    pub fn from_ron(text: &str, source_name: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    ///
    /// [`GameError::DataParseError`] if serialization fails.
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            GameError::DataParseError {
                source_name: "GameConfig".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Build the terrain map.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidDimensions`] for non-positive dimensions or a
    /// layout whose size disagrees with `rows` and `cols`, and
    /// [`GameError::MapFormat`] for a malformed layout.
    pub fn build_terrain(&self) -> Result<TerrainMap> {
        check_dimensions(self.rows, self.cols)?;
        match &self.terrain {
            TerrainSource::Procedural => TerrainMap::procedural(self.rows, self.cols),
            TerrainSource::Layout(lines) => {
                let map = TerrainMap::from_layout(lines)?;
                if i64::from(map.rows()) != self.rows || i64::from(map.cols()) != self.cols {
                    return Err(GameError::InvalidDimensions {
                        rows: i64::from(map.rows()),
                        cols: i64::from(map.cols()),
                    });
                }
                Ok(map)
            }
        }
    }

    /// Deploy both armies.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidDimensions`] for non-positive dimensions,
    /// [`GameError::MapFormat`] for unknown unit symbols and
    /// [`GameError::InvalidPosition`] for units off the board or stacked.
    pub fn build_roster(&self) -> Result<Roster> {
        let (rows, cols) = check_dimensions(self.rows, self.cols)?;
        let mut roster = Roster::new();
        roster.deploy(Player::One, &self.player1_army, rows, cols)?;
        roster.deploy(Player::Two, &self.player2_army, rows, cols)?;
        Ok(roster)
    }

    /// Collect every problem with this configuration. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Err(e) = self.build_terrain() {
            problems.push(format!("terrain: {e}"));
        }

        match self.build_roster() {
            Ok(roster) => {
                for player in [Player::One, Player::Two] {
                    if roster.living(player).is_empty() {
                        problems.push(format!("{player} has no units"));
                    }
                }
            }
            Err(e) => problems.push(format!("armies: {e}")),
        }

        problems
    }
}
