//! # Warbound Core
//!
//! Rules engine for a turn-based tactics game.
//!
//! This crate contains **only** deterministic rules logic:
//! - No rendering
//! - No IO
//! - No system randomness (combat dice are seeded)
//! - No floating-point math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`grid`] - Cells and cardinal directions
//! - [`terrain`] - Static terrain map and layout parsing
//! - [`pathfinding`] - Movement graph and budget-bounded reachability
//! - [`unit_kind`], [`formation`], [`unit`] - The unit record and its tables
//! - [`roster`] - Unit storage and army deployment
//! - [`combat`] - Attack resolution
//! - [`turn`] - Turn state machine and action predicates
//! - [`game`] - Command-driven game controller
//! - [`config`] - RON game setup
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod config;
pub mod error;
pub mod formation;
pub mod game;
pub mod grid;
pub mod math;
pub mod pathfinding;
pub mod roster;
pub mod terrain;
pub mod turn;
pub mod unit;
pub mod unit_kind;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{
        AttackDirection, AttackProfile, CombatDice, CombatOutcome, SeededDice,
    };
    pub use crate::config::{GameConfig, TerrainSource};
    pub use crate::error::{GameError, Result};
    pub use crate::formation::Formation;
    pub use crate::game::{Command, CommandOutcome, Game, GameResult};
    pub use crate::grid::{Cell, Direction};
    pub use crate::math::Fixed;
    pub use crate::pathfinding::{parse_budget, reachable, EdgeWeight, MovementGraph, Reachability};
    pub use crate::roster::{Roster, UnitRoster};
    pub use crate::terrain::{TerrainKind, TerrainMap, TerrainProvider};
    pub use crate::turn::{TurnController, TurnState};
    pub use crate::unit::{Player, Unit, UnitId};
    pub use crate::unit_kind::{AttackKind, UnitKind};
}
