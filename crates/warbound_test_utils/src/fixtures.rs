//! Test fixtures and helpers.
//!
//! Boards, units and dice for building reproducible game states.
//! Helpers panic on bad input: they are for tests only.

use std::collections::VecDeque;

use fixed::types::I32F32;
use warbound_core::combat::CombatDice;
use warbound_core::game::Game;
use warbound_core::grid::Cell;
use warbound_core::math::Fixed;
use warbound_core::roster::Roster;
use warbound_core::terrain::{TerrainKind, TerrainMap};
use warbound_core::unit::{Player, Unit, UnitId};
use warbound_core::unit_kind::UnitKind;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In rules code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// True when `a` and `b` differ by at most `tolerance`.
#[must_use]
pub fn approx_eq(a: Fixed, b: Fixed, tolerance: Fixed) -> bool {
    (a - b).abs() <= tolerance
}

/// An all-plains board.
#[must_use]
pub fn plains(rows: i64, cols: i64) -> TerrainMap {
    TerrainMap::uniform(rows, cols, TerrainKind::Plains).expect("valid plains dimensions")
}

/// A board from layout lines (`.` plains, `M` mountain, `F` forest).
#[must_use]
pub fn board(lines: &[&str]) -> TerrainMap {
    TerrainMap::from_layout(lines).expect("valid board layout")
}

/// A unit of `kind` at `(row, col)`, facing its owner's deployment direction.
#[must_use]
pub fn unit(id: u32, kind: UnitKind, player: Player, row: i32, col: i32) -> Unit {
    Unit::new(UnitId(id), kind, player, Cell::new(row, col))
}

/// Deploy both armies onto a board of the given size.
#[must_use]
pub fn deployed(rows: i32, cols: i32, player1: &[&str], player2: &[&str]) -> Roster {
    let mut roster = Roster::new();
    roster
        .deploy(Player::One, player1, rows, cols)
        .expect("player one deploys");
    roster
        .deploy(Player::Two, player2, rows, cols)
        .expect("player two deploys");
    roster
}

/// A game on `terrain` with both armies deployed and scripted dice.
#[must_use]
pub fn scripted_game(
    terrain: TerrainMap,
    player1: &[&str],
    player2: &[&str],
    dice: ScriptedDice,
) -> Game<ScriptedDice> {
    use warbound_core::terrain::TerrainProvider;

    let roster = deployed(terrain.rows(), terrain.cols(), player1, player2);
    Game::new(terrain, roster, dice).expect("fixture game is valid")
}

/// Dice that replay queued rolls, then fall back to fixed defaults.
///
/// The defaults are a variation of exactly 1 and no critical hits, which
/// makes every attack hit for its base damage.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    variations: VecDeque<Fixed>,
    criticals: VecDeque<bool>,
    default_variation: Fixed,
    default_critical: bool,
}

impl Default for ScriptedDice {
    fn default() -> Self {
        Self::steady(Fixed::ONE, false)
    }
}

impl ScriptedDice {
    /// Always roll `variation`, and always (or never) crit.
    #[must_use]
    pub fn steady(variation: Fixed, critical: bool) -> Self {
        Self {
            variations: VecDeque::new(),
            criticals: VecDeque::new(),
            default_variation: variation,
            default_critical: critical,
        }
    }

    /// Queue variation rolls, consumed in order.
    #[must_use]
    pub fn with_variations(mut self, rolls: impl IntoIterator<Item = Fixed>) -> Self {
        self.variations.extend(rolls);
        self
    }

    /// Queue critical rolls, consumed in order.
    #[must_use]
    pub fn with_criticals(mut self, rolls: impl IntoIterator<Item = bool>) -> Self {
        self.criticals.extend(rolls);
        self
    }

    /// Rolls still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.variations.len() + self.criticals.len()
    }
}

impl CombatDice for ScriptedDice {
    fn variation(&mut self) -> Fixed {
        self.variations
            .pop_front()
            .unwrap_or(self.default_variation)
    }

    fn critical(&mut self, _chance: Fixed) -> bool {
        self.criticals.pop_front().unwrap_or(self.default_critical)
    }
}
