//! Reachability inspection for a configured board.

use serde::Serialize;

use warbound_core::combat::CombatDice;
use warbound_core::error::GameError;
use warbound_core::game::Game;
use warbound_core::grid::Cell;
use warbound_core::math::Fixed;
use warbound_core::pathfinding::Reachability;
use warbound_core::roster::UnitRoster;
use warbound_core::terrain::TerrainProvider;
use warbound_core::unit::Player;

use crate::error::Result;

/// One reachable cell with its cheapest cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReachCell {
    /// Row index.
    pub row: i32,
    /// Column index.
    pub col: i32,
    /// Movement points spent to get there.
    pub cost: f64,
}

/// Reachable area of the unit standing on `start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReachReport {
    /// Cell the search started from.
    pub start: Cell,
    /// Budget the search was given.
    pub budget: f64,
    /// Reachable cells in row-major order.
    pub cells: Vec<ReachCell>,
    #[serde(skip)]
    reach: Reachability,
}

impl ReachReport {
    /// The underlying search result.
    #[must_use]
    pub fn reachability(&self) -> &Reachability {
        &self.reach
    }

    /// Pretty JSON rendering.
    ///
    /// # Errors
    ///
    /// [`crate::error::ToolError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Search from the living unit at `start`.
///
/// Without an explicit budget the unit's full movement range is used.
///
/// # Errors
///
/// [`GameError::InvalidPosition`] if no living unit stands on `start`, and
/// any search error from the movement graph.
pub fn reach_report<D: CombatDice>(
    game: &Game<D>,
    start: Cell,
    budget: Option<Fixed>,
) -> Result<ReachReport> {
    let unit = game
        .roster()
        .unit_at(start)
        .ok_or_else(|| GameError::InvalidPosition {
            cell: start,
            reason: "no living unit there".to_string(),
        })?;
    let budget = budget.unwrap_or_else(|| unit.movement_range());
    tracing::debug!(%start, unit = %unit.id, %budget, "searching reachable cells");

    let reach = game.reachable_from(start, budget)?;
    let cells = reach
        .costs
        .iter()
        .map(|(cell, cost)| ReachCell {
            row: cell.row,
            col: cell.col,
            cost: cost.to_num(),
        })
        .collect();

    Ok(ReachReport {
        start,
        budget: budget.to_num(),
        cells,
        reach,
    })
}

/// Draw the board with the reachable area overlaid.
///
/// `@` marks the start and reachable cells show their cost (`*` above 9).
/// Other cells show the unit on them, lowercase for Player Two, or the
/// terrain symbol.
#[must_use]
pub fn render_grid<D: CombatDice>(game: &Game<D>, report: &ReachReport) -> String {
    let terrain = game.terrain();
    let mut out = String::new();
    for row in 0..terrain.rows() {
        for col in 0..terrain.cols() {
            let cell = Cell::new(row, col);
            out.push(glyph(game, report, cell));
        }
        out.push('\n');
    }
    out
}

fn glyph<D: CombatDice>(game: &Game<D>, report: &ReachReport, cell: Cell) -> char {
    if cell == report.start {
        return '@';
    }
    if let Some(cost) = report.reach.cost(cell) {
        return u32::try_from(cost.to_num::<i64>())
            .ok()
            .and_then(|n| char::from_digit(n, 10))
            .unwrap_or('*');
    }
    if let Some(unit) = game.roster().unit_at(cell) {
        let symbol = unit.kind.symbol();
        return match unit.player {
            Player::One => symbol,
            Player::Two => symbol.to_ascii_lowercase(),
        };
    }
    game.terrain()
        .terrain_at(cell)
        .map_or('?', warbound_core::terrain::TerrainKind::symbol)
}
