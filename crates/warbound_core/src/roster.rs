//! Unit storage and army deployment.
//!
//! The [`Roster`] owns every unit. Ids are handed out sequentially and units
//! are never removed, so iteration in storage order is also id order and is
//! deterministic.

use std::collections::BTreeSet;

use crate::error::{GameError, Result};
use crate::grid::Cell;
use crate::unit::{Player, Unit, UnitId};
use crate::unit_kind::UnitKind;

/// Read access to the units on the board.
pub trait UnitRoster {
    /// All units, dead ones included, in id order.
    fn units(&self) -> &[Unit];

    /// Cells held by living units.
    fn occupancy(&self) -> BTreeSet<Cell> {
        self.units()
            .iter()
            .filter(|u| u.alive)
            .map(|u| u.position)
            .collect()
    }

    /// The living unit at `cell`, if any.
    fn unit_at(&self, cell: Cell) -> Option<&Unit> {
        self.units().iter().find(|u| u.alive && u.position == cell)
    }

    /// Look a unit up by id, dead or alive.
    fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units().iter().find(|u| u.id == id)
    }

    /// Living units of `player`.
    fn living(&self, player: Player) -> Vec<&Unit> {
        self.units()
            .iter()
            .filter(|u| u.alive && u.player == player)
            .collect()
    }

    /// Whether `player` still has a living unit carrying the general.
    fn has_living_general(&self, player: Player) -> bool {
        self.units()
            .iter()
            .any(|u| u.player == player && u.is_living_general())
    }
}

impl UnitRoster for [Unit] {
    fn units(&self) -> &[Unit] {
        self
    }
}

impl UnitRoster for Vec<Unit> {
    fn units(&self) -> &[Unit] {
        self
    }
}

/// Owning storage for all units in a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Roster {
    units: Vec<Unit>,
    next_id: u32,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a unit of `kind` and return its id.
    pub fn spawn(&mut self, kind: UnitKind, player: Player, position: Cell) -> UnitId {
        self.insert(Unit::new(UnitId(0), kind, player, position))
    }

    /// Add a prepared unit, assigning it a fresh id.
    pub fn insert(&mut self, mut unit: Unit) -> UnitId {
        let id = UnitId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        unit.id = id;
        self.units.push(unit);
        id
    }

    /// Mutable access by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    /// Mutable access to two distinct units at once.
    ///
    /// Returns `None` if either id is missing or both ids are the same.
    pub fn pair_mut(&mut self, first: UnitId, second: UnitId) -> Option<(&mut Unit, &mut Unit)> {
        let a = self.units.iter().position(|u| u.id == first)?;
        let b = self.units.iter().position(|u| u.id == second)?;
        if a == b {
            return None;
        }
        if a < b {
            let (left, right) = self.units.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.units.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }

    /// Mutable iteration in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.iter_mut()
    }

    /// Number of units, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no unit was ever added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Deploy an army from layout lines and return the new ids in creation
    /// order.
    ///
    /// Each character is a [`UnitKind`] symbol, with `#` or `.` for an empty
    /// cell. Player One reads top-down from row 0. Player Two's lines are
    /// mirrored: each line is reversed and line `i` lands on row
    /// `rows - 1 - i`. The first unit created carries the general.
    ///
    /// # Errors
    ///
    /// [`GameError::MapFormat`] for an unknown symbol and
    /// [`GameError::InvalidPosition`] for a unit placed off the board or on
    /// an occupied cell. Nothing is added on error.
    pub fn deploy<S: AsRef<str>>(
        &mut self,
        player: Player,
        lines: &[S],
        rows: i32,
        cols: i32,
    ) -> Result<Vec<UnitId>> {
        let mut taken = self.occupancy();
        let mut placements = Vec::new();

        for (line_index, line) in lines.iter().enumerate() {
            let symbols: Vec<char> = match player {
                Player::One => line.as_ref().trim_end().chars().collect(),
                Player::Two => line.as_ref().trim_end().chars().rev().collect(),
            };
            let row = match player {
                Player::One => line_index as i32,
                Player::Two => rows - 1 - line_index as i32,
            };

            for (col, symbol) in symbols.into_iter().enumerate() {
                if symbol == '#' || symbol == '.' {
                    continue;
                }
                let kind = UnitKind::from_symbol(symbol).ok_or_else(|| GameError::MapFormat {
                    row: line_index,
                    col,
                    message: format!("unknown unit symbol '{symbol}' in {player} army"),
                })?;

                let cell = Cell::new(row, col as i32);
                if !((0..rows).contains(&cell.row) && (0..cols).contains(&cell.col)) {
                    return Err(GameError::invalid_position(cell, "unit placed off the board"));
                }
                if !taken.insert(cell) {
                    return Err(GameError::invalid_position(cell, "cell already occupied"));
                }
                placements.push((kind, cell));
            }
        }

        let ids: Vec<UnitId> = placements
            .into_iter()
            .map(|(kind, cell)| self.spawn(kind, player, cell))
            .collect();
        if let Some(unit) = ids.first().and_then(|&id| self.get_mut(id)) {
            unit.has_general = true;
        }
        Ok(ids)
    }
}

impl UnitRoster for Roster {
    fn units(&self) -> &[Unit] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;

    #[test]
    fn test_spawn_assigns_sequential_ids() {
        let mut roster = Roster::new();
        let a = roster.spawn(UnitKind::Hoplite, Player::One, Cell::new(0, 0));
        let b = roster.spawn(UnitKind::Archer, Player::Two, Cell::new(1, 1));
        assert_eq!(a, UnitId(1));
        assert_eq!(b, UnitId(2));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_dead_units_are_skipped_but_addressable() {
        let mut roster = Roster::new();
        let id = roster.spawn(UnitKind::Hoplite, Player::One, Cell::new(0, 0));
        roster.get_mut(id).unwrap().alive = false;

        assert!(roster.unit_at(Cell::new(0, 0)).is_none());
        assert!(roster.occupancy().is_empty());
        assert!(roster.unit(id).is_some());
        assert!(roster.living(Player::One).is_empty());
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut roster = Roster::new();
        let a = roster.spawn(UnitKind::Hoplite, Player::One, Cell::new(0, 0));
        let b = roster.spawn(UnitKind::Viking, Player::Two, Cell::new(0, 1));

        let (first, second) = roster.pair_mut(b, a).unwrap();
        assert_eq!(first.id, b);
        assert_eq!(second.id, a);
        assert!(roster.pair_mut(a, a).is_none());
    }

    #[test]
    fn test_deploy_player_one_top_down() {
        let mut roster = Roster::new();
        let ids = roster.deploy(Player::One, &["H#A", ".C"], 5, 5).unwrap();
        assert_eq!(ids.len(), 3);

        let general = roster.unit(ids[0]).unwrap();
        assert_eq!(general.position, Cell::new(0, 0));
        assert!(general.has_general);
        assert_eq!(general.facing, Direction::East);

        assert_eq!(roster.unit_at(Cell::new(0, 2)).unwrap().kind, UnitKind::Archer);
        assert_eq!(
            roster.unit_at(Cell::new(1, 1)).unwrap().kind,
            UnitKind::LightHorsemen
        );
        assert_eq!(roster.units().iter().filter(|u| u.has_general).count(), 1);
    }

    #[test]
    fn test_deploy_player_two_is_mirrored() {
        let mut roster = Roster::new();
        let ids = roster.deploy(Player::Two, &["H#A", ".C"], 5, 5).unwrap();

        // "H#A" reversed is "A#H" on the last row.
        let first = roster.unit(ids[0]).unwrap();
        assert_eq!(first.kind, UnitKind::Archer);
        assert_eq!(first.position, Cell::new(4, 0));
        assert!(first.has_general);
        assert_eq!(first.facing, Direction::West);

        assert_eq!(roster.unit_at(Cell::new(4, 2)).unwrap().kind, UnitKind::Hoplite);
        // ".C" reversed is "C." one row up.
        assert_eq!(
            roster.unit_at(Cell::new(3, 0)).unwrap().kind,
            UnitKind::LightHorsemen
        );
    }

    #[test]
    fn test_deploy_rejects_bad_layouts() {
        let mut roster = Roster::new();
        assert!(matches!(
            roster.deploy(Player::One, &["HX"], 3, 3),
            Err(GameError::MapFormat { row: 0, col: 1, .. })
        ));
        assert!(matches!(
            roster.deploy(Player::One, &["HHHH"], 3, 3),
            Err(GameError::InvalidPosition { .. })
        ));
        assert!(roster.is_empty());

        roster.deploy(Player::One, &["H"], 3, 3).unwrap();
        assert!(matches!(
            roster.deploy(Player::Two, &["", "", "H"], 3, 3),
            Err(GameError::InvalidPosition { .. })
        ));
        assert_eq!(roster.len(), 1);
    }
}
