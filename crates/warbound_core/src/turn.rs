//! Whose turn it is, per-turn allowances, and action eligibility.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::Fixed;
use crate::roster::{Roster, UnitRoster};
use crate::unit::{Player, Unit, UnitId};

/// Turn state machine. There is no terminal state; game over is derived
/// from the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TurnState {
    /// Player One acts.
    #[default]
    Player1Turn,
    /// Player Two acts.
    Player2Turn,
}

impl TurnState {
    /// The acting side.
    #[must_use]
    pub const fn player(self) -> Player {
        match self {
            Self::Player1Turn => Player::One,
            Self::Player2Turn => Player::Two,
        }
    }

    /// The state after the current player ends their turn.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Player1Turn => Self::Player2Turn,
            Self::Player2Turn => Self::Player1Turn,
        }
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'s turn", self.player())
    }
}

/// Tracks the active player, remaining movement points and the selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TurnController {
    state: TurnState,
    turn_number: u32,
    movement_points: BTreeMap<UnitId, Fixed>,
    selected: Option<UnitId>,
}

impl TurnController {
    /// Start a game: Player One acts first with full movement points.
    #[must_use]
    pub fn new<R: UnitRoster + ?Sized>(roster: &R) -> Self {
        let mut controller = Self {
            state: TurnState::Player1Turn,
            turn_number: 1,
            movement_points: BTreeMap::new(),
            selected: None,
        };
        for unit in roster.living(Player::One) {
            controller
                .movement_points
                .insert(unit.id, unit.movement_range());
        }
        controller
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// The acting side.
    #[must_use]
    pub const fn active_player(&self) -> Player {
        self.state.player()
    }

    /// Turns started so far, counting from 1.
    #[must_use]
    pub const fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Currently selected unit.
    #[must_use]
    pub const fn selected(&self) -> Option<UnitId> {
        self.selected
    }

    /// Select a unit. Eligibility is checked by the caller.
    pub fn select(&mut self, id: UnitId) {
        self.selected = Some(id);
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Remaining movement points for `id`. Zero if none were granted.
    #[must_use]
    pub fn points(&self, id: UnitId) -> Fixed {
        self.movement_points.get(&id).copied().unwrap_or(Fixed::ZERO)
    }

    /// Overwrite the remaining points for `id`.
    pub fn set_points(&mut self, id: UnitId, points: Fixed) {
        self.movement_points.insert(id, points.max(Fixed::ZERO));
    }

    /// Deduct `cost` from the remaining points for `id`.
    ///
    /// # Errors
    ///
    /// [`GameError::IllegalAction`] if the unit cannot afford it.
    pub fn spend(&mut self, id: UnitId, cost: Fixed) -> Result<Fixed> {
        let remaining = self.points(id);
        if cost > remaining {
            return Err(GameError::illegal(format!(
                "unit {id} needs {cost} movement points but has {remaining}"
            )));
        }
        let left = remaining - cost;
        self.movement_points.insert(id, left);
        Ok(left)
    }

    /// Hand the turn to the other player.
    ///
    /// Clears the selection, then gives every living unit of the new active
    /// player full movement points and clears its per-turn flags. The side
    /// that just finished is left untouched.
    pub fn end_turn(&mut self, roster: &mut Roster) {
        self.state = self.state.next();
        self.turn_number += 1;
        self.selected = None;

        let player = self.state.player();
        for unit in roster.iter_mut().filter(|u| u.alive && u.player == player) {
            self.movement_points.insert(unit.id, unit.movement_range());
            unit.has_attacked = false;
            unit.has_changed_direction = false;
        }

        tracing::info!(
            turn = self.turn_number,
            player = %player,
            "Turn started"
        );
    }

    /// Alive, owned by the active player, and with movement points left.
    #[must_use]
    pub fn can_act(&self, unit: &Unit) -> bool {
        unit.alive && unit.player == self.active_player() && self.points(unit.id) > Fixed::ZERO
    }

    /// The unit has not attacked yet this turn.
    #[must_use]
    pub fn has_valid_attack(&self, unit: &Unit) -> bool {
        !unit.has_attacked
    }

    /// The unit has movement points left.
    #[must_use]
    pub fn has_valid_moves(&self, unit: &Unit) -> bool {
        self.points(unit.id) > Fixed::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::unit_kind::UnitKind;

    fn roster() -> (Roster, UnitId, UnitId) {
        let mut roster = Roster::new();
        let one = roster.spawn(UnitKind::LightHorsemen, Player::One, Cell::new(0, 0));
        let two = roster.spawn(UnitKind::Hoplite, Player::Two, Cell::new(4, 4));
        (roster, one, two)
    }

    #[test]
    fn test_initial_state_grants_player_one_points() {
        let (roster, one, two) = roster();
        let turn = TurnController::new(&roster);
        assert_eq!(turn.state(), TurnState::Player1Turn);
        assert_eq!(turn.points(one), Fixed::from_num(3));
        assert_eq!(turn.points(two), Fixed::ZERO);
        assert!(turn.can_act(roster.unit(one).unwrap()));
        assert!(!turn.can_act(roster.unit(two).unwrap()));
    }

    #[test]
    fn test_end_turn_swaps_and_clears_selection() {
        let (mut roster, one, two) = roster();
        let mut turn = TurnController::new(&roster);
        turn.select(one);

        turn.end_turn(&mut roster);
        assert_eq!(turn.active_player(), Player::Two);
        assert_eq!(turn.selected(), None);
        assert_eq!(turn.points(two), Fixed::from_num(2));
        assert_eq!(turn.turn_number(), 2);

        turn.end_turn(&mut roster);
        assert_eq!(turn.state(), TurnState::Player1Turn);
    }

    #[test]
    fn test_spend_rejects_overdraft() {
        let (roster, one, _) = roster();
        let mut turn = TurnController::new(&roster);
        assert_eq!(turn.spend(one, Fixed::from_num(2)).unwrap(), Fixed::ONE);
        assert!(matches!(
            turn.spend(one, Fixed::from_num(2)),
            Err(GameError::IllegalAction(_))
        ));
        assert_eq!(turn.points(one), Fixed::ONE);
    }

    #[test]
    fn test_predicates() {
        let (mut roster, one, _) = roster();
        let mut turn = TurnController::new(&roster);
        let unit = roster.unit(one).unwrap().clone();
        assert!(turn.has_valid_attack(&unit));
        assert!(turn.has_valid_moves(&unit));

        turn.set_points(one, Fixed::ZERO);
        assert!(!turn.has_valid_moves(&unit));
        assert!(!turn.can_act(&unit));

        roster.get_mut(one).unwrap().has_attacked = true;
        assert!(!turn.has_valid_attack(roster.unit(one).unwrap()));
    }

    #[test]
    fn test_dead_units_are_not_refreshed() {
        let (mut roster, _, two) = roster();
        roster.get_mut(two).unwrap().alive = false;
        let mut turn = TurnController::new(&roster);
        turn.end_turn(&mut roster);
        assert_eq!(turn.points(two), Fixed::ZERO);
    }
}
