//! The game controller.
//!
//! [`Game`] owns the terrain, the roster, the movement graph, the turn
//! controller and the dice. Every state change goes through
//! [`Game::apply`], one [`Command`] at a time. A rejected command returns
//! an error and leaves the game exactly as it was.
//!
//! # Determinism
//!
//! Given the same configuration (seed included) and the same command
//! stream, two games end in the same [`Game::state_hash`]:
//! - all rules math is fixed-point
//! - the only randomness is the seeded [`CombatDice`]
//! - units are stored and visited in id order
//!
//! # Example
//!
//! ```
//! use warbound_core::prelude::*;
//!
//! let mut game = Game::from_config(&GameConfig::default()).unwrap();
//!
//! // Player One's general starts on (0, 1).
//! game.apply(Command::SelectUnit(Cell::new(0, 1))).unwrap();
//! game.apply(Command::MoveTo(Cell::new(0, 0))).unwrap();
//! game.apply(Command::EndTurn).unwrap();
//!
//! assert_eq!(game.turn().active_player(), Player::Two);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::combat::{self, CombatDice, CombatOutcome, SeededDice};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::formation::Formation;
use crate::grid::{Cell, Direction};
use crate::math::Fixed;
use crate::pathfinding::{self, MovementGraph, Reachability};
use crate::roster::{Roster, UnitRoster};
use crate::terrain::{TerrainMap, TerrainProvider};
use crate::turn::{TurnController, TurnState};
use crate::unit::{Player, Unit, UnitId};

/// An abstract player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Select the active player's living unit at a cell.
    SelectUnit(Cell),
    /// Clear the selection.
    Deselect,
    /// Move the selected unit.
    MoveTo(Cell),
    /// Attack the enemy at a cell with the selected unit.
    AttackAt(Cell),
    /// Hand the turn to the other player.
    EndTurn,
    /// Cycle the selected unit to its next formation.
    ChangeFormation,
    /// Turn the selected unit to face a direction. Once per turn.
    ChangeFacing(Direction),
    /// Pass the general from the selected unit to an adjacent friend.
    TransferGeneral(UnitId),
}

/// What an accepted command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A unit is now selected.
    Selected(UnitId),
    /// The selection was cleared.
    Deselected,
    /// A unit moved.
    Moved {
        /// The unit.
        unit: UnitId,
        /// Where it started.
        from: Cell,
        /// Where it ended.
        to: Cell,
        /// Movement points spent.
        cost: Fixed,
    },
    /// An attack was resolved.
    Attacked(CombatOutcome),
    /// The turn passed.
    TurnEnded(TurnState),
    /// A unit changed formation.
    FormationChanged(UnitId, Formation),
    /// A unit changed facing.
    FacingChanged(UnitId, Direction),
    /// The general moved between units.
    GeneralTransferred {
        /// Previous holder.
        from: UnitId,
        /// New holder.
        to: UnitId,
    },
}

/// Derived game result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// Both generals live.
    InProgress,
    /// One side lost its general.
    Won(Player),
    /// Both generals fell.
    Draw,
}

/// A running game.
#[derive(Debug, Clone)]
pub struct Game<D = SeededDice> {
    terrain: TerrainMap,
    roster: Roster,
    graph: MovementGraph,
    turn: TurnController,
    dice: D,
}

impl Game<SeededDice> {
    /// Set up a game from a configuration, with dice seeded from it.
    ///
    /// # Errors
    ///
    /// Any setup error from building the terrain, the armies or the graph.
    pub fn from_config(config: &GameConfig) -> Result<Self> {
        let terrain = config.build_terrain()?;
        let roster = config.build_roster()?;
        Self::new(terrain, roster, SeededDice::new(config.seed))
    }
}

impl<D: CombatDice> Game<D> {
    /// Set up a game from prepared parts.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidPosition`] if a unit stands off the board, and
    /// any error from building the movement graph.
    pub fn new(terrain: TerrainMap, roster: Roster, dice: D) -> Result<Self> {
        if let Some(stray) = roster.units().iter().find(|u| !terrain.is_valid(u.position)) {
            return Err(GameError::invalid_position(
                stray.position,
                "unit placed off the board",
            ));
        }

        let graph = MovementGraph::build(&terrain, &roster.occupancy())?;
        let turn = TurnController::new(&roster);

        tracing::info!(
            rows = terrain.rows(),
            cols = terrain.cols(),
            units = roster.len(),
            "Game started"
        );

        Ok(Self {
            terrain,
            roster,
            graph,
            turn,
            dice,
        })
    }

    /// Board terrain.
    #[must_use]
    pub fn terrain(&self) -> &TerrainMap {
        &self.terrain
    }

    /// All units.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The current movement graph.
    #[must_use]
    pub fn graph(&self) -> &MovementGraph {
        &self.graph
    }

    /// Turn state, selection and movement points.
    #[must_use]
    pub fn turn(&self) -> &TurnController {
        &self.turn
    }

    /// The selected unit, if any.
    #[must_use]
    pub fn selected_unit(&self) -> Option<&Unit> {
        self.turn.selected().and_then(|id| self.roster.unit(id))
    }

    /// Current result.
    #[must_use]
    pub fn result(&self) -> GameResult {
        let one = self.roster.has_living_general(Player::One);
        let two = self.roster.has_living_general(Player::Two);
        match (one, two) {
            (true, true) => GameResult::InProgress,
            (true, false) => GameResult::Won(Player::One),
            (false, true) => GameResult::Won(Player::Two),
            (false, false) => GameResult::Draw,
        }
    }

    /// True once some side has no living general.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.result() != GameResult::InProgress
    }

    /// The winning side, if there is one. `None` during play and on a draw.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        match self.result() {
            GameResult::Won(player) => Some(player),
            GameResult::InProgress | GameResult::Draw => None,
        }
    }

    /// Cells the unit can reach with its remaining movement points.
    ///
    /// # Errors
    ///
    /// [`GameError::IllegalAction`] if no such living unit exists.
    pub fn reachable(&self, id: UnitId) -> Result<Reachability> {
        let unit = self.living_unit(id)?;
        pathfinding::reachable(&self.graph, unit.position, self.turn.points(id))
    }

    /// Cells reachable from `start` with an explicit budget.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfBounds`] for an invalid start and
    /// [`GameError::InvalidBudget`] for a negative budget.
    pub fn reachable_from(&self, start: Cell, budget: Fixed) -> Result<Reachability> {
        pathfinding::reachable(&self.graph, start, budget)
    }

    /// Reachable cells of the unit that some living enemy could attack.
    ///
    /// # Errors
    ///
    /// [`GameError::IllegalAction`] if no such living unit exists.
    pub fn dangerous_squares(&self, id: UnitId) -> Result<BTreeSet<Cell>> {
        let unit = self.living_unit(id)?;
        let reach = self.reachable(id)?;
        let enemies = self.roster.living(unit.player.opponent());
        Ok(reach
            .cells
            .into_iter()
            .filter(|&cell| enemies.iter().any(|enemy| enemy.in_attack_range(cell)))
            .collect())
    }

    /// Enemy cells the unit can attack right now.
    ///
    /// # Errors
    ///
    /// [`GameError::IllegalAction`] if no such living unit exists.
    pub fn attackable_squares(&self, id: UnitId) -> Result<BTreeSet<Cell>> {
        let unit = self.living_unit(id)?;
        if !self.turn.has_valid_attack(unit) {
            return Ok(BTreeSet::new());
        }
        Ok(self
            .roster
            .living(unit.player.opponent())
            .into_iter()
            .filter(|enemy| unit.in_attack_range(enemy.position))
            .map(|enemy| enemy.position)
            .collect())
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Any per-command error. The game is unchanged when an error is
    /// returned. Every command is an [`GameError::IllegalAction`] once the
    /// game is over.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome> {
        let result = if self.game_over() {
            Err(GameError::illegal("the game is over"))
        } else {
            self.dispatch(command)
        };

        match &result {
            Ok(outcome) => {
                tracing::debug!(?command, ?outcome, "Command applied");
                if self.game_over() {
                    tracing::info!(result = ?self.result(), "Game over");
                }
            }
            Err(error) => tracing::warn!(?command, %error, "Command rejected"),
        }

        #[cfg(feature = "debug-validation")]
        self.check_invariants();

        result
    }

    fn dispatch(&mut self, command: Command) -> Result<CommandOutcome> {
        match command {
            Command::SelectUnit(cell) => self.select(cell),
            Command::Deselect => {
                self.turn.deselect();
                Ok(CommandOutcome::Deselected)
            }
            Command::MoveTo(cell) => self.move_selected(cell),
            Command::AttackAt(cell) => self.attack(cell),
            Command::EndTurn => {
                self.turn.end_turn(&mut self.roster);
                Ok(CommandOutcome::TurnEnded(self.turn.state()))
            }
            Command::ChangeFormation => self.change_formation(),
            Command::ChangeFacing(direction) => self.change_facing(direction),
            Command::TransferGeneral(target) => self.transfer_general(target),
        }
    }

    fn select(&mut self, cell: Cell) -> Result<CommandOutcome> {
        self.check_cell(cell)?;
        let active = self.turn.active_player();
        let unit = self
            .roster
            .unit_at(cell)
            .ok_or_else(|| GameError::invalid_position(cell, "no living unit here"))?;
        if unit.player != active {
            return Err(GameError::illegal(format!(
                "unit {} belongs to {}, but it is {active}'s turn",
                unit.id, unit.player
            )));
        }
        let id = unit.id;
        self.turn.select(id);
        Ok(CommandOutcome::Selected(id))
    }

    fn move_selected(&mut self, target: Cell) -> Result<CommandOutcome> {
        let unit = self.require_selection()?;
        let (id, from) = (unit.id, unit.position);
        self.check_cell(target)?;

        if target == from {
            return Err(GameError::illegal(format!("unit {id} is already at {target}")));
        }
        if self.graph.is_occupied(target) {
            return Err(GameError::illegal(format!("{target} is occupied")));
        }
        let cost = self.reachable(id)?.cost(target).ok_or_else(|| {
            GameError::illegal(format!("{target} is not reachable by unit {id}"))
        })?;

        self.turn.spend(id, cost)?;
        if let Some(unit) = self.roster.get_mut(id) {
            unit.position = target;
        }
        self.graph.update(&self.roster.occupancy());

        if self.turn.points(id) <= Fixed::ZERO {
            self.turn.deselect();
        }

        Ok(CommandOutcome::Moved {
            unit: id,
            from,
            to: target,
            cost,
        })
    }

    fn attack(&mut self, target: Cell) -> Result<CommandOutcome> {
        let attacker = self.require_selection()?;
        let attacker_id = attacker.id;
        if !self.turn.has_valid_attack(attacker) {
            return Err(GameError::illegal(format!(
                "unit {attacker_id} has already attacked this turn"
            )));
        }
        self.check_cell(target)?;
        let defender_id = self
            .roster
            .unit_at(target)
            .ok_or_else(|| GameError::invalid_position(target, "no unit to attack"))?
            .id;
        let terrain = self.terrain.terrain_at(target)?;

        let (attacker, defender) = self
            .roster
            .pair_mut(attacker_id, defender_id)
            .ok_or_else(|| GameError::illegal("a unit cannot attack itself"))?;
        combat::validate_attack(attacker, defender)?;
        let outcome = combat::resolve(attacker, defender, terrain, &mut self.dice);

        self.turn.set_points(attacker_id, Fixed::ZERO);
        if outcome.attacker_died || outcome.defender_died {
            self.graph.update(&self.roster.occupancy());
        }
        self.turn.deselect();

        Ok(CommandOutcome::Attacked(outcome))
    }

    fn change_formation(&mut self) -> Result<CommandOutcome> {
        let unit = self.require_selection()?;
        let id = unit.id;
        if !self.turn.has_valid_moves(unit) {
            return Err(GameError::illegal(format!(
                "unit {id} has no movement points left to reform"
            )));
        }
        let unit = self
            .roster
            .get_mut(id)
            .ok_or_else(|| GameError::illegal("selected unit vanished"))?;
        let formation = unit.cycle_formation()?;
        tracing::debug!(unit = %id, %formation, "Formation changed");
        Ok(CommandOutcome::FormationChanged(id, formation))
    }

    fn change_facing(&mut self, direction: Direction) -> Result<CommandOutcome> {
        let id = self.require_selection()?.id;
        let unit = self
            .roster
            .get_mut(id)
            .ok_or_else(|| GameError::illegal("selected unit vanished"))?;
        if unit.has_changed_direction {
            return Err(GameError::illegal(format!(
                "unit {id} has already turned this turn"
            )));
        }
        unit.facing = direction;
        unit.has_changed_direction = true;
        Ok(CommandOutcome::FacingChanged(id, direction))
    }

    fn transfer_general(&mut self, target: UnitId) -> Result<CommandOutcome> {
        let source = self.require_selection()?;
        let (source_id, source_pos, player) = (source.id, source.position, source.player);
        if !source.has_general {
            return Err(GameError::illegal(format!(
                "unit {source_id} does not carry the general"
            )));
        }

        let receiver = self
            .roster
            .unit(target)
            .filter(|u| u.alive)
            .ok_or_else(|| GameError::illegal(format!("unit {target} is not a living unit")))?;
        if receiver.id == source_id {
            return Err(GameError::illegal("the general is already with this unit"));
        }
        if receiver.player != player {
            return Err(GameError::illegal("the general can only join a friendly unit"));
        }
        if receiver.position.chebyshev(source_pos) > 1 {
            return Err(GameError::illegal(format!(
                "unit {target} is not adjacent to unit {source_id}"
            )));
        }

        let (from, to) = self
            .roster
            .pair_mut(source_id, target)
            .ok_or_else(|| GameError::illegal("general transfer needs two units"))?;
        from.has_general = false;
        to.has_general = true;
        self.turn.deselect();

        tracing::info!(from = %source_id, to = %target, player = %player, "General transferred");
        Ok(CommandOutcome::GeneralTransferred {
            from: source_id,
            to: target,
        })
    }

    /// Hash of everything that affects future play.
    ///
    /// Two games with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.turn.state().hash(&mut hasher);
        self.turn.turn_number().hash(&mut hasher);
        self.turn.selected().hash(&mut hasher);

        self.roster.len().hash(&mut hasher);
        for unit in self.roster.units() {
            unit.hash(&mut hasher);
            self.turn.points(unit.id).to_bits().hash(&mut hasher);
        }

        hasher.finish()
    }

    fn require_selection(&self) -> Result<&Unit> {
        self.selected_unit()
            .filter(|u| u.alive)
            .ok_or_else(|| GameError::illegal("no unit selected"))
    }

    fn living_unit(&self, id: UnitId) -> Result<&Unit> {
        self.roster
            .unit(id)
            .filter(|u| u.alive)
            .ok_or_else(|| GameError::illegal(format!("unit {id} is not on the board")))
    }

    fn check_cell(&self, cell: Cell) -> Result<()> {
        if self.terrain.is_valid(cell) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds(cell))
        }
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        for player in [Player::One, Player::Two] {
            let generals = self
                .roster
                .living(player)
                .iter()
                .filter(|u| u.has_general)
                .count();
            debug_assert!(generals <= 1, "{player} has {generals} living generals");
        }
        for unit in self.roster.units() {
            debug_assert!(unit.hp >= Fixed::ZERO && unit.hp <= unit.max_hp);
            debug_assert_eq!(unit.alive, unit.hp > Fixed::ZERO);
        }
        debug_assert_eq!(self.graph.rows(), self.terrain.rows());
    }
}
