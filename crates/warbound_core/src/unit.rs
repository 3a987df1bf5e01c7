//! The unit record.
//!
//! One plain data struct per unit. Combat, movement and formation rules are
//! free functions that borrow units; nothing here knows about the board.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formation::{self, Formation};
use crate::grid::{Cell, Direction};
use crate::math::Fixed;
use crate::unit_kind::{AttackKind, UnitKind, UnitStats};

/// Unique identifier of a unit within a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// Moves first. Deploys along the north edge.
    One,
    /// Deploys along the south edge.
    Two,
}

impl Player {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// 1 or 2.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Facing given to this side's units at deployment.
    #[must_use]
    pub const fn deployment_facing(self) -> Direction {
        match self {
            Self::One => Direction::East,
            Self::Two => Direction::West,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// A unit on the board.
///
/// Dead units stay in the roster with `alive == false` so that ids remain
/// addressable; every query skips them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit {
    /// Unique id.
    pub id: UnitId,
    /// Kind, for display and formation lookups.
    pub kind: UnitKind,
    /// Owning side.
    pub player: Player,
    /// Current cell.
    pub position: Cell,
    /// False once hit points reach zero.
    pub alive: bool,
    /// Current hit points, in `[0, max_hp]`.
    pub hp: Fixed,
    /// Maximum hit points.
    pub max_hp: Fixed,
    /// Stat line, copied from the kind at creation.
    pub stats: UnitStats,
    /// Direction the unit faces.
    pub facing: Direction,
    /// Carries the army's general.
    pub has_general: bool,
    /// Already attacked this turn.
    pub has_attacked: bool,
    /// Already turned this turn.
    pub has_changed_direction: bool,
    formation: Formation,
    attack_points: Fixed,
    defense_points: Fixed,
}

impl Unit {
    /// Create a full-health unit in Standard formation with the kind's stats.
    #[must_use]
    pub fn new(id: UnitId, kind: UnitKind, player: Player, position: Cell) -> Self {
        Self::with_stats(id, kind, player, position, kind.stats())
    }

    /// Create a unit with an explicit stat line.
    #[must_use]
    pub fn with_stats(
        id: UnitId,
        kind: UnitKind,
        player: Player,
        position: Cell,
        stats: UnitStats,
    ) -> Self {
        let max_hp = Fixed::from_num(stats.max_hp);
        Self {
            id,
            kind,
            player,
            position,
            alive: true,
            hp: max_hp,
            max_hp,
            stats,
            facing: player.deployment_facing(),
            has_general: false,
            has_attacked: false,
            has_changed_direction: false,
            formation: Formation::Standard,
            attack_points: Fixed::from_num(stats.base_attack),
            defense_points: Fixed::from_num(stats.base_defense),
        }
    }

    /// Base attack as a fixed-point value.
    #[must_use]
    pub fn base_attack(&self) -> Fixed {
        Fixed::from_num(self.stats.base_attack)
    }

    /// Base defense as a fixed-point value.
    #[must_use]
    pub fn base_defense(&self) -> Fixed {
        Fixed::from_num(self.stats.base_defense)
    }

    /// Movement points granted each turn.
    #[must_use]
    pub fn movement_range(&self) -> Fixed {
        Fixed::from_num(self.stats.movement_range)
    }

    /// Melee or ranged.
    #[must_use]
    pub const fn attack_kind(&self) -> AttackKind {
        self.stats.attack_kind
    }

    /// Returns true for melee units.
    #[must_use]
    pub const fn is_melee(&self) -> bool {
        self.stats.attack_kind.is_melee()
    }

    /// Active formation.
    #[must_use]
    pub const fn formation(&self) -> Formation {
        self.formation
    }

    /// Attack after the formation modifier.
    #[must_use]
    pub const fn attack_points(&self) -> Fixed {
        self.attack_points
    }

    /// Defense after the formation modifier.
    #[must_use]
    pub const fn defense_points(&self) -> Fixed {
        self.defense_points
    }

    /// Adopt `formation` and recompute attack and defense points.
    ///
    /// # Errors
    ///
    /// [`crate::error::GameError::UnknownFormation`] if the kind cannot use it.
    pub fn set_formation(&mut self, formation: Formation) -> Result<()> {
        let record = formation::record(self.kind, formation)?;
        self.formation = formation;
        self.attack_points = self.base_attack() * record.attack_modifier;
        self.defense_points = self.base_defense() * record.defense_modifier;
        Ok(())
    }

    /// Advance to the next formation in the kind's cycle.
    ///
    /// # Errors
    ///
    /// Only if the formation tables disagree with themselves.
    pub fn cycle_formation(&mut self) -> Result<Formation> {
        let next = formation::next_formation(self.kind, self.formation);
        self.set_formation(next)?;
        Ok(next)
    }

    /// Whether `target` is within this unit's attack range.
    #[must_use]
    pub const fn in_attack_range(&self, target: Cell) -> bool {
        self.position.chebyshev(target) <= self.stats.attack_range
    }

    /// Subtract `damage` from hit points, clamping at zero. Negative damage
    /// counts as zero. Returns true if this blow killed the unit.
    pub fn take_damage(&mut self, damage: Fixed) -> bool {
        let damage = damage.max(Fixed::ZERO);
        self.hp = (self.hp - damage).max(Fixed::ZERO);
        if self.alive && self.hp == Fixed::ZERO {
            self.alive = false;
            return true;
        }
        false
    }

    /// Alive and carrying the general.
    #[must_use]
    pub const fn is_living_general(&self) -> bool {
        self.alive && self.has_general
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::math::percent;

    fn hoplite() -> Unit {
        Unit::new(UnitId(1), UnitKind::Hoplite, Player::One, Cell::new(2, 2))
    }

    #[test]
    fn test_new_unit_defaults() {
        let unit = hoplite();
        assert!(unit.alive);
        assert_eq!(unit.hp, Fixed::from_num(100));
        assert_eq!(unit.facing, Direction::East);
        assert_eq!(unit.formation(), Formation::Standard);
        assert_eq!(unit.attack_points(), Fixed::from_num(60));
        assert_eq!(unit.defense_points(), Fixed::from_num(20));

        let enemy = Unit::new(UnitId(2), UnitKind::Archer, Player::Two, Cell::new(0, 0));
        assert_eq!(enemy.facing, Direction::West);
    }

    #[test]
    fn test_formation_recomputes_points() {
        let mut unit = hoplite();
        unit.set_formation(Formation::ShieldWall).unwrap();
        assert_eq!(unit.attack_points(), Fixed::from_num(60) * percent(70));
        assert_eq!(unit.defense_points(), Fixed::from_num(20) * percent(180));

        unit.set_formation(Formation::Standard).unwrap();
        assert_eq!(unit.attack_points(), Fixed::from_num(60));
        assert_eq!(unit.defense_points(), Fixed::from_num(20));
    }

    #[test]
    fn test_unknown_formation_leaves_unit_untouched() {
        let mut unit = hoplite();
        let before = unit.clone();
        assert!(matches!(
            unit.set_formation(Formation::Turtle),
            Err(GameError::UnknownFormation { .. })
        ));
        assert_eq!(unit, before);
    }

    #[test]
    fn test_cycle_formation_wraps() {
        let mut unit = Unit::new(UnitId(3), UnitKind::Archer, Player::One, Cell::new(0, 0));
        assert_eq!(unit.cycle_formation().unwrap(), Formation::Spread);
        assert_eq!(unit.cycle_formation().unwrap(), Formation::Standard);
    }

    #[test]
    fn test_take_damage_clamps_and_kills_once() {
        let mut unit = hoplite();
        assert!(!unit.take_damage(Fixed::from_num(-5)));
        assert_eq!(unit.hp, Fixed::from_num(100));

        assert!(!unit.take_damage(Fixed::from_num(40)));
        assert_eq!(unit.hp, Fixed::from_num(60));

        assert!(unit.take_damage(Fixed::from_num(500)));
        assert_eq!(unit.hp, Fixed::ZERO);
        assert!(!unit.alive);

        assert!(!unit.take_damage(Fixed::from_num(1)));
    }

    #[test]
    fn test_attack_range_is_chebyshev() {
        let archer = Unit::new(UnitId(4), UnitKind::Archer, Player::One, Cell::new(5, 5));
        assert!(archer.in_attack_range(Cell::new(7, 7)));
        assert!(archer.in_attack_range(Cell::new(3, 6)));
        assert!(!archer.in_attack_range(Cell::new(8, 5)));
    }
}
