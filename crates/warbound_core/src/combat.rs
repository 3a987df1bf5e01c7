//! Attack resolution.
//!
//! Damage is directional. The side of the defender that is struck picks a
//! damage multiplier, a critical chance and a counter-attack strength. On
//! top of that:
//! - the attacker's general and a melee Phalanx raise attack
//! - the defender's general, the terrain under it and its formation raise
//!   (or lower) its effective defense
//! - a uniform variation in `[0.8, 1.2]` is applied, and a critical hit
//!   multiplies by a further 1.5
//!
//! Both sides fighting in melee trade blows: the defender always counters,
//! even when the first strike killed it.
//!
//! All math is fixed-point. Randomness comes only from a [`CombatDice`].

use std::cmp::Ordering;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::formation::Formation;
use crate::grid::{Cell, Direction};
use crate::math::{percent, Fixed};
use crate::terrain::TerrainKind;
use crate::unit::Unit;
use crate::unit_kind::AttackKind;

/// Which side of the defender an attack lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackDirection {
    /// The side the defender faces.
    Front,
    /// Either side.
    Flank,
    /// Behind.
    Rear,
}

impl AttackDirection {
    /// Damage multiplier for this side.
    #[must_use]
    pub fn damage_multiplier(self) -> Fixed {
        match self {
            Self::Front => percent(100),
            Self::Flank => percent(150),
            Self::Rear => percent(200),
        }
    }

    /// Chance of a critical hit from this side.
    #[must_use]
    pub fn critical_chance(self) -> Fixed {
        match self {
            Self::Front => percent(5),
            Self::Flank => percent(10),
            Self::Rear => percent(15),
        }
    }

    /// Strength of the defender's counter-attack.
    #[must_use]
    pub fn counter_multiplier(self) -> Fixed {
        match self {
            Self::Front => percent(60),
            Self::Flank => percent(40),
            Self::Rear => percent(20),
        }
    }
}

impl fmt::Display for AttackDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Front => "front",
            Self::Flank => "flank",
            Self::Rear => "rear",
        })
    }
}

/// Classify an attack from `attacker` on a defender at `defender` facing
/// `facing`.
///
/// Only the component of `defender - attacker` on the facing axis counts:
/// along the facing is front, against it is rear, zero is flank.
#[must_use]
pub fn attack_direction(attacker: Cell, defender: Cell, facing: Direction) -> AttackDirection {
    use AttackDirection::{Flank, Front, Rear};
    use Direction::{East, North, South, West};

    let rel_row = defender.row - attacker.row;
    let rel_col = defender.col - attacker.col;
    let axis = match facing {
        North | South => rel_row.cmp(&0),
        East | West => rel_col.cmp(&0),
    };

    match (facing, axis) {
        (_, Ordering::Equal) => Flank,
        (North, Ordering::Less) => Front,
        (North, Ordering::Greater) => Rear,
        (South, Ordering::Greater) => Front,
        (South, Ordering::Less) => Rear,
        (East, Ordering::Greater) => Front,
        (East, Ordering::Less) => Rear,
        (West, Ordering::Less) => Front,
        (West, Ordering::Greater) => Rear,
    }
}

/// Source of combat randomness.
pub trait CombatDice {
    /// Uniform damage variation in `[0.8, 1.2]`.
    fn variation(&mut self) -> Fixed;

    /// Roll for a critical hit with probability `chance`.
    fn critical(&mut self, chance: Fixed) -> bool;
}

/// Production dice backed by a seeded ChaCha8 stream.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    /// Lower bound of the damage variation.
    pub const VARIATION_MIN: Fixed = Fixed::from_bits(0x0000_0000_CCCC_CCCD);
    /// Upper bound of the damage variation.
    pub const VARIATION_MAX: Fixed = Fixed::from_bits(0x0000_0001_3333_3333);

    /// Dice seeded from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Number of 32-bit words drawn so far. Two dice with the same seed and
    /// the same position produce the same future rolls.
    #[must_use]
    pub fn position(&self) -> u128 {
        self.rng.get_word_pos()
    }
}

impl CombatDice for SeededDice {
    fn variation(&mut self) -> Fixed {
        let bits = self
            .rng
            .gen_range(Self::VARIATION_MIN.to_bits()..=Self::VARIATION_MAX.to_bits());
        Fixed::from_bits(bits)
    }

    fn critical(&mut self, chance: Fixed) -> bool {
        let roll = Fixed::from_bits(self.rng.gen_range(0..Fixed::ONE.to_bits()));
        roll < chance
    }
}

/// Deterministic breakdown of an attack before any dice are rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackProfile {
    /// Side of the defender that is struck.
    pub direction: AttackDirection,
    /// Product of attacker-side multipliers.
    pub attack_modifier: Fixed,
    /// Product of defender-side multipliers.
    pub defense_modifier: Fixed,
    /// Damage before variation and critical hits. Never negative.
    pub base_damage: Fixed,
    /// Chance of a critical hit.
    pub critical_chance: Fixed,
    /// Counter damage before variation, if the defender counters.
    pub base_counter: Option<Fixed>,
}

/// Result of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatOutcome {
    /// Side of the defender that was struck.
    pub direction: AttackDirection,
    /// Damage dealt to the defender.
    pub defender_damage: Fixed,
    /// Whether the strike was a critical hit.
    pub critical: bool,
    /// The defender's hit points reached zero.
    pub defender_died: bool,
    /// Damage dealt back to the attacker, if the defender countered.
    pub counter_damage: Option<Fixed>,
    /// The attacker's hit points reached zero.
    pub attacker_died: bool,
}

/// Attacker-side multiplier: general and melee Phalanx.
#[must_use]
pub fn attack_modifier(attacker: &Unit) -> Fixed {
    let mut modifier = Fixed::ONE;
    if attacker.has_general {
        modifier *= percent(125);
    }
    if attacker.is_melee() && attacker.formation() == Formation::Phalanx {
        modifier *= percent(175);
    }
    modifier
}

/// Defender-side multiplier: general, terrain and formation.
#[must_use]
pub fn defense_modifier(
    defender: &Unit,
    attacker_kind: AttackKind,
    terrain: TerrainKind,
    direction: AttackDirection,
) -> Fixed {
    let mut modifier = Fixed::ONE;
    if defender.has_general {
        modifier *= percent(160);
    }

    modifier *= match (terrain, attacker_kind) {
        (TerrainKind::Mountain, AttackKind::Melee) => percent(150),
        (TerrainKind::Mountain, AttackKind::Ranged) => percent(120),
        (TerrainKind::Forest, AttackKind::Ranged) => percent(170),
        (TerrainKind::Forest, AttackKind::Melee) => percent(125),
        (TerrainKind::Plains, _) => Fixed::ONE,
    };

    modifier *= match (defender.formation(), defender.attack_kind()) {
        (Formation::ShieldWall, _) => match attacker_kind {
            AttackKind::Ranged => percent(250),
            AttackKind::Melee => percent(150),
        },
        (Formation::Phalanx, AttackKind::Melee) => match direction {
            AttackDirection::Front => percent(300),
            AttackDirection::Flank | AttackDirection::Rear => percent(80),
        },
        (Formation::Spread, AttackKind::Ranged) => match attacker_kind {
            AttackKind::Ranged => percent(160),
            AttackKind::Melee => percent(80),
        },
        _ => Fixed::ONE,
    };

    modifier
}

/// Compute every deterministic factor of an attack.
///
/// `terrain` is the terrain under the defender.
#[must_use]
pub fn profile(attacker: &Unit, defender: &Unit, terrain: TerrainKind) -> AttackProfile {
    let direction = attack_direction(attacker.position, defender.position, defender.facing);
    let attack_mod = attack_modifier(attacker);
    let defense_mod = defense_modifier(defender, attacker.attack_kind(), terrain, direction);

    let hundred = Fixed::from_num(100);
    let reduction = defender.base_defense() * defense_mod / hundred;
    let base_damage = (attacker.base_attack()
        * attack_mod
        * direction.damage_multiplier()
        * (Fixed::ONE - reduction))
        .max(Fixed::ZERO);

    let base_counter = (attacker.is_melee() && defender.is_melee()).then(|| {
        (defender.base_attack()
            * direction.counter_multiplier()
            * (Fixed::ONE - attacker.base_defense() / hundred))
            .max(Fixed::ZERO)
    });

    AttackProfile {
        direction,
        attack_modifier: attack_mod,
        defense_modifier: defense_mod,
        base_damage,
        critical_chance: direction.critical_chance(),
        base_counter,
    }
}

/// Check the preconditions of an attack.
///
/// # Errors
///
/// [`GameError::IllegalAction`] if either unit is dead, they share an
/// owner, or the defender is out of range. Whether the attacker still has
/// its attack this turn is up to [`crate::turn::TurnController`].
pub fn validate_attack(attacker: &Unit, defender: &Unit) -> Result<()> {
    if !attacker.alive || !defender.alive {
        return Err(GameError::illegal("dead units cannot fight"));
    }
    if attacker.player == defender.player {
        return Err(GameError::illegal("cannot attack a friendly unit"));
    }
    if !attacker.in_attack_range(defender.position) {
        return Err(GameError::illegal(format!(
            "target {} is out of range of unit {}",
            defender.position, attacker.id
        )));
    }
    Ok(())
}

/// Resolve an attack and apply it to both units.
///
/// `terrain` is the terrain under the defender. The caller is expected to
/// have checked [`validate_attack`].
pub fn resolve<D: CombatDice + ?Sized>(
    attacker: &mut Unit,
    defender: &mut Unit,
    terrain: TerrainKind,
    dice: &mut D,
) -> CombatOutcome {
    let profile = profile(attacker, defender, terrain);

    let mut variation = dice.variation();
    let critical = dice.critical(profile.critical_chance);
    if critical {
        variation *= percent(150);
    }
    let defender_damage = (profile.base_damage * variation).max(Fixed::ZERO);
    defender.take_damage(defender_damage);

    let counter_damage = profile.base_counter.map(|base| {
        let damage = (base * dice.variation()).max(Fixed::ZERO);
        attacker.take_damage(damage);
        damage
    });

    attacker.has_attacked = true;

    let outcome = CombatOutcome {
        direction: profile.direction,
        defender_damage,
        critical,
        defender_died: !defender.alive,
        counter_damage,
        attacker_died: !attacker.alive,
    };

    tracing::info!(
        attacker = %attacker.id,
        defender = %defender.id,
        direction = %outcome.direction,
        damage = %outcome.defender_damage,
        critical = outcome.critical,
        counter = ?outcome.counter_damage.map(|c| c.to_string()),
        defender_died = outcome.defender_died,
        attacker_died = outcome.attacker_died,
        "Attack resolved"
    );

    outcome
}
