//! Battle formations and their stat modifiers.
//!
//! Each unit kind offers an ordered list of formations. Changing formation
//! cycles through that list, and the unit's current attack and defense
//! points are `base * modifier` for the active formation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{percent, Fixed};
use crate::unit_kind::UnitKind;

/// A battle formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Formation {
    /// Default order. No modifiers.
    #[default]
    Standard,
    /// Locked shields. Strong against missiles.
    ShieldWall,
    /// Dense spear block. Devastating from the front, exposed elsewhere.
    Phalanx,
    /// Loose order. Helps missile troops against missiles.
    Spread,
    /// Roman testudo.
    Turtle,
    /// Wedge for breaking lines.
    V,
}

impl Formation {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::ShieldWall => "Shield Wall",
            Self::Phalanx => "Phalanx",
            Self::Spread => "Spread",
            Self::Turtle => "Turtle",
            Self::V => "V Formation",
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attack and defense multipliers for one formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormationRecord {
    /// The formation.
    pub formation: Formation,
    /// Multiplier on base attack.
    pub attack_modifier: Fixed,
    /// Multiplier on base defense.
    pub defense_modifier: Fixed,
}

/// Formations available to `kind`, in cycling order. Always starts with
/// [`Formation::Standard`].
#[must_use]
pub const fn formations(kind: UnitKind) -> &'static [Formation] {
    use Formation::{Phalanx, ShieldWall, Spread, Standard, Turtle, V};
    match kind {
        UnitKind::Hoplite => &[Standard, ShieldWall, Phalanx, Spread],
        UnitKind::LightHorsemen | UnitKind::HeavyCavalry => &[Standard, Spread, V],
        UnitKind::Legionary => &[Standard, ShieldWall, Turtle, Spread],
        UnitKind::Viking => &[Standard, ShieldWall, Spread, Turtle, V],
        UnitKind::Hypaspist => &[Standard, Phalanx, Spread],
        UnitKind::MenAtArms => &[Standard, ShieldWall, V, Turtle, Spread],
        UnitKind::Archer | UnitKind::Crossbowmen => &[Standard, Spread],
    }
}

/// Modifiers for `kind` in `formation`.
///
/// # Errors
///
/// [`GameError::UnknownFormation`] if the kind cannot adopt the formation.
pub fn record(kind: UnitKind, formation: Formation) -> Result<FormationRecord> {
    use Formation::{Phalanx, ShieldWall, Spread, Standard, Turtle, V};

    if !formations(kind).contains(&formation) {
        return Err(GameError::UnknownFormation {
            formation: formation.name().to_string(),
            unit: kind.name().to_string(),
        });
    }

    let (attack, defense) = match (kind, formation) {
        (_, Standard) => (100, 100),
        (_, ShieldWall) => (70, 180),
        (_, Turtle) => (50, 120),
        (_, Phalanx) => (120, 160),

        (UnitKind::Archer | UnitKind::Crossbowmen, Spread) => (130, 80),
        (UnitKind::Hoplite | UnitKind::Viking, Spread) => (100, 100),
        (UnitKind::LightHorsemen | UnitKind::HeavyCavalry, Spread) => (90, 120),
        (_, Spread) => (90, 100),

        (UnitKind::Viking, V) => (150, 90),
        (_, V) => (150, 60),
    };

    Ok(FormationRecord {
        formation,
        attack_modifier: percent(attack),
        defense_modifier: percent(defense),
    })
}

/// The formation after `current` in the kind's cycle, wrapping to the start.
///
/// A formation the kind does not know restarts the cycle.
#[must_use]
pub fn next_formation(kind: UnitKind, current: Formation) -> Formation {
    let cycle = formations(kind);
    let next = cycle
        .iter()
        .position(|&f| f == current)
        .map_or(0, |i| (i + 1) % cycle.len());
    cycle[next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_starts_standard() {
        for kind in UnitKind::ALL {
            assert_eq!(formations(kind)[0], Formation::Standard);
            let standard = record(kind, Formation::Standard).unwrap();
            assert_eq!(standard.attack_modifier, Fixed::ONE);
            assert_eq!(standard.defense_modifier, Fixed::ONE);
        }
    }

    #[test]
    fn test_every_listed_formation_has_a_record() {
        for kind in UnitKind::ALL {
            for &formation in formations(kind) {
                assert!(record(kind, formation).is_ok(), "{kind} {formation}");
            }
        }
    }

    #[test]
    fn test_unavailable_formation_is_rejected() {
        let err = record(UnitKind::Archer, Formation::Phalanx).unwrap_err();
        assert_eq!(
            err,
            GameError::UnknownFormation {
                formation: "Phalanx".to_string(),
                unit: "Archer".to_string(),
            }
        );
    }

    #[test]
    fn test_modifier_values() {
        let wall = record(UnitKind::Hoplite, Formation::ShieldWall).unwrap();
        assert_eq!(wall.attack_modifier, percent(70));
        assert_eq!(wall.defense_modifier, percent(180));

        let wedge = record(UnitKind::Viking, Formation::V).unwrap();
        assert_eq!(wedge.defense_modifier, percent(90));

        let loose = record(UnitKind::Crossbowmen, Formation::Spread).unwrap();
        assert_eq!(loose.attack_modifier, percent(130));
        assert_eq!(loose.defense_modifier, percent(80));
    }

    #[test]
    fn test_next_formation_cycles() {
        let kind = UnitKind::Hoplite;
        let mut current = Formation::Standard;
        let mut seen = Vec::new();
        for _ in 0..formations(kind).len() {
            current = next_formation(kind, current);
            seen.push(current);
        }
        assert_eq!(
            seen,
            vec![
                Formation::ShieldWall,
                Formation::Phalanx,
                Formation::Spread,
                Formation::Standard
            ]
        );
        assert_eq!(next_formation(UnitKind::Archer, Formation::V), Formation::Standard);
    }
}
