//! Unit kinds and their stat lines.
//!
//! Every kind has a fixed stat line and a single-letter layout symbol used
//! by army layouts.
//!
//! ```
//! use warbound_core::unit_kind::{AttackKind, UnitKind};
//!
//! let kind = UnitKind::from_symbol('B').unwrap();
//! assert_eq!(kind, UnitKind::Crossbowmen);
//! assert_eq!(kind.stats().attack_range, 3);
//! assert_eq!(kind.stats().attack_kind, AttackKind::Ranged);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a unit delivers its attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Hand-to-hand. Melee pairs trade counter-attacks.
    Melee,
    /// Missile troops. Never counter and are never countered.
    Ranged,
}

impl AttackKind {
    /// Returns true for melee.
    #[must_use]
    pub const fn is_melee(self) -> bool {
        matches!(self, Self::Melee)
    }

    /// Returns true for ranged.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::Ranged)
    }
}

/// Base stats shared by every unit of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Movement points granted at the start of each turn.
    pub movement_range: u32,
    /// Maximum Chebyshev distance of an attack.
    pub attack_range: u32,
    /// Melee or ranged.
    pub attack_kind: AttackKind,
    /// Base attack before formation modifiers.
    pub base_attack: u32,
    /// Base defense before formation modifiers. Read as a percentage.
    pub base_defense: u32,
    /// Maximum hit points.
    pub max_hp: u32,
}

impl UnitStats {
    const fn melee(movement_range: u32, base_attack: u32, base_defense: u32) -> Self {
        Self {
            movement_range,
            attack_range: 1,
            attack_kind: AttackKind::Melee,
            base_attack,
            base_defense,
            max_hp: 100,
        }
    }

    const fn ranged(attack_range: u32, base_attack: u32, base_defense: u32) -> Self {
        Self {
            movement_range: 2,
            attack_range,
            attack_kind: AttackKind::Ranged,
            base_attack,
            base_defense,
            max_hp: 100,
        }
    }
}

/// The kinds of unit an army can field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Greek heavy infantry.
    Hoplite,
    /// Fast skirmishing cavalry.
    LightHorsemen,
    /// Armoured shock cavalry.
    HeavyCavalry,
    /// Norse raiders.
    Viking,
    /// Short-range bowmen.
    Archer,
    /// Long-range missile troops.
    Crossbowmen,
    /// Macedonian elite infantry.
    Hypaspist,
    /// Roman line infantry.
    Legionary,
    /// Heavily armoured foot.
    MenAtArms,
}

impl UnitKind {
    /// Every unit kind.
    pub const ALL: [UnitKind; 9] = [
        Self::Hoplite,
        Self::LightHorsemen,
        Self::HeavyCavalry,
        Self::Viking,
        Self::Archer,
        Self::Crossbowmen,
        Self::Hypaspist,
        Self::Legionary,
        Self::MenAtArms,
    ];

    /// Stat line for this kind.
    #[must_use]
    pub const fn stats(self) -> UnitStats {
        match self {
            Self::Hoplite => UnitStats::melee(2, 60, 20),
            Self::LightHorsemen => UnitStats::melee(3, 50, 10),
            Self::HeavyCavalry => UnitStats::melee(2, 65, 30),
            Self::Viking => UnitStats::melee(2, 65, 15),
            Self::Archer => UnitStats::ranged(2, 22, 2),
            Self::Crossbowmen => UnitStats::ranged(3, 30, 2),
            Self::Hypaspist => UnitStats::melee(2, 45, 25),
            Self::Legionary => UnitStats::melee(2, 50, 22),
            Self::MenAtArms => UnitStats::melee(2, 50, 35),
        }
    }

    /// Army layout symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Hoplite => 'H',
            Self::LightHorsemen => 'C',
            Self::HeavyCavalry => 'P',
            Self::Viking => 'V',
            Self::Archer => 'A',
            Self::Crossbowmen => 'B',
            Self::Hypaspist => 'I',
            Self::Legionary => 'L',
            Self::MenAtArms => 'M',
        }
    }

    /// Look a kind up by its layout symbol.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.symbol() == symbol)
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hoplite => "Hoplite",
            Self::LightHorsemen => "Light Horsemen",
            Self::HeavyCavalry => "Heavy Cavalry",
            Self::Viking => "Viking",
            Self::Archer => "Archer",
            Self::Crossbowmen => "Crossbowmen",
            Self::Hypaspist => "Hypaspist",
            Self::Legionary => "Legionary",
            Self::MenAtArms => "Men-at-Arms",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
