//! Balance testing utilities.
//!
//! Runs seeded one-on-one duels between unit kinds to check matchups,
//! and tabulates the deterministic damage each kind deals another.

use std::ops::Range;

use warbound_core::combat::{self, SeededDice};
use warbound_core::grid::Cell;
use warbound_core::math::Fixed;
use warbound_core::terrain::TerrainKind;
use warbound_core::unit::{Player, Unit, UnitId};
use warbound_core::unit_kind::UnitKind;

/// Result of a single duel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelResult {
    /// The surviving side (None if both fell or time ran out).
    pub winner: Option<Player>,
    /// Attacks made by both sides together.
    pub exchanges: u32,
    /// Hit points Player One's unit finished with.
    pub remaining_hp_a: Fixed,
    /// Hit points Player Two's unit finished with.
    pub remaining_hp_b: Fixed,
}

/// Statistics for a set of duels.
#[derive(Debug, Clone, Default)]
pub struct DuelStats {
    /// Total duels run.
    pub total_duels: u32,
    /// Wins for side A (strikes first).
    pub wins_a: u32,
    /// Wins for side B.
    pub wins_b: u32,
    /// Mutual kills or timeouts.
    pub draws: u32,
    /// Average attacks to resolution.
    pub avg_exchanges: f64,
}

impl DuelStats {
    /// Win rate for side A (0.0 to 1.0).
    pub fn win_rate_a(&self) -> f64 {
        if self.total_duels == 0 {
            return 0.5;
        }
        f64::from(self.wins_a) / f64::from(self.total_duels)
    }

    /// Win rate for side B (0.0 to 1.0).
    pub fn win_rate_b(&self) -> f64 {
        if self.total_duels == 0 {
            return 0.5;
        }
        f64::from(self.wins_b) / f64::from(self.total_duels)
    }

    /// Check if the matchup is within an acceptable range for side A.
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate_a();
        rate >= min_rate && rate <= max_rate
    }
}

/// Fight `a` (Player One, striking first) against `b` (Player Two) until
/// one falls or `max_exchanges` attacks have been made.
///
/// The units stand side by side in their deployment facings, placed so
/// every blow lands on the front. `terrain` lies under both.
pub fn duel(
    a: UnitKind,
    b: UnitKind,
    terrain: TerrainKind,
    seed: u64,
    max_exchanges: u32,
) -> DuelResult {
    let mut first = Unit::new(UnitId(1), a, Player::One, Cell::new(0, 1));
    let mut second = Unit::new(UnitId(2), b, Player::Two, Cell::new(0, 0));
    let mut dice = SeededDice::new(seed);
    let mut exchanges = 0;

    while first.alive && second.alive && exchanges < max_exchanges {
        let (attacker, defender) = if exchanges % 2 == 0 {
            (&mut first, &mut second)
        } else {
            (&mut second, &mut first)
        };
        attacker.has_attacked = false;
        combat::resolve(attacker, defender, terrain, &mut dice);
        exchanges += 1;
    }

    let winner = match (first.alive, second.alive) {
        (true, false) => Some(Player::One),
        (false, true) => Some(Player::Two),
        _ => None,
    };

    tracing::debug!(%a, %b, seed, exchanges, ?winner, "Duel finished");

    DuelResult {
        winner,
        exchanges,
        remaining_hp_a: first.hp,
        remaining_hp_b: second.hp,
    }
}

/// Run one duel per seed and collect statistics.
pub fn run_duels(
    a: UnitKind,
    b: UnitKind,
    terrain: TerrainKind,
    seeds: Range<u64>,
) -> DuelStats {
    let mut stats = DuelStats::default();
    let mut total_exchanges = 0u64;

    for seed in seeds {
        let result = duel(a, b, terrain, seed, 50);
        stats.total_duels += 1;
        total_exchanges += u64::from(result.exchanges);
        match result.winner {
            Some(Player::One) => stats.wins_a += 1,
            Some(Player::Two) => stats.wins_b += 1,
            None => stats.draws += 1,
        }
    }

    if stats.total_duels > 0 {
        #[allow(clippy::cast_precision_loss)]
        let average = total_exchanges as f64 / f64::from(stats.total_duels);
        stats.avg_exchanges = average;
    }
    stats
}

/// Damage `attacker` deals `defender` head-on on plains, before dice.
pub fn base_damage(attacker: UnitKind, defender: UnitKind) -> Fixed {
    let a = Unit::new(UnitId(1), attacker, Player::One, Cell::new(0, 1));
    let d = Unit::new(UnitId(2), defender, Player::Two, Cell::new(0, 0));
    combat::profile(&a, &d, TerrainKind::Plains).base_damage
}

/// Unanswered base-damage hits `attacker` needs to kill a fresh `defender`.
/// None if it cannot hurt it at all.
pub fn hits_to_kill(attacker: UnitKind, defender: UnitKind) -> Option<u32> {
    let damage = base_damage(attacker, defender);
    if damage <= Fixed::ZERO {
        return None;
    }
    let hp = Fixed::from_num(defender.stats().max_hp);
    (hp / damage).ceil().checked_to_num::<u32>()
}

/// Base damage for every ordered pair of unit kinds.
pub fn generate_damage_matrix() -> Vec<(UnitKind, UnitKind, Fixed)> {
    let mut results = Vec::new();

    for attacker in UnitKind::ALL {
        for defender in UnitKind::ALL {
            results.push((attacker, defender, base_damage(attacker, defender)));
        }
    }

    results
}
