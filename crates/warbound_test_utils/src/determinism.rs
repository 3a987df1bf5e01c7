//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a game produces identical
//! results given identical setup and an identical command stream.
//!
//! # Sources of non-determinism
//!
//! - **Floating-point math**: all rules math is fixed-point via
//!   [`warbound_core::math::Fixed`].
//! - **Hash iteration order**: the core keeps ordered collections
//!   (`BTreeMap`, `BTreeSet`, id-ordered vectors) wherever it iterates.
//! - **System randomness**: combat dice are a seeded ChaCha8 stream.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: a single command produces the same state twice
//! 2. **Property tests**: random command streams still replay identically
//! 3. **Integration tests**: full scripted skirmishes are reproducible
//! 4. **Parallel tests**: replaying on N threads all match

use std::thread;

use warbound_core::combat::CombatDice;
use warbound_core::config::GameConfig;
use warbound_core::game::{Command, Game};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final hash from each run.
    pub hashes: Vec<u64>,
    /// Steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// All distinct hashes (one for a deterministic game).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Game is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run some state forward several times and verify the final hashes agree.
///
/// # Arguments
///
/// * `runs` - Number of independent runs
/// * `steps` - Number of steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Hashes the final state
///
/// # Example
///
/// ```
/// use warbound_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n| *n += 2, |n| *n);
/// result.assert_deterministic();
/// assert_eq!(result.hashes, vec![20, 20, 20]);
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Apply every command, ignoring rejections, and return the final hash.
///
/// Rejected commands leave the game untouched, so a replay of the same
/// stream always goes through the same states.
pub fn replay<D: CombatDice>(game: &mut Game<D>, commands: &[Command]) -> u64 {
    for &command in commands {
        let _ = game.apply(command);
    }
    game.state_hash()
}

/// Replay a command stream on `runs` fresh games and compare final hashes.
pub fn verify_replay<D, F>(runs: usize, setup: F, commands: &[Command]) -> DeterminismResult
where
    D: CombatDice,
    F: Fn() -> Game<D>,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| replay(&mut setup(), commands))
        .collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps: commands.len() as u64,
    }
}

/// Result of replaying on several threads.
#[derive(Debug, Clone)]
pub struct ParallelReplayResult {
    /// Final state hash from each thread.
    pub hashes: Vec<u64>,
    /// Commands replayed per thread.
    pub commands: usize,
}

impl ParallelReplayResult {
    /// Check if all threads produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all threads matched.
    ///
    /// # Panics
    ///
    /// Panics if threads produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            panic!(
                "Parallel replays diverged!\n\
                 Threads: {}\n\
                 Commands: {}\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.commands,
                self.hashes
            );
        }
    }
}

/// Replay a command stream on `threads` scoped threads.
///
/// Each thread builds its own game, so the dice never cross threads.
///
/// # Panics
///
/// Panics if a replay thread panics.
pub fn replay_in_parallel<D, F>(
    setup: F,
    commands: &[Command],
    threads: usize,
) -> ParallelReplayResult
where
    D: CombatDice,
    F: Fn() -> Game<D> + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| s.spawn(|| replay(&mut setup(), commands)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("replay thread panicked"))
            .collect()
    });

    ParallelReplayResult {
        hashes,
        commands: commands.len(),
    }
}

/// Replay two games side by side and report the first command after which
/// their states differ.
///
/// `Some(0)` means the freshly built games already differ.
pub fn find_first_divergence<D, F>(setup: F, commands: &[Command]) -> Option<usize>
where
    D: CombatDice,
    F: Fn() -> Game<D>,
{
    let mut first = setup();
    let mut second = setup();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for (index, &command) in commands.iter().enumerate() {
        let _ = first.apply(command);
        let _ = second.apply(command);
        if first.state_hash() != second.state_hash() {
            tracing::warn!(step = index + 1, ?command, "Replays diverged");
            return Some(index + 1);
        }
    }

    None
}

/// Verify that writing a configuration to RON and reading it back yields a
/// game that replays `commands` to the same state.
pub fn verify_config_round_trip(config: &GameConfig, commands: &[Command]) -> bool {
    let Ok(text) = config.to_ron() else {
        return false;
    };
    let Ok(restored) = GameConfig::from_ron(&text, "round-trip") else {
        return false;
    };
    let (Ok(mut original), Ok(mut reloaded)) =
        (Game::from_config(config), Game::from_config(&restored))
    else {
        return false;
    };

    replay(&mut original, commands) == replay(&mut reloaded, commands)
}

/// Proptest strategies for boards, budgets and command streams.
pub mod strategies {
    use proptest::prelude::*;
    use warbound_core::game::Command;
    use warbound_core::grid::{Cell, Direction};
    use warbound_core::math::Fixed;
    use warbound_core::terrain::TerrainKind;
    use warbound_core::unit::UnitId;

    /// A cell on a `rows` by `cols` board.
    pub fn arb_cell(rows: i32, cols: i32) -> impl Strategy<Value = Cell> {
        (0..rows, 0..cols).prop_map(|(row, col)| Cell::new(row, col))
    }

    /// A cell that may fall off a `rows` by `cols` board by up to two cells.
    pub fn arb_any_cell(rows: i32, cols: i32) -> impl Strategy<Value = Cell> {
        (-2..rows + 2, -2..cols + 2).prop_map(|(row, col)| Cell::new(row, col))
    }

    /// A cardinal direction.
    pub fn arb_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    /// A terrain kind, plains-heavy.
    pub fn arb_terrain_kind() -> impl Strategy<Value = TerrainKind> {
        prop_oneof![
            3 => Just(TerrainKind::Plains),
            1 => Just(TerrainKind::Mountain),
            1 => Just(TerrainKind::Forest),
        ]
    }

    /// Layout lines for a board of 1 to `max_rows` by 1 to `max_cols`.
    pub fn arb_layout(max_rows: usize, max_cols: usize) -> impl Strategy<Value = Vec<String>> {
        (1..=max_rows, 1..=max_cols).prop_flat_map(|(rows, cols)| {
            proptest::collection::vec(
                proptest::collection::vec(arb_terrain_kind(), cols)
                    .prop_map(|line| line.into_iter().map(TerrainKind::symbol).collect::<String>()),
                rows,
            )
        })
    }

    /// A movement budget from 0 to `max` in quarter steps.
    pub fn arb_budget(max: i32) -> impl Strategy<Value = Fixed> {
        (0..=max * 4).prop_map(|quarters| Fixed::from_num(quarters) / Fixed::from_num(4))
    }

    /// Any command aimed at a `rows` by `cols` board with up to `max_id`
    /// unit ids.
    pub fn arb_command(rows: i32, cols: i32, max_id: u32) -> impl Strategy<Value = Command> {
        prop_oneof![
            3 => arb_any_cell(rows, cols).prop_map(Command::SelectUnit),
            3 => arb_any_cell(rows, cols).prop_map(Command::MoveTo),
            2 => arb_any_cell(rows, cols).prop_map(Command::AttackAt),
            1 => Just(Command::EndTurn),
            1 => Just(Command::Deselect),
            1 => Just(Command::ChangeFormation),
            1 => arb_direction().prop_map(Command::ChangeFacing),
            1 => (1..=max_id).prop_map(|id| Command::TransferGeneral(UnitId(id))),
        ]
    }

    /// A stream of up to `max_len` commands.
    pub fn arb_command_sequence(
        rows: i32,
        cols: i32,
        max_id: u32,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<Command>> {
        proptest::collection::vec(arb_command(rows, cols, max_id), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use proptest::prelude::*;
    use warbound_core::grid::Cell;

    fn opening() -> Vec<Command> {
        vec![
            Command::SelectUnit(Cell::new(1, 2)),
            Command::MoveTo(Cell::new(3, 2)),
            Command::EndTurn,
            Command::SelectUnit(Cell::new(18, 2)),
            Command::MoveTo(Cell::new(16, 2)),
            Command::EndTurn,
        ]
    }

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
        assert_eq!(result.unique_hashes(), vec![100]);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_panics_on_mismatch() {
        DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
            steps: 1,
        }
        .assert_deterministic();
    }

    #[test]
    fn test_default_game_replays_identically() {
        let setup = || Game::from_config(&GameConfig::default()).unwrap();
        verify_replay(3, setup, &opening()).assert_deterministic();
        assert_eq!(find_first_divergence(setup, &opening()), None);
    }

    #[test]
    fn test_parallel_replays_match() {
        let setup = || Game::from_config(&GameConfig::default()).unwrap();
        let result = replay_in_parallel(setup, &opening(), 4);
        assert_eq!(result.hashes.len(), 4);
        result.assert_deterministic();
    }

    #[test]
    fn test_replay_changes_state() {
        let mut game = Game::from_config(&GameConfig::default()).unwrap();
        let before = game.state_hash();
        assert_ne!(replay(&mut game, &opening()), before);
    }

    #[test]
    fn test_config_round_trip_replays() {
        let config = GameConfig {
            seed: 77,
            ..GameConfig::default()
        };
        assert!(verify_config_round_trip(&config, &opening()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Random command streams, legal or not, replay identically.
        #[test]
        fn prop_random_command_streams_are_deterministic(
            commands in arb_command_sequence(20, 30, 16, 60),
            seed in any::<u64>(),
        ) {
            let setup = move || {
                let config = GameConfig { seed, ..GameConfig::default() };
                Game::from_config(&config).unwrap()
            };
            let result = verify_replay(2, setup, &commands);
            prop_assert!(result.is_deterministic);
        }

        /// Generated layouts always parse to their own dimensions.
        #[test]
        fn prop_generated_layouts_parse(layout in arb_layout(6, 8)) {
            let map = warbound_core::terrain::TerrainMap::from_layout(&layout).unwrap();
            prop_assert_eq!(map.to_layout(), layout);
        }
    }
}
