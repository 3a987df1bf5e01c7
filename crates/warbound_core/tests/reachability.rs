//! Movement graph and reachability tests.
//!
//! Exercises the terrain cost table, occupancy blocking and the bounded
//! Dijkstra search through the public API.

use std::collections::BTreeSet;

use warbound_core::error::GameError;
use warbound_core::grid::Cell;
use warbound_core::math::Fixed;
use warbound_core::pathfinding::{
    parse_budget, reachable, terrain_step_cost, EdgeWeight, MovementGraph,
};
use warbound_core::terrain::{TerrainKind, TerrainMap};
use warbound_test_utils::determinism::strategies::arb_layout;
use warbound_test_utils::fixtures::{board, fixed, fixed_f, plains};
use warbound_test_utils::proptest::prelude::*;

fn empty() -> BTreeSet<Cell> {
    BTreeSet::new()
}

fn held(cells: &[(i32, i32)]) -> BTreeSet<Cell> {
    cells.iter().copied().map(Cell::from).collect()
}

// =============================================================================
// Reachable sets
// =============================================================================

#[test]
fn open_plains_reach_a_diamond() {
    let graph = MovementGraph::build(&plains(3, 3), &empty()).unwrap();
    let reach = reachable(&graph, Cell::new(0, 0), fixed(2)).unwrap();

    let expected = [
        ((0, 0), 0),
        ((0, 1), 1),
        ((1, 0), 1),
        ((0, 2), 2),
        ((1, 1), 2),
        ((2, 0), 2),
    ];
    assert_eq!(reach.len(), expected.len());
    for ((row, col), cost) in expected {
        assert_eq!(reach.cost(Cell::new(row, col)), Some(fixed(cost)), "({row}, {col})");
    }
    assert!(!reach.contains(Cell::new(2, 2)));
}

#[test]
fn zero_budget_reaches_only_the_start() {
    let graph = MovementGraph::build(&plains(4, 4), &empty()).unwrap();
    let reach = reachable(&graph, Cell::new(2, 2), Fixed::ZERO).unwrap();
    assert_eq!(reach.cells, BTreeSet::from([Cell::new(2, 2)]));
}

#[test]
fn mountains_and_forests_cost_two_to_enter() {
    let terrain = board(&["PMF", "...", "..."]);
    let graph = MovementGraph::build(&terrain, &empty()).unwrap();
    let reach = reachable(&graph, Cell::new(0, 0), fixed(3)).unwrap();

    assert_eq!(reach.cost(Cell::new(0, 1)), Some(fixed(2)));
    assert_eq!(reach.cost(Cell::new(1, 2)), Some(fixed(3)));
    // Mountain then forest is 4, one over the budget.
    assert!(!reach.contains(Cell::new(0, 2)));

    let reach = reachable(&graph, Cell::new(0, 0), fixed(4)).unwrap();
    assert_eq!(reach.cost(Cell::new(0, 2)), Some(fixed(4)));
}

#[test]
fn leaving_rough_ground_costs_one() {
    let terrain = board(&["MP"]);
    let graph = MovementGraph::build(&terrain, &empty()).unwrap();
    let reach = reachable(&graph, Cell::new(0, 0), Fixed::ONE).unwrap();
    assert_eq!(reach.cost(Cell::new(0, 1)), Some(Fixed::ONE));
}

#[test]
fn cost_table_depends_only_on_destination() {
    for from in TerrainKind::ALL {
        assert_eq!(terrain_step_cost(from, TerrainKind::Plains), fixed(1));
        assert_eq!(terrain_step_cost(from, TerrainKind::Mountain), fixed(2));
        assert_eq!(terrain_step_cost(from, TerrainKind::Forest), fixed(2));
    }
}

// =============================================================================
// Occupancy
// =============================================================================

#[test]
fn living_units_block_their_cell() {
    let graph = MovementGraph::build(&plains(3, 3), &held(&[(0, 1), (1, 0)])).unwrap();

    assert_eq!(
        graph.weight(Cell::new(0, 0), Cell::new(0, 1)).unwrap(),
        Some(EdgeWeight::Impassable)
    );
    // The mover at (0, 0) is boxed in.
    let reach = reachable(&graph, Cell::new(0, 0), fixed(5)).unwrap();
    assert_eq!(reach.cells, BTreeSet::from([Cell::new(0, 0)]));
}

#[test]
fn a_unit_can_search_from_its_own_cell() {
    let occupied = held(&[(1, 1)]);
    let graph = MovementGraph::build(&plains(3, 3), &occupied).unwrap();

    let reach = reachable(&graph, Cell::new(1, 1), Fixed::ONE).unwrap();
    assert_eq!(reach.cost(Cell::new(1, 1)), Some(Fixed::ZERO));
    assert_eq!(reach.len(), 5);

    let other = reachable(&graph, Cell::new(0, 0), fixed(4)).unwrap();
    assert!(!other.contains(Cell::new(1, 1)));
    assert_eq!(other.cost(Cell::new(2, 2)), Some(fixed(4)));
}

#[test]
fn update_rebuilds_from_a_new_snapshot() {
    let mut graph = MovementGraph::build(&plains(1, 3), &held(&[(0, 1)])).unwrap();
    assert_eq!(reachable(&graph, Cell::new(0, 0), fixed(2)).unwrap().len(), 1);

    graph.update(&empty());
    assert_eq!(reachable(&graph, Cell::new(0, 0), fixed(2)).unwrap().len(), 3);
    assert!(!graph.is_occupied(Cell::new(0, 1)));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn invalid_start_is_out_of_bounds() {
    let graph = MovementGraph::build(&plains(2, 2), &empty()).unwrap();
    assert_eq!(
        reachable(&graph, Cell::new(2, 0), Fixed::ONE),
        Err(GameError::OutOfBounds(Cell::new(2, 0)))
    );
}

#[test]
fn negative_budget_is_rejected() {
    let graph = MovementGraph::build(&plains(2, 2), &empty()).unwrap();
    assert!(matches!(
        reachable(&graph, Cell::new(0, 0), fixed(-1)),
        Err(GameError::InvalidBudget(_))
    ));
}

#[test]
fn budget_text_must_be_a_non_negative_number() {
    assert_eq!(parse_budget(" 2.5 ").unwrap(), fixed_f(2.5));
    assert_eq!(parse_budget("0").unwrap(), Fixed::ZERO);
    assert!(matches!(parse_budget("two"), Err(GameError::InvalidBudget(_))));
    assert!(matches!(parse_budget("-1"), Err(GameError::InvalidBudget(_))));
    assert!(matches!(parse_budget(""), Err(GameError::InvalidBudget(_))));
}

#[test]
fn sparse_terrain_cannot_build_a_graph() {
    let terrain = TerrainMap::from_entries(
        2,
        2,
        [
            (Cell::new(0, 0), TerrainKind::Plains),
            (Cell::new(0, 1), TerrainKind::Forest),
        ],
    )
    .unwrap();
    assert_eq!(
        MovementGraph::build(&terrain, &empty()).unwrap_err(),
        GameError::MissingTerrain(Cell::new(1, 0))
    );
}

#[test]
fn empty_board_is_rejected() {
    assert!(matches!(
        TerrainMap::uniform(0, 3, TerrainKind::Plains),
        Err(GameError::InvalidDimensions { rows: 0, cols: 3 })
    ));
}

// =============================================================================
// Properties
// =============================================================================

fn layout_and_start() -> impl Strategy<Value = (Vec<String>, Cell)> {
    arb_layout(8, 8).prop_flat_map(|layout| {
        let rows = layout.len() as i32;
        let cols = layout[0].len() as i32;
        (Just(layout), (0..rows, 0..cols).prop_map(Cell::from))
    })
}

proptest! {
    /// Every reachable cell fits the budget and the start costs nothing.
    #[test]
    fn reachable_costs_fit_the_budget(
        (layout, start) in layout_and_start(),
        budget in 0i32..8,
    ) {
        let terrain = TerrainMap::from_layout(&layout).unwrap();
        let graph = MovementGraph::build(&terrain, &BTreeSet::new()).unwrap();
        let budget = Fixed::from_num(budget);
        let reach = reachable(&graph, start, budget).unwrap();

        prop_assert_eq!(reach.cost(start), Some(Fixed::ZERO));
        for (cell, cost) in &reach.costs {
            prop_assert!(*cost <= budget, "{} costs {}", cell, cost);
            prop_assert!(i64::from(cell.manhattan(start)) <= budget.to_num::<i64>());
        }
    }

    /// Same inputs, same answer.
    #[test]
    fn reachability_is_idempotent(
        (layout, start) in layout_and_start(),
        budget in 0i32..8,
    ) {
        let terrain = TerrainMap::from_layout(&layout).unwrap();
        let graph = MovementGraph::build(&terrain, &BTreeSet::new()).unwrap();
        let budget = Fixed::from_num(budget);
        prop_assert_eq!(
            reachable(&graph, start, budget).unwrap(),
            reachable(&graph, start, budget).unwrap()
        );
    }

    /// A bigger budget never loses cells or changes their cost.
    #[test]
    fn larger_budgets_only_add_cells(
        (layout, start) in layout_and_start(),
        budget in 0i32..6,
    ) {
        let terrain = TerrainMap::from_layout(&layout).unwrap();
        let graph = MovementGraph::build(&terrain, &BTreeSet::new()).unwrap();
        let small = reachable(&graph, start, Fixed::from_num(budget)).unwrap();
        let large = reachable(&graph, start, Fixed::from_num(budget + 2)).unwrap();

        for (cell, cost) in &small.costs {
            prop_assert_eq!(large.cost(*cell), Some(*cost));
        }
    }

    /// An occupied cell never shows up in anyone else's reach.
    #[test]
    fn occupied_cells_are_never_reached(
        (layout, start) in layout_and_start(),
        blocker in (0i32..8, 0i32..8),
    ) {
        let terrain = TerrainMap::from_layout(&layout).unwrap();
        let blocker = Cell::from(blocker);
        prop_assume!(blocker != start);
        let graph = MovementGraph::build(&terrain, &BTreeSet::from([blocker])).unwrap();
        let reach = reachable(&graph, start, Fixed::from_num(20)).unwrap();
        prop_assert!(!reach.contains(blocker));
    }
}
