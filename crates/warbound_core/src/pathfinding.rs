//! Movement graph and budget-bounded reachability.
//!
//! The graph is a directed, 4-connected view of the board. Edge weights
//! come from the terrain pair and are forced to [`EdgeWeight::Impassable`]
//! for any edge that ends on an occupied cell. Occupancy changes trigger a
//! full rebuild; there is no incremental patching.
//!
//! All costs use fixed-point math, so the same board always yields the same
//! reachable set on every platform.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::error::{GameError, Result};
use crate::grid::{Cell, Direction};
use crate::math::Fixed;
use crate::terrain::{check_dimensions, TerrainKind, TerrainProvider};

/// Weight of one directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeWeight {
    /// Finite movement cost.
    Cost(Fixed),
    /// The destination is held by a living unit.
    Impassable,
}

impl EdgeWeight {
    /// Returns the finite cost, or `None` when impassable.
    #[must_use]
    pub const fn cost(self) -> Option<Fixed> {
        match self {
            Self::Cost(cost) => Some(cost),
            Self::Impassable => None,
        }
    }

    /// Returns true if the edge can be traversed.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Cost(_))
    }
}

/// Cost of stepping from a cell of terrain `from` onto one of terrain `to`.
///
/// The table is asymmetric in principle; today only the destination
/// matters.
#[must_use]
pub const fn terrain_step_cost(from: TerrainKind, to: TerrainKind) -> Fixed {
    match (from, to) {
        (_, TerrainKind::Plains) => Fixed::const_from_int(1),
        (_, TerrainKind::Mountain) => Fixed::const_from_int(2),
        (_, TerrainKind::Forest) => Fixed::const_from_int(2),
    }
}

/// An outgoing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Direction of travel.
    pub direction: Direction,
    /// Destination cell.
    pub to: Cell,
    /// Weight of the step.
    pub weight: EdgeWeight,
}

/// Weighted movement graph over the board.
#[derive(Debug, Clone)]
pub struct MovementGraph {
    rows: i32,
    cols: i32,
    /// Resolved terrain, row-major.
    terrain: Vec<TerrainKind>,
    /// Occupied flags, row-major.
    occupied: Vec<bool>,
    /// Outgoing edges per cell, indexed by [`Direction::index`]. `None`
    /// where the neighbor is off the board.
    edges: Vec<[Option<EdgeWeight>; 4]>,
}

impl MovementGraph {
    /// Build the graph from terrain and the cells held by living units.
    ///
    /// Occupied cells outside the board are ignored.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidDimensions`] if the provider reports a
    /// non-positive size, and [`GameError::MissingTerrain`] if any valid cell
    /// has no terrain.
    pub fn build<T: TerrainProvider + ?Sized>(
        terrain: &T,
        occupancy: &BTreeSet<Cell>,
    ) -> Result<Self> {
        let (rows, cols) = check_dimensions(i64::from(terrain.rows()), i64::from(terrain.cols()))?;

        let count = (rows as usize) * (cols as usize);
        let mut kinds = Vec::with_capacity(count);
        for row in 0..rows {
            for col in 0..cols {
                kinds.push(terrain.terrain_at(Cell::new(row, col))?);
            }
        }

        let mut graph = Self {
            rows,
            cols,
            terrain: kinds,
            occupied: vec![false; count],
            edges: vec![[None; 4]; count],
        };
        graph.update(occupancy);
        Ok(graph)
    }

    /// Replace the occupancy snapshot and recompute every edge weight.
    pub fn update(&mut self, occupancy: &BTreeSet<Cell>) {
        self.occupied.fill(false);
        for &cell in occupancy {
            if let Some(index) = self.index(cell) {
                self.occupied[index] = true;
            }
        }

        for row in 0..self.rows {
            for col in 0..self.cols {
                let from = Cell::new(row, col);
                let from_index = self.offset(from);
                let from_kind = self.terrain[from_index];
                let mut slots = [None; 4];
                for direction in Direction::ALL {
                    let to = from.step(direction);
                    if let Some(to_index) = self.index(to) {
                        slots[direction.index()] = Some(if self.occupied[to_index] {
                            EdgeWeight::Impassable
                        } else {
                            EdgeWeight::Cost(terrain_step_cost(from_kind, self.terrain[to_index]))
                        });
                    }
                }
                self.edges[from_index] = slots;
            }
        }

        tracing::debug!(
            rows = self.rows,
            cols = self.cols,
            occupied = occupancy.len(),
            "Movement graph rebuilt"
        );
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Whether `cell` lies on the board.
    #[must_use]
    pub fn is_valid(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    /// Whether `cell` is held by a living unit in the current snapshot.
    #[must_use]
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|index| self.occupied[index])
    }

    /// Terrain at `cell`.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfBounds`] for an invalid cell.
    pub fn terrain(&self, cell: Cell) -> Result<TerrainKind> {
        self.index(cell)
            .map(|index| self.terrain[index])
            .ok_or(GameError::OutOfBounds(cell))
    }

    /// Outgoing edges of `cell` in North, East, South, West order.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfBounds`] for an invalid cell.
    pub fn neighbors(&self, cell: Cell) -> Result<Vec<Edge>> {
        let index = self.index(cell).ok_or(GameError::OutOfBounds(cell))?;
        Ok(Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                self.edges[index][direction.index()].map(|weight| Edge {
                    direction,
                    to: cell.step(direction),
                    weight,
                })
            })
            .collect())
    }

    /// Weight of the edge `from -> to`, or `None` if the cells are not
    /// orthogonally adjacent.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfBounds`] if either cell is invalid.
    pub fn weight(&self, from: Cell, to: Cell) -> Result<Option<EdgeWeight>> {
        let index = self.index(from).ok_or(GameError::OutOfBounds(from))?;
        if !self.is_valid(to) {
            return Err(GameError::OutOfBounds(to));
        }
        Ok(Direction::ALL
            .into_iter()
            .find(|&direction| from.step(direction) == to)
            .and_then(|direction| self.edges[index][direction.index()]))
    }

    #[inline]
    fn index(&self, cell: Cell) -> Option<usize> {
        if (0..self.rows).contains(&cell.row) && (0..self.cols).contains(&cell.col) {
            Some(self.offset(cell))
        } else {
            None
        }
    }

    #[inline]
    fn offset(&self, cell: Cell) -> usize {
        (cell.row as usize) * (self.cols as usize) + (cell.col as usize)
    }
}

/// Cells reachable within a budget, with their cheapest cost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    /// Reachable cells, always including the start.
    pub cells: BTreeSet<Cell>,
    /// Cheapest cost to each reachable cell.
    pub costs: BTreeMap<Cell, Fixed>,
}

impl Reachability {
    /// Whether `cell` is reachable.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Cost to reach `cell`, if reachable.
    #[must_use]
    pub fn cost(&self, cell: Cell) -> Option<Fixed> {
        self.costs.get(&cell).copied()
    }

    /// Number of reachable cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if nothing is reachable. Never the case for a valid start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A node in the Dijkstra frontier.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct FrontierNode {
    cell: Cell,
    cost: Fixed,
    /// Lower cells pop first when costs tie.
    tie_breaker: u64,
}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for lowest cost first.
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[inline]
fn cell_to_tie_breaker(cell: Cell) -> u64 {
    ((cell.row as u32 as u64) << 32) | (cell.col as u32 as u64)
}

/// Cheapest cost from `start` to every cell it can reach at all.
///
/// Runs Dijkstra to exhaustion. Each cell is finalized once.
///
/// # Errors
///
/// [`GameError::OutOfBounds`] if `start` is invalid.
pub fn shortest_costs(graph: &MovementGraph, start: Cell) -> Result<BTreeMap<Cell, Fixed>> {
    if !graph.is_valid(start) {
        return Err(GameError::OutOfBounds(start));
    }

    let mut settled: BTreeMap<Cell, Fixed> = BTreeMap::new();
    let mut best: BTreeMap<Cell, Fixed> = BTreeMap::new();
    let mut frontier = BinaryHeap::new();

    best.insert(start, Fixed::ZERO);
    frontier.push(FrontierNode {
        cell: start,
        cost: Fixed::ZERO,
        tie_breaker: cell_to_tie_breaker(start),
    });

    while let Some(current) = frontier.pop() {
        if settled.contains_key(&current.cell) {
            continue;
        }
        settled.insert(current.cell, current.cost);

        for edge in graph.neighbors(current.cell)? {
            let Some(step) = edge.weight.cost() else {
                continue;
            };
            if settled.contains_key(&edge.to) {
                continue;
            }
            let tentative = current.cost + step;
            if best.get(&edge.to).map_or(true, |&known| tentative < known) {
                best.insert(edge.to, tentative);
                frontier.push(FrontierNode {
                    cell: edge.to,
                    cost: tentative,
                    tie_breaker: cell_to_tie_breaker(edge.to),
                });
            }
        }
    }

    Ok(settled)
}

/// Cells reachable from `start` with a movement budget.
///
/// The start always has cost zero and is always included, even when it is
/// occupied by the moving unit itself.
///
/// # Errors
///
/// [`GameError::OutOfBounds`] for an invalid start and
/// [`GameError::InvalidBudget`] for a negative budget.
pub fn reachable(graph: &MovementGraph, start: Cell, budget: Fixed) -> Result<Reachability> {
    if budget < Fixed::ZERO {
        return Err(GameError::InvalidBudget(budget.to_string()));
    }

    let costs: BTreeMap<Cell, Fixed> = shortest_costs(graph, start)?
        .into_iter()
        .filter(|&(_, cost)| cost <= budget)
        .collect();
    let cells = costs.keys().copied().collect();

    tracing::debug!(
        start = %start,
        budget = %budget,
        reachable = costs.len(),
        "Reachability computed"
    );

    Ok(Reachability { cells, costs })
}

/// Parse a movement budget from user-supplied text.
///
/// # Errors
///
/// [`GameError::InvalidBudget`] if the text is not a number or is negative.
pub fn parse_budget(text: &str) -> Result<Fixed> {
    let trimmed = text.trim();
    let budget: Fixed = trimmed
        .parse()
        .map_err(|_| GameError::InvalidBudget(trimmed.to_string()))?;
    if budget < Fixed::ZERO {
        return Err(GameError::InvalidBudget(trimmed.to_string()));
    }
    Ok(budget)
}
