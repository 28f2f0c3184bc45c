//! Rectangular assignment solver (Hungarian / Jonker-Volgenant shortest
//! augmenting path with row and column potentials).
//!
//! The cost matrix is padded to `N x N`, then one row is inserted per round by
//! growing an augmenting path from a virtual column 0. Internally rows and
//! columns are 1-based; slot 0 carries the row being inserted and, at the
//! end, the negated optimum in its column potential.
//!
//! Padding cells share one finite value (the largest real cost). Any constant
//! leaves the optimum over real cells unchanged, and keeping it finite keeps
//! the potentials exact for floating point costs. `CostValue::SENTINEL` is
//! only used as the "not reached yet" distance during the path search.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use tracing::{instrument, trace};

use crate::domain::matrix::Matrix;

/// Numeric type usable as an assignment cost.
pub trait CostValue:
    Copy
    + PartialOrd
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Send
    + Sync
{
    const ZERO: Self;

    /// Distance of columns not reached yet. `MAX / 4` leaves headroom for
    /// potential updates without overflowing.
    const SENTINEL: Self;
}

macro_rules! impl_cost_value {
    ($($t:ty => $zero:expr),* $(,)?) => {
        $(
            impl CostValue for $t {
                const ZERO: Self = $zero;
                const SENTINEL: Self = <$t>::MAX / (4 as $t);
            }
        )*
    };
}

impl_cost_value!(f32 => 0.0, f64 => 0.0, i32 => 0, i64 => 0);

/// Result of solving an assignment problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<T> {
    /// Minimum total cost. Read from the dual solution for square input,
    /// summed over the matched cells otherwise.
    pub cost: T,
    /// Column matched to each row, None when the row is left over.
    pub rows: Vec<Option<usize>>,
}

impl<T: CostValue> Assignment<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(row, col)` pairs in row order.
    pub fn matched_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|c| (row, c)))
    }

    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|c| c.is_some()).count()
    }

    pub fn unmatched_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, col)| col.is_none())
            .map(|(row, _)| row)
            .collect()
    }

    /// Sum of the selected cells of `costs`, a cross-check for `cost`.
    pub fn total(&self, costs: &Matrix<T>) -> T {
        self.matched_pairs()
            .fold(T::ZERO, |acc, (row, col)| acc + costs[(row, col)])
    }

    /// Row assignment with `-1` for unmatched rows, the exchange-format shape.
    pub fn to_signed(&self) -> Vec<i64> {
        self.rows
            .iter()
            .map(|c| c.map_or(-1, |c| c as i64))
            .collect()
    }
}

/// Solve the minimum-cost assignment for a rectangular cost matrix.
///
/// At most `min(rows, cols)` rows receive a column; surplus rows are `None`.
/// Ties resolve to the first column reaching the minimum in a left-to-right
/// scan, so results are deterministic.
#[instrument(level = "debug", skip(costs), fields(rows = costs.rows(), cols = costs.cols()))]
pub fn solve<T: CostValue>(costs: &Matrix<T>) -> Assignment<T> {
    let num_rows = costs.rows();
    let num_cols = costs.cols();
    if num_rows == 0 {
        return Assignment {
            cost: T::ZERO,
            rows: Vec::new(),
        };
    }
    if num_cols == 0 {
        return Assignment {
            cost: T::ZERO,
            rows: vec![None; num_rows],
        };
    }

    let size = num_rows.max(num_cols);
    let padded = pad(costs, size, pad_value(costs));
    let mut state = DualState::new(size);
    for row in 1..=size {
        state.augment(row, &padded);
    }

    let mut assignment = Assignment {
        cost: -state.col_duals[0],
        rows: state.unpad(num_rows, num_cols),
    };
    if num_rows != num_cols {
        // The dual optimum includes the padding cells.
        assignment.cost = assignment.total(costs);
    }
    trace!(rows = ?assignment.rows, cost = ?assignment.cost, "assignment solved");
    assignment
}

/// Largest cell of a non-empty matrix.
fn pad_value<T: CostValue>(costs: &Matrix<T>) -> T {
    costs
        .values()
        .fold(None, |max: Option<T>, v| match max {
            Some(m) if v <= m => Some(m),
            _ => Some(v),
        })
        .unwrap_or(T::ZERO)
}

/// Square `size x size` copy of `costs`, extra cells set to `fill`.
fn pad<T: CostValue>(costs: &Matrix<T>, size: usize, fill: T) -> Matrix<T> {
    Matrix::from_fn(size, size, |i, j| costs.get(i, j).unwrap_or(fill))
}

/// Potentials and matching; index 0 is the virtual path start.
struct DualState<T> {
    size: usize,
    row_duals: Vec<T>,
    col_duals: Vec<T>,
    /// Row matched to each column, 0 when the column is free
    col_match: Vec<usize>,
    /// Predecessor column on the current augmenting path
    prev_col: Vec<usize>,
}

impl<T: CostValue> DualState<T> {
    fn new(size: usize) -> Self {
        Self {
            size,
            row_duals: vec![T::ZERO; size + 1],
            col_duals: vec![T::ZERO; size + 1],
            col_match: vec![0; size + 1],
            prev_col: vec![0; size + 1],
        }
    }

    /// Insert `row` into the matching along a shortest augmenting path.
    fn augment(&mut self, row: usize, cost: &Matrix<T>) {
        self.col_match[0] = row;
        self.prev_col.fill(0);
        let mut min_reduced = vec![T::SENTINEL; self.size + 1];
        let mut visited = vec![false; self.size + 1];
        let mut current = 0;

        loop {
            visited[current] = true;
            let (next, delta) = self.explore(current, cost, &mut min_reduced, &visited);
            self.shift_duals(delta, &mut min_reduced, &visited);
            current = next;
            if self.col_match[current] == 0 {
                break;
            }
        }

        // Flip the matching along the path back to the virtual start.
        while current != 0 {
            let prev = self.prev_col[current];
            self.col_match[current] = self.col_match[prev];
            current = prev;
        }
    }

    /// Relax reduced costs from the row matched to `current` and pick the
    /// unvisited column with the smallest tentative distance.
    fn explore(
        &mut self,
        current: usize,
        cost: &Matrix<T>,
        min_reduced: &mut [T],
        visited: &[bool],
    ) -> (usize, T) {
        let row = self.col_match[current];
        let mut candidate = 0;
        let mut delta = T::SENTINEL;

        for col in 1..=self.size {
            if visited[col] {
                continue;
            }
            let reduced = cost[(row - 1, col - 1)] - self.row_duals[row] - self.col_duals[col];
            if reduced < min_reduced[col] {
                min_reduced[col] = reduced;
                self.prev_col[col] = current;
            }
            if candidate == 0 || min_reduced[col] < delta {
                delta = min_reduced[col];
                candidate = col;
            }
        }
        (candidate, delta)
    }

    fn shift_duals(&mut self, delta: T, min_reduced: &mut [T], visited: &[bool]) {
        for col in 0..=self.size {
            if visited[col] {
                self.row_duals[self.col_match[col]] += delta;
                self.col_duals[col] -= delta;
            } else {
                min_reduced[col] -= delta;
            }
        }
    }

    /// Row -> column view restricted to the original dimensions.
    fn unpad(&self, num_rows: usize, num_cols: usize) -> Vec<Option<usize>> {
        let mut rows = vec![None; num_rows];
        for col in 1..=self.size {
            let row = self.col_match[col];
            if row >= 1 && row <= num_rows && col <= num_cols {
                rows[row - 1] = Some(col - 1);
            }
        }
        rows
    }
}
