//! Matching service
//!
//! Applies the configured preprocessing (frame rotation, canonical sort) to a
//! pair of trees, runs the matching core and maps the result back to the
//! caller's node indices. Frame sequences are matched pairwise, in parallel
//! when enabled.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{match_trees_with, sort_tree, MatchOptions, SortedTree, Tree};

/// Result of matching one pair of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatch {
    /// Position of the pair in its sequence
    pub frame: usize,
    pub timestamp_a: Option<u64>,
    pub timestamp_b: Option<u64>,
    /// Assignment between the prepared (rotated/sorted) trees
    pub assignment: Vec<Option<usize>>,
    /// The same assignment in the input trees' indices
    pub original_assignment: Vec<Option<usize>>,
    /// Optimal total cost
    pub cost: f64,
    /// Wall time of the matching core alone
    pub elapsed: Duration,
    /// Prepared trees, kept for display
    pub prepared_a: SortedTree,
    pub prepared_b: SortedTree,
}

impl FrameMatch {
    pub fn matched_count(&self) -> usize {
        self.assignment.iter().filter(|c| c.is_some()).count()
    }
}

/// Service for matching trees according to settings.
pub struct MatchingService {
    settings: Arc<Settings>,
}

impl MatchingService {
    /// Create a new matching service.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    pub fn options(&self) -> MatchOptions {
        self.settings.match_options()
    }

    /// Apply rotation and sorting as configured.
    ///
    /// Without sorting the permutation is the identity.
    pub fn prepare(&self, tree: &Tree) -> SortedTree {
        if self.settings.sort_before_match {
            return self.sort(tree);
        }
        let tree = self.oriented(tree);
        let permutation = (0..tree.len()).collect();
        SortedTree { tree, permutation }
    }

    /// Canonical sort in the display frame, rotating first if configured.
    pub fn sort(&self, tree: &Tree) -> SortedTree {
        sort_tree(&self.oriented(tree))
    }

    fn oriented(&self, tree: &Tree) -> Tree {
        let mut tree = tree.clone();
        if self.settings.vehicle_frame {
            tree.rotate_to_display_frame();
        }
        tree
    }

    /// Match frame `a` against frame `b`.
    #[instrument(level = "debug", skip(self, a, b), fields(a = a.len(), b = b.len()))]
    pub fn match_pair(&self, frame: usize, a: &Tree, b: &Tree) -> ApplicationResult<FrameMatch> {
        let prepared_a = self.prepare(a);
        let prepared_b = self.prepare(b);

        let start = Instant::now();
        let outcome = match_trees_with(&prepared_a.tree, &prepared_b.tree, &self.options())?;
        let elapsed = start.elapsed();

        let assignment = outcome.assignment.rows;
        let original_assignment =
            to_original_indices(&assignment, &prepared_a, &prepared_b, a.len());
        debug!(frame, ?assignment, micros = elapsed.as_micros(), "frame matched");

        Ok(FrameMatch {
            frame,
            timestamp_a: a.timestamp,
            timestamp_b: b.timestamp,
            assignment,
            original_assignment,
            cost: outcome.assignment.cost,
            elapsed,
            prepared_a,
            prepared_b,
        })
    }

    /// Match frame `k` of `a` against frame `k` of `b` for every `k`.
    ///
    /// Both sequences must have the same length. Results are in frame order.
    pub fn match_sequences(&self, a: &[Tree], b: &[Tree]) -> ApplicationResult<Vec<FrameMatch>> {
        if a.len() != b.len() {
            return Err(ApplicationError::FrameCountMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        info!(
            "matching {} frames ({}, parallel={})",
            a.len(),
            self.settings.similarity,
            self.settings.parallel
        );

        if self.settings.parallel {
            a.par_iter()
                .zip(b.par_iter())
                .enumerate()
                .map(|(k, (ta, tb))| self.match_pair(k, ta, tb))
                .collect()
        } else {
            a.iter()
                .zip(b)
                .enumerate()
                .map(|(k, (ta, tb))| self.match_pair(k, ta, tb))
                .collect()
        }
    }
}

/// Translate a prepared-index assignment through both permutations.
fn to_original_indices(
    assignment: &[Option<usize>],
    a: &SortedTree,
    b: &SortedTree,
    original_len: usize,
) -> Vec<Option<usize>> {
    let mut original = vec![None; original_len];
    for (row, col) in assignment.iter().enumerate() {
        let Some(orig_row) = a.original_index(row) else {
            continue;
        };
        if let Some(slot) = original.get_mut(orig_row) {
            *slot = col.and_then(|c| b.original_index(c));
        }
    }
    original
}
