pub mod initialization;
pub mod runner;

pub use self::initialization::{generate as generate_initial, InitialSolution, Strategy};
pub use self::runner::{ExperimentReport, ExperimentRunner, ProgressCallback, RunMetrics, RunRecord};

use crate::matrix::CoverageMatrix;
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

/// How the climber picks among several removable tests.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Lowest local test index.
    #[default]
    Lowest,
    /// Uniform among the removable tests, drawn from the run's rng.
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimbOptions {
    pub max_iterations: usize,
    pub tie_break: TieBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No single removal keeps the covered set intact.
    LocalOptimum,
    /// `max_iterations` neighbourhoods were evaluated first.
    BudgetExhausted,
}

/// Lexicographic fitness: covered requirements first (more is better),
/// then solution size (fewer is better). `Ordering::Greater` means better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fitness {
    pub covered: usize,
    pub size: usize,
}

impl Ord for Fitness {
    fn cmp(&self, other: &Self) -> Ordering {
        self.covered
            .cmp(&other.covered)
            .then_with(|| other.size.cmp(&self.size))
    }
}

impl PartialOrd for Fitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimbResult {
    /// Local test indices, ascending.
    pub solution: Vec<usize>,
    pub covered: usize,
    pub iterations: usize,
    pub improvements: usize,
    pub evaluations: usize,
    pub termination: Termination,
    /// Solution size before the first move and after every accepted move.
    pub history: Vec<usize>,
}

impl ClimbResult {
    pub fn size(&self) -> usize {
        self.solution.len()
    }
}

/// Removal-only steepest descent over a fixed matrix.
///
/// `cover_counts[r]` is how many tests in the current solution cover `r`;
/// a test is removable exactly when every requirement it covers has a
/// count of at least two, so the covered set never shrinks. The last
/// remaining test is never removed.
pub struct HillClimber<'a> {
    matrix: &'a CoverageMatrix,
    in_solution: Vec<bool>,
    cover_counts: Vec<u32>,
    size: usize,
    covered: usize,
}

impl<'a> HillClimber<'a> {
    pub fn new(matrix: &'a CoverageMatrix, initial: &[usize]) -> Self {
        let mut in_solution = vec![false; matrix.num_tests()];
        let mut cover_counts = vec![0u32; matrix.num_requirements()];
        let mut size = 0;

        for &t in initial {
            if in_solution[t] {
                continue;
            }
            in_solution[t] = true;
            size += 1;
            for r in matrix.coverage(t).iter() {
                cover_counts[r] += 1;
            }
        }

        let covered = cover_counts.iter().filter(|&&c| c > 0).count();

        Self {
            matrix,
            in_solution,
            cover_counts,
            size,
            covered,
        }
    }

    pub fn fitness(&self) -> Fitness {
        Fitness {
            covered: self.covered,
            size: self.size,
        }
    }

    pub fn solution(&self) -> Vec<usize> {
        (0..self.in_solution.len())
            .filter(|&t| self.in_solution[t])
            .collect()
    }

    #[inline(always)]
    pub fn is_removable(&self, test: usize) -> bool {
        self.size > 1
            && self.in_solution[test]
            && self
                .matrix
                .coverage(test)
                .iter()
                .all(|r| self.cover_counts[r] >= 2)
    }

    /// Admissible neighbours of the current solution, ascending.
    pub fn removable(&self) -> Vec<usize> {
        (0..self.in_solution.len())
            .filter(|&t| self.is_removable(t))
            .collect()
    }

    fn remove(&mut self, test: usize) {
        self.in_solution[test] = false;
        self.size -= 1;
        for r in self.matrix.coverage(test).iter() {
            self.cover_counts[r] -= 1;
        }
    }

    pub fn climb(mut self, options: &ClimbOptions, rng: &mut Rng) -> ClimbResult {
        let mut iterations = 0;
        let mut improvements = 0;
        let mut evaluations = 0;
        let mut history = vec![self.size];
        let mut termination = Termination::BudgetExhausted;

        while iterations < options.max_iterations {
            iterations += 1;
            evaluations += self.size;

            let candidates = self.removable();
            if candidates.is_empty() {
                termination = Termination::LocalOptimum;
                break;
            }

            let pick = match options.tie_break {
                TieBreak::Lowest => candidates[0],
                TieBreak::Random => candidates[rng.usize(0..candidates.len())],
            };

            let before = self.fitness();
            self.remove(pick);
            debug_assert!(self.fitness() > before);

            improvements += 1;
            history.push(self.size);
        }

        debug!(
            "climb finished: {:?} after {} iterations, size {} -> {}",
            termination,
            iterations,
            history[0],
            self.size
        );

        ClimbResult {
            solution: self.solution(),
            covered: self.covered,
            iterations,
            improvements,
            evaluations,
            termination,
            history,
        }
    }
}
