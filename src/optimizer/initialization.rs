use crate::matrix::{BitSet, CoverageMatrix};
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    All,
    Greedy,
    Essential,
    Random,
}

/// Starting point for the climber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialSolution {
    /// Local test indices in the order they were picked.
    pub tests: Vec<usize>,
    pub covered: BitSet,
}

impl InitialSolution {
    fn empty(matrix: &CoverageMatrix) -> Self {
        Self {
            tests: Vec::new(),
            covered: BitSet::new(matrix.num_requirements()),
        }
    }

    fn push(&mut self, matrix: &CoverageMatrix, test: usize) {
        self.covered.union_with(matrix.coverage(test));
        self.tests.push(test);
    }

    /// True when every requirement of the matrix is covered.
    pub fn is_complete(&self, matrix: &CoverageMatrix) -> bool {
        self.covered.len() == matrix.num_requirements()
    }
}

/// Builds an initial solution. Only `Random` draws from `rng`.
pub fn generate(matrix: &CoverageMatrix, strategy: Strategy, rng: &mut Rng) -> InitialSolution {
    match strategy {
        Strategy::All => {
            let mut sol = InitialSolution::empty(matrix);
            for t in 0..matrix.num_tests() {
                sol.push(matrix, t);
            }
            sol
        }
        Strategy::Greedy => {
            let mut sol = InitialSolution::empty(matrix);
            extend_greedy(matrix, &mut sol);
            sol
        }
        Strategy::Essential => {
            let mut sol = InitialSolution::empty(matrix);
            for t in matrix.essential_tests() {
                sol.push(matrix, t);
            }
            extend_greedy(matrix, &mut sol);
            sol
        }
        Strategy::Random => random_scan(matrix, rng),
    }
}

/// Adds the test with the largest number of newly covered requirements
/// (lowest index on ties) until nothing new can be covered.
fn extend_greedy(matrix: &CoverageMatrix, sol: &mut InitialSolution) {
    let mut chosen = vec![false; matrix.num_tests()];
    for &t in &sol.tests {
        chosen[t] = true;
    }

    while !sol.is_complete(matrix) {
        let mut best: Option<(usize, usize)> = None;
        for t in 0..matrix.num_tests() {
            if chosen[t] {
                continue;
            }
            let gain = sol.covered.count_new(matrix.coverage(t));
            if gain > 0 && best.map_or(true, |(_, g)| gain > g) {
                best = Some((t, gain));
            }
        }

        match best {
            Some((t, _)) => {
                chosen[t] = true;
                sol.push(matrix, t);
            }
            None => break,
        }
    }
}

fn random_scan(matrix: &CoverageMatrix, rng: &mut Rng) -> InitialSolution {
    let mut order: Vec<usize> = (0..matrix.num_tests()).collect();
    rng.shuffle(&mut order);

    let mut sol = InitialSolution::empty(matrix);
    for t in order {
        if sol.is_complete(matrix) {
            break;
        }
        if sol.covered.count_new(matrix.coverage(t)) > 0 {
            sol.push(matrix, t);
        }
    }
    sol
}
