pub mod bitset;
pub mod loader;

pub use self::bitset::BitSet;

use crate::error::{SfResult, SuiteError};
use serde::Serialize;

/// Binary test x requirement coverage relation.
///
/// Rows are tests, columns are requirements. Local indices are always
/// `0..n` / `0..m`; `test_ids` and `requirement_ids` map them back to the
/// positions they held in the matrix that was originally loaded, so a
/// reduced matrix can report its solutions in the original space.
/// Nothing mutates a matrix after construction; reductions build new ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMatrix {
    rows: Vec<BitSet>,
    num_requirements: usize,
    test_ids: Vec<usize>,
    requirement_ids: Vec<usize>,
}

impl CoverageMatrix {
    /// Builds a matrix from a dense boolean grid (one inner vec per test).
    pub fn from_grid(grid: &[Vec<bool>]) -> SfResult<Self> {
        let num_requirements = grid.first().map(|r| r.len()).unwrap_or(0);
        if grid.is_empty() || num_requirements == 0 {
            return Err(SuiteError::EmptyMatrix);
        }

        let mut rows = Vec::with_capacity(grid.len());
        for (t, row) in grid.iter().enumerate() {
            if row.len() != num_requirements {
                return Err(SuiteError::format(
                    t + 1,
                    format!(
                        "row has {} columns, expected {}",
                        row.len(),
                        num_requirements
                    ),
                ));
            }
            rows.push(BitSet::from_indices(
                num_requirements,
                row.iter().enumerate().filter(|&(_, &c)| c).map(|(r, _)| r),
            ));
        }

        Ok(Self::identity(rows, num_requirements))
    }

    /// Builds a matrix from per-test requirement lists.
    pub fn from_sets(num_requirements: usize, sets: &[Vec<usize>]) -> SfResult<Self> {
        if sets.is_empty() || num_requirements == 0 {
            return Err(SuiteError::EmptyMatrix);
        }

        let mut rows = Vec::with_capacity(sets.len());
        for (t, set) in sets.iter().enumerate() {
            if let Some(&bad) = set.iter().find(|&&r| r >= num_requirements) {
                return Err(SuiteError::format(
                    t + 1,
                    format!(
                        "requirement {} out of range (matrix has {})",
                        bad, num_requirements
                    ),
                ));
            }
            rows.push(BitSet::from_indices(num_requirements, set.iter().copied()));
        }

        Ok(Self::identity(rows, num_requirements))
    }

    fn identity(rows: Vec<BitSet>, num_requirements: usize) -> Self {
        let test_ids = (0..rows.len()).collect();
        Self {
            rows,
            num_requirements,
            test_ids,
            requirement_ids: (0..num_requirements).collect(),
        }
    }

    /// New matrix holding the listed local tests and requirements, in the
    /// order given. Original-index mappings are composed through.
    pub fn select(&self, tests: &[usize], requirements: &[usize]) -> Self {
        let rows = tests
            .iter()
            .map(|&t| self.rows[t].project(requirements))
            .collect();

        Self {
            rows,
            num_requirements: requirements.len(),
            test_ids: tests.iter().map(|&t| self.test_ids[t]).collect(),
            requirement_ids: requirements
                .iter()
                .map(|&r| self.requirement_ids[r])
                .collect(),
        }
    }

    #[inline(always)]
    pub fn num_tests(&self) -> usize {
        self.rows.len()
    }

    #[inline(always)]
    pub fn num_requirements(&self) -> usize {
        self.num_requirements
    }

    #[inline(always)]
    pub fn coverage(&self, test: usize) -> &BitSet {
        &self.rows[test]
    }

    pub fn test_ids(&self) -> &[usize] {
        &self.test_ids
    }

    pub fn requirement_ids(&self) -> &[usize] {
        &self.requirement_ids
    }

    pub fn columns(&self) -> Vec<BitSet> {
        let mut cols = vec![BitSet::new(self.rows.len()); self.num_requirements];
        for (t, row) in self.rows.iter().enumerate() {
            for r in row.iter() {
                cols[r].insert(t);
            }
        }
        cols
    }

    /// Union of the coverage of the given tests.
    pub fn covered(&self, tests: &[usize]) -> BitSet {
        let mut acc = BitSet::new(self.num_requirements);
        for &t in tests {
            acc.union_with(&self.rows[t]);
        }
        acc
    }

    /// Requirements covered by at least one test of the full suite.
    pub fn coverable(&self) -> BitSet {
        let mut acc = BitSet::new(self.num_requirements);
        for row in &self.rows {
            acc.union_with(row);
        }
        acc
    }

    /// Maps local test indices to original ones, sorted ascending.
    pub fn to_original(&self, tests: &[usize]) -> Vec<usize> {
        let mut ids: Vec<usize> = tests.iter().map(|&t| self.test_ids[t]).collect();
        ids.sort_unstable();
        ids
    }

    /// Tests that are the sole coverer of at least one requirement.
    pub fn essential_tests(&self) -> Vec<usize> {
        let mut essential: Vec<usize> = self
            .columns()
            .iter()
            .filter(|col| col.len() == 1)
            .filter_map(|col| col.iter().next())
            .collect();
        essential.sort_unstable();
        essential.dedup();
        essential
    }

    pub fn profile(&self) -> MatrixProfile {
        let per_test: Vec<usize> = self.rows.iter().map(|r| r.len()).collect();
        let per_req: Vec<usize> = self.columns().iter().map(|c| c.len()).collect();

        MatrixProfile {
            num_tests: self.num_tests(),
            num_requirements: self.num_requirements,
            empty_tests: per_test.iter().filter(|&&c| c == 0).count(),
            uncovered_requirements: per_req.iter().filter(|&&c| c == 0).count(),
            essential_tests: self.essential_tests().len(),
            per_test: CountSpread::of(&per_test),
            per_requirement: CountSpread::of(&per_req),
        }
    }
}

/// Min / mean / max of a list of counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountSpread {
    pub min: usize,
    pub mean: f64,
    pub max: usize,
}

impl CountSpread {
    fn of(counts: &[usize]) -> Self {
        if counts.is_empty() {
            return Self {
                min: 0,
                mean: 0.0,
                max: 0,
            };
        }
        Self {
            min: counts.iter().copied().min().unwrap_or(0),
            mean: counts.iter().sum::<usize>() as f64 / counts.len() as f64,
            max: counts.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Shape and density summary used by the `inspect` report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixProfile {
    pub num_tests: usize,
    pub num_requirements: usize,
    pub empty_tests: usize,
    pub uncovered_requirements: usize,
    pub essential_tests: usize,
    /// Requirements covered per test.
    pub per_test: CountSpread,
    /// Tests covering each requirement.
    pub per_requirement: CountSpread,
}
