use crate::matrix::{BitSet, CoverageMatrix};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Mode {
    /// Test reduction.
    A,
    /// Requirement reduction.
    B,
    /// A then B, repeated to a fixpoint.
    C,
}

/// Tests dropped by one Mode A pass, as local indices of the input matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestReduction {
    pub empty: Vec<usize>,
    pub duplicate: Vec<usize>,
    pub dominated: Vec<usize>,
    pub kept: Vec<usize>,
}

impl TestReduction {
    pub fn removed(&self) -> usize {
        self.empty.len() + self.duplicate.len() + self.dominated.len()
    }
}

/// Requirements dropped by one Mode B pass, as local indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementReduction {
    pub uncovered: Vec<usize>,
    pub dominated: Vec<usize>,
    pub kept: Vec<usize>,
}

impl RequirementReduction {
    pub fn removed(&self) -> usize {
        self.uncovered.len() + self.dominated.len()
    }
}

/// One A/B round of Mode C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub round: usize,
    pub tests_removed: usize,
    pub requirements_removed: usize,
    pub tests_after: usize,
    pub requirements_after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode")]
pub enum ReductionReport {
    A(TestReduction),
    B(RequirementReduction),
    C { rounds: Vec<RoundSummary> },
    /// Preprocessing disabled; the matrix passed through untouched.
    Skipped,
}

/// Output of preprocessing: the reduced matrix (which carries the mapping
/// back to original indices) plus what was removed and why.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub matrix: CoverageMatrix,
    pub report: ReductionReport,
    pub original_tests: usize,
    pub original_requirements: usize,
}

impl Reduction {
    pub fn unchanged(matrix: &CoverageMatrix) -> Self {
        Self {
            matrix: matrix.clone(),
            report: ReductionReport::Skipped,
            original_tests: matrix.num_tests(),
            original_requirements: matrix.num_requirements(),
        }
    }

    pub fn tests_removed(&self) -> usize {
        self.original_tests - self.matrix.num_tests()
    }

    pub fn requirements_removed(&self) -> usize {
        self.original_requirements - self.matrix.num_requirements()
    }

    /// Original indices of the retained tests.
    pub fn kept_tests(&self) -> &[usize] {
        self.matrix.test_ids()
    }

    /// Original indices of the retained requirements.
    pub fn kept_requirements(&self) -> &[usize] {
        self.matrix.requirement_ids()
    }
}

pub fn preprocess(matrix: &CoverageMatrix, mode: Mode) -> Reduction {
    let (reduced, report) = match mode {
        Mode::A => {
            let (m, r) = reduce_tests(matrix);
            (m, ReductionReport::A(r))
        }
        Mode::B => {
            let (m, r) = reduce_requirements(matrix);
            (m, ReductionReport::B(r))
        }
        Mode::C => {
            let (m, rounds) = reduce_to_fixpoint(matrix);
            (m, ReductionReport::C { rounds })
        }
    };

    debug!(
        "Mode {}: {}x{} -> {}x{}",
        mode,
        matrix.num_tests(),
        matrix.num_requirements(),
        reduced.num_tests(),
        reduced.num_requirements()
    );

    Reduction {
        matrix: reduced,
        report,
        original_tests: matrix.num_tests(),
        original_requirements: matrix.num_requirements(),
    }
}

/// Mode A. Drops empty tests, then duplicates (lowest index survives), then
/// tests whose coverage is a proper subset of another survivor's.
pub fn reduce_tests(matrix: &CoverageMatrix) -> (CoverageMatrix, TestReduction) {
    let mut report = TestReduction::default();

    // 1. Empty
    let mut non_empty = Vec::with_capacity(matrix.num_tests());
    for t in 0..matrix.num_tests() {
        if matrix.coverage(t).is_empty() {
            report.empty.push(t);
        } else {
            non_empty.push(t);
        }
    }

    // 2. Duplicates
    let mut seen: HashMap<&BitSet, usize> = HashMap::with_capacity(non_empty.len());
    let mut unique = Vec::with_capacity(non_empty.len());
    for &t in &non_empty {
        if seen.contains_key(matrix.coverage(t)) {
            report.duplicate.push(t);
        } else {
            seen.insert(matrix.coverage(t), t);
            unique.push(t);
        }
    }

    // 3. Dominated. Survivors are pairwise distinct, so a subset is a proper
    // subset and the maximal elements always remain as dominators.
    for &b in &unique {
        let cov_b = matrix.coverage(b);
        let dominated = unique
            .iter()
            .any(|&a| a != b && cov_b.is_strict_subset(matrix.coverage(a)));
        if dominated {
            report.dominated.push(b);
        } else {
            report.kept.push(b);
        }
    }

    // Never hand back a matrix with no tests.
    if report.kept.is_empty() {
        report.kept.push(0);
        report.empty.retain(|&t| t != 0);
    }

    let requirements: Vec<usize> = (0..matrix.num_requirements()).collect();
    (matrix.select(&report.kept, &requirements), report)
}

/// Mode B. Drops requirements no test covers, then every requirement `r1`
/// whose covering tests are all covering tests of some other `r2`. When two
/// requirements share the exact same covering tests the lower index stays.
pub fn reduce_requirements(matrix: &CoverageMatrix) -> (CoverageMatrix, RequirementReduction) {
    let mut report = RequirementReduction::default();
    let columns = matrix.columns();

    let mut covered = Vec::with_capacity(columns.len());
    for (r, col) in columns.iter().enumerate() {
        if col.is_empty() {
            report.uncovered.push(r);
        } else {
            covered.push(r);
        }
    }

    for &r1 in &covered {
        let col1 = &columns[r1];
        let dominated = covered.iter().any(|&r2| {
            r2 != r1
                && (col1.is_strict_subset(&columns[r2]) || (r2 < r1 && *col1 == columns[r2]))
        });
        if dominated {
            report.dominated.push(r1);
        } else {
            report.kept.push(r1);
        }
    }

    if report.kept.is_empty() {
        report.kept.push(0);
        report.uncovered.retain(|&r| r != 0);
    }

    let tests: Vec<usize> = (0..matrix.num_tests()).collect();
    (matrix.select(&tests, &report.kept), report)
}

/// Mode C. Alternates A and B until a whole round removes nothing.
pub fn reduce_to_fixpoint(matrix: &CoverageMatrix) -> (CoverageMatrix, Vec<RoundSummary>) {
    let mut current = matrix.clone();
    let mut rounds = Vec::new();

    loop {
        let (after_a, tests) = reduce_tests(&current);
        let (after_b, reqs) = reduce_requirements(&after_a);

        let summary = RoundSummary {
            round: rounds.len() + 1,
            tests_removed: tests.removed(),
            requirements_removed: reqs.removed(),
            tests_after: after_b.num_tests(),
            requirements_after: after_b.num_requirements(),
        };
        debug!(
            "   round {}: -{} tests, -{} requirements -> {}x{}",
            summary.round,
            summary.tests_removed,
            summary.requirements_removed,
            summary.tests_after,
            summary.requirements_after
        );
        rounds.push(summary);
        current = after_b;

        if summary.tests_removed == 0 && summary.requirements_removed == 0 {
            break;
        }
    }

    (current, rounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(num_req: usize, sets: &[&[usize]]) -> CoverageMatrix {
        let owned: Vec<Vec<usize>> = sets.iter().map(|s| s.to_vec()).collect();
        CoverageMatrix::from_sets(num_req, &owned).unwrap()
    }

    #[test]
    fn test_mode_a_classifies_each_removal() {
        // 0: {0,1}  1: {}  2: {0,1} dup of 0  3: {0} dominated by 0  4: {2}
        let matrix = m(3, &[&[0, 1], &[], &[0, 1], &[0], &[2]]);
        let (reduced, report) = reduce_tests(&matrix);

        assert_eq!(report.empty, vec![1]);
        assert_eq!(report.duplicate, vec![2]);
        assert_eq!(report.dominated, vec![3]);
        assert_eq!(report.kept, vec![0, 4]);
        assert_eq!(reduced.test_ids(), &[0, 4]);
        assert_eq!(reduced.num_requirements(), 3);
    }

    #[test]
    fn test_mode_a_later_test_can_dominate_earlier() {
        let matrix = m(3, &[&[0], &[0, 1, 2]]);
        let (reduced, report) = reduce_tests(&matrix);
        assert_eq!(report.dominated, vec![0]);
        assert_eq!(reduced.test_ids(), &[1]);
    }

    #[test]
    fn test_mode_a_all_empty_keeps_one() {
        let matrix = m(2, &[&[], &[]]);
        let (reduced, report) = reduce_tests(&matrix);
        assert_eq!(reduced.num_tests(), 1);
        assert_eq!(report.kept, vec![0]);
        assert_eq!(report.empty, vec![1]);
    }

    #[test]
    fn test_mode_b_drops_uncovered_and_dominated() {
        // req 0: tests {0}     -> subset of req 1's tests, dropped
        // req 1: tests {0,1}
        // req 2: nobody        -> uncovered
        // req 3: tests {0,1}   -> same as req 1, higher index, dropped
        let matrix = m(4, &[&[0, 1, 3], &[1, 3]]);
        let (reduced, report) = reduce_requirements(&matrix);

        assert_eq!(report.uncovered, vec![2]);
        assert_eq!(report.dominated, vec![0, 3]);
        assert_eq!(report.kept, vec![1]);
        assert_eq!(reduced.requirement_ids(), &[1]);
        assert_eq!(reduced.num_tests(), 2);
    }

    #[test]
    fn test_mode_c_reaches_fixpoint() {
        let matrix = m(4, &[&[0, 1], &[0], &[2], &[2, 3], &[]]);
        let (reduced, rounds) = reduce_to_fixpoint(&matrix);

        let last = rounds.last().unwrap();
        assert_eq!(last.tests_removed, 0);
        assert_eq!(last.requirements_removed, 0);

        let (again, again_rounds) = reduce_to_fixpoint(&reduced);
        assert_eq!(again, reduced);
        assert_eq!(again_rounds.len(), 1);
    }

    #[test]
    fn test_mode_parses_case_insensitive() {
        assert_eq!("a".parse::<Mode>().unwrap(), Mode::A);
        assert_eq!("C".parse::<Mode>().unwrap(), Mode::C);
        assert!("D".parse::<Mode>().is_err());
    }
}
