use fastrand::Rng;
use proptest::prelude::*;
use suiteforge::config::ExperimentConfig;
use suiteforge::matrix::CoverageMatrix;
use suiteforge::optimizer::runner::Silent;
use suiteforge::optimizer::{
    generate_initial, ClimbOptions, ExperimentRunner, HillClimber, Strategy as Start, TieBreak,
};
use suiteforge::preprocess::{preprocess, Mode};

// --- STRATEGIES ---

// Small, dense-ish matrices so subsets and duplicates actually occur.
prop_compose! {
    fn arb_matrix()(tests in 1usize..9, reqs in 1usize..9)(
        grid in proptest::collection::vec(
            proptest::collection::vec(proptest::bool::weighted(0.4), reqs),
            tests
        )
    ) -> CoverageMatrix {
        CoverageMatrix::from_grid(&grid).unwrap()
    }
}

fn arb_mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::A), Just(Mode::B), Just(Mode::C)]
}

fn arb_start() -> impl Strategy<Value = Start> {
    prop_oneof![
        Just(Start::All),
        Just(Start::Greedy),
        Just(Start::Essential),
        Just(Start::Random),
    ]
}

fn arb_tie_break() -> impl Strategy<Value = TieBreak> {
    prop_oneof![Just(TieBreak::Lowest), Just(TieBreak::Random)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn test_preprocessing_is_idempotent(m in arb_matrix(), mode in arb_mode()) {
        let once = preprocess(&m, mode).matrix;
        let twice = preprocess(&once, mode).matrix;
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_mode_c_preserves_coverability(m in arb_matrix()) {
        let reduced = preprocess(&m, Mode::C);
        let full = m.coverable();
        // every retained requirement keeps its coverable status
        for (local, &orig) in reduced.kept_requirements().iter().enumerate() {
            let still = reduced.matrix.coverable().contains(local);
            prop_assert_eq!(still, full.contains(orig));
        }
        // the retained tests, mapped back, still reach every retained requirement
        let all_local: Vec<usize> = (0..reduced.matrix.num_tests()).collect();
        let mapped = m.covered(&reduced.matrix.to_original(&all_local));
        for &orig in reduced.kept_requirements() {
            prop_assert_eq!(mapped.contains(orig), full.contains(orig));
        }
    }

    #[test]
    fn test_mode_a_leaves_no_dominated_survivor(m in arb_matrix()) {
        let r = preprocess(&m, Mode::A).matrix;
        for a in 0..r.num_tests() {
            for b in 0..r.num_tests() {
                if a != b {
                    prop_assert!(
                        !r.coverage(b).is_subset(r.coverage(a)),
                        "test {} still dominated by {}", b, a
                    );
                }
            }
        }
    }

    #[test]
    fn test_climb_never_grows_or_loses_coverage(
        m in arb_matrix(),
        strategy in arb_start(),
        tie_break in arb_tie_break(),
        seed in any::<u64>(),
    ) {
        let mut rng = Rng::with_seed(seed);
        let initial = generate_initial(&m, strategy, &mut rng);
        let options = ClimbOptions { max_iterations: 1000, tie_break };
        let result = HillClimber::new(&m, &initial.tests).climb(&options, &mut rng);

        prop_assert!(result.size() <= initial.tests.len());
        prop_assert_eq!(result.covered, initial.covered.len());
        prop_assert_eq!(m.covered(&result.solution), initial.covered.clone());
        if initial.is_complete(&m) {
            prop_assert_eq!(result.covered, m.num_requirements());
        }
        // history only ever goes down by one
        for w in result.history.windows(2) {
            prop_assert_eq!(w[0], w[1] + 1);
        }
    }

    #[test]
    fn test_experiment_is_deterministic(
        m in arb_matrix(),
        mode in arb_mode(),
        strategy in arb_start(),
        tie_break in arb_tie_break(),
        seeds in proptest::collection::vec(any::<u64>(), 1..4),
    ) {
        let cfg = ExperimentConfig {
            tie_break,
            ..ExperimentConfig::new(mode, strategy, seeds, 200)
        };
        let a = ExperimentRunner::new(&m, cfg.clone()).unwrap().run(Silent);
        let b = ExperimentRunner::new(&m, cfg).unwrap().run(Silent);

        prop_assert_eq!(a.runs.len(), b.runs.len());
        for (x, y) in a.runs.iter().zip(&b.runs) {
            prop_assert_eq!(&x.solution, &y.solution);
            prop_assert_eq!(&x.metrics, &y.metrics);
            prop_assert_eq!(x.termination, y.termination);
        }
    }
}
