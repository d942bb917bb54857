use clap::{CommandFactory, FromArgMatches, Parser};
use rstest::rstest;
use std::fs;
use suiteforge::config::{Config, SearchParams, DEFAULT_SEEDS};
use suiteforge::error::SuiteError;
use suiteforge::optimizer::{Strategy, TieBreak};
use suiteforge::preprocess::Mode;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    config: Config,
}

fn parse(args: &[&str]) -> (SearchParams, clap::ArgMatches) {
    let mut argv = vec!["suiteforge"];
    argv.extend_from_slice(args);
    let matches = TestCli::command().get_matches_from(argv);
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    (cli.config.search, matches)
}

#[test]
fn test_cli_defaults_match_struct_defaults() {
    let (params, _) = parse(&[]);
    let defaults = SearchParams::default();
    assert_eq!(params.mode, defaults.mode);
    assert_eq!(params.initial_strategy, defaults.initial_strategy);
    assert_eq!(params.seeds, DEFAULT_SEEDS.to_vec());
    assert_eq!(params.max_iterations, defaults.max_iterations);
    assert_eq!(params.tie_break, defaults.tie_break);
    assert!(!params.no_preprocessing);
}

#[test]
fn test_cli_values_validate() {
    let (params, _) = parse(&[
        "--mode",
        "c",
        "--initial-strategy",
        "Essential",
        "--seeds",
        "1",
        "2",
        "--max-iterations",
        "50",
        "--tie-break",
        "random",
        "--no-preprocessing",
    ]);
    let cfg = params.validate().unwrap();
    assert_eq!(cfg.mode, Mode::C);
    assert_eq!(cfg.strategy, Strategy::Essential);
    assert_eq!(cfg.seeds, vec![1, 2]);
    assert_eq!(cfg.max_iterations, 50);
    assert_eq!(cfg.tie_break, TieBreak::Random);
    assert!(!cfg.preprocess);
}

#[rstest]
#[case("mode", "D")]
#[case("initial-strategy", "best")]
#[case("tie-break", "highest")]
#[case("max-iterations", "0")]
#[case("max-iterations", "-5")]
fn test_bad_values_are_config_errors(#[case] flag: &str, #[case] value: &str) {
    let flag = format!("--{}", flag);
    let (params, _) = parse(&[flag.as_str(), value]);
    assert!(matches!(params.validate(), Err(SuiteError::Config(_))));
}

#[test]
fn test_empty_seed_list_from_file_is_config_error() {
    let params: SearchParams = serde_json::from_str(r#"{"seeds": []}"#).unwrap();
    assert!(matches!(params.validate(), Err(SuiteError::Config(_))));
}

#[test]
fn test_file_values_with_cli_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("search.json");
    fs::write(
        &path,
        r#"{ "mode": "A", "initial_strategy": "greedy", "max_iterations": 10 }"#,
    )
    .unwrap();

    let mut from_file = SearchParams::load_from_file(&path).unwrap();
    // missing fields fall back to defaults
    assert_eq!(from_file.seeds, DEFAULT_SEEDS.to_vec());
    assert_eq!(from_file.tie_break, "lowest");

    let (cli, matches) = parse(&["--max-iterations", "99"]);
    from_file.merge_from_cli(&cli, &matches);

    let cfg = from_file.validate().unwrap();
    // typed on the command line: wins
    assert_eq!(cfg.max_iterations, 99);
    // clap defaults do not clobber file values
    assert_eq!(cfg.mode, Mode::A);
    assert_eq!(cfg.strategy, Strategy::Greedy);
}

#[test]
fn test_bad_json_file_is_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ mode: A").unwrap();
    assert!(matches!(
        SearchParams::load_from_file(&path),
        Err(SuiteError::Json(_))
    ));
}
