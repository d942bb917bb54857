use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use suiteforge::matrix::MatrixProfile;
use suiteforge::optimizer::{ExperimentReport, Termination};
use suiteforge::preprocess::ReductionReport;
use suiteforge::stats::Statistics;

const MAX_LISTED: usize = 12;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, cols: std::ops::RangeInclusive<usize>) {
    for i in cols {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn index_list(ids: &[usize]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    let mut shown: Vec<String> = ids.iter().take(MAX_LISTED).map(|i| i.to_string()).collect();
    if ids.len() > MAX_LISTED {
        shown.push(format!("... (+{})", ids.len() - MAX_LISTED));
    }
    shown.join(" ")
}

pub fn profile(title: &str, p: &MatrixProfile) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new(title).add_attribute(Attribute::Bold),
        Cell::new("Value").fg(Color::Cyan),
    ]);
    align_right(&mut table, 1..=1);

    let rows = [
        ("Tests", p.num_tests.to_string()),
        ("Requirements", p.num_requirements.to_string()),
        ("Empty tests", p.empty_tests.to_string()),
        ("Uncovered requirements", p.uncovered_requirements.to_string()),
        ("Essential tests", p.essential_tests.to_string()),
        (
            "Reqs per test (min/mean/max)",
            format!(
                "{} / {:.2} / {}",
                p.per_test.min, p.per_test.mean, p.per_test.max
            ),
        ),
        (
            "Tests per req (min/mean/max)",
            format!(
                "{} / {:.2} / {}",
                p.per_requirement.min, p.per_requirement.mean, p.per_requirement.max
            ),
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("\n{}", table);
}

pub fn reduction(report: &ReductionReport) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Preprocessing").add_attribute(Attribute::Bold),
        Cell::new("Count").fg(Color::Cyan),
        Cell::new("Indices (input matrix)"),
    ]);
    align_right(&mut table, 1..=1);

    match report {
        ReductionReport::A(r) => {
            for (label, ids) in [
                ("Empty tests", &r.empty),
                ("Duplicate tests", &r.duplicate),
                ("Dominated tests", &r.dominated),
            ] {
                table.add_row(vec![
                    Cell::new(label),
                    Cell::new(ids.len()).fg(Color::Red),
                    Cell::new(index_list(ids)),
                ]);
            }
            table.add_row(vec![
                Cell::new("Kept tests").add_attribute(Attribute::Bold),
                Cell::new(r.kept.len()).fg(Color::Green),
                Cell::new(index_list(&r.kept)),
            ]);
        }
        ReductionReport::B(r) => {
            for (label, ids) in [
                ("Uncovered requirements", &r.uncovered),
                ("Dominated requirements", &r.dominated),
            ] {
                table.add_row(vec![
                    Cell::new(label),
                    Cell::new(ids.len()).fg(Color::Red),
                    Cell::new(index_list(ids)),
                ]);
            }
            table.add_row(vec![
                Cell::new("Kept requirements").add_attribute(Attribute::Bold),
                Cell::new(r.kept.len()).fg(Color::Green),
                Cell::new(index_list(&r.kept)),
            ]);
        }
        ReductionReport::C { rounds } => {
            for s in rounds {
                table.add_row(vec![
                    Cell::new(format!("Round {}", s.round)),
                    Cell::new(format!("-{} / -{}", s.tests_removed, s.requirements_removed)),
                    Cell::new(format!(
                        "{} tests x {} requirements",
                        s.tests_after, s.requirements_after
                    )),
                ]);
            }
            let tests: usize = rounds.iter().map(|s| s.tests_removed).sum();
            let reqs: usize = rounds.iter().map(|s| s.requirements_removed).sum();
            table.add_row(vec![
                Cell::new("Total removed").add_attribute(Attribute::Bold),
                Cell::new(format!("-{} / -{}", tests, reqs)).fg(Color::Red),
                Cell::new(format!("{} rounds", rounds.len())),
            ]);
        }
        ReductionReport::Skipped => {
            table.add_row(vec![
                Cell::new("Skipped"),
                Cell::new(0),
                Cell::new("matrix used as loaded"),
            ]);
        }
    }
    println!("\n{}", table);
}

pub fn runs(report: &ExperimentReport) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Seed").add_attribute(Attribute::Bold),
        Cell::new("Init"),
        Cell::new("Size").fg(Color::Cyan),
        Cell::new("TSSR"),
        Cell::new("Red %").fg(Color::Green),
        Cell::new("Cov %"),
        Cell::new("FDCLOSS").fg(Color::Red),
        Cell::new("Iter"),
        Cell::new("Moves"),
        Cell::new("Time (s)"),
        Cell::new("Stop"),
    ]);
    align_right(&mut table, 0..=9);

    for run in &report.runs {
        let m = &run.metrics;
        let stop = match run.termination {
            Termination::LocalOptimum => Cell::new("local optimum").fg(Color::Green),
            Termination::BudgetExhausted => Cell::new("budget").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(run.seed).add_attribute(Attribute::Bold),
            Cell::new(run.initial_size),
            Cell::new(m.solution_size).fg(Color::Cyan),
            Cell::new(format!("{:.4}", m.tssr)),
            Cell::new(format!("{:.2}", m.reduction_pct)).fg(Color::Green),
            Cell::new(format!("{:.2}", m.coverage_pct)),
            Cell::new(format!("{:.4}", m.fdcloss)).fg(Color::Red),
            Cell::new(m.iterations),
            Cell::new(m.improvements),
            Cell::new(format!("{:.4}", run.elapsed_secs)),
            stop,
        ]);
    }
    println!("\n{}", table);
}

pub fn statistics(stats: &Statistics) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new(format!("Statistics ({} runs)", stats.runs)).add_attribute(Attribute::Bold),
        Cell::new("Mean").fg(Color::Cyan),
        Cell::new("Min"),
        Cell::new("Max"),
        Cell::new("Std"),
    ]);
    align_right(&mut table, 1..=4);

    for (label, s) in stats.rows() {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{:.4}", s.mean)).fg(Color::Cyan),
            Cell::new(format!("{:.4}", s.min)),
            Cell::new(format!("{:.4}", s.max)),
            Cell::new(format!("{:.4}", s.std)),
        ]);
    }
    println!("\n{}", table);
}
