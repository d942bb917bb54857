mod tables;

pub use self::tables::{
    profile as print_matrix_profile, reduction as print_reduction_report,
    runs as print_run_table, statistics as print_statistics,
};
