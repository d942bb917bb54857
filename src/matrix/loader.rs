use super::CoverageMatrix;
use crate::error::{SfResult, SuiteError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Loads a flat 0/1 matrix file: one line per test, one character per
/// requirement. Blank lines are skipped and leading or trailing ASCII
/// whitespace on a row (including `\r`) is stripped; whitespace inside a
/// row is a format error.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> SfResult<CoverageMatrix> {
    let path = path.as_ref();
    debug!("Loading coverage matrix from: {}", path.display());

    let file = File::open(path)?;
    let matrix = read_matrix(BufReader::new(file))?;

    debug!(
        "   -> {} tests x {} requirements",
        matrix.num_tests(),
        matrix.num_requirements()
    );
    Ok(matrix)
}

pub fn read_matrix<R: BufRead>(reader: R) -> SfResult<CoverageMatrix> {
    let mut grid: Vec<Vec<bool>> = Vec::new();
    let mut width: Option<usize> = None;

    // Rows are read as raw bytes so that non-UTF-8 input is a format error.
    for (idx, line) in reader.split(b'\n').enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let row = line.trim_ascii();
        if row.is_empty() {
            continue;
        }

        let mut cells = Vec::with_capacity(row.len());
        for (col, &byte) in row.iter().enumerate() {
            match byte {
                b'0' => cells.push(false),
                b'1' => cells.push(true),
                other => {
                    return Err(SuiteError::format(
                        line_no,
                        format!(
                            "invalid character '{}' at column {}",
                            other.escape_ascii(),
                            col + 1
                        ),
                    ))
                }
            }
        }

        match width {
            None => width = Some(cells.len()),
            Some(w) if w != cells.len() => {
                return Err(SuiteError::format(
                    line_no,
                    format!("row has {} columns, expected {}", cells.len(), w),
                ))
            }
            Some(_) => {}
        }
        grid.push(cells);
    }

    CoverageMatrix::from_grid(&grid)
}

pub fn parse_matrix(text: &str) -> SfResult<CoverageMatrix> {
    read_matrix(text.as_bytes())
}

/// Matrix files (`*.txt`) directly inside `dir`, sorted by name.
pub fn list_matrix_files<P: AsRef<Path>>(dir: P) -> SfResult<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
