//! Text input and output around the numeric core: comma-separated point files, row-list
//! marshalling for foreign callers, and the fixed four-decimal matrix printout.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
use ndarray::{Array2, ArrayView2};

use crate::dense::allocate;
use crate::SymNmfError;

/// Parse comma-separated rows of reals into an `n x d` matrix.
///
/// Blank lines are skipped. Every row must have the same number of fields as the first one.
pub fn parse_points<R: BufRead>(reader: R) -> anyhow::Result<Array2<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let row = trimmed
            .split(',')
            .map(|field| {
                field.trim().parse::<f64>().map_err(|_| {
                    SymNmfError::MalformedInput(format!(
                        "line {}: '{}' is not a number",
                        line_no + 1,
                        field.trim()
                    ))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(SymNmfError::MalformedInput("no data points".to_string()).into());
    }

    matrix_from_rows(&rows)
}

pub fn load_points<P: AsRef<Path>>(path: P) -> anyhow::Result<Array2<f64>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_points(BufReader::new(file))
}

/// Copy a list of equal-length rows into a matrix, rejecting ragged input as a whole.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> anyhow::Result<Array2<f64>> {
    let cols = rows.first().map_or(0, Vec::len);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
        return Err(SymNmfError::MalformedInput(format!(
            "row {} has {} values, expected {}",
            i,
            row.len(),
            cols
        ))
        .into());
    }

    let mut matrix = allocate(rows.len(), cols)?;
    for (mut target, source) in matrix.rows_mut().into_iter().zip(rows) {
        for (cell, &value) in target.iter_mut().zip(source) {
            *cell = value;
        }
    }
    Ok(matrix)
}

pub fn matrix_to_rows(matrix: ArrayView2<f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Write one line per row, four decimals per entry, comma-separated.
pub fn write_matrix<W: Write>(writer: &mut W, matrix: ArrayView2<f64>) -> std::io::Result<()> {
    for row in matrix.rows() {
        let line = row
            .iter()
            .map(|v| format!("{:.4}", v))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

pub fn format_matrix(matrix: ArrayView2<f64>) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_matrix(&mut out, matrix);
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Cursor;

    fn malformed(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<SymNmfError>(),
            Some(SymNmfError::MalformedInput(_))
        )
    }

    #[test]
    fn test_parse_points() {
        let input = "0,0\n1.5, -2\n\n3e1,4\n";
        let points = parse_points(Cursor::new(input)).unwrap();
        assert_eq!(points, array![[0.0, 0.0], [1.5, -2.0], [30.0, 4.0]]);
    }

    #[test]
    fn test_parse_points_ragged() {
        let err = parse_points(Cursor::new("1,2\n3\n")).unwrap_err();
        assert!(malformed(&err));
    }

    #[test]
    fn test_parse_points_not_numeric() {
        let err = parse_points(Cursor::new("1,2\n3,abc\n")).unwrap_err();
        assert!(malformed(&err));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_points_empty() {
        let err = parse_points(Cursor::new("\n\n")).unwrap_err();
        assert!(malformed(&err));
    }

    #[test]
    fn test_load_points_missing_file() {
        assert!(load_points("/nonexistent/symnmf/input.txt").is_err());
    }

    #[test]
    fn test_matrix_from_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let m = matrix_from_rows(&rows).unwrap();
        assert_eq!(m, array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(matrix_to_rows(m.view()), rows);

        let empty = matrix_from_rows(&[]).unwrap();
        assert_eq!(empty.dim(), (0, 0));
    }

    #[test]
    fn test_matrix_from_rows_ragged() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0, 5.0]];
        let err = matrix_from_rows(&rows).unwrap_err();
        assert!(malformed(&err));
    }

    #[test]
    fn test_format_matrix() {
        let m = array![[1.0, 0.123456], [-2.5, 1e-9]];
        assert_eq!(format_matrix(m.view()), "1.0000,0.1235\n-2.5000,0.0000\n");
    }
}
