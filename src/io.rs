//! Matrix Market I/O (§4.11): the "external collaborator" from the
//! component table given a concrete, minimal body. Matrices go through
//! `nalgebra_sparse`'s own Matrix Market support; dense vectors use the
//! array-format variant of the same file format, which the sparse crate
//! doesn't cover, by hand.

use crate::error::{AmgError, AmgResult};
use nalgebra::DVector;
use nalgebra_sparse::io::{load_coo_from_matrix_market_file, save_to_matrix_market_file};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Load a sparse matrix in Matrix Market coordinate format, canonicalized
/// into CSR (duplicate entries summed, columns sorted per row).
pub fn load_matrix(path: impl AsRef<Path>) -> AmgResult<CsrMatrix<f64>> {
    let coo: CooMatrix<f64> = load_coo_from_matrix_market_file(path.as_ref())
        .map_err(|e| AmgError::MatrixMarket(e.to_string()))?;
    Ok(CsrMatrix::from(&coo))
}

/// Save a sparse matrix in Matrix Market coordinate format.
pub fn save_matrix(path: impl AsRef<Path>, a: &CsrMatrix<f64>) -> AmgResult<()> {
    let mut coo = CooMatrix::new(a.nrows(), a.ncols());
    for (row, col, &val) in a.triplet_iter() {
        coo.push(row, col, val);
    }
    save_to_matrix_market_file(&coo, path.as_ref()).map_err(|e| AmgError::MatrixMarket(e.to_string()))
}

/// Load a dense vector in Matrix Market array format (`%%MatrixMarket matrix
/// array real general`, one value per line after the size header).
pub fn load_vector(path: impl AsRef<Path>) -> AmgResult<DVector<f64>> {
    let contents = fs::read_to_string(path.as_ref())?;
    let mut values = Vec::new();
    let mut dims: Option<(usize, usize)> = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        if dims.is_none() {
            let mut parts = line.split_whitespace();
            let rows: usize = parts
                .next()
                .ok_or_else(|| AmgError::MatrixMarket("missing size header".to_string()))?
                .parse()
                .map_err(|_| AmgError::MatrixMarket("invalid row count".to_string()))?;
            let cols: usize = parts
                .next()
                .ok_or_else(|| AmgError::MatrixMarket("missing size header".to_string()))?
                .parse()
                .map_err(|_| AmgError::MatrixMarket("invalid column count".to_string()))?;
            if cols != 1 {
                return Err(AmgError::MatrixMarket(
                    "expected a single-column array for a vector".to_string(),
                ));
            }
            dims = Some((rows, cols));
            continue;
        }
        let v: f64 = line
            .parse()
            .map_err(|_| AmgError::MatrixMarket(format!("invalid value '{line}'")))?;
        values.push(v);
    }

    let (rows, _) = dims.ok_or_else(|| AmgError::MatrixMarket("missing size header".to_string()))?;
    if values.len() != rows {
        return Err(AmgError::MatrixMarket(format!(
            "expected {rows} values, found {}",
            values.len()
        )));
    }

    Ok(DVector::from_vec(values))
}

/// Save a dense vector in Matrix Market array format.
pub fn save_vector(path: impl AsRef<Path>, v: &DVector<f64>) -> AmgResult<()> {
    let mut file = fs::File::create(path.as_ref())?;
    writeln!(file, "%%MatrixMarket matrix array real general")?;
    writeln!(file, "{} 1", v.len())?;
    for i in 0..v.len() {
        writeln!(file, "{:.17e}", v[i])?;
    }
    Ok(())
}

/// Check that a loaded matrix/vector pair have matching dimensions before
/// handing them to the solver.
pub fn check_dimensions(a: &CsrMatrix<f64>, f: &DVector<f64>) -> AmgResult<()> {
    if a.nrows() != f.len() {
        return Err(AmgError::InvalidArgument(format!(
            "matrix has {} rows but right-hand side has {} entries",
            a.nrows(),
            f.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_sparse::CooMatrix;
    use std::env::temp_dir;

    fn unique_path(name: &str) -> std::path::PathBuf {
        temp_dir().join(format!("amg-solver-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn vector_round_trips_through_matrix_market_array_format() {
        let path = unique_path("vector");
        let v = DVector::from_vec(vec![1.0, 2.5, -3.25]);
        save_vector(&path, &v).unwrap();
        let back = load_vector(&path).unwrap();
        assert_eq!(back.as_slice(), v.as_slice());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn matrix_round_trips_through_matrix_market_coordinate_format() {
        let path = unique_path("matrix");
        let mut coo = CooMatrix::new(3, 3);
        coo.push(0, 0, 2.0);
        coo.push(1, 1, 2.0);
        coo.push(2, 2, 2.0);
        coo.push(0, 1, -1.0);
        coo.push(1, 0, -1.0);
        let a = CsrMatrix::from(&coo);
        save_matrix(&path, &a).unwrap();
        let back = load_matrix(&path).unwrap();
        for r in 0..3 {
            for c in 0..3 {
                assert_eq!(
                    crate::matrix::coeff(&a, r, c),
                    crate::matrix::coeff(&back, r, c)
                );
            }
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 0, 1.0);
        coo.push(1, 1, 1.0);
        let a = CsrMatrix::from(&coo);
        let f = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(matches!(check_dimensions(&a, &f), Err(AmgError::InvalidArgument(_))));
    }
}
