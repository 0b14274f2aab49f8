//! Sparse matrix kernels shared by the coarsening, interpolation, and cycle
//! components: matvec, transpose, sparse-sparse multiply, lower-triangular
//! solve, and coefficient lookup.
//!
//! Everything here treats `CsrMatrix<f64>` as the canonical storage format,
//! the same choice this codebase makes for stiffness matrices.

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use std::collections::BTreeMap;

/// `y = A * x`
pub fn matvec(a: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = a.nrows();
    let mut y = DVector::zeros(n);

    let row_offsets = a.row_offsets();
    let col_indices = a.col_indices();
    let values = a.values();

    for row in 0..n {
        let start = row_offsets[row];
        let end = row_offsets[row + 1];
        let mut sum = 0.0;
        for idx in start..end {
            sum += values[idx] * x[col_indices[idx]];
        }
        y[row] = sum;
    }

    y
}

/// Random coefficient read `A[i, j]`, 0.0 if not stored. Assumes sorted
/// column indices within each row, which `CsrMatrix` guarantees.
pub fn coeff(a: &CsrMatrix<f64>, row: usize, col: usize) -> f64 {
    let row_offsets = a.row_offsets();
    let col_indices = a.col_indices();
    let values = a.values();

    let start = row_offsets[row];
    let end = row_offsets[row + 1];
    col_indices[start..end]
        .binary_search(&col)
        .map(|local| values[start + local])
        .unwrap_or(0.0)
}

/// Matrix transpose via a full re-triplet pass.
pub fn transpose(a: &CsrMatrix<f64>) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(a.ncols(), a.nrows());
    for (row, col, &val) in a.triplet_iter() {
        coo.push(col, row, val);
    }
    CsrMatrix::from(&coo)
}

/// Sparse-sparse matrix multiply `C = A * B` (Gustavson's row-wise algorithm).
pub fn spmm(a: &CsrMatrix<f64>, b: &CsrMatrix<f64>) -> CsrMatrix<f64> {
    assert_eq!(
        a.ncols(),
        b.nrows(),
        "inner dimensions must agree for sparse multiply"
    );
    let m = a.nrows();
    let n = b.ncols();

    let a_offsets = a.row_offsets();
    let a_cols = a.col_indices();
    let a_vals = a.values();
    let b_offsets = b.row_offsets();
    let b_cols = b.col_indices();
    let b_vals = b.values();

    let mut coo = CooMatrix::new(m, n);
    let mut row_acc: BTreeMap<usize, f64> = BTreeMap::new();

    for i in 0..m {
        row_acc.clear();
        for idx in a_offsets[i]..a_offsets[i + 1] {
            let k = a_cols[idx];
            let aik = a_vals[idx];
            for jdx in b_offsets[k]..b_offsets[k + 1] {
                let j = b_cols[jdx];
                let bkj = b_vals[jdx];
                *row_acc.entry(j).or_insert(0.0) += aik * bkj;
            }
        }
        for (&j, &v) in row_acc.iter() {
            if v != 0.0 {
                coo.push(i, j, v);
            }
        }
    }

    CsrMatrix::from(&coo)
}

/// Galerkin triple product `P^T A P`.
pub fn triple_product(p: &CsrMatrix<f64>, a: &CsrMatrix<f64>) -> CsrMatrix<f64> {
    let pt = transpose(p);
    spmm(&spmm(&pt, a), p)
}

/// Solve `L z = r` by forward substitution, where `L` is the lower triangular
/// part of `a` (including the diagonal). Used once per Gauss-Seidel sweep.
pub fn lower_triangular_solve(a: &CsrMatrix<f64>, r: &DVector<f64>) -> DVector<f64> {
    let n = a.nrows();
    let row_offsets = a.row_offsets();
    let col_indices = a.col_indices();
    let values = a.values();

    let mut z = DVector::zeros(n);
    for row in 0..n {
        let start = row_offsets[row];
        let end = row_offsets[row + 1];
        let mut sum = r[row];
        let mut diag = 1.0;
        for idx in start..end {
            let col = col_indices[idx];
            if col < row {
                sum -= values[idx] * z[col];
            } else if col == row {
                diag = values[idx];
            }
        }
        z[row] = sum / diag;
    }
    z
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_sparse::CooMatrix;

    fn tridiag(n: usize, diag: f64, off: f64) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(n, n);
        for i in 0..n {
            coo.push(i, i, diag);
            if i + 1 < n {
                coo.push(i, i + 1, off);
                coo.push(i + 1, i, off);
            }
        }
        CsrMatrix::from(&coo)
    }

    #[test]
    fn matvec_matches_dense_reference() {
        let a = tridiag(4, 2.0, -1.0);
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let y = matvec(&a, &x);
        assert_eq!(y.as_slice(), &[0.0, 1.0, 2.0, 5.0]);
    }

    #[test]
    fn coeff_reads_stored_and_zero_entries() {
        let a = tridiag(3, 2.0, -1.0);
        assert_eq!(coeff(&a, 0, 0), 2.0);
        assert_eq!(coeff(&a, 0, 1), -1.0);
        assert_eq!(coeff(&a, 0, 2), 0.0);
    }

    #[test]
    fn triple_product_identity_prolongator_is_noop() {
        let a = tridiag(3, 2.0, -1.0);
        let mut coo = CooMatrix::new(3, 3);
        for i in 0..3 {
            coo.push(i, i, 1.0);
        }
        let id = CsrMatrix::from(&coo);
        let result = triple_product(&id, &a);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(coeff(&result, i, j), coeff(&a, i, j));
            }
        }
    }

    #[test]
    fn lower_triangular_solve_matches_forward_substitution() {
        let a = tridiag(3, 4.0, -1.0);
        let r = DVector::from_vec(vec![4.0, 3.0, 2.0]);
        let z = lower_triangular_solve(&a, &r);
        assert!((z[0] - 1.0).abs() < 1e-12);
        assert!((z[1] - (3.0 - (-1.0) * z[0]) / 4.0).abs() < 1e-12);
    }
}
