//! Envelope (skyline) Cholesky factorization for the coarse-level direct
//! solve and the SPD pre-check.
//!
//! Adapted from this codebase's banded `SparseCholeskySolver`, generalized to
//! any symmetric sparse matrix: the skyline profile is computed per-row from
//! the distance to the first stored off-diagonal entry, which is exact for
//! arbitrary sparsity (not just banded systems), at the cost of storing zero
//! fill-in within each row's envelope.

use crate::error::{AmgError, AmgResult};
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

/// Factorized `A = L L^T` in skyline storage.
pub struct CholeskySolver {
    size: usize,
    skyline: Vec<Vec<f64>>,
    heights: Vec<usize>,
}

impl CholeskySolver {
    /// Build the (unfactorized) skyline storage from a CSR matrix.
    pub fn new(a: &CsrMatrix<f64>) -> Self {
        let size = a.nrows();
        let mut heights = vec![0usize; size];
        for (row, col, _val) in a.triplet_iter() {
            if col < row {
                let height = row - col;
                if height > heights[row] {
                    heights[row] = height;
                }
            }
        }

        let mut skyline: Vec<Vec<f64>> = Vec::with_capacity(size);
        for &h in &heights {
            skyline.push(vec![0.0; h + 1]);
        }

        for (row, col, &val) in a.triplet_iter() {
            let h = heights[row];
            if col >= row - h && col <= row {
                let idx = col - (row - h);
                skyline[row][idx] += val;
            }
        }

        Self {
            size,
            skyline,
            heights,
        }
    }

    /// Factorize in place. Fails with `NumericalIssue` on a non-positive pivot.
    pub fn factorize(&mut self) -> AmgResult<()> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;

            for j in start_i..i {
                let hj = self.heights[j];
                let start_j = j - hj;
                let start = start_i.max(start_j);

                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.skyline[j][hj];
                if diag_j.abs() < 1e-15 {
                    return Err(AmgError::NumericalIssue(
                        "zero pivot in Cholesky factorization".to_string(),
                    ));
                }

                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            let mut sum = 0.0;
            for j in start_i..i {
                let v = self.get(i, j);
                sum += v * v;
            }

            let diag = self.skyline[i][hi] - sum;
            if diag <= 0.0 {
                return Err(AmgError::NumericalIssue(format!(
                    "matrix not positive definite at row {i}"
                )));
            }
            self.skyline[i][hi] = diag.sqrt();
        }

        Ok(())
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        if col > row {
            return self.get(col, row);
        }
        let h = self.heights[row];
        let start = row - h;
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve `L L^T x = b` using the existing factorization.
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();

        for i in 0..self.size {
            let hi = self.heights[i];
            let start = i - hi;
            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }
            x[i] = (x[i] - sum) / self.get(i, i);
        }

        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);
            let hi = self.heights[i];
            let start = i - hi;
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        x
    }
}

/// One-shot SPD check: factorize and discard, surfacing the first failure.
pub fn check_spd(a: &CsrMatrix<f64>) -> AmgResult<()> {
    CholeskySolver::new(a).factorize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_sparse::CooMatrix;

    fn spd_tridiag(n: usize) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(n, n);
        for i in 0..n {
            coo.push(i, i, 4.0);
            if i + 1 < n {
                coo.push(i, i + 1, -1.0);
                coo.push(i + 1, i, -1.0);
            }
        }
        CsrMatrix::from(&coo)
    }

    #[test]
    fn factorize_and_solve_recovers_known_solution() {
        let a = spd_tridiag(5);
        let mut solver = CholeskySolver::new(&a);
        solver.factorize().unwrap();

        let x_expected = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = crate::matrix::matvec(&a, &x_expected);
        let x = solver.solve(&b);
        for i in 0..5 {
            assert!((x[i] - x_expected[i]).abs() < 1e-8);
        }
    }

    #[test]
    fn rejects_non_spd_matrix() {
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 0, 1.0);
        coo.push(0, 1, 2.0);
        coo.push(1, 0, 2.0);
        coo.push(1, 1, 1.0); // not SPD: leading principal minors fail
        let a = CsrMatrix::from(&coo);
        assert!(check_spd(&a).is_err());
    }
}
