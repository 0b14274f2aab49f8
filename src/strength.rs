//! Strong-connection analysis (§4.2): classifies every off-diagonal entry
//! of a level matrix into strong-dependence, strong-influence, or weak.

use crate::sets::IndexSet;
use log::debug;
use nalgebra_sparse::CsrMatrix;

/// Per-row strength triples, indexed by row: `s` (strong dependence), `st`
/// (strong influence: `st[i]` holds columns `j` for which row `i`'s entry
/// meets *column* `j`'s threshold, not neighbors that influence `i`), and
/// `dw` (weak).
pub struct StrengthTriples {
    pub s: Vec<IndexSet>,
    pub st: Vec<IndexSet>,
    pub dw: Vec<IndexSet>,
}

/// Classify every off-diagonal entry of `a` at threshold `theta`.
///
/// `theta` must satisfy `0 < theta <= 1`; callers validate this once at the
/// parameter level (see [`crate::config::SolverParams::validate`]) rather
/// than on every call here.
pub fn analyze(a: &CsrMatrix<f64>, theta: f64) -> StrengthTriples {
    let n = a.nrows();
    let (max_row, max_col) = row_col_abs_max(a);

    let mut s = vec![IndexSet::new(); n];
    let mut st = vec![IndexSet::new(); n];
    let mut dw = vec![IndexSet::new(); n];

    for (row, col, &val) in a.triplet_iter() {
        if row == col {
            continue;
        }
        let abs_val = val.abs();
        if abs_val >= theta * max_row[row] {
            s[row].push(col);
        } else {
            dw[row].push(col);
        }
        if abs_val >= theta * max_col[col] {
            st[row].push(col);
        }
    }

    for row in 0..n {
        s[row].sort();
        st[row].sort();
        dw[row].sort();
    }

    debug!(
        "strength analysis: n={n} theta={theta} avg |S|={:.2}",
        s.iter().map(|set| set.cardinality()).sum::<usize>() as f64 / n.max(1) as f64
    );

    StrengthTriples { s, st, dw }
}

/// `max_row[i] = max_{j != i} |A[i,j]|`, `max_col[j] = max_{i != j} |A[i,j]|`.
fn row_col_abs_max(a: &CsrMatrix<f64>) -> (Vec<f64>, Vec<f64>) {
    let mut max_row = vec![0.0; a.nrows()];
    let mut max_col = vec![0.0; a.ncols()];
    for (row, col, &val) in a.triplet_iter() {
        if row == col {
            continue;
        }
        let abs_val = val.abs();
        if abs_val > max_row[row] {
            max_row[row] = abs_val;
        }
        if abs_val > max_col[col] {
            max_col[col] = abs_val;
        }
    }
    (max_row, max_col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_sparse::CooMatrix;

    fn tridiag(n: usize) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(n, n);
        for i in 0..n {
            coo.push(i, i, 2.0);
            if i + 1 < n {
                coo.push(i, i + 1, -1.0);
                coo.push(i + 1, i, -1.0);
            }
        }
        CsrMatrix::from(&coo)
    }

    #[test]
    fn all_off_diagonals_are_strong_for_a_tridiagonal_matrix() {
        let a = tridiag(5);
        let triples = analyze(&a, 0.25);
        // interior rows have exactly two off-diagonal entries, both at the
        // row's max magnitude, so both are strong.
        assert_eq!(triples.s[2].cardinality(), 2);
        assert_eq!(triples.dw[2].cardinality(), 0);
    }

    #[test]
    fn zero_off_diagonal_row_yields_empty_sets() {
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 0, 1.0);
        coo.push(1, 1, 1.0);
        let a = CsrMatrix::from(&coo);
        let triples = analyze(&a, 0.25);
        assert!(triples.s[0].is_empty());
        assert!(triples.dw[0].is_empty());
        assert!(triples.st[0].is_empty());
    }
}
