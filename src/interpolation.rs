//! Classical (Ruge-Stuben) interpolation weights (§4.5).
//!
//! Per-row scratch (`X`, `E`, `L`, `sabs`) is a dense array of size `n` reset
//! through a touch list rather than a hash map, following the Design Notes'
//! guidance for problem sizes below ~10^6 unknowns.

use crate::error::{AmgError, AmgResult};
use crate::matrix::coeff;
use crate::sets::IndexSet;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Dense, touch-list-reset scratch shared across the rows of one interpolation build.
struct RowScratch {
    x: Vec<f64>,
    e: Vec<f64>,
    sabs: Vec<f64>,
    l: Vec<usize>,
    touched: Vec<usize>,
}

impl RowScratch {
    fn new(n: usize) -> Self {
        Self {
            x: vec![0.0; n],
            e: vec![0.0; n],
            sabs: vec![0.0; n],
            l: vec![0; n],
            touched: Vec::new(),
        }
    }

    fn reset(&mut self) {
        for &j in &self.touched {
            self.x[j] = 0.0;
            self.e[j] = 0.0;
            self.sabs[j] = 0.0;
            self.l[j] = 0;
        }
        self.touched.clear();
    }

    fn touch(&mut self, j: usize) {
        self.touched.push(j);
    }
}

/// `element_set`: values `A[c, b]` for `b` in `set` where the coefficient is nonzero.
fn element_set(a: &CsrMatrix<f64>, set: &IndexSet, c: usize) -> Vec<f64> {
    set.as_slice()
        .iter()
        .map(|&b| coeff(a, c, b))
        .filter(|&v| v != 0.0)
        .collect()
}

/// Build the classical interpolation operator `P` (rows = n, cols = |C|).
pub fn build(
    a: &CsrMatrix<f64>,
    c: &IndexSet,
    ci: &[IndexSet],
    ds: &[IndexSet],
    dw: &[IndexSet],
) -> AmgResult<CsrMatrix<f64>> {
    let n = a.nrows();
    let ncols = c.cardinality();
    let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
    let mut scratch = RowScratch::new(n);

    for i in 0..n {
        if c.contains(i) {
            let pos = c.position(i)?;
            triplets.push((i, pos, 1.0));
            continue;
        }

        let cii = &ci[i];
        let dis = &ds[i];
        let diw = &dw[i];
        let mut den = coeff(a, i, i);

        scratch.reset();

        for &n_idx in diw.as_slice() {
            let vals = element_set(a, cii, n_idx);
            let l = vals.len();
            let sumabs: f64 = vals.iter().map(|v| v.abs()).sum();

            scratch.l[n_idx] = l;
            scratch.touch(n_idx);

            let a_in = coeff(a, i, n_idx);
            if l == 0 {
                // sabs is necessarily 0 too: no Cii-connection at all for this
                // neighbor, so X_n is undefined and the contribution is
                // dropped from the numerator below, but the denominator
                // still picks up the plain |A[i,n]| term.
                den -= a_in.abs();
                continue;
            }

            let sum: f64 = vals.iter().sum();
            scratch.x[n_idx] = -sum / sumabs;
            scratch.sabs[n_idx] = sumabs;

            if scratch.x[n_idx] >= 0.5 && a_in < 0.0 {
                den -= a_in;
            }
        }

        for &m_idx in dis.as_slice() {
            let vals = element_set(a, cii, m_idx);
            let l = vals.len();
            let sum: f64 = vals.iter().sum();
            let sumabs: f64 = vals.iter().map(|v| v.abs()).sum();

            scratch.l[m_idx] = l;
            scratch.touch(m_idx);
            if sumabs == 0.0 {
                continue;
            }
            scratch.x[m_idx] = -sum / sumabs;
            scratch.sabs[m_idx] = sumabs;
            scratch.e[m_idx] = coeff(a, m_idx, i).abs() * l as f64 / sumabs;

            let a_im = coeff(a, i, m_idx);
            let x_m = scratch.x[m_idx];
            let e_m = scratch.e[m_idx];
            if e_m < 0.75 && x_m >= 0.5 && a_im < 0.0 {
                den -= a_im;
            } else if e_m > 2.0 && x_m >= 0.5 && a_im < 0.0 {
                den += 0.5 * a_im;
            }
        }

        if den == 0.0 {
            return Err(AmgError::NumericalIssue(format!(
                "zero interpolation denominator at row {i}"
            )));
        }

        for &cj in cii.as_slice() {
            let mut num = coeff(a, i, cj);

            for &n_idx in diw.as_slice() {
                if scratch.sabs[n_idx] == 0.0 {
                    continue;
                }
                let g = coeff(a, n_idx, cj).abs() / scratch.sabs[n_idx];
                let a_in = coeff(a, i, n_idx);
                if scratch.x[n_idx] >= 0.5 && a_in < 0.0 {
                    num += 2.0 * g * a_in;
                } else {
                    num += g * a_in;
                }
            }

            for &m_idx in dis.as_slice() {
                if scratch.sabs[m_idx] == 0.0 {
                    continue;
                }
                let g = coeff(a, m_idx, cj).abs() / scratch.sabs[m_idx];
                let a_im = coeff(a, i, m_idx);
                let x_m = scratch.x[m_idx];
                let e_m = scratch.e[m_idx];
                if e_m < 0.75 && x_m >= 0.5 && a_im < 0.0 {
                    num += 2.0 * g * a_im;
                } else if e_m > 2.0 && x_m >= 0.5 && a_im < 0.0 {
                    num += 0.5 * g * a_im;
                } else {
                    num += g * a_im;
                }
            }

            let w_ic = -num / den;
            let pos = c.position(cj)?;
            triplets.push((i, pos, w_ic));
        }
    }

    let mut coo = CooMatrix::new(n, ncols);
    for (row, col, val) in triplets {
        coo.push(row, col, val);
    }
    Ok(CsrMatrix::from(&coo))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strength::analyze;
    use crate::splitting::split;
    use nalgebra_sparse::CooMatrix;

    fn poisson_1d(n: usize) -> CsrMatrix<f64> {
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
    fn coarse_points_are_injected() {
        let a = poisson_1d(9);
        let triples = analyze(&a, 0.25);
        let splitting = split(9, &triples.s, &triples.st);
        let p = build(&a, &splitting.c, &splitting.ci, &splitting.ds, &triples.dw).unwrap();

        for &ci_point in splitting.c.as_slice() {
            let pos = splitting.c.position(ci_point).unwrap();
            for q in 0..splitting.c.cardinality() {
                let expected = if q == pos { 1.0 } else { 0.0 };
                assert_eq!(coeff(&p, ci_point, q), expected);
            }
        }
    }

    #[test]
    fn prolongator_dimensions_match_split() {
        let a = poisson_1d(15);
        let triples = analyze(&a, 0.25);
        let splitting = split(15, &triples.s, &triples.st);
        let p = build(&a, &splitting.c, &splitting.ci, &splitting.ds, &triples.dw).unwrap();
        assert_eq!(p.nrows(), 15);
        assert_eq!(p.ncols(), splitting.c.cardinality());
    }
}
