//! Matching-based aggregation for discontinuous Galerkin matrices (§4.6).
//!
//! Builds the tentative prolongator from pairwise/singleton aggregates, then
//! column-normalizes and Jacobi-smooths it into the operator used for the
//! level-0 Galerkin product. Aggregates are grown unsorted during the greedy
//! pass, so membership here is a linear scan rather than the binary search
//! [`IndexSet::contains`] assumes elsewhere in this crate.

use crate::error::{AmgError, AmgResult};
use crate::matrix::coeff;
use crate::sets::IndexSet;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

const JACOBI_WEIGHT: f64 = 2.0 / 3.0;

/// Build the smoothed aggregation prolongator for the finest (DG) level.
pub fn build(a: &CsrMatrix<f64>) -> AmgResult<CsrMatrix<f64>> {
    let aggregates = aggregate(a)?;
    let tentative = tentative_prolongator(a.nrows(), &aggregates);
    let normalized = normalize_columns(tentative, &aggregates);
    Ok(smooth(a, &normalized))
}

/// For each row, the column holding the largest-magnitude off-diagonal entry.
fn max_row_position(a: &CsrMatrix<f64>) -> AmgResult<Vec<usize>> {
    let n = a.nrows();
    let row_offsets = a.row_offsets();
    let col_indices = a.col_indices();
    let values = a.values();
    let mut pos = Vec::with_capacity(n);

    for row in 0..n {
        let start = row_offsets[row];
        let end = row_offsets[row + 1];
        let mut best_col = None;
        let mut best_val = 0.0f64;
        for idx in start..end {
            let col = col_indices[idx];
            if col == row {
                continue;
            }
            let v = values[idx].abs();
            if v > best_val {
                best_val = v;
                best_col = Some(col);
            }
        }
        pos.push(best_col.ok_or(AmgError::IsolatedPoint(row))?);
    }

    Ok(pos)
}

fn is_member(set: &IndexSet, k: usize) -> bool {
    set.as_slice().iter().any(|&v| v == k)
}

fn find_set(b: &[IndexSet], k: usize) -> Option<usize> {
    b.iter().position(|set| is_member(set, k))
}

/// Greedy pairwise matching: rows with a positive max-magnitude connection
/// form singletons, rows with a negative one pair up with their partner.
/// Merged-away slots are recycled (smallest index first) before a fresh slot
/// is opened, matching the reuse policy of the matching pass this was
/// grounded on.
fn aggregate(a: &CsrMatrix<f64>) -> AmgResult<Vec<IndexSet>> {
    let pos = max_row_position(a)?;
    let r = a.nrows();
    let mut b: Vec<IndexSet> = Vec::new();
    let mut delset = IndexSet::new();

    let mut first = IndexSet::new();
    first.push(0);
    first.push(pos[0]);
    b.push(first);

    for i in 1..r {
        let n_idx = find_set(&b, i);
        let m_idx = find_set(&b, pos[i]);

        if coeff(a, i, pos[i]) > 0.0 {
            if n_idx.is_none() {
                if delset.is_empty() {
                    let mut s = IndexSet::new();
                    s.push(i);
                    b.push(s);
                } else {
                    delset.sort();
                    let slot = delset.get(0)?;
                    b[slot].push(i);
                    delset.delete(slot)?;
                }
            }
        } else {
            match (n_idx, m_idx) {
                (None, None) => {
                    if delset.is_empty() {
                        let mut s = IndexSet::new();
                        s.push(i);
                        s.push(pos[i]);
                        b.push(s);
                    } else {
                        delset.sort();
                        let slot = delset.get(0)?;
                        b[slot].push(i);
                        b[slot].push(pos[i]);
                        delset.delete(slot)?;
                    }
                }
                (None, Some(m)) => b[m].push(i),
                (Some(n), None) => b[n].push(pos[i]),
                (Some(n), Some(m)) if n != m => {
                    let lo = n.min(m);
                    let hi = n.max(m);
                    let merged = IndexSet::union(&b[lo], &b[hi]);
                    b[lo] = merged;
                    b[hi] = IndexSet::new();
                    delset.push(hi);
                }
                _ => {}
            }
        }
    }

    for set in b.iter_mut() {
        set.sort();
    }

    // slots left in delset were merged away and never reused; dropping them
    // keeps every aggregate column of the tentative prolongator nonzero.
    Ok(b.into_iter().filter(|set| !set.is_empty()).collect())
}

fn tentative_prolongator(n: usize, aggregates: &[IndexSet]) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(n, aggregates.len());
    for (col, agg) in aggregates.iter().enumerate() {
        for &row in agg.as_slice() {
            coo.push(row, col, 1.0);
        }
    }
    CsrMatrix::from(&coo)
}

/// Columns of the tentative prolongator are disjoint indicator vectors, so
/// the Gram-Schmidt step this was grounded on reduces to dividing each column
/// by its own norm, `sqrt(|aggregate|)`.
fn normalize_columns(p: CsrMatrix<f64>, aggregates: &[IndexSet]) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(p.nrows(), p.ncols());
    for (row, col, &val) in p.triplet_iter() {
        let norm = (aggregates[col].cardinality() as f64).sqrt();
        coo.push(row, col, val / norm);
    }
    CsrMatrix::from(&coo)
}

/// `P = (I - w D^-1 A) P_tilde`, the Jacobi smoothing step.
fn smooth(a: &CsrMatrix<f64>, p_tilde: &CsrMatrix<f64>) -> CsrMatrix<f64> {
    let n = a.nrows();
    let mut inv_diag = DVector::zeros(n);
    for i in 0..n {
        inv_diag[i] = 1.0 / coeff(a, i, i);
    }

    let a_p = crate::matrix::spmm(a, p_tilde);
    let mut coo = CooMatrix::new(p_tilde.nrows(), p_tilde.ncols());
    for (row, col, &val) in p_tilde.triplet_iter() {
        coo.push(row, col, val);
    }
    for (row, col, &val) in a_p.triplet_iter() {
        coo.push(row, col, -JACOBI_WEIGHT * inv_diag[row] * val);
    }
    CsrMatrix::from(&coo)
}
