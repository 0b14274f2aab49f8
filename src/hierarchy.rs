//! Hierarchy construction (§4.7): drives the coarsening components level by
//! level and assembles the `A_0..A_L` / `P_0..P_{L-1}` stacks a cycle walks.

use crate::aggregation;
use crate::error::AmgResult;
use crate::interpolation;
use crate::matrix::triple_product;
use crate::splitting;
use crate::strength;
use log::debug;
use nalgebra_sparse::CsrMatrix;

/// Whether the finest-level matrix comes from a continuous or discontinuous
/// Galerkin discretization: only the finest level's setup differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discretization {
    Continuous,
    Discontinuous,
}

/// The full multigrid hierarchy: `levels + 1` operators, `levels` prolongators.
pub struct Hierarchy {
    pub operators: Vec<CsrMatrix<f64>>,
    pub prolongators: Vec<CsrMatrix<f64>>,
}

impl Hierarchy {
    /// Number of coarser levels below the finest one.
    pub fn levels(&self) -> usize {
        self.prolongators.len()
    }
}

/// Build a hierarchy with up to `max_levels` coarse levels (fewer if
/// coarsening stalls: a level whose matrix can no longer be coarsened
/// profitably stops the build early rather than producing a degenerate
/// operator).
pub fn build(
    a0: &CsrMatrix<f64>,
    discretization: Discretization,
    max_levels: usize,
    theta: f64,
) -> AmgResult<Hierarchy> {
    let mut operators = vec![a0.clone()];
    let mut prolongators = Vec::with_capacity(max_levels);

    for level in 0..max_levels {
        let a = &operators[level];
        if a.nrows() <= 1 {
            debug!("hierarchy build: stopping at level {level}, matrix too small to coarsen");
            break;
        }

        let p = if level == 0 && discretization == Discretization::Discontinuous {
            aggregation::build(a)?
        } else {
            let triples = strength::analyze(a, theta);
            let split = splitting::split(a.nrows(), &triples.s, &triples.st);
            interpolation::build(a, &split.c, &split.ci, &split.ds, &triples.dw)?
        };

        if p.ncols() == 0 || p.ncols() >= a.nrows() {
            debug!(
                "hierarchy build: stopping at level {level}, coarsening did not reduce the problem size"
            );
            break;
        }

        let coarse = triple_product(&p, a);
        prolongators.push(p);
        operators.push(coarse);
    }

    debug!(
        "hierarchy build: {} levels, sizes {:?}",
        prolongators.len(),
        operators.iter().map(|a| a.nrows()).collect::<Vec<_>>()
    );

    Ok(Hierarchy {
        operators,
        prolongators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn builds_a_strictly_shrinking_cg_hierarchy() {
        let a = poisson_1d(33);
        let h = build(&a, Discretization::Continuous, 4, 0.25).unwrap();
        assert!(h.levels() >= 1);
        for w in h.operators.windows(2) {
            assert!(w[1].nrows() < w[0].nrows());
        }
        for (level, p) in h.prolongators.iter().enumerate() {
            assert_eq!(p.nrows(), h.operators[level].nrows());
            assert_eq!(p.ncols(), h.operators[level + 1].nrows());
        }
    }

    #[test]
    fn respects_max_levels_cap() {
        let a = poisson_1d(65);
        let h = build(&a, Discretization::Continuous, 2, 0.25).unwrap();
        assert!(h.levels() <= 2);
    }
}
