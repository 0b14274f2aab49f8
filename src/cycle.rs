//! The recursive mu-cycle (§4.8): Gauss-Seidel pre/post smoothing around a
//! direct coarse solve, grounded on this codebase's `cycle` class.

use crate::cholesky::CholeskySolver;
use crate::error::AmgResult;
use crate::hierarchy::Hierarchy;
use crate::matrix::{lower_triangular_solve, matvec, transpose};
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

/// V-cycle (`mu=1`) or W-cycle (`mu=2`); anything above 2 is accepted but
/// unusual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    V,
    W,
}

impl CycleKind {
    fn mu(self) -> usize {
        match self {
            CycleKind::V => 1,
            CycleKind::W => 2,
        }
    }
}

/// One mu-cycle application of the hierarchy as a linear operator, factoring
/// the coarsest matrix once up front so repeated `apply` calls (e.g. inside
/// PCG) don't refactorize it every time.
pub struct CycleEngine<'a> {
    hierarchy: &'a Hierarchy,
    kind: CycleKind,
    pre_smooth: usize,
    post_smooth: usize,
    coarse_solver: CholeskySolver,
}

impl<'a> CycleEngine<'a> {
    pub fn new(
        hierarchy: &'a Hierarchy,
        kind: CycleKind,
        pre_smooth: usize,
        post_smooth: usize,
    ) -> AmgResult<Self> {
        let coarsest = hierarchy.operators.last().expect("hierarchy has level 0");
        let mut coarse_solver = CholeskySolver::new(coarsest);
        coarse_solver.factorize()?;
        Ok(Self {
            hierarchy,
            kind,
            pre_smooth,
            post_smooth,
            coarse_solver,
        })
    }

    /// Apply the cycle to right-hand side `f`, returning an approximate
    /// solution of `A_0 u = f` starting from `u = 0`.
    pub fn apply(&self, f: &DVector<f64>) -> DVector<f64> {
        let mut u: Vec<DVector<f64>> = self
            .hierarchy
            .operators
            .iter()
            .map(|a| DVector::zeros(a.nrows()))
            .collect();
        let mut rhs: Vec<DVector<f64>> = self
            .hierarchy
            .operators
            .iter()
            .map(|a| DVector::zeros(a.nrows()))
            .collect();
        rhs[0] = f.clone();
        self.recurse(0, &mut u, &mut rhs);
        u.swap_remove(0)
    }

    fn recurse(&self, level: usize, u: &mut [DVector<f64>], f: &mut [DVector<f64>]) {
        let a = &self.hierarchy.operators[level];
        gauss_seidel(a, &mut u[level], &f[level], self.pre_smooth);

        let coarsest = self.hierarchy.operators.len() - 1;
        if level == coarsest {
            u[level] = self.coarse_solver.solve(&f[level]);
            return;
        }

        let p = &self.hierarchy.prolongators[level];
        let residual = &f[level] - matvec(a, &u[level]);
        f[level + 1] = matvec(&transpose(p), &residual);
        u[level + 1] = DVector::zeros(f[level + 1].len());

        for _ in 0..self.kind.mu() {
            self.recurse(level + 1, u, f);
            // avoids solving the coarsest level twice when mu=2 (W-cycle)
            if level + 1 == coarsest {
                break;
            }
        }

        u[level] += matvec(p, &u[level + 1]);
        gauss_seidel(a, &mut u[level], &f[level], self.post_smooth);
    }
}

/// Forward-Gauss-Seidel smoothing sweep: `u += L^-1(f - A u)`, `maxit` times.
fn gauss_seidel(a: &CsrMatrix<f64>, u: &mut DVector<f64>, f: &DVector<f64>, maxit: usize) {
    for _ in 0..maxit {
        let r = f - matvec(a, u);
        let z = lower_triangular_solve(a, &r);
        *u += &z;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{self, Discretization};
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
    fn v_cycle_reduces_residual_on_poisson_1d() {
        let a = poisson_1d(31);
        let h = hierarchy::build(&a, Discretization::Continuous, 5, 0.25).unwrap();
        let engine = CycleEngine::new(&h, CycleKind::V, 2, 2).unwrap();

        let f = DVector::from_element(31, 1.0);
        let u0 = DVector::zeros(31);
        let r0 = (&f - matvec(&a, &u0)).norm();

        let u1 = engine.apply(&f);
        let r1 = (&f - matvec(&a, &u1)).norm();

        assert!(r1 < 0.5 * r0, "expected residual reduction, got r0={r0} r1={r1}");
    }

    #[test]
    fn w_cycle_also_converges() {
        let a = poisson_1d(31);
        let h = hierarchy::build(&a, Discretization::Continuous, 5, 0.25).unwrap();
        let engine = CycleEngine::new(&h, CycleKind::W, 1, 1).unwrap();

        let f = DVector::from_element(31, 1.0);
        let mut u = DVector::zeros(31);
        for _ in 0..10 {
            let correction = engine.apply(&(&f - matvec(&a, &u)));
            u += correction;
        }
        let residual = (&f - matvec(&a, &u)).norm();
        assert!(residual < 1e-6, "residual did not converge: {residual}");
    }
}
