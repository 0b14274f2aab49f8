//! Outer iterative drivers (§4.9): stationary AMG and AMG-preconditioned CG,
//! grounded on this codebase's `method` class.

use crate::cholesky;
use crate::config::{Method, SolverParams};
use crate::cycle::{CycleEngine, CycleKind};
use crate::error::AmgResult;
use crate::hierarchy;
use crate::matrix::matvec;
use log::{debug, info};
use nalgebra::DVector;
use nalgebra_sparse::CsrMatrix;

/// Full solve entry point: pre-checks `a0` for symmetric positive
/// definiteness, builds the hierarchy, and runs the configured outer
/// iteration. This is the path every caller (the CLI binary, library users)
/// should go through rather than calling `hierarchy::build` directly, since
/// it's the only place the A0 SPD pre-check required of this solver is
/// enforced.
pub fn solve(a0: &CsrMatrix<f64>, f: &DVector<f64>, params: &SolverParams) -> AmgResult<SolveReport> {
    cholesky::check_spd(a0)?;

    let hierarchy = hierarchy::build(a0, params.fem.into(), params.nlevel, params.theta)?;
    let cycle_kind = if params.mu == 2 { CycleKind::W } else { CycleKind::V };
    let engine = CycleEngine::new(&hierarchy, cycle_kind, params.nu1, params.nu2)?;

    Ok(match params.method {
        Method::Amg => amg_cycle(&engine, a0, f, params.tol, params.maxiter),
        Method::Pcg => pcg(&engine, a0, f, params.tol, params.maxiter),
    })
}

/// Outcome of a stationary-AMG or PCG solve.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub solution: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
    /// Asymptotic convergence factor `rho = (||r_n|| / ||r_0||)^(1/n)`.
    pub rho: f64,
    pub residual_norm: f64,
}

/// Stationary AMG iteration: repeated cycle applications until the relative
/// residual drops below `tol` or `maxiter` is reached.
pub fn amg_cycle(
    engine: &CycleEngine,
    a0: &CsrMatrix<f64>,
    f: &DVector<f64>,
    tol: f64,
    maxiter: usize,
) -> SolveReport {
    let mut u = DVector::zeros(f.len());
    let mut r = f - matvec(a0, &u);
    let r0 = r.norm();
    let mut fnorm = f.norm();
    if fnorm == 0.0 {
        fnorm = 1.0;
    }

    let mut err = r0 / fnorm;
    let mut iter = 0;
    while err > tol && iter < maxiter {
        iter += 1;
        let residual = f - matvec(a0, &u);
        let correction = engine.apply(&residual);
        u += correction;
        r = f - matvec(a0, &u);
        err = r.norm() / fnorm;
    }

    let rn = r.norm();
    let rho = if iter > 0 && r0 > 0.0 {
        (rn / r0).powf(1.0 / iter as f64)
    } else {
        0.0
    };

    let converged = err <= tol;
    info!("stationary AMG: iter={iter} converged={converged} rho={rho:.4e} residual={rn:.4e}");

    SolveReport {
        solution: u,
        iterations: iter,
        converged,
        rho,
        residual_norm: rn,
    }
}

/// AMG-preconditioned conjugate gradient (PCG), with the AMG cycle applied
/// to the residual equation as the preconditioner each iteration.
pub fn pcg(
    engine: &CycleEngine,
    a0: &CsrMatrix<f64>,
    f: &DVector<f64>,
    tol: f64,
    maxiter: usize,
) -> SolveReport {
    let n = f.len();
    let mut solution = DVector::zeros(n);
    let mut r = f - matvec(a0, &solution);
    let r0 = r.norm();
    let mut fnorm = f.norm();
    if fnorm == 0.0 {
        fnorm = 1.0;
    }

    let mut z = engine.apply(&r);
    let mut err = z.norm() / fnorm;

    let mut p = DVector::zeros(n);
    let mut csi;
    let mut csiold = 0.0;
    let mut iter = 0;

    while err > tol && iter < maxiter {
        iter += 1;
        csi = r.dot(&z);

        if iter > 1 {
            let beta = csi / csiold;
            p = &z + beta * &p;
        } else {
            p = z.clone();
        }

        let q = matvec(a0, &p);
        let alpha = csi / p.dot(&q);
        solution += alpha * &p;
        r -= alpha * &q;

        z = engine.apply(&r);
        err = z.norm() / fnorm;
        csiold = csi;

        debug!("pcg iter={iter} err={err:.4e}");
    }

    let rn = r.norm();
    let rho = if iter > 0 && r0 > 0.0 {
        (rn / r0).powf(1.0 / iter as f64)
    } else {
        0.0
    };

    let converged = err <= tol;
    info!("AMG-PCG: iter={iter} converged={converged} rho={rho:.4e} residual={rn:.4e}");

    SolveReport {
        solution,
        iterations: iter,
        converged,
        rho,
        residual_norm: rn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleKind;
    use crate::hierarchy::{self, Discretization};
    use nalgebra_sparse::{CooMatrix, CsrMatrix};

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
    fn stationary_amg_converges_on_poisson_1d() {
        let a = poisson_1d(63);
        let h = hierarchy::build(&a, Discretization::Continuous, 6, 0.25).unwrap();
        let engine = CycleEngine::new(&h, CycleKind::V, 2, 2).unwrap();

        let f = DVector::from_element(63, 1.0);
        let report = amg_cycle(&engine, &a, &f, 1e-8, 100);
        assert!(report.converged, "stationary AMG failed to converge: {report:?}");
        assert!(report.rho < 1.0);
    }

    #[test]
    fn pcg_converges_faster_than_stationary_amg() {
        let a = poisson_1d(63);
        let h = hierarchy::build(&a, Discretization::Continuous, 6, 0.25).unwrap();
        let engine = CycleEngine::new(&h, CycleKind::V, 1, 1).unwrap();

        let f = DVector::from_element(63, 1.0);
        let amg_report = amg_cycle(&engine, &a, &f, 1e-8, 200);
        let pcg_report = pcg(&engine, &a, &f, 1e-8, 200);

        assert!(pcg_report.converged);
        assert!(pcg_report.iterations <= amg_report.iterations);
    }
}
