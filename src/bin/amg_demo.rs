//! AMG Solver Example - 1-D Poisson problem
//!
//! Builds the finite-difference stiffness matrix for `-u'' = f` on a unit
//! interval with homogeneous Dirichlet boundary conditions and solves it
//! with a V-cycle AMG-preconditioned CG.

use amg_solver::prelude::*;
use nalgebra::DVector;
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

fn main() {
    println!("=== AMG Solver Example: 1-D Poisson ===\n");

    let n = 127;
    let a = poisson_1d(n);
    let f = DVector::from_element(n, 1.0);

    let params = SolverParams::default()
        .with_levels(5)
        .with_method(Method::Pcg);

    let hierarchy =
        hierarchy::build(&a, params.fem.into(), params.nlevel, params.theta).expect("hierarchy build failed");
    println!("built hierarchy with {} coarse levels", hierarchy.levels());

    let engine =
        CycleEngine::new(&hierarchy, CycleKind::V, params.nu1, params.nu2).expect("coarse factorization failed");

    let report = solver::pcg(&engine, &a, &f, params.tol, params.maxiter);

    println!("iterations: {}", report.iterations);
    println!("converged: {}", report.converged);
    println!("convergence factor rho: {:.6e}", report.rho);
    println!("final residual norm: {:.6e}", report.residual_norm);
}
