//! amg-solver - Algebraic multigrid for sparse SPD systems
//!
//! A from-scratch Rust implementation of Ruge-Stuben classical algebraic
//! multigrid with a discontinuous-Galerkin aggregation pre-step, covering:
//! - strong-connection analysis and two-pass C/F splitting
//! - classical interpolation weights
//! - matching-based aggregation for DG finest levels
//! - hierarchy construction via the Galerkin triple product
//! - a recursive mu-cycle (V- or W-cycle) with Gauss-Seidel smoothing
//! - stationary AMG and AMG-preconditioned CG outer iterations
//!
//! ## Example
//! ```rust
//! use amg_solver::prelude::*;
//! use nalgebra::DVector;
//! use nalgebra_sparse::CooMatrix;
//!
//! // 1-D Poisson stiffness matrix
//! let n = 31;
//! let mut coo = CooMatrix::new(n, n);
//! for i in 0..n {
//!     coo.push(i, i, 2.0);
//!     if i + 1 < n {
//!         coo.push(i, i + 1, -1.0);
//!         coo.push(i + 1, i, -1.0);
//!     }
//! }
//! let a = nalgebra_sparse::CsrMatrix::from(&coo);
//! let f = DVector::from_element(n, 1.0);
//!
//! let params = SolverParams::default();
//! let hierarchy = hierarchy::build(&a, params.fem.into(), params.nlevel, params.theta).unwrap();
//! let engine = CycleEngine::new(&hierarchy, CycleKind::V, params.nu1, params.nu2).unwrap();
//! let report = solver::amg_cycle(&engine, &a, &f, params.tol, params.maxiter);
//! assert!(report.converged);
//! ```

pub mod aggregation;
pub mod cholesky;
pub mod config;
pub mod cycle;
pub mod error;
pub mod hierarchy;
pub mod interpolation;
pub mod io;
pub mod matrix;
pub mod sets;
pub mod solver;
pub mod splitting;
pub mod strength;

pub mod prelude {
    pub use crate::config::{CliArgs, Fem, Method, SolverParams};
    pub use crate::cycle::{CycleEngine, CycleKind};
    pub use crate::error::{AmgError, AmgResult};
    pub use crate::hierarchy::{self, Discretization, Hierarchy};
    pub use crate::sets::IndexSet;
    pub use crate::solver::{self, SolveReport};
}
