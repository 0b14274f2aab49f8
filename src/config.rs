//! Run configuration (§4.10): validated, serializable solver parameters plus
//! the CLI surface for `amg-solve`, in the style of this codebase's
//! `AnalysisOptions`.

use crate::error::{AmgError, AmgResult};
use crate::hierarchy::Discretization;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Finite-element discretization the finest-level matrix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fem {
    /// Conforming Galerkin.
    Cg,
    /// Discontinuous Galerkin.
    Dg,
}

impl Default for Fem {
    fn default() -> Self {
        Self::Cg
    }
}

impl From<Fem> for Discretization {
    fn from(fem: Fem) -> Self {
        match fem {
            Fem::Cg => Discretization::Continuous,
            Fem::Dg => Discretization::Discontinuous,
        }
    }
}

/// Outer iteration to run once the hierarchy is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Stationary AMG iteration.
    Amg,
    /// AMG-preconditioned conjugate gradient.
    Pcg,
}

impl Default for Method {
    fn default() -> Self {
        Self::Amg
    }
}

/// Validated solver run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Strong-connection threshold, `0 < theta <= 1`.
    pub theta: f64,
    /// Number of coarser levels to attempt below the finest one.
    pub nlevel: usize,
    /// Pre-smoothing Gauss-Seidel sweeps.
    pub nu1: usize,
    /// Post-smoothing Gauss-Seidel sweeps.
    pub nu2: usize,
    /// Cycle type: 1 for V-cycle, 2 for W-cycle.
    pub mu: usize,
    /// Relative residual tolerance.
    pub tol: f64,
    /// Maximum outer iterations.
    pub maxiter: usize,
    /// Discretization of the finest-level matrix.
    pub fem: Fem,
    /// Outer iteration to run.
    pub method: Method,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            theta: 0.25,
            nlevel: 1,
            nu1: 1,
            nu2: 1,
            mu: 1,
            tol: 1e-8,
            maxiter: 150,
            fem: Fem::Cg,
            method: Method::Amg,
        }
    }
}

impl SolverParams {
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_levels(mut self, nlevel: usize) -> Self {
        self.nlevel = nlevel;
        self
    }

    pub fn with_smoothing(mut self, nu1: usize, nu2: usize) -> Self {
        self.nu1 = nu1;
        self.nu2 = nu2;
        self
    }

    pub fn with_cycle(mut self, mu: usize) -> Self {
        self.mu = mu;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_max_iterations(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    pub fn with_fem(mut self, fem: Fem) -> Self {
        self.fem = fem;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Check the parameter ranges this solver assumes, returning
    /// [`AmgError::InvalidArgument`] on the first violation.
    pub fn validate(&self) -> AmgResult<()> {
        if !(self.theta > 0.0 && self.theta <= 1.0) {
            return Err(AmgError::InvalidArgument(format!(
                "theta must be in (0, 1], got {}",
                self.theta
            )));
        }
        if self.nlevel == 0 {
            return Err(AmgError::InvalidArgument(
                "nlevel must be at least 1".to_string(),
            ));
        }
        if self.mu != 1 && self.mu != 2 {
            return Err(AmgError::InvalidArgument(format!(
                "mu must be 1 (V-cycle) or 2 (W-cycle), got {}",
                self.mu
            )));
        }
        if !(self.tol > 0.0) {
            return Err(AmgError::InvalidArgument(format!(
                "tol must be positive, got {}",
                self.tol
            )));
        }
        if self.maxiter == 0 {
            return Err(AmgError::InvalidArgument(
                "maxiter must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command-line arguments for the `amg-solve` binary.
#[derive(Debug, Parser)]
#[command(name = "amg-solve", about = "Algebraic multigrid solver for sparse SPD systems")]
pub struct CliArgs {
    /// Matrix Market file for the finest-level matrix.
    #[arg(long)]
    pub matrix: PathBuf,

    /// Matrix Market file for the right-hand side vector.
    #[arg(long)]
    pub rhs: PathBuf,

    /// Optional path to write the solution vector.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Strong-connection threshold.
    #[arg(long, default_value_t = 0.25)]
    pub theta: f64,

    /// Number of coarser levels to attempt.
    #[arg(long, default_value_t = 1)]
    pub nlevel: usize,

    /// Pre-smoothing sweeps.
    #[arg(long, default_value_t = 1)]
    pub nu1: usize,

    /// Post-smoothing sweeps.
    #[arg(long, default_value_t = 1)]
    pub nu2: usize,

    /// 1 for V-cycle, 2 for W-cycle.
    #[arg(long, default_value_t = 1)]
    pub mu: usize,

    /// Relative residual tolerance.
    #[arg(long, default_value_t = 1e-8)]
    pub tol: f64,

    /// Maximum outer iterations.
    #[arg(long, default_value_t = 150)]
    pub maxiter: usize,

    /// Finest-level discretization: "cg" or "dg".
    #[arg(long, default_value = "cg")]
    pub fem: String,

    /// Outer iteration: "amg" or "pcg".
    #[arg(long, default_value = "amg")]
    pub method: String,
}

impl CliArgs {
    pub fn to_solver_params(&self) -> AmgResult<SolverParams> {
        let fem = match self.fem.to_lowercase().as_str() {
            "cg" => Fem::Cg,
            "dg" => Fem::Dg,
            other => {
                return Err(AmgError::InvalidArgument(format!(
                    "unknown fem kind '{other}', expected 'cg' or 'dg'"
                )))
            }
        };
        let method = match self.method.to_lowercase().as_str() {
            "amg" => Method::Amg,
            "pcg" => Method::Pcg,
            other => {
                return Err(AmgError::InvalidArgument(format!(
                    "unknown method '{other}', expected 'amg' or 'pcg'"
                )))
            }
        };

        let params = SolverParams::default()
            .with_theta(self.theta)
            .with_levels(self.nlevel)
            .with_smoothing(self.nu1, self.nu2)
            .with_cycle(self.mu)
            .with_tolerance(self.tol)
            .with_max_iterations(self.maxiter)
            .with_fem(fem)
            .with_method(method);
        params.validate()?;
        Ok(params)
    }
}
