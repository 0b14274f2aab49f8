//! AMG solver CLI - loads a Matrix Market matrix/vector pair, builds the
//! hierarchy, runs the configured outer iteration, and reports diagnostics.

use amg_solver::config::CliArgs;
use amg_solver::error::AmgResult;
use amg_solver::{io, solver};
use clap::Parser;
use std::process::ExitCode;

fn run() -> AmgResult<()> {
    let args = CliArgs::parse();
    let params = args.to_solver_params()?;

    let a = io::load_matrix(&args.matrix)?;
    let f = io::load_vector(&args.rhs)?;
    io::check_dimensions(&a, &f)?;

    log::info!(
        "loaded system: n={} nnz={} fem={:?} method={:?}",
        a.nrows(),
        a.nnz(),
        params.fem,
        params.method
    );

    let report = solver::solve(&a, &f, &params)?;

    println!(
        "iterations: {}\nconverged: {}\nrho: {:.6e}\nresidual: {:.6e}",
        report.iterations, report.converged, report.rho, report.residual_norm
    );

    if let Some(output) = &args.output {
        io::save_vector(output, &report.solution)?;
        log::info!("wrote solution to {}", output.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
