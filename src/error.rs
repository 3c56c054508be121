use annealers::error::ModelError;
use annealers_dwave::ApiError;
use classical_solver::SolverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("edge references undeclared vertex {0}")]
	UndeclaredVertex(String),
	#[error(transparent)]
	Model(#[from] ModelError),
	#[error(transparent)]
	Solver(#[from] SolverError),
	#[error(transparent)]
	Api(#[from] ApiError),
	#[error("cannot write output: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
