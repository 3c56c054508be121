//! Samplers that run on the local machine.
//!
//! - [`exact::ExactSolver`] enumerates every state of the model.
//! - [`sa::SimulatedAnnealingSampler`] runs Metropolis sweeps over a schedule
//!   of inverse temperatures.
//!
//! # Example:
//! ```
//! use annealers::prelude::*;
//! use classical_solver::sa::SimulatedAnnealingSampler;
//! let model: BinaryQuadraticModel<usize> =
//! 	BinaryQuadraticModel::new(vec![(0, 1.0)], vec![((0, 1), -2.0)], 0.0, Vartype::Spin).unwrap();
//! let mut sampler = SimulatedAnnealingSampler::new();
//! sampler.seed = Some(1);
//! let response = sampler.sample(&model).unwrap();
//! assert_eq!(response.first().unwrap().energy, -3.0);
//! ```

extern crate annealers;
extern crate rand;

pub mod algo;
pub mod beta;
pub mod exact;
pub mod sa;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
	#[error("model has {found} variables, more than the {max} this solver enumerates")]
	TooManyVariables { found: usize, max: usize },
	#[error("invalid parameter: {0}")]
	InvalidParameter(String),
}
