//! Sampler module contains the abstraction of every solving procedure.
//!
//! ```text
//!               Sampler            AsyncSampler
//!                  |                    |
//!          ClassicalSampler      (+ Structured)
//! ```
//!
//! - A [`Sampler`] solves a model on the local machine and blocks until it is
//!   done.
//! - A [`ClassicalSampler`] is a [`Sampler`] driven by a caller supplied
//!   random number generator.
//! - An [`AsyncSampler`] hands the model to something outside the process,
//!   typically a remote service, and awaits the answer.
//! - A [`Structured`] sampler only accepts models laid out on its own graph
//!   of nodes and edges (e.g. the working qubits and couplers of a QPU).
//!
//! Solver options (number of reads, schedules, ...) are plain fields of the
//! sampler value.
extern crate async_trait;
use crate::model::BinaryQuadraticModel;
use crate::sampleset::SampleSet;
use crate::variable::{Label, Real};
use async_trait::async_trait;
use rand::prelude::*;
use std::error::Error;

pub trait Sampler<V: Label, R: Real> {
	type ErrorType: Error + Send + Sync + 'static;

	fn sample(&self, model: &BinaryQuadraticModel<V, R>) -> Result<SampleSet<V, R>, Self::ErrorType>;
}

pub trait ClassicalSampler<V: Label, R: Real>: Sampler<V, R> {
	fn sample_with_rng<T: Rng>(
		&self,
		model: &BinaryQuadraticModel<V, R>,
		r: &mut T,
	) -> Result<SampleSet<V, R>, Self::ErrorType>;
}

#[async_trait]
pub trait AsyncSampler<V: Label, R: Real>: Send + Sync {
	type ErrorType: Error + Send + Sync + 'static;

	async fn sample_async(
		&self,
		model: &BinaryQuadraticModel<V, R>,
	) -> Result<SampleSet<V, R>, Self::ErrorType>;
}

pub trait Structured {
	/// Usable nodes, ascending.
	fn nodelist(&self) -> Vec<usize>;
	/// Usable edges `(u, v)` with `u < v`.
	fn edgelist(&self) -> Vec<(usize, usize)>;

	/// Whether `model` only uses nodes and edges of this sampler.
	fn accepts<R: Real>(&self, model: &BinaryQuadraticModel<usize, R>) -> bool {
		let nodes = self.nodelist();
		let edges = self.edgelist();
		model.variables().all(|v| nodes.binary_search(v).is_ok())
			&& model.iter_quadratic().all(|(k, _)| {
				edges.contains(&(*k.first(), *k.second()))
			})
	}
}
