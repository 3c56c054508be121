use crate::algo::simulated_annealing;
use crate::beta::{generate_schedule, BetaType, Interpolation};
use crate::SolverError;
use annealers::model::{BinaryQuadraticModel, IndexedModel};
use annealers::repr::BinaryRepr;
use annealers::sampler::{ClassicalSampler, Sampler};
use annealers::sampleset::SampleSet;
use annealers::variable::{Label, Real};
use annealers::vartype::Vartype;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

/// Simulated annealing with single-spin Metropolis updates.
///
/// Every read starts from a uniformly random state and walks the whole beta
/// schedule. With [`Sampler::sample`] the reads run on the rayon thread
/// pool.
#[derive(Clone, Debug)]
pub struct SimulatedAnnealingSampler<R: Real = f64> {
	pub num_reads: usize,
	pub sweeps_per_beta: usize,
	pub beta: BetaType<R>,
	pub interpolation: Interpolation,
	/// Read `k` draws from a generator seeded with `seed + k`. Without a seed
	/// the generators are seeded from the OS.
	pub seed: Option<u64>,
}

impl<R: Real> SimulatedAnnealingSampler<R> {
	pub fn new() -> Self {
		Self {
			num_reads: 10,
			sweeps_per_beta: 10,
			beta: BetaType::Count(100),
			interpolation: Interpolation::default(),
			seed: None,
		}
	}

	pub fn with_num_reads(mut self, num_reads: usize) -> Self {
		self.num_reads = num_reads;
		self
	}

	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Spin form of `model` and its beta schedule.
	fn prepare<V: Label>(
		&self,
		model: &BinaryQuadraticModel<V, R>,
	) -> Result<(IndexedModel<V, R>, Vec<f64>), SolverError> {
		if self.num_reads == 0 {
			return Err(SolverError::InvalidParameter(
				"num_reads must be positive".to_owned(),
			));
		}
		if self.sweeps_per_beta == 0 {
			return Err(SolverError::InvalidParameter(
				"sweeps_per_beta must be positive".to_owned(),
			));
		}
		let spin = model.change_vartype(Vartype::Spin).indexed();
		let schedule = generate_schedule(&self.beta, self.interpolation, &spin)?;
		debug!(
			variables = spin.size(),
			reads = self.num_reads,
			betas = schedule.len(),
			"annealing"
		);
		Ok((spin, schedule))
	}

	fn read<T: Rng, V>(&self, r: &mut T, spin: &IndexedModel<V, R>, schedule: &[f64]) -> BinaryRepr {
		let mut state = BinaryRepr::new_random(spin.size(), r);
		simulated_annealing(r, &mut state, schedule, self.sweeps_per_beta, spin);
		state
	}
}

impl<R: Real> Default for SimulatedAnnealingSampler<R> {
	fn default() -> Self {
		Self::new()
	}
}

// A bit set to true means +1 in the spin form and 1 in the binary form, so
// the states found on the spin model index the input model as is.
impl<V: Label, R: Real> Sampler<V, R> for SimulatedAnnealingSampler<R> {
	type ErrorType = SolverError;

	fn sample(&self, model: &BinaryQuadraticModel<V, R>) -> Result<SampleSet<V, R>, SolverError> {
		let (spin, schedule) = self.prepare(model)?;
		let states = (0..self.num_reads)
			.into_par_iter()
			.map(|k| {
				let mut r = match self.seed {
					Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(k as u64)),
					None => StdRng::from_entropy(),
				};
				self.read(&mut r, &spin, &schedule)
			})
			.collect::<Vec<_>>();
		Ok(SampleSet::from_indexed(&model.indexed(), states))
	}
}

impl<V: Label, R: Real> ClassicalSampler<V, R> for SimulatedAnnealingSampler<R> {
	fn sample_with_rng<T: Rng>(
		&self,
		model: &BinaryQuadraticModel<V, R>,
		r: &mut T,
	) -> Result<SampleSet<V, R>, SolverError> {
		let (spin, schedule) = self.prepare(model)?;
		let states = (0..self.num_reads)
			.map(|_| self.read(r, &spin, &schedule))
			.collect::<Vec<_>>();
		Ok(SampleSet::from_indexed(&model.indexed(), states))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_reads_is_an_error() {
		let model: BinaryQuadraticModel<usize> =
			BinaryQuadraticModel::new(vec![], vec![((0, 1), 1.0)], 0.0, Vartype::Spin).unwrap();
		let sampler = SimulatedAnnealingSampler::new().with_num_reads(0);
		assert!(matches!(
			sampler.sample(&model),
			Err(SolverError::InvalidParameter(_))
		));
	}

	#[test]
	fn seeded_runs_repeat() {
		let model: BinaryQuadraticModel<usize> = BinaryQuadraticModel::new(
			vec![(0, 0.3)],
			vec![((0, 1), 1.0), ((1, 2), 1.0), ((0, 2), 1.0)],
			0.0,
			Vartype::Spin,
		)
		.unwrap();
		let sampler = SimulatedAnnealingSampler::new().with_seed(42);
		let a = sampler.sample(&model).unwrap();
		let b = sampler.sample(&model).unwrap();
		assert_eq!(a.len(), 10);
		assert_eq!(
			a.iter().map(|s| s.state.clone()).collect::<Vec<_>>(),
			b.iter().map(|s| s.state.clone()).collect::<Vec<_>>()
		);
	}

	#[test]
	fn binary_models_keep_their_vartype() {
		let model: BinaryQuadraticModel<usize> =
			BinaryQuadraticModel::from_qubo(vec![((0, 0), -1.0), ((1, 1), -1.0), ((0, 1), 3.0)], 0.0)
				.unwrap();
		let mut r = rand::rngs::SmallRng::seed_from_u64(5);
		let set = SimulatedAnnealingSampler::new().sample_with_rng(&model, &mut r).unwrap();
		assert_eq!(set.vartype(), Vartype::Binary);
		assert_eq!(set.first().unwrap().energy, -1.0);
	}
}
