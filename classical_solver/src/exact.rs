use crate::SolverError;
use annealers::model::{BinaryQuadraticModel, IndexedModel};
use annealers::repr::BinaryRepr;
use annealers::sampler::Sampler;
use annealers::sampleset::{Sample, SampleSet};
use annealers::variable::{Label, Real};
use annealers::vartype::Vartype;
use tracing::debug;

/// Upper bound of [`ExactSolver::max_variables`].
pub const MAX_VARIABLES: usize = 30;

/// Brute-force solver returning every state of the model, sorted by
/// energy.
#[derive(Clone, Debug)]
pub struct ExactSolver {
	/// Models with more variables are refused.
	pub max_variables: usize,
}

impl ExactSolver {
	pub fn new() -> Self {
		Self { max_variables: 24 }
	}
}

impl Default for ExactSolver {
	fn default() -> Self {
		Self::new()
	}
}

/// Visits the `2^n` states in Gray code order; consecutive states differ in
/// one bit, so each energy is the previous one plus a single flip cost.
fn enumerate<V, R: Real>(model: &IndexedModel<V, R>) -> Vec<(BinaryRepr, R)> {
	let n = model.size();
	let total = 1u64 << n;
	let two = R::from_i32(2);
	let mut state = BinaryRepr::new(n);
	let mut energy = model.energy(&state);
	let mut field = model.local_fields(&state);
	let mut ret = Vec::with_capacity(total as usize);
	ret.push((state.clone(), energy));
	for k in 1..total {
		let i = k.trailing_zeros() as usize;
		let old = state.get(i);
		let delta = match model.vartype {
			// s -> -s
			Vartype::Spin => {
				if old {
					-two
				} else {
					two
				}
			}
			// x -> 1 - x
			Vartype::Binary => {
				if old {
					-R::one()
				} else {
					R::one()
				}
			}
		};
		energy += delta * field[i];
		state.flip(i);
		for (j, w) in model.neighbors[i].iter() {
			field[*j] += *w * delta;
		}
		ret.push((state.clone(), energy));
	}
	ret
}

impl<V: Label, R: Real> Sampler<V, R> for ExactSolver {
	type ErrorType = SolverError;

	fn sample(&self, model: &BinaryQuadraticModel<V, R>) -> Result<SampleSet<V, R>, SolverError> {
		let max = self.max_variables.min(MAX_VARIABLES);
		if model.num_variables() > max {
			return Err(SolverError::TooManyVariables {
				found: model.num_variables(),
				max,
			});
		}
		let indexed = model.indexed();
		debug!(variables = indexed.size(), "enumerating all states");
		let mut ret = SampleSet::new(indexed.labels.clone(), indexed.vartype);
		for (state, energy) in enumerate(&indexed) {
			ret.push(Sample::new(state, energy));
		}
		ret.sort_by_energy();
		Ok(ret)
	}
}
