use annealers::model::IndexedModel;
use annealers::repr::BinaryRepr;
use annealers::variable::Real;
use annealers::vartype::Vartype;
use rand::prelude::*;

/// Spin value of bit `i`.
#[inline]
fn spin(state: &BinaryRepr, i: usize) -> f64 {
	if unsafe { state.get_unchecked(i) } {
		1.0
	} else {
		-1.0
	}
}

/// Metropolis sweeps over `beta_schedule`, `sweeps_per_beta` sweeps per
/// beta, on a spin-domain model.
///
/// `field[i] = h_i + sum_j J_ij s_j` is kept up to date so that flipping `i`
/// costs `-2 s_i field[i]`.
pub fn simulated_annealing<T: Rng, V, R: Real>(
	random: &mut T,
	state: &mut BinaryRepr,
	beta_schedule: &[f64],
	sweeps_per_beta: usize,
	model: &IndexedModel<V, R>,
) {
	assert_eq!(state.len(), model.size());
	debug_assert_eq!(model.vartype, Vartype::Spin);
	let mut field = model
		.local_fields(state)
		.into_iter()
		.map(|f| f.as_f64())
		.collect::<Vec<_>>();
	let neighbors = model
		.neighbors
		.iter()
		.map(|n| n.iter().map(|(j, w)| (*j, w.as_f64())).collect::<Vec<_>>())
		.collect::<Vec<_>>();
	for beta in beta_schedule.iter() {
		// exp(-44.36) is below the resolution of gen_range
		let threshold = 44.36142 / beta;
		for _ in 0..sweeps_per_beta {
			for i in 0..state.len() {
				let s = spin(state, i);
				let delta = -2.0 * s * field[i];
				if delta > threshold {
					continue;
				}
				if delta <= 0.0 || f64::exp(-delta * beta) > random.gen_range(0.0, 1.0) {
					unsafe {
						state.flip_unchecked(i);
					}
					// s_i went from s to -s
					for (j, w) in neighbors[i].iter() {
						field[*j] -= 2.0 * s * w;
					}
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use annealers::model::BinaryQuadraticModel;
	use rand::rngs::SmallRng;

	#[test]
	fn cold_sweeps_reach_ferromagnetic_ground_state() {
		let model: BinaryQuadraticModel<usize> = BinaryQuadraticModel::new(
			vec![(0, -1.0)],
			vec![((0, 1), -1.0), ((1, 2), -1.0), ((2, 3), -1.0)],
			0.0,
			Vartype::Spin,
		)
		.unwrap();
		let model = model.indexed();
		let mut r = SmallRng::seed_from_u64(3);
		let mut state = BinaryRepr::new_random(4, &mut r);
		simulated_annealing(&mut r, &mut state, &[0.1, 1.0, 10.0, 100.0], 20, &model);
		assert_eq!(state.to_vec(), vec![true; 4]);
	}
}
