//! The representation of the *beta schedule* of an annealer.
//! Generally, a beta schedule is an array of inverse temperatures, but an
//! efficient schedule can be generated from a *beta range* and a *beta
//! count*, so either can be given in place of the schedule itself.
use crate::SolverError;
use annealers::model::IndexedModel;
use annealers::variable::Real;

#[derive(Clone, Debug, PartialEq)]
pub enum BetaType<R: Real> {
	/// Specify beta schedule by *beta count*. The range is derived from the
	/// model.
	Count(usize),
	/// Specify beta schedule by *beta count* and *beta range* `(min, max)`.
	CountRange(usize, R, R),
	/// Specify *beta schedule* manually. The values should grow with the
	/// index.
	Schedule(Vec<R>),
}

/// How intermediate betas are placed between the ends of the range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
	Geometric,
	Linear,
}

impl Default for Interpolation {
	fn default() -> Self {
		Interpolation::Geometric
	}
}

/// Hot and cold ends of the schedule for an Ising model.
///
/// The hot beta accepts the largest possible single-flip energy rise with
/// probability 1/2, the cold one accepts the smallest with probability 1/100.
pub fn beta_range<V, R: Real>(model: &IndexedModel<V, R>) -> (f64, f64) {
	let max_delta = (0..model.size())
		.map(|i| {
			2.0 * (model.linear[i].abs().as_f64()
				+ model.neighbors[i]
					.iter()
					.map(|(_, w)| w.abs().as_f64())
					.sum::<f64>())
		})
		.fold(0.0, f64::max);
	let min_delta = model
		.linear
		.iter()
		.chain(model.neighbors.iter().flat_map(|n| n.iter().map(|(_, w)| w)))
		.map(|b| 2.0 * b.abs().as_f64())
		.filter(|d| *d > 0.0)
		.fold(f64::INFINITY, f64::min);
	if max_delta > 0.0 && min_delta.is_finite() {
		(f64::ln(2.0) / max_delta, f64::ln(100.0) / min_delta)
	} else {
		(0.1, 1.0)
	}
}

/// Generate the *beta schedule* for `model` from the given parameters.
pub fn generate_schedule<V, R: Real>(
	beta_type: &BetaType<R>,
	interpolation: Interpolation,
	model: &IndexedModel<V, R>,
) -> Result<Vec<f64>, SolverError> {
	match beta_type {
		BetaType::Schedule(v) => {
			let v = v.iter().map(|b| b.as_f64()).collect::<Vec<_>>();
			if v.iter().any(|b| !(b.is_finite() && *b >= 0.0)) {
				return Err(SolverError::InvalidParameter(
					"beta schedule must be finite and non-negative".to_owned(),
				));
			}
			Ok(v)
		}
		BetaType::Count(count) => {
			let (min, max) = beta_range(model);
			generate_beta_schedule(min, max, *count, interpolation)
		}
		BetaType::CountRange(count, min, max) => {
			generate_beta_schedule(min.as_f64(), max.as_f64(), *count, interpolation)
		}
	}
}

fn generate_beta_schedule(
	beta_min: f64,
	beta_max: f64,
	count: usize,
	interpolation: Interpolation,
) -> Result<Vec<f64>, SolverError> {
	if !(beta_min.is_finite() && beta_max.is_finite() && beta_min > 0.0 && beta_max >= beta_min) {
		return Err(SolverError::InvalidParameter(format!(
			"beta range ({}, {}) must be positive and ascending",
			beta_min, beta_max
		)));
	}
	Ok(match count {
		0 => Vec::new(),
		1 => vec![beta_max],
		_ => {
			let steps = count as f64 - 1.0;
			match interpolation {
				Interpolation::Geometric => {
					let r = f64::ln(beta_max / beta_min) / steps;
					(0..count)
						.map(|index| beta_min * f64::exp(index as f64 * r))
						.collect()
				}
				Interpolation::Linear => {
					let d = (beta_max - beta_min) / steps;
					(0..count).map(|index| beta_min + index as f64 * d).collect()
				}
			}
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use annealers::model::BinaryQuadraticModel;
	use annealers::vartype::Vartype;

	#[test]
	fn range_follows_biases() {
		let model: BinaryQuadraticModel<usize> =
			BinaryQuadraticModel::new(vec![], vec![((0, 1), 1.0), ((1, 2), 0.5)], 0.0, Vartype::Spin)
				.unwrap();
		let (hot, cold) = beta_range(&model.indexed());
		assert!((hot - f64::ln(2.0) / 3.0).abs() < 1e-12);
		assert!((cold - f64::ln(100.0) / 1.0).abs() < 1e-12);
	}

	#[test]
	fn model_without_biases_uses_fallback() {
		let model: BinaryQuadraticModel<usize> =
			BinaryQuadraticModel::new(vec![(0, 0.0)], vec![], 0.0, Vartype::Spin).unwrap();
		assert_eq!(beta_range(&model.indexed()), (0.1, 1.0));
	}

	#[test]
	fn geometric_and_linear_schedules() {
		let g = generate_beta_schedule(0.1, 10.0, 3, Interpolation::Geometric).unwrap();
		assert!((g[1] - 1.0).abs() < 1e-12);
		assert!((g[2] - 10.0).abs() < 1e-9);
		let l = generate_beta_schedule(1.0, 3.0, 3, Interpolation::Linear).unwrap();
		assert_eq!(l, vec![1.0, 2.0, 3.0]);
		assert_eq!(generate_beta_schedule(1.0, 3.0, 1, Interpolation::Linear).unwrap(), vec![3.0]);
		assert!(generate_beta_schedule(0.0, 3.0, 4, Interpolation::Linear).is_err());
	}
}
