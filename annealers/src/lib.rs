//! Binary quadratic models and the sampler interfaces implemented by the
//! `classical_solver` and `annealers_dwave` crates.
//!
//! # Example
//! ```
//! use annealers::prelude::*;
//! let model: BinaryQuadraticModel<usize> =
//! 	BinaryQuadraticModel::new(vec![], vec![((0, 1), 1.0)], 0.0, Vartype::Spin).unwrap();
//! assert_eq!(model.num_variables(), 2);
//! ```
pub mod error;
pub mod interaction;
pub mod model;
pub mod repr;
pub mod sampler;
pub mod sampleset;
pub mod variable;
pub mod vartype;

pub mod prelude {
	pub use crate::error::ModelError;
	pub use crate::model::BinaryQuadraticModel;
	pub use crate::sampler::{AsyncSampler, ClassicalSampler, Sampler, Structured};
	pub use crate::sampleset::{Sample, SampleSet};
	pub use crate::vartype::Vartype;
}

const TRUE_VAL: bool = true;
const FALSE_VAL: bool = false;
