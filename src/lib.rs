//! MaxCut formulated as an Ising model and solved three ways: by exact
//! enumeration, by simulated annealing and on a D-Wave quantum annealer.
//!
//! # Example
//! ```
//! # extern crate maxcut;
//! # extern crate annealers;
//! # extern crate classical_solver;
//! use annealers::prelude::*;
//! use classical_solver::exact::ExactSolver;
//! use maxcut::{Graph, MaxCut};
//! let problem = MaxCut::new(Graph::triangle_and_square());
//! let model = problem.to_model().unwrap();
//! let response = ExactSolver::new().sample(&model).unwrap();
//! let best = response.first().unwrap();
//! // displays -4.0, 5.0
//! println!("{}, {}", best.energy, problem.cut_from_energy(best.energy));
//! # assert_eq!(best.energy, -4.0);
//! # assert_eq!(problem.cut_from_energy(best.energy), 5.0);
//! # assert_eq!(response.lowest().len(), 4);
//! ```
extern crate annealers;
extern crate annealers_dwave;
extern crate classical_solver;
extern crate rand;

pub mod config;
pub mod error;
pub mod graph;
pub mod problem;
pub mod runner;

pub use config::{Cli, RunConfig};
pub use error::{Error, Result};
pub use graph::Graph;
pub use problem::MaxCut;
pub use runner::Demo;
