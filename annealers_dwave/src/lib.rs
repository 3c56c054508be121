//! Client of D-Wave's Solver API (SAPI).
//!
//! [`solver::DWaveSampler`] submits Ising and QUBO problems to a remote
//! solver and reads the answers back as [`annealers::sampleset::SampleSet`]s.
//! The QPU only accepts problems laid out on its working graph, so arbitrary
//! models go through [`composite::EmbeddingComposite`] (or
//! [`composite::FixedEmbeddingComposite`]) which maps every variable on a
//! chain of qubits.
//!
//! Connection settings are read from `dwave.conf` profiles and `DWAVE_*`
//! environment variables, see [`profile::DWaveConfig`].
extern crate base64;
extern crate ini;
extern crate reqwest;
extern crate serde;
extern crate serde_json;
extern crate tokio;
#[macro_use]
extern crate serde_derive;

pub mod composite;
pub mod decoder;
pub mod embedding;
pub mod encoder;
pub mod profile;
pub mod property;
pub mod session;
pub mod solver;

use annealers::error::ModelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("authentication failed: {0}")]
	Auth(String),
	#[error("cannot load config: {0}")]
	LoadConfig(String),
	#[error("cannot parse config file: {0}")]
	IniParse(#[from] ini::Error),
	#[error("connection error: {0}")]
	Connection(#[from] reqwest::Error),
	#[error("SAPI error: {0}")]
	Api(String),
	#[error("problem rejected: {0}")]
	Problem(String),
	#[error("cannot decode answer: {0}")]
	Decode(String),
	#[error("bad base64 payload: {0}")]
	Base64(#[from] base64::DecodeError),
	#[error("embedding failed: {0}")]
	Embedding(String),
	#[error("solver not found: {0}")]
	NotFound(String),
	#[error("problem {0} was cancelled")]
	Cancelled(String),
	#[error("problem {0} did not finish in time")]
	Timeout(String),
	#[error(transparent)]
	Model(#[from] ModelError),
}

pub mod prelude {
	pub use crate::composite::{EmbeddingComposite, FixedEmbeddingComposite};
	pub use crate::embedding::{find_embedding, Embedding, TargetGraph};
	pub use crate::profile::DWaveConfig;
	pub use crate::property::{SolverCategory, SolverInfo, SolverProperties};
	pub use crate::session::DWaveSession;
	pub use crate::solver::DWaveSampler;
	pub use crate::ApiError;
}
