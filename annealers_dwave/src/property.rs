//! Solver descriptions returned by `GET /solvers/remote/`.
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverCategory {
	#[serde(rename = "software")]
	Software,
	#[serde(rename = "qpu")]
	Qpu,
	/// quantum-classical hybrid; typically one or more classical algorithms run
	/// on the problem while outsourcing to a quantum processing unit (QPU)
	/// parts of the problem where it benefits most.
	#[serde(rename = "hybrid")]
	Hybrid,
}

impl FromStr for SolverCategory {
	type Err = String;

	/// Accepts the names used by the `client` key of `dwave.conf`.
	fn from_str(s: &str) -> Result<Self, String> {
		match s.to_ascii_lowercase().as_str() {
			"qpu" => Ok(SolverCategory::Qpu),
			"sw" | "software" => Ok(SolverCategory::Software),
			"hybrid" => Ok(SolverCategory::Hybrid),
			o => Err(format!("unknown client type {}", o)),
		}
	}
}

impl fmt::Display for SolverCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			SolverCategory::Software => "software",
			SolverCategory::Qpu => "qpu",
			SolverCategory::Hybrid => "hybrid",
		})
	}
}

#[derive(Serialize, Deserialize, Hash, Clone, Copy, Debug, PartialEq, Eq, Ord, PartialOrd)]
pub enum ProblemType {
	/// (for qpu-like solvers) Ising model problems; use −1/1 -valued
	#[serde(rename = "ising")]
	Ising,
	/// (for qpu-like solvers) Quadratic unconstrained binary optimization
	///   (QUBO) problems; use 0/1- valued variables.
	#[serde(rename = "qubo")]
	Qubo,
	/// (for hybrid solvers) binary quadratic model (BQM) problems
	#[serde(rename = "bqm")]
	Bqm,
	/// Problem types this client cannot submit (dqm, cqm, ...).
	#[serde(other)]
	Other,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TopologyType {
	Chimera,
	Pegasus,
	Zephyr,
	#[serde(other)]
	Other,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SolverTopology {
	#[serde(rename = "type")]
	pub topology: TopologyType,

	/// Shape of the QPU graph, e.g. `[16, 16, 4]` for a C16 Chimera graph or
	/// `[16]` for P16 Pegasus.
	pub shape: Vec<usize>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SolverProperties {
	/// Indicates what problem types are supported for the solver.
	#[serde(default)]
	pub supported_problem_types: BTreeSet<ProblemType>,

	/// List of the parameters supported for the solver and descriptions
	#[serde(default)]
	pub parameters: HashMap<String, Value>,

	/// Type of solver. Old solvers do not report it.
	#[serde(default)]
	pub category: Option<SolverCategory>,

	/// Range of values possible for the number of reads that you can request
	/// for a problem; for example, [1,10000].
	#[serde(default)]
	pub num_reads_range: Option<(usize, usize)>,

	/// Indices of the working qubits in the working graph.
	#[serde(default)]
	pub qubits: Vec<usize>,

	/// Couplers in the working graph, as `[q1, q2]` pairs of working qubits.
	#[serde(default)]
	pub couplers: Vec<(usize, usize)>,

	/// Total number of qubits, both working and nonworking, in the QPU.
	#[serde(default)]
	pub num_qubits: Option<usize>,

	/// Range of values possible for the qubit biases.
	#[serde(default)]
	pub h_range: Option<(f64, f64)>,

	/// Range of values possible for the coupling strengths.
	#[serde(default)]
	pub j_range: Option<(f64, f64)>,

	#[serde(default)]
	pub topology: Option<SolverTopology>,

	/// Name of the chip, e.g. `Advantage_system4.1`.
	#[serde(default)]
	pub chip_id: Option<String>,

	/// Include other properties
	#[serde(flatten)]
	pub other: HashMap<String, Value>,
}

impl SolverProperties {
	/// Reported category, guessed from the presence of a working graph when
	/// the solver is too old to report one.
	pub fn category(&self) -> SolverCategory {
		match self.category {
			Some(c) => c,
			None if !self.qubits.is_empty() => SolverCategory::Qpu,
			None => SolverCategory::Software,
		}
	}

	pub fn supports(&self, problem_type: ProblemType) -> bool {
		self.supported_problem_types.contains(&problem_type)
	}

	pub fn get<S: AsRef<str>>(&self, key: S) -> Option<&Value> {
		self.other.get(key.as_ref())
	}
}

#[derive(Deserialize, Clone, Debug)]
pub struct SolverInfo {
	pub id: String,
	#[serde(default)]
	pub status: String,
	#[serde(default)]
	pub description: String,
	pub properties: SolverProperties,
	#[serde(default)]
	pub avg_load: Option<f64>,
}

impl SolverInfo {
	pub fn is_online(&self) -> bool {
		self.status.is_empty() || self.status.eq_ignore_ascii_case("online")
	}

	/// Chip name, falling back to the solver id.
	pub fn chip_id(&self) -> &str {
		self.properties.chip_id.as_deref().unwrap_or(&self.id)
	}
}
