//! Run parameters of the demo, read from the command line and the D-Wave
//! config files.
use crate::error::Result;
use crate::graph::Graph;
use annealers_dwave::profile::DWaveConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_SA_READS: usize = 10;
pub const DEFAULT_QPU_READS: usize = 5000;
pub const DEFAULT_SECOND_SOLVER: &str = "Advantage_system1.1";

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphChoice {
	SingleEdge,
	TriangleAndSquare,
	All,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "maxcut")]
#[command(version)]
#[command(about = "Solve MaxCut exactly, by simulated annealing and on a D-Wave QPU")]
pub struct Cli {
	/// Reads of the simulated annealer
	#[arg(long, default_value_t = DEFAULT_SA_READS)]
	pub sa_reads: usize,

	/// Reads of the quantum annealer
	#[arg(long, default_value_t = DEFAULT_QPU_READS)]
	pub qpu_reads: usize,

	/// Seed of the simulated annealer
	#[arg(long)]
	pub seed: Option<u64>,

	/// Do not contact the D-Wave service
	#[arg(long)]
	pub skip_qpu: bool,

	/// SAPI token, overriding dwave.conf and DWAVE_API_TOKEN
	#[arg(long)]
	pub token: Option<String>,

	/// Solver for the first graph (default: the configured or least loaded QPU)
	#[arg(long)]
	pub solver: Option<String>,

	/// Solver for the second graph
	#[arg(long, default_value = DEFAULT_SECOND_SOLVER)]
	pub second_solver: String,

	#[arg(long)]
	pub config_file: Option<PathBuf>,

	#[arg(long)]
	pub profile: Option<String>,

	/// Log filter used when RUST_LOG is not set
	#[arg(long, default_value = "info")]
	pub log_level: String,

	#[arg(long, value_enum, default_value_t = GraphChoice::All)]
	pub graph: GraphChoice,
}

/// One graph of the demo and the QPU solver used for it.
#[derive(Clone, Debug)]
pub struct Case {
	pub name: &'static str,
	pub graph: Graph,
	pub solver: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RunConfig {
	pub sa_reads: usize,
	pub qpu_reads: usize,
	pub seed: Option<u64>,
	pub skip_qpu: bool,
	pub graph: GraphChoice,
	/// Connection settings; `solver` is the solver of the first graph.
	pub dwave: DWaveConfig,
	pub second_solver: Option<String>,
}

impl Default for RunConfig {
	fn default() -> Self {
		Self {
			sa_reads: DEFAULT_SA_READS,
			qpu_reads: DEFAULT_QPU_READS,
			seed: None,
			skip_qpu: false,
			graph: GraphChoice::All,
			dwave: DWaveConfig::default(),
			second_solver: Some(DEFAULT_SECOND_SOLVER.to_owned()),
		}
	}
}

impl RunConfig {
	/// Command line arguments layered over the D-Wave config files. The files
	/// are not read with `--skip-qpu`.
	pub fn from_cli(cli: &Cli) -> Result<Self> {
		let mut dwave = if cli.skip_qpu {
			DWaveConfig::default()
		} else {
			DWaveConfig::load(cli.config_file.as_deref(), cli.profile.as_deref())?
		};
		if let Some(token) = &cli.token {
			dwave.token = Some(token.clone());
		}
		if let Some(solver) = &cli.solver {
			dwave.solver = Some(solver.clone());
		}
		Ok(Self {
			sa_reads: cli.sa_reads,
			qpu_reads: cli.qpu_reads,
			seed: cli.seed,
			skip_qpu: cli.skip_qpu,
			graph: cli.graph,
			dwave,
			second_solver: Some(cli.second_solver.clone()),
		})
	}

	pub fn cases(&self) -> Vec<Case> {
		let mut v = Vec::new();
		if self.graph != GraphChoice::TriangleAndSquare {
			v.push(Case {
				name: "single-edge",
				graph: Graph::single_edge(),
				solver: self.dwave.solver.clone(),
			});
		}
		if self.graph != GraphChoice::SingleEdge {
			v.push(Case {
				name: "triangle-and-square",
				graph: Graph::triangle_and_square(),
				solver: self.second_solver.clone().or_else(|| self.dwave.solver.clone()),
			});
		}
		v
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let cli = Cli::parse_from(vec!["maxcut", "--skip-qpu"]);
		let config = RunConfig::from_cli(&cli).unwrap();
		assert_eq!(config.sa_reads, 10);
		assert_eq!(config.qpu_reads, 5000);
		assert_eq!(config.graph, GraphChoice::All);
		let cases = config.cases();
		assert_eq!(cases.len(), 2);
		assert_eq!(cases[0].solver, None);
		assert_eq!(cases[1].solver.as_deref(), Some("Advantage_system1.1"));
	}

	#[test]
	fn overrides() {
		let cli = Cli::parse_from(vec![
			"maxcut",
			"--skip-qpu",
			"--sa-reads",
			"3",
			"--token",
			"T",
			"--solver",
			"Advantage_system4.1",
			"--graph",
			"triangle-and-square",
		]);
		let config = RunConfig::from_cli(&cli).unwrap();
		assert_eq!(config.sa_reads, 3);
		assert_eq!(config.dwave.token.as_deref(), Some("T"));
		let cases = config.cases();
		assert_eq!(cases.len(), 1);
		assert_eq!(cases[0].name, "triangle-and-square");
	}
}
