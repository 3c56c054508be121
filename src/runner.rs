use crate::config::{Case, RunConfig};
use crate::error::Result;
use crate::problem::MaxCut;
use annealers::model::BinaryQuadraticModel;
use annealers::sampler::{AsyncSampler, Sampler};
use annealers::sampleset::SampleSet;
use annealers_dwave::composite::EmbeddingComposite;
use annealers_dwave::ApiError;
use annealers_dwave::solver::DWaveSampler;
use classical_solver::exact::ExactSolver;
use classical_solver::sa::SimulatedAnnealingSampler;
use std::io::Write;
use tracing::info;

/// Solves every graph of a [`RunConfig`] three ways and prints the results.
pub struct Demo {
	config: RunConfig,
}

impl Demo {
	pub fn new(config: RunConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &RunConfig {
		&self.config
	}

	pub async fn run<W: Write>(&self, out: &mut W) -> Result<()> {
		for case in self.config.cases() {
			self.run_case(&case, out).await?;
		}
		Ok(())
	}

	async fn run_case<W: Write>(&self, case: &Case, out: &mut W) -> Result<()> {
		info!(graph = case.name, "solving");
		let problem = MaxCut::new(case.graph.clone());
		let model = problem.to_model()?;
		writeln!(out, "The model that we are going to solve is")?;
		writeln!(out, "{}", model)?;
		writeln!(out)?;

		let exact = ExactSolver::new().sample(&model)?;
		report(&problem, &exact, "exact");
		writeln!(out, "The exact solution is")?;
		writeln!(out, "{}", exact)?;
		writeln!(out)?;

		let seed = self.config.seed.unwrap_or_else(rand::random);
		info!(seed, "simulated annealing");
		let sa = SimulatedAnnealingSampler::new()
			.with_num_reads(self.config.sa_reads)
			.with_seed(seed)
			.sample(&model)?;
		report(&problem, &sa, "simulated annealing");
		writeln!(out, "The solution with simulated annealing is")?;
		writeln!(out, "{}", sa)?;
		writeln!(out)?;

		if let Some((chip_id, qpu)) = self.sample_qpu(&model, case.solver.as_deref()).await? {
			report(&problem, &qpu, "quantum annealer");
			writeln!(out, "The solution obtained by D-Wave's quantum annealer {} is", chip_id)?;
			writeln!(out, "{}", qpu)?;
			writeln!(out)?;
		}
		Ok(())
	}

	async fn sample_qpu(
		&self,
		model: &BinaryQuadraticModel<usize>,
		solver: Option<&str>,
	) -> Result<Option<(String, SampleSet<usize>)>> {
		if self.config.skip_qpu {
			info!("skipping the quantum annealer");
			return Ok(None);
		}
		if self.config.dwave.token.is_none() {
			return Err(ApiError::Auth(
				"no D-Wave API token configured, set one or pass --skip-qpu".to_owned(),
			)
			.into());
		}
		let mut dwave = self.config.dwave.clone();
		dwave.solver = solver.map(str::to_owned);
		let sampler = DWaveSampler::connect(&dwave)
			.await?
			.with_num_reads(self.config.qpu_reads);
		let sampler = EmbeddingComposite::new(sampler);
		let chip_id = sampler.child().chip_id().to_owned();
		info!(%chip_id, reads = self.config.qpu_reads, "sampling on the quantum annealer");
		let set = sampler.sample_async(model).await?;
		Ok(Some((chip_id, set)))
	}
}

fn report(problem: &MaxCut, set: &SampleSet<usize>, sampler: &str) {
	if let Some(best) = set.first() {
		info!(
			sampler,
			energy = best.energy,
			cut = problem.cut_from_energy(best.energy),
			"best sample"
		);
	}
}
