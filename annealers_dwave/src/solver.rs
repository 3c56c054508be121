extern crate async_trait;
use crate::decoder::{decode_answer, DecodedAnswer};
use crate::encoder::encode_qp;
use crate::profile::DWaveConfig;
use crate::property::{ProblemType, SolverCategory, SolverInfo, SolverProperties};
use crate::session::DWaveSession;
use crate::{ApiError, Result};
use annealers::model::BinaryQuadraticModel;
use annealers::sampler::{AsyncSampler, Structured};
use annealers::sampleset::{Sample, SampleSet};
use annealers::variable::Real;
use annealers::vartype::Vartype;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Sampler backed by one remote solver.
#[derive(Clone, Debug)]
pub struct DWaveSampler {
	/// pub for reference (avg_load, description, etc)
	pub info: SolverInfo,
	session: Arc<DWaveSession>,
	pub num_reads: usize,
	/// Extra solver parameters (`annealing_time`, `auto_scale`, ...).
	pub params: Map<String, Value>,
}

impl DWaveSampler {
	/// Open a session and pick a solver: the configured one by name, else the
	/// least loaded online solver of the configured category (QPU by default).
	pub async fn connect(config: &DWaveConfig) -> Result<Self> {
		let session = Arc::new(DWaveSession::new(config)?);
		let info = match &config.solver {
			Some(name) => session.get_solver(name).await?,
			None => {
				let category = config.client.unwrap_or(SolverCategory::Qpu);
				session
					.list_solvers()
					.await?
					.into_iter()
					.filter(|s| s.is_online() && s.properties.category() == category)
					.min_by(|a, b| {
						let la = a.avg_load.unwrap_or(f64::INFINITY);
						let lb = b.avg_load.unwrap_or(f64::INFINITY);
						la.partial_cmp(&lb).unwrap_or(std::cmp::Ordering::Equal)
					})
					.ok_or_else(|| ApiError::NotFound(format!("no online {} solver", category)))?
			}
		};
		info!(solver = %info.id, avg_load = ?info.avg_load, "selected D-Wave solver");
		Ok(Self::from_info(info, session))
	}

	pub fn from_info(info: SolverInfo, session: Arc<DWaveSession>) -> Self {
		Self {
			info,
			session,
			num_reads: 1,
			params: Map::new(),
		}
	}

	pub fn with_num_reads(mut self, num_reads: usize) -> Self {
		self.num_reads = num_reads;
		self
	}

	pub fn id(&self) -> &str {
		&self.info.id
	}

	pub fn properties(&self) -> &SolverProperties {
		&self.info.properties
	}

	pub fn chip_id(&self) -> &str {
		self.info.chip_id()
	}

	fn check_num_reads(&self) -> Result<()> {
		if let Some((lo, hi)) = self.properties().num_reads_range {
			if self.num_reads < lo || self.num_reads > hi {
				return Err(ApiError::Problem(format!(
					"num_reads {} is outside of [{}, {}]",
					self.num_reads, lo, hi
				)));
			}
		} else if self.num_reads == 0 {
			return Err(ApiError::Problem("num_reads must be positive".to_owned()));
		}
		Ok(())
	}

	async fn submit(
		&self,
		problem_type: ProblemType,
		h: &BTreeMap<usize, f64>,
		j: &BTreeMap<(usize, usize), f64>,
	) -> Result<SampleSet<usize, f64>> {
		self.check_num_reads()?;
		if !self.properties().supports(problem_type) {
			return Err(ApiError::Problem(format!(
				"solver {} does not accept {:?} problems",
				self.id(),
				problem_type
			)));
		}
		let p = self.properties();
		let data = encode_qp(&p.qubits, &p.couplers, h, j, 0.0)?;
		let mut params = self.params.clone();
		params.insert("num_reads".to_owned(), Value::from(self.num_reads));
		let completed = self
			.session
			.submit_problem(self.id(), &data, problem_type, &params)
			.await?;
		let answer = decode_answer(&completed.answer)?;
		let vartype = match problem_type {
			ProblemType::Qubo => Vartype::Binary,
			_ => Vartype::Spin,
		};
		let mut ret = into_sampleset(answer, vartype);
		ret.info.insert("solver".to_owned(), self.id().to_owned());
		ret.info.insert("problem_id".to_owned(), completed.id);
		Ok(ret)
	}

	/// Sample an Ising problem given on the working graph.
	pub async fn sample_ising(
		&self,
		h: &BTreeMap<usize, f64>,
		j: &BTreeMap<(usize, usize), f64>,
	) -> Result<SampleSet<usize, f64>> {
		self.submit(ProblemType::Ising, h, j).await
	}

	/// Sample a QUBO given on the working graph; diagonal entries are linear
	/// biases.
	pub async fn sample_qubo(&self, q: &BTreeMap<(usize, usize), f64>) -> Result<SampleSet<usize, f64>> {
		let mut lin = BTreeMap::new();
		let mut quad = BTreeMap::new();
		for (&(u, v), bias) in q.iter() {
			if u == v {
				*lin.entry(u).or_insert(0.0) += *bias;
			} else {
				*quad.entry((u, v)).or_insert(0.0) += *bias;
			}
		}
		self.submit(ProblemType::Qubo, &lin, &quad).await
	}
}

fn into_sampleset(answer: DecodedAnswer, vartype: Vartype) -> SampleSet<usize, f64> {
	let mut ret = SampleSet::new(answer.active_variables, vartype);
	for ((state, energy), occurrences) in answer
		.solutions
		.into_iter()
		.zip(answer.energies.into_iter())
		.zip(answer.num_occurrences.into_iter())
	{
		let mut sample = Sample::new(state, energy);
		sample.num_occurrences = occurrences;
		ret.push(sample);
	}
	if let Some(timing) = answer.timing {
		ret.info.insert("timing".to_owned(), timing.to_string());
	}
	ret
}

impl Structured for DWaveSampler {
	fn nodelist(&self) -> Vec<usize> {
		let mut v = self.properties().qubits.clone();
		v.sort_unstable();
		v
	}

	fn edgelist(&self) -> Vec<(usize, usize)> {
		let mut v = self
			.properties()
			.couplers
			.iter()
			.map(|&(u, v)| (u.min(v), u.max(v)))
			.collect::<Vec<_>>();
		v.sort_unstable();
		v
	}
}

/// Models labelled by qubit. The model is submitted in its spin form and the
/// energies of the returned samples are evaluated on the model itself.
#[async_trait]
impl<R: Real> AsyncSampler<usize, R> for DWaveSampler {
	type ErrorType = ApiError;

	async fn sample_async(&self, model: &BinaryQuadraticModel<usize, R>) -> Result<SampleSet<usize, R>> {
		let (h, j, _) = model.to_ising();
		let h: BTreeMap<usize, f64> = h.into_iter().map(|(v, b)| (v, b.as_f64())).collect();
		let j: BTreeMap<(usize, usize), f64> =
			j.into_iter().map(|(k, b)| (k, b.as_f64())).collect();
		let answer = self.sample_ising(&h, &j).await?;
		let indexed = model.indexed();
		if answer.variables() != indexed.labels.as_slice() {
			return Err(ApiError::Decode(format!(
				"answer covers qubits {:?}, expected {:?}",
				answer.variables(),
				indexed.labels
			)));
		}
		let mut ret = SampleSet::new(indexed.labels.clone(), model.vartype());
		for s in answer.iter() {
			let mut sample = Sample::new(s.state.clone(), indexed.energy(&s.state));
			sample.num_occurrences = s.num_occurrences;
			ret.push(sample);
		}
		ret.info = answer.info.clone();
		Ok(ret)
	}
}
