//! Samplers that lay arbitrary models out on a structured child sampler.
extern crate async_trait;
use crate::embedding::{default_chain_strength, embed_ising, find_embedding, unembed, Embedding, TargetGraph};
use crate::property::SolverProperties;
use crate::solver::DWaveSampler;
use crate::{ApiError, Result};
use annealers::model::BinaryQuadraticModel;
use annealers::sampler::{AsyncSampler, Structured};
use annealers::sampleset::SampleSet;
use annealers::variable::{Label, Real};
use async_trait::async_trait;
use tracing::debug;

async fn sample_embedded<S, V, R>(
	child: &S,
	model: &BinaryQuadraticModel<V, R>,
	embedding: &Embedding<V>,
	target: &TargetGraph,
	chain_strength: Option<f64>,
) -> Result<SampleSet<V, R>>
where
	S: AsyncSampler<usize, f64, ErrorType = ApiError> + ?Sized,
	V: Label,
	R: Real,
{
	let chain_strength = chain_strength.unwrap_or_else(|| default_chain_strength(model));
	let (h, j) = embed_ising(model, embedding, target, chain_strength)?;
	debug!(
		variables = model.num_variables(),
		qubits = h.len(),
		chain_strength,
		"embedded problem"
	);
	let child_model = BinaryQuadraticModel::from_ising(h, j, 0.0)?;
	let child_set = child.sample_async(&child_model).await?;
	let mut ret = unembed(&child_set, embedding, &model.indexed())?;
	ret.info.insert("chain_strength".to_owned(), chain_strength.to_string());
	Ok(ret)
}

/// Finds a direct embedding for every submitted model.
#[derive(Clone, Debug)]
pub struct EmbeddingComposite<S> {
	child: S,
	/// Coupling put inside chains. Defaults to [`default_chain_strength`].
	pub chain_strength: Option<f64>,
	/// Step budget of the embedding search.
	pub max_steps: usize,
}

impl<S> EmbeddingComposite<S> {
	pub fn new(child: S) -> Self {
		Self {
			child,
			chain_strength: None,
			max_steps: 100_000,
		}
	}

	pub fn child(&self) -> &S {
		&self.child
	}

	pub fn child_mut(&mut self) -> &mut S {
		&mut self.child
	}
}

impl EmbeddingComposite<DWaveSampler> {
	pub fn child_properties(&self) -> &SolverProperties {
		self.child.properties()
	}
}

#[async_trait]
impl<S, V, R> AsyncSampler<V, R> for EmbeddingComposite<S>
where
	S: AsyncSampler<usize, f64, ErrorType = ApiError> + Structured,
	V: Label,
	R: Real,
{
	type ErrorType = ApiError;

	async fn sample_async(&self, model: &BinaryQuadraticModel<V, R>) -> Result<SampleSet<V, R>> {
		let target = TargetGraph::from_structured(&self.child);
		let nodes = model.variables().cloned().collect::<Vec<_>>();
		let edges = model
			.iter_quadratic()
			.map(|(k, _)| (k.first().clone(), k.second().clone()))
			.collect::<Vec<_>>();
		let embedding = find_embedding(&nodes, &edges, &target, self.max_steps)?;
		debug!(chains = embedding.len(), "found embedding");
		sample_embedded(&self.child, model, &embedding, &target, self.chain_strength).await
	}
}

/// Uses one embedding, given by the caller, for every model.
#[derive(Clone, Debug)]
pub struct FixedEmbeddingComposite<S, V: Label> {
	child: S,
	embedding: Embedding<V>,
	pub chain_strength: Option<f64>,
}

impl<S: Structured, V: Label> FixedEmbeddingComposite<S, V> {
	/// Fails if a chain is empty, shared, disconnected or off the child's
	/// graph.
	pub fn new(child: S, embedding: Embedding<V>) -> Result<Self> {
		embedding.validate(&[], &TargetGraph::from_structured(&child))?;
		Ok(Self {
			child,
			embedding,
			chain_strength: None,
		})
	}

	pub fn child(&self) -> &S {
		&self.child
	}

	pub fn embedding(&self) -> &Embedding<V> {
		&self.embedding
	}
}

impl<V: Label> FixedEmbeddingComposite<DWaveSampler, V> {
	pub fn child_properties(&self) -> &SolverProperties {
		self.child.properties()
	}
}

#[async_trait]
impl<S, V, R> AsyncSampler<V, R> for FixedEmbeddingComposite<S, V>
where
	S: AsyncSampler<usize, f64, ErrorType = ApiError> + Structured,
	V: Label,
	R: Real,
{
	type ErrorType = ApiError;

	async fn sample_async(&self, model: &BinaryQuadraticModel<V, R>) -> Result<SampleSet<V, R>> {
		let target = TargetGraph::from_structured(&self.child);
		let edges = model
			.iter_quadratic()
			.map(|(k, _)| (k.first().clone(), k.second().clone()))
			.collect::<Vec<_>>();
		self.embedding.validate(&edges, &target)?;
		sample_embedded(&self.child, model, &self.embedding, &target, self.chain_strength).await
	}
}
