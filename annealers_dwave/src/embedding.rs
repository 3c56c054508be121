//! Mapping of logical variables on chains of physical qubits.
use crate::{ApiError, Result};
use annealers::model::{BinaryQuadraticModel, IndexedModel};
use annealers::repr::BinaryRepr;
use annealers::sampler::Structured;
use annealers::sampleset::{Sample, SampleSet};
use annealers::variable::{Label, Real};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

/// Undirected hardware graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetGraph {
	adjacency: BTreeMap<usize, BTreeSet<usize>>,
}

impl TargetGraph {
	pub fn new<N, E>(nodes: N, edges: E) -> Self
	where
		N: IntoIterator<Item = usize>,
		E: IntoIterator<Item = (usize, usize)>,
	{
		let mut adjacency: BTreeMap<usize, BTreeSet<usize>> =
			nodes.into_iter().map(|n| (n, BTreeSet::new())).collect();
		for (u, v) in edges {
			if u == v {
				continue;
			}
			adjacency.entry(u).or_insert_with(BTreeSet::new).insert(v);
			adjacency.entry(v).or_insert_with(BTreeSet::new).insert(u);
		}
		Self { adjacency }
	}

	pub fn from_structured<S: Structured + ?Sized>(sampler: &S) -> Self {
		Self::new(sampler.nodelist(), sampler.edgelist())
	}

	pub fn contains(&self, q: usize) -> bool {
		self.adjacency.contains_key(&q)
	}

	pub fn has_edge(&self, u: usize, v: usize) -> bool {
		self.adjacency.get(&u).map(|a| a.contains(&v)).unwrap_or(false)
	}

	pub fn degree(&self, q: usize) -> usize {
		self.adjacency.get(&q).map(|a| a.len()).unwrap_or(0)
	}

	pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
		self.adjacency.keys().copied()
	}

	pub fn neighbors(&self, q: usize) -> impl Iterator<Item = usize> + '_ {
		self.adjacency.get(&q).into_iter().flat_map(|a| a.iter().copied())
	}
}

/// Chain of qubits of every variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedding<V: Label> {
	chains: BTreeMap<V, Vec<usize>>,
}

impl<V: Label> Embedding<V> {
	pub fn new<I: IntoIterator<Item = (V, Vec<usize>)>>(chains: I) -> Self {
		Self {
			chains: chains.into_iter().collect(),
		}
	}

	pub fn chain(&self, v: &V) -> Option<&[usize]> {
		self.chains.get(v).map(|c| c.as_slice())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&V, &[usize])> {
		self.chains.iter().map(|(v, c)| (v, c.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.chains.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chains.is_empty()
	}

	/// Check that chains are non-empty, disjoint and connected on `target`,
	/// and that every edge of the source graph is covered by a coupler.
	pub fn validate(&self, source_edges: &[(V, V)], target: &TargetGraph) -> Result<()> {
		let mut owner: BTreeMap<usize, &V> = BTreeMap::new();
		for (v, chain) in self.chains.iter() {
			if chain.is_empty() {
				return Err(ApiError::Embedding(format!("chain of {} is empty", v)));
			}
			for q in chain.iter() {
				if !target.contains(*q) {
					return Err(ApiError::Embedding(format!("qubit {} of {} is not in the target", q, v)));
				}
				if let Some(other) = owner.insert(*q, v) {
					return Err(ApiError::Embedding(format!(
						"qubit {} is shared by {} and {}",
						q, other, v
					)));
				}
			}
			if !is_connected(chain, target) {
				return Err(ApiError::Embedding(format!("chain of {} is not connected", v)));
			}
		}
		for (u, v) in source_edges.iter() {
			let cu = self
				.chain(u)
				.ok_or_else(|| ApiError::Embedding(format!("{} has no chain", u)))?;
			let cv = self
				.chain(v)
				.ok_or_else(|| ApiError::Embedding(format!("{} has no chain", v)))?;
			if coupler_between(cu, cv, target).is_none() {
				return Err(ApiError::Embedding(format!("no coupler between {} and {}", u, v)));
			}
		}
		Ok(())
	}
}

fn is_connected(chain: &[usize], target: &TargetGraph) -> bool {
	let members = chain.iter().copied().collect::<BTreeSet<_>>();
	let mut seen = BTreeSet::new();
	let mut queue = VecDeque::new();
	queue.push_back(chain[0]);
	seen.insert(chain[0]);
	while let Some(q) = queue.pop_front() {
		for n in target.neighbors(q) {
			if members.contains(&n) && seen.insert(n) {
				queue.push_back(n);
			}
		}
	}
	seen.len() == members.len()
}

/// First coupler `(p, q)` with `p` in `a` and `q` in `b`.
fn coupler_between(a: &[usize], b: &[usize], target: &TargetGraph) -> Option<(usize, usize)> {
	a.iter()
		.flat_map(|p| b.iter().map(move |q| (*p, *q)))
		.find(|(p, q)| target.has_edge(*p, *q))
}

/// Longest chain tried by [`find_embedding`].
pub const MAX_CHAIN_LENGTH: usize = 2;

struct Search<'a> {
	adjacency: Vec<Vec<usize>>,
	target: &'a TargetGraph,
	placed: Vec<Option<Vec<usize>>>,
	used: BTreeSet<usize>,
	max_chain: usize,
	steps: usize,
	max_steps: usize,
}

impl<'a> Search<'a> {
	/// Unplaced variable with the most placed neighbors, then the highest
	/// degree.
	fn next_variable(&self) -> Option<usize> {
		(0..self.adjacency.len())
			.filter(|i| self.placed[*i].is_none())
			.max_by_key(|i| {
				let placed = self.adjacency[*i]
					.iter()
					.filter(|j| self.placed[**j].is_some())
					.count();
				(placed, self.adjacency[*i].len(), std::cmp::Reverse(*i))
			})
	}

	/// Chains for variable `i` touching every placed neighbor: single qubits
	/// first, then pairs of coupled qubits.
	fn candidates(&self, i: usize) -> Vec<Vec<usize>> {
		let placed = self.adjacency[i]
			.iter()
			.filter_map(|j| self.placed[*j].as_ref())
			.collect::<Vec<_>>();
		let degree = self.adjacency[i].len();
		let pool: BTreeSet<usize> = match placed.first() {
			Some(c) => c.iter().flat_map(|q| self.target.neighbors(*q)).collect(),
			None => self.target.nodes().collect(),
		};
		let fits = |chain: &[usize]| {
			placed
				.iter()
				.all(|c| coupler_between(chain, c.as_slice(), self.target).is_some())
		};
		let mut ret = pool
			.iter()
			.filter(|q| !self.used.contains(*q) && self.target.degree(**q) >= degree)
			.map(|q| vec![*q])
			.filter(|c| fits(c.as_slice()))
			.collect::<Vec<_>>();
		if self.max_chain < 2 {
			return ret;
		}
		for a in pool.iter().filter(|q| !self.used.contains(*q)) {
			for b in self.target.neighbors(*a) {
				// (b, a) is generated from b
				if self.used.contains(&b) || (pool.contains(&b) && b < *a) {
					continue;
				}
				let chain = vec![*a, b];
				if self.target.degree(*a) + self.target.degree(b) >= degree + 2
					&& fits(chain.as_slice())
				{
					ret.push(chain);
				}
			}
		}
		ret
	}

	fn solve(&mut self) -> bool {
		let i = match self.next_variable() {
			Some(i) => i,
			None => return true,
		};
		for chain in self.candidates(i) {
			if self.steps >= self.max_steps {
				return false;
			}
			self.steps += 1;
			for q in chain.iter() {
				self.used.insert(*q);
			}
			self.placed[i] = Some(chain);
			if self.solve() {
				return true;
			}
			if let Some(chain) = self.placed[i].take() {
				for q in chain.iter() {
					self.used.remove(q);
				}
			}
		}
		false
	}
}

/// Search an embedding of the source graph into `target` by backtracking.
///
/// A direct embedding (every chain a single qubit) is tried first. When
/// there is none, as for odd cycles on a bipartite Chimera graph, the search
/// is repeated allowing chains of up to [`MAX_CHAIN_LENGTH`] coupled qubits.
/// `max_steps` bounds each attempt.
pub fn find_embedding<V: Label>(
	source_nodes: &[V],
	source_edges: &[(V, V)],
	target: &TargetGraph,
	max_steps: usize,
) -> Result<Embedding<V>> {
	let nodes = source_nodes
		.iter()
		.chain(source_edges.iter().flat_map(|(u, v)| vec![u, v]))
		.cloned()
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect::<Vec<_>>();
	let index = nodes
		.iter()
		.enumerate()
		.map(|(i, v)| (v, i))
		.collect::<BTreeMap<_, _>>();
	let mut adjacency = vec![BTreeSet::new(); nodes.len()];
	for (u, v) in source_edges.iter() {
		let (i, j) = (index[u], index[v]);
		if i != j {
			adjacency[i].insert(j);
			adjacency[j].insert(i);
		}
	}
	let adjacency = adjacency
		.into_iter()
		.map(|a| a.into_iter().collect::<Vec<_>>())
		.collect::<Vec<_>>();
	let mut exhausted = false;
	for max_chain in 1..=MAX_CHAIN_LENGTH {
		let mut search = Search {
			adjacency: adjacency.clone(),
			target,
			placed: vec![None; nodes.len()],
			used: BTreeSet::new(),
			max_chain,
			steps: 0,
			max_steps,
		};
		if search.solve() {
			debug!(max_chain, steps = search.steps, "embedding found");
			return Ok(Embedding::new(
				nodes
					.into_iter()
					.zip(search.placed.into_iter())
					.filter_map(|(v, c)| c.map(|c| (v, c))),
			));
		}
		exhausted |= search.steps >= max_steps;
	}
	Err(ApiError::Embedding(if exhausted {
		format!(
			"no embedding with chains of up to {} qubits found within {} steps",
			MAX_CHAIN_LENGTH, max_steps
		)
	} else {
		format!(
			"the source graph has no embedding with chains of up to {} qubits in {} qubits",
			MAX_CHAIN_LENGTH,
			target.adjacency.len()
		)
	}))
}

/// 1.5 times the largest absolute bias of the spin form of `model`, at least
/// 1.0.
pub fn default_chain_strength<V: Label, R: Real>(model: &BinaryQuadraticModel<V, R>) -> f64 {
	let (h, j, _) = model.to_ising();
	let max = h
		.values()
		.chain(j.values())
		.map(|b| b.abs().as_f64())
		.fold(0.0, f64::max);
	(1.5 * max).max(1.0)
}

/// Ising problem on `target` equivalent to `model`.
///
/// Linear biases are spread evenly over the chain, each coupling goes on one
/// coupler between the two chains and every coupler inside a chain gets
/// `-chain_strength`.
pub fn embed_ising<V: Label, R: Real>(
	model: &BinaryQuadraticModel<V, R>,
	embedding: &Embedding<V>,
	target: &TargetGraph,
	chain_strength: f64,
) -> Result<(BTreeMap<usize, f64>, BTreeMap<(usize, usize), f64>)> {
	let (h, j, _) = model.to_ising();
	let chain = |v: &V| {
		embedding
			.chain(v)
			.ok_or_else(|| ApiError::Embedding(format!("{} has no chain", v)))
	};
	let mut th = BTreeMap::new();
	let mut tj = BTreeMap::new();
	for (v, bias) in h.iter() {
		let c = chain(v)?;
		let share = bias.as_f64() / c.len() as f64;
		for q in c.iter() {
			*th.entry(*q).or_insert(0.0) += share;
		}
	}
	for ((u, v), bias) in j.iter() {
		let (p, q) = coupler_between(chain(u)?, chain(v)?, target)
			.ok_or_else(|| ApiError::Embedding(format!("no coupler between {} and {}", u, v)))?;
		*tj.entry((p.min(q), p.max(q))).or_insert(0.0) += bias.as_f64();
	}
	for (_, c) in embedding.iter() {
		for (k, p) in c.iter().enumerate() {
			for q in c[k + 1..].iter() {
				if target.has_edge(*p, *q) {
					*tj.entry((*p.min(q), *p.max(q))).or_insert(0.0) -= chain_strength;
				}
			}
		}
	}
	Ok((th, tj))
}

/// Read samples over qubits back onto the source variables by majority vote
/// of each chain; ties resolve to +1. Energies are evaluated on `source`.
pub fn unembed<V: Label, R: Real>(
	child: &SampleSet<usize, f64>,
	embedding: &Embedding<V>,
	source: &IndexedModel<V, R>,
) -> Result<SampleSet<V, R>> {
	let column = child
		.variables()
		.iter()
		.enumerate()
		.map(|(i, q)| (*q, i))
		.collect::<BTreeMap<_, _>>();
	let chains = source
		.labels
		.iter()
		.map(|v| {
			embedding
				.chain(v)
				.ok_or_else(|| ApiError::Embedding(format!("{} has no chain", v)))?
				.iter()
				.map(|q| {
					column
						.get(q)
						.copied()
						.ok_or_else(|| ApiError::Decode(format!("qubit {} missing from answer", q)))
				})
				.collect::<Result<Vec<_>>>()
		})
		.collect::<Result<Vec<_>>>()?;
	let mut ret = SampleSet::new(source.labels.clone(), source.vartype);
	for s in child.iter() {
		let mut state = BinaryRepr::new(chains.len());
		let mut broken = 0;
		for (i, c) in chains.iter().enumerate() {
			let ones = c.iter().filter(|col| s.state.get(**col)).count();
			if ones > 0 && ones < c.len() {
				broken += 1;
			}
			state.set(i, 2 * ones >= c.len());
		}
		let energy = source.energy(&state);
		let mut sample = Sample::new(state, energy);
		sample.num_occurrences = s.num_occurrences;
		sample.chain_break_fraction = Some(if chains.is_empty() {
			0.0
		} else {
			broken as f64 / chains.len() as f64
		});
		ret.push(sample);
	}
	ret.info = child.info.clone();
	Ok(ret)
}
