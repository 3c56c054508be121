use crate::error::ModelError;
use crate::interaction::Interaction;
use crate::repr::BinaryRepr;
use crate::variable::{format_real, Label, Real};
use crate::vartype::Vartype;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Binary quadratic model
///
/// ```text
/// E(x) = offset + sum_i a_i x_i + sum_{i<j} b_ij x_i x_j
/// ```
///
/// where each `x_i` takes values in the domain named by the model's
/// [`Vartype`]. With `Vartype::Spin` this is an Ising model (`a` = h,
/// `b` = J), with `Vartype::Binary` a QUBO.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryQuadraticModel<V: Label, R: Real = f64> {
	linear: BTreeMap<V, R>,
	quadratic: BTreeMap<Interaction<V>, R>,
	adjacency: BTreeMap<V, BTreeSet<V>>,
	offset: R,
	vartype: Vartype,
}

impl<V: Label, R: Real> BinaryQuadraticModel<V, R> {
	pub fn empty(vartype: Vartype) -> Self {
		Self {
			linear: BTreeMap::new(),
			quadratic: BTreeMap::new(),
			adjacency: BTreeMap::new(),
			offset: R::zero(),
			vartype,
		}
	}

	/// Build a model from a bias map and a coupling map.
	///
	/// Couplings given on both `(u, v)` and `(v, u)` are summed. Every
	/// variable of a coupling is declared with a zero bias if the bias map
	/// does not mention it.
	pub fn new<L, Q>(linear: L, quadratic: Q, offset: R, vartype: Vartype) -> Result<Self, ModelError>
	where
		L: IntoIterator<Item = (V, R)>,
		Q: IntoIterator<Item = ((V, V), R)>,
	{
		let mut ret = Self::empty(vartype);
		for (v, bias) in linear {
			ret.add_variable(v, bias);
		}
		for ((u, v), bias) in quadratic {
			ret.add_interaction(u, v, bias)?;
		}
		ret.offset = offset;
		Ok(ret)
	}

	/// Ising model `(h, J, offset)`.
	pub fn from_ising<L, Q>(h: L, j: Q, offset: R) -> Result<Self, ModelError>
	where
		L: IntoIterator<Item = (V, R)>,
		Q: IntoIterator<Item = ((V, V), R)>,
	{
		Self::new(h, j, offset, Vartype::Spin)
	}

	/// QUBO `(Q, offset)`; diagonal entries `(v, v)` are linear biases.
	pub fn from_qubo<Q>(q: Q, offset: R) -> Result<Self, ModelError>
	where
		Q: IntoIterator<Item = ((V, V), R)>,
	{
		let mut ret = Self::empty(Vartype::Binary);
		for ((u, v), bias) in q {
			if u == v {
				ret.add_variable(u, bias);
			} else {
				ret.add_interaction(u, v, bias)?;
			}
		}
		ret.offset = offset;
		Ok(ret)
	}

	/// Add `bias` to the linear bias of `v`, declaring it if needed.
	pub fn add_variable(&mut self, v: V, bias: R) {
		self.adjacency.entry(v.clone()).or_insert_with(BTreeSet::new);
		*self.linear.entry(v).or_insert_with(R::zero) += bias;
	}

	/// Add `bias` to the coupling between `u` and `v`.
	pub fn add_interaction(&mut self, u: V, v: V, bias: R) -> Result<(), ModelError> {
		let key = Interaction::new(u.clone(), v.clone())?;
		self.add_variable(u.clone(), R::zero());
		self.add_variable(v.clone(), R::zero());
		if let Some(adj) = self.adjacency.get_mut(&u) {
			adj.insert(v.clone());
		}
		if let Some(adj) = self.adjacency.get_mut(&v) {
			adj.insert(u);
		}
		*self.quadratic.entry(key).or_insert_with(R::zero) += bias;
		Ok(())
	}

	pub fn add_offset(&mut self, offset: R) {
		self.offset += offset;
	}

	#[inline]
	pub fn vartype(&self) -> Vartype {
		self.vartype
	}

	#[inline]
	pub fn offset(&self) -> R {
		self.offset
	}

	#[inline]
	pub fn num_variables(&self) -> usize {
		self.linear.len()
	}

	#[inline]
	pub fn num_interactions(&self) -> usize {
		self.quadratic.len()
	}

	pub fn linear(&self, v: &V) -> Option<R> {
		self.linear.get(v).copied()
	}

	pub fn quadratic(&self, u: &V, v: &V) -> Option<R> {
		let key = Interaction::new(u.clone(), v.clone()).ok()?;
		self.quadratic.get(&key).copied()
	}

	/// Variables in ascending label order.
	pub fn variables(&self) -> impl Iterator<Item = &V> {
		self.linear.keys()
	}

	pub fn iter_linear(&self) -> impl Iterator<Item = (&V, R)> {
		self.linear.iter().map(|(v, b)| (v, *b))
	}

	pub fn iter_quadratic(&self) -> impl Iterator<Item = (&Interaction<V>, R)> {
		self.quadratic.iter().map(|(k, b)| (k, *b))
	}

	pub fn degree(&self, v: &V) -> usize {
		self.adjacency.get(v).map(|a| a.len()).unwrap_or(0)
	}

	pub fn neighbors(&self, v: &V) -> impl Iterator<Item = &V> {
		self.adjacency.get(v).into_iter().flat_map(|a| a.iter())
	}

	/// Energy of a labelled assignment. Values are `-1`/`+1` or `0`/`1`
	/// depending on the vartype.
	pub fn energy(&self, assignment: &BTreeMap<V, i8>) -> Result<R, ModelError> {
		let value = |v: &V| -> Result<R, ModelError> {
			let x = *assignment
				.get(v)
				.ok_or_else(|| ModelError::MissingVariable(v.to_string()))?;
			match self.vartype.from_value(x) {
				Some(_) => Ok(R::from_i32(x as i32)),
				None => Err(ModelError::InvalidValue {
					variable: v.to_string(),
					value: x,
					vartype: self.vartype,
				}),
			}
		};
		let mut energy = self.offset;
		for (v, bias) in self.linear.iter() {
			energy += *bias * value(v)?;
		}
		for (key, bias) in self.quadratic.iter() {
			energy += *bias * value(key.first())? * value(key.second())?;
		}
		Ok(energy)
	}

	/// Energy-equivalent model over the given domain (`s = 2x - 1`).
	///
	/// Binary to spin divides the biases by 2 and 4. With integer `R` the
	/// division truncates, so the result is only energy-equivalent when every
	/// linear bias is even and every coupling a multiple of 4.
	pub fn change_vartype(&self, vartype: Vartype) -> Self {
		if vartype == self.vartype {
			return self.clone();
		}
		let two = R::from_i32(2);
		let four = R::from_i32(4);
		let mut ret = Self::empty(vartype);
		ret.adjacency = self.adjacency.clone();
		match vartype {
			Vartype::Binary => {
				// spin -> binary
				let mut offset = self.offset;
				for (v, h) in self.linear.iter() {
					ret.linear.insert(v.clone(), two * *h);
					offset -= *h;
				}
				for (key, j) in self.quadratic.iter() {
					ret.quadratic.insert(key.clone(), four * *j);
					*ret.linear.entry(key.first().clone()).or_insert_with(R::zero) -= two * *j;
					*ret.linear.entry(key.second().clone()).or_insert_with(R::zero) -= two * *j;
					offset += *j;
				}
				ret.offset = offset;
			}
			Vartype::Spin => {
				// binary -> spin
				let mut offset = self.offset;
				for (v, a) in self.linear.iter() {
					ret.linear.insert(v.clone(), *a / two);
					offset += *a / two;
				}
				for (key, b) in self.quadratic.iter() {
					ret.quadratic.insert(key.clone(), *b / four);
					*ret.linear.entry(key.first().clone()).or_insert_with(R::zero) += *b / four;
					*ret.linear.entry(key.second().clone()).or_insert_with(R::zero) += *b / four;
					offset += *b / four;
				}
				ret.offset = offset;
			}
		}
		ret
	}

	/// `(h, J, offset)` of the spin form of this model.
	pub fn to_ising(&self) -> (BTreeMap<V, R>, BTreeMap<(V, V), R>, R) {
		let spin = self.change_vartype(Vartype::Spin);
		let j = spin
			.quadratic
			.iter()
			.map(|(k, b)| ((k.first().clone(), k.second().clone()), *b))
			.collect();
		(spin.linear, j, spin.offset)
	}

	/// `(Q, offset)` of the binary form of this model, linear biases on the
	/// diagonal.
	pub fn to_qubo(&self) -> (BTreeMap<(V, V), R>, R) {
		let binary = self.change_vartype(Vartype::Binary);
		let mut q: BTreeMap<(V, V), R> = binary
			.linear
			.iter()
			.map(|(v, a)| ((v.clone(), v.clone()), *a))
			.collect();
		for (k, b) in binary.quadratic.iter() {
			q.insert((k.first().clone(), k.second().clone()), *b);
		}
		(q, binary.offset)
	}

	/// Index-based view used by the solvers. Variable `i` of the view is the
	/// `i`-th variable in label order.
	pub fn indexed(&self) -> IndexedModel<V, R> {
		let labels: Vec<V> = self.linear.keys().cloned().collect();
		let index: BTreeMap<&V, usize> = labels.iter().enumerate().map(|(i, v)| (v, i)).collect();
		let linear = self.linear.values().copied().collect();
		let mut neighbors = vec![Vec::new(); labels.len()];
		for (key, bias) in self.quadratic.iter() {
			let i = index[key.first()];
			let j = index[key.second()];
			neighbors[i].push((j, *bias));
			neighbors[j].push((i, *bias));
		}
		IndexedModel {
			labels,
			linear,
			neighbors,
			offset: self.offset,
			vartype: self.vartype,
		}
	}
}

impl<V: Label, R: Real> fmt::Display for BinaryQuadraticModel<V, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("BinaryQuadraticModel({")?;
		for (i, (v, b)) in self.linear.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}: {}", v, format_real(*b))?;
		}
		f.write_str("}, {")?;
		for (i, (k, b)) in self.quadratic.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "({}, {}): {}", k.first(), k.second(), format_real(*b))?;
		}
		write!(f, "}}, {}, '{}')", format_real(self.offset), self.vartype)
	}
}

/// Model with variables renumbered `0..n`, as adjacency lists.
#[derive(Clone, Debug)]
pub struct IndexedModel<V, R> {
	pub labels: Vec<V>,
	pub linear: Vec<R>,
	/// `neighbors[i]` holds `(j, bias)` for every coupling of `i`; each
	/// coupling appears in the lists of both ends.
	pub neighbors: Vec<Vec<(usize, R)>>,
	pub offset: R,
	pub vartype: Vartype,
}

impl<V, R: Real> IndexedModel<V, R> {
	#[inline]
	pub fn size(&self) -> usize {
		self.linear.len()
	}

	pub fn energy(&self, state: &BinaryRepr) -> R {
		assert_eq!(state.len(), self.size());
		let value = |i: usize| R::from_i32(self.vartype.value(state.get(i)) as i32);
		let mut energy = self.offset;
		for (i, bias) in self.linear.iter().enumerate() {
			energy += *bias * value(i);
			for (j, weight) in self.neighbors[i].iter() {
				if *j > i {
					energy += *weight * value(i) * value(*j);
				}
			}
		}
		energy
	}

	/// `h_i + sum_j J_ij x_j` for every variable.
	pub fn local_fields(&self, state: &BinaryRepr) -> Vec<R> {
		(0..self.size())
			.map(|i| {
				self.neighbors[i].iter().fold(self.linear[i], |acc, (j, w)| {
					acc + *w * R::from_i32(self.vartype.value(state.get(*j)) as i32)
				})
			})
			.collect()
	}
}
