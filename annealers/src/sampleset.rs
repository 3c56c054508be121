use crate::model::{BinaryQuadraticModel, IndexedModel};
use crate::repr::BinaryRepr;
use crate::variable::{format_real, Label, Real};
use crate::vartype::Vartype;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One record of a sample set.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<R: Real> {
	pub state: BinaryRepr,
	pub energy: R,
	pub num_occurrences: usize,
	/// Fraction of broken chains, for samples read back through an
	/// embedding.
	pub chain_break_fraction: Option<f64>,
}

impl<R: Real> Sample<R> {
	pub fn new(state: BinaryRepr, energy: R) -> Self {
		Self {
			state,
			energy,
			num_occurrences: 1,
			chain_break_fraction: None,
		}
	}

	/// Compare two samples by energy.
	pub fn compare_energy(&self, other: &Self) -> std::cmp::Ordering {
		self.energy
			.partial_cmp(&other.energy)
			.unwrap_or(std::cmp::Ordering::Equal)
	}
}

/// Ordered collection of (assignment, energy, multiplicity) records over a
/// fixed list of variables.
#[derive(Clone, Debug)]
pub struct SampleSet<V: Label, R: Real = f64> {
	variables: Vec<V>,
	vartype: Vartype,
	records: Vec<Sample<R>>,
	pub info: BTreeMap<String, String>,
}

impl<V: Label, R: Real> SampleSet<V, R> {
	pub fn new(variables: Vec<V>, vartype: Vartype) -> Self {
		Self {
			variables,
			vartype,
			records: Vec::new(),
			info: BTreeMap::new(),
		}
	}

	/// Sample set whose energies are evaluated on `model`. The bits of each
	/// state follow the variable order of [`BinaryQuadraticModel::indexed`].
	pub fn from_states<I>(model: &BinaryQuadraticModel<V, R>, states: I) -> Self
	where
		I: IntoIterator<Item = BinaryRepr>,
	{
		Self::from_indexed(&model.indexed(), states)
	}

	pub fn from_indexed<I>(model: &IndexedModel<V, R>, states: I) -> Self
	where
		I: IntoIterator<Item = BinaryRepr>,
	{
		let mut ret = Self::new(model.labels.clone(), model.vartype);
		for state in states {
			let energy = model.energy(&state);
			ret.push(Sample::new(state, energy));
		}
		ret
	}

	pub fn push(&mut self, sample: Sample<R>) {
		assert_eq!(sample.state.len(), self.variables.len());
		self.records.push(sample);
	}

	#[inline]
	pub fn variables(&self) -> &[V] {
		&self.variables
	}

	#[inline]
	pub fn vartype(&self) -> Vartype {
		self.vartype
	}

	/// Number of records.
	#[inline]
	pub fn len(&self) -> usize {
		self.records.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Number of samples, counting multiplicities.
	pub fn num_samples(&self) -> usize {
		self.records.iter().map(|s| s.num_occurrences).sum()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Sample<R>> {
		self.records.iter()
	}

	pub fn energies(&self) -> Vec<R> {
		self.records.iter().map(|s| s.energy).collect()
	}

	/// Record with the lowest energy; the earliest one on ties.
	pub fn first(&self) -> Option<&Sample<R>> {
		self.records.iter().fold(None, |best: Option<&Sample<R>>, s| match best {
			Some(b) if b.energy <= s.energy => Some(b),
			_ => Some(s),
		})
	}

	/// All records at the minimum energy.
	pub fn lowest(&self) -> Vec<&Sample<R>> {
		match self.first() {
			Some(best) => self.records.iter().filter(|s| s.energy == best.energy).collect(),
			None => Vec::new(),
		}
	}

	/// Stable sort by ascending energy.
	pub fn sort_by_energy(&mut self) {
		self.records.sort_by(|a, b| a.compare_energy(b));
	}

	pub fn truncate(&mut self, len: usize) {
		self.records.truncate(len);
	}

	/// Merge records with identical states, summing their occurrences. The
	/// first occurrence of each state keeps its position.
	pub fn aggregate(&self) -> Self {
		let mut index: HashMap<&BinaryRepr, usize> = HashMap::new();
		let mut records: Vec<Sample<R>> = Vec::new();
		for s in self.records.iter() {
			match index.get(&s.state).copied() {
				Some(i) => records[i].num_occurrences += s.num_occurrences,
				None => {
					index.insert(&s.state, records.len());
					records.push(s.clone());
				}
			}
		}
		Self {
			variables: self.variables.clone(),
			vartype: self.vartype,
			records,
			info: self.info.clone(),
		}
	}

	/// Labelled values of a record.
	pub fn assignment(&self, sample: &Sample<R>) -> BTreeMap<V, i8> {
		self.variables
			.iter()
			.cloned()
			.zip(sample.state.iter().map(|b| self.vartype.value(b)))
			.collect()
	}

	/// Same samples read in the other domain. Energies do not change.
	pub fn change_vartype(&self, vartype: Vartype) -> Self {
		let mut ret = self.clone();
		ret.vartype = vartype;
		ret
	}
}

impl<'a, V: Label, R: Real> IntoIterator for &'a SampleSet<V, R> {
	type Item = &'a Sample<R>;
	type IntoIter = std::slice::Iter<'a, Sample<R>>;

	fn into_iter(self) -> Self::IntoIter {
		self.records.iter()
	}
}

impl<V: Label, R: Real> fmt::Display for SampleSet<V, R> {
	/// Table of records sorted by energy, followed by a summary line.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut rows: Vec<&Sample<R>> = self.records.iter().collect();
		rows.sort_by(|a, b| a.compare_energy(b));
		let with_chains = rows.iter().any(|s| s.chain_break_fraction.is_some());

		let index_width = rows.len().saturating_sub(1).to_string().len();
		let var_widths: Vec<usize> = self
			.variables
			.iter()
			.map(|v| v.to_string().len().max(2))
			.collect();
		let energies: Vec<String> = rows.iter().map(|s| format_real(s.energy)).collect();
		let energy_width = energies.iter().map(|e| e.len()).fold("energy".len(), usize::max);
		let occ_width = rows
			.iter()
			.map(|s| s.num_occurrences.to_string().len())
			.fold("num_oc.".len(), usize::max);

		write!(f, "{:>w$}", "", w = index_width)?;
		for (v, w) in self.variables.iter().zip(var_widths.iter()) {
			write!(f, " {:>w$}", v.to_string(), w = *w)?;
		}
		write!(f, " {:>w$} {:>o$}", "energy", "num_oc.", w = energy_width, o = occ_width)?;
		if with_chains {
			write!(f, " {:>8}", "chain_b.")?;
		}
		writeln!(f)?;

		for (i, (s, e)) in rows.iter().zip(energies.iter()).enumerate() {
			write!(f, "{:>w$}", i, w = index_width)?;
			for (b, w) in s.state.iter().zip(var_widths.iter()) {
				write!(f, " {:>w$}", self.vartype.render(b), w = *w)?;
			}
			write!(
				f,
				" {:>w$} {:>o$}",
				e,
				s.num_occurrences,
				w = energy_width,
				o = occ_width
			)?;
			if with_chains {
				match s.chain_break_fraction {
					Some(c) => write!(f, " {:>8.2}", c)?,
					None => write!(f, " {:>8}", "")?,
				}
			}
			writeln!(f)?;
		}
		write!(
			f,
			"['{}', {} rows, {} samples, {} variables]",
			self.vartype,
			self.len(),
			self.num_samples(),
			self.variables.len()
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn edge() -> BinaryQuadraticModel<usize> {
		BinaryQuadraticModel::new(vec![], vec![((0, 1), 1.0)], 0.0, Vartype::Spin).unwrap()
	}

	#[test]
	fn energies_come_from_the_model() {
		let states = vec![
			BinaryRepr::from_vec(&[true, true]),
			BinaryRepr::from_vec(&[true, false]),
			BinaryRepr::from_vec(&[false, true]),
		];
		let set = SampleSet::from_states(&edge(), states);
		assert_eq!(set.energies(), vec![1.0, -1.0, -1.0]);
		assert_eq!(set.first().unwrap().state, BinaryRepr::from_vec(&[true, false]));
		assert_eq!(set.lowest().len(), 2);
	}

	#[test]
	fn aggregate_sums_occurrences() {
		let states = vec![
			BinaryRepr::from_vec(&[true, false]),
			BinaryRepr::from_vec(&[true, true]),
			BinaryRepr::from_vec(&[true, false]),
		];
		let set = SampleSet::from_states(&edge(), states).aggregate();
		assert_eq!(set.len(), 2);
		assert_eq!(set.num_samples(), 3);
		assert_eq!(set.iter().next().unwrap().num_occurrences, 2);
	}

	#[test]
	fn assignment_uses_domain_values() {
		let set = SampleSet::from_states(&edge(), vec![BinaryRepr::from_vec(&[false, true])]);
		let a = set.assignment(set.first().unwrap());
		assert_eq!(a[&0], -1);
		assert_eq!(a[&1], 1);
		let b = set.change_vartype(Vartype::Binary);
		assert_eq!(b.assignment(b.first().unwrap())[&0], 0);
	}

	#[test]
	fn display_sorts_by_energy() {
		let states = vec![
			BinaryRepr::from_vec(&[true, true]),
			BinaryRepr::from_vec(&[false, true]),
		];
		let set = SampleSet::from_states(&edge(), states);
		let text = set.to_string();
		let lines = text.lines().collect::<Vec<_>>();
		assert_eq!(lines[0], "   0  1 energy num_oc.");
		assert_eq!(lines[1], "0 -1 +1   -1.0       1");
		assert_eq!(lines[2], "1 +1 +1    1.0       1");
		assert_eq!(lines[3], "['SPIN', 2 rows, 2 samples, 2 variables]");
	}
}
