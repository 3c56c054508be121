//! Problem encoding of SAPI's `qp` format.
use crate::{ApiError, Result};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ProblemData {
	Qp { lin: String, quad: String, offset: f64 },
}

fn to_le_bytes(values: &[f64]) -> Vec<u8> {
	values.iter().flat_map(|f| f.to_le_bytes().to_vec()).collect()
}

/// Encode an Ising (or QUBO) problem for a solver with the given working
/// graph.
///
/// `lin` holds one value per working qubit in `qubits` order: the bias, `0.0`
/// for a qubit only used by couplings and NaN for an unused qubit. `quad`
/// holds one value per coupler in `couplers` order whose two qubits are both
/// used. Couplings given on `(u, v)` and `(v, u)` are summed.
pub fn encode_qp(
	qubits: &[usize],
	couplers: &[(usize, usize)],
	h: &BTreeMap<usize, f64>,
	j: &BTreeMap<(usize, usize), f64>,
	offset: f64,
) -> Result<ProblemData> {
	let qubit_set = qubits.iter().copied().collect::<BTreeSet<_>>();
	let coupler_set = couplers
		.iter()
		.map(|&(u, v)| (u.min(v), u.max(v)))
		.collect::<BTreeSet<_>>();
	let mut active = BTreeSet::new();
	for q in h.keys() {
		if !qubit_set.contains(q) {
			return Err(ApiError::Problem(format!("qubit {} is not a working qubit", q)));
		}
		active.insert(*q);
	}
	let mut quadratic: BTreeMap<(usize, usize), f64> = BTreeMap::new();
	for (&(u, v), bias) in j.iter() {
		let key = (u.min(v), u.max(v));
		if u == v || !coupler_set.contains(&key) {
			return Err(ApiError::Problem(format!(
				"coupler ({}, {}) is not a working coupler",
				u, v
			)));
		}
		*quadratic.entry(key).or_insert(0.0) += *bias;
		active.insert(u);
		active.insert(v);
	}
	let lin = qubits
		.iter()
		.map(|q| match h.get(q) {
			Some(b) => *b,
			None if active.contains(q) => 0.0,
			None => f64::NAN,
		})
		.collect::<Vec<_>>();
	let quad = couplers
		.iter()
		.map(|&(u, v)| (u.min(v), u.max(v)))
		.filter(|(u, v)| active.contains(u) && active.contains(v))
		.map(|key| quadratic.get(&key).copied().unwrap_or(0.0))
		.collect::<Vec<_>>();
	Ok(ProblemData::Qp {
		lin: base64::encode(&to_le_bytes(&lin)),
		quad: base64::encode(&to_le_bytes(&quad)),
		offset,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn floats(s: &str) -> Vec<f64> {
		base64::decode(s)
			.unwrap()
			.chunks(8)
			.map(|c| {
				let mut b = [0u8; 8];
				b.copy_from_slice(c);
				f64::from_le_bytes(b)
			})
			.collect()
	}

	#[test]
	fn lin_marks_unused_qubits() {
		let qubits = [0, 1, 4, 5];
		let couplers = [(0, 4), (1, 4), (0, 5), (1, 5)];
		let mut h = BTreeMap::new();
		h.insert(0, 0.5);
		let mut j = BTreeMap::new();
		j.insert((4, 1), 1.0);
		j.insert((1, 4), 0.5);
		let ProblemData::Qp { lin, quad, offset } = encode_qp(&qubits, &couplers, &h, &j, 0.0).unwrap();
		let lin = floats(&lin);
		assert_eq!(lin[0], 0.5);
		assert_eq!(lin[1], 0.0);
		assert_eq!(lin[2], 0.0);
		assert!(lin[3].is_nan());
		// (0, 4): both active, no bias; (1, 4): summed
		assert_eq!(floats(&quad), vec![0.0, 1.5]);
		assert_eq!(offset, 0.0);
	}

	#[test]
	fn rejects_missing_hardware() {
		let qubits = [0, 1];
		let couplers = [(0, 1)];
		let mut h = BTreeMap::new();
		h.insert(2, 1.0);
		assert!(matches!(
			encode_qp(&qubits, &couplers, &h, &BTreeMap::new(), 0.0),
			Err(ApiError::Problem(_))
		));
		let mut j = BTreeMap::new();
		j.insert((0, 0), 1.0);
		assert!(encode_qp(&qubits, &couplers, &BTreeMap::new(), &j, 0.0).is_err());
	}

	#[test]
	fn serializes_with_format_tag() {
		let data = encode_qp(&[0], &[], &BTreeMap::new(), &BTreeMap::new(), 1.0).unwrap();
		let json = serde_json::to_value(&data).unwrap();
		assert_eq!(json["format"], "qp");
		assert_eq!(json["offset"], 1.0);
	}
}
