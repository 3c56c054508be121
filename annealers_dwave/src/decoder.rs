//! Answer decoding of SAPI's `qp` format.
use crate::{ApiError, Result};
use annealers::repr::BinaryRepr;
use serde_json::Value;

/// `answer` object of a completed problem.
#[derive(Deserialize, Clone, Debug)]
pub struct QpAnswer {
	/// Base64 of little-endian i32 qubit indices.
	pub active_variables: String,
	/// Base64 of little-endian f64, one per sample.
	pub energies: String,
	/// Base64 of bit-packed samples, `ceil(active / 8)` bytes each.
	pub solutions: String,
	/// Base64 of little-endian i32, one per sample.
	#[serde(default)]
	pub num_occurrences: Option<String>,
	#[serde(default)]
	pub num_variables: Option<usize>,
	#[serde(default)]
	pub timing: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAnswer {
	pub active_variables: Vec<usize>,
	pub energies: Vec<f64>,
	/// A set bit is +1 for Ising problems and 1 for QUBOs.
	pub solutions: Vec<BinaryRepr>,
	pub num_occurrences: Vec<usize>,
	pub timing: Option<Value>,
}

/// Decode the `answer` value of a problem.
pub fn decode_answer(answer: &Value) -> Result<DecodedAnswer> {
	match answer.get("format").and_then(Value::as_str) {
		Some("qp") => (),
		Some(o) => return Err(ApiError::Decode(format!("unsupported answer format {}", o))),
		None => return Err(ApiError::Decode("answer format missing".to_owned())),
	}
	let answer: QpAnswer =
		serde_json::from_value(answer.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
	answer.decode()
}

fn chunks<const N: usize>(bytes: &[u8], what: &str) -> Result<Vec<[u8; N]>> {
	if bytes.len() % N != 0 {
		return Err(ApiError::Decode(format!(
			"{} has {} bytes, not a multiple of {}",
			what,
			bytes.len(),
			N
		)));
	}
	Ok(bytes
		.chunks(N)
		.map(|c| {
			let mut b = [0u8; N];
			b.copy_from_slice(c);
			b
		})
		.collect())
}

fn decode_i32(s: &str, what: &str) -> Result<Vec<i32>> {
	Ok(chunks::<4>(&base64::decode(s)?, what)?
		.into_iter()
		.map(i32::from_le_bytes)
		.collect())
}

fn decode_f64(s: &str, what: &str) -> Result<Vec<f64>> {
	Ok(chunks::<8>(&base64::decode(s)?, what)?
		.into_iter()
		.map(f64::from_le_bytes)
		.collect())
}

fn non_negative(v: Vec<i32>, what: &str) -> Result<Vec<usize>> {
	v.into_iter()
		.map(|i| {
			if i < 0 {
				Err(ApiError::Decode(format!("negative value {} in {}", i, what)))
			} else {
				Ok(i as usize)
			}
		})
		.collect()
}

impl QpAnswer {
	pub fn decode(&self) -> Result<DecodedAnswer> {
		let active_variables = non_negative(
			decode_i32(&self.active_variables, "active_variables")?,
			"active_variables",
		)?;
		let energies = decode_f64(&self.energies, "energies")?;
		let num_samples = energies.len();
		let n = active_variables.len();

		let bytes = base64::decode(&self.solutions)?;
		let row = (n + 7) / 8;
		if bytes.len() != row * num_samples {
			return Err(ApiError::Decode(format!(
				"solutions has {} bytes, expected {} samples of {} bytes",
				bytes.len(),
				num_samples,
				row
			)));
		}
		let solutions = (0..num_samples)
			.map(|s| {
				let packed = &bytes[s * row..(s + 1) * row];
				let mut state = BinaryRepr::new(n);
				for k in 0..n {
					// most significant bit first
					state.set(k, (packed[k / 8] >> (7 - k % 8)) & 1 == 1);
				}
				state
			})
			.collect::<Vec<_>>();

		let num_occurrences = match &self.num_occurrences {
			Some(s) => {
				let v = non_negative(decode_i32(s, "num_occurrences")?, "num_occurrences")?;
				if v.len() != num_samples {
					return Err(ApiError::Decode(format!(
						"{} occurrence counts for {} samples",
						v.len(),
						num_samples
					)));
				}
				v
			}
			None => vec![1; num_samples],
		};
		Ok(DecodedAnswer {
			active_variables,
			energies,
			solutions,
			num_occurrences,
			timing: self.timing.clone(),
		})
	}
}
