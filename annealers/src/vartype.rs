use std::fmt;
use std::str::FromStr;

/// Domain of the variables of a model.
///
/// A state bit `true` stands for `+1` in the spin domain and `1` in the
/// binary domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vartype {
	/// Variables take values in {-1, +1}.
	Spin,
	/// Variables take values in {0, 1}.
	Binary,
}

impl Vartype {
	#[inline]
	pub fn value(self, b: bool) -> i8 {
		match (self, b) {
			(_, true) => 1,
			(Vartype::Spin, false) => -1,
			(Vartype::Binary, false) => 0,
		}
	}

	/// Inverse of [`Vartype::value`]. Returns `None` for values outside the
	/// domain.
	#[inline]
	pub fn from_value(self, v: i8) -> Option<bool> {
		match (self, v) {
			(_, 1) => Some(true),
			(Vartype::Spin, -1) | (Vartype::Binary, 0) => Some(false),
			_ => None,
		}
	}

	pub fn other(self) -> Self {
		match self {
			Vartype::Spin => Vartype::Binary,
			Vartype::Binary => Vartype::Spin,
		}
	}

	/// Column rendering used by the sample set printer.
	pub(crate) fn render(self, b: bool) -> &'static str {
		match (self, b) {
			(Vartype::Spin, true) => "+1",
			(Vartype::Spin, false) => "-1",
			(Vartype::Binary, true) => "1",
			(Vartype::Binary, false) => "0",
		}
	}
}

impl fmt::Display for Vartype {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Vartype::Spin => "SPIN",
			Vartype::Binary => "BINARY",
		})
	}
}

impl FromStr for Vartype {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, String> {
		match s.to_ascii_uppercase().as_str() {
			"SPIN" => Ok(Vartype::Spin),
			"BINARY" => Ok(Vartype::Binary),
			o => Err(format!("unknown vartype {}", o)),
		}
	}
}

#[test]
fn vartype_values() {
	assert_eq!(Vartype::Spin.value(false), -1);
	assert_eq!(Vartype::Binary.value(false), 0);
	assert_eq!(Vartype::Spin.from_value(0), None);
	assert_eq!(Vartype::Binary.from_value(1), Some(true));
	assert_eq!("spin".parse::<Vartype>(), Ok(Vartype::Spin));
	assert_eq!(Vartype::Binary.to_string(), "BINARY");
}
