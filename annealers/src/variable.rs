use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Numeric type of biases and energies.
pub trait Real:
	Copy
	+ Clone
	+ Default
	+ Display
	+ Debug
	+ PartialEq
	+ PartialOrd
	+ Add<Self, Output = Self>
	+ AddAssign<Self>
	+ Mul<Self, Output = Self>
	+ MulAssign<Self>
	+ Div<Self, Output = Self>
	+ Sub<Self, Output = Self>
	+ SubAssign<Self>
	+ 'static
	+ Send
	+ Sync
	+ Sum
	+ Neg<Output = Self>
{
	const MAX: Self;
	const MIN: Self;
	fn as_f64(&self) -> f64;
	fn from_i32(i: i32) -> Self;
	fn from_f64(f: f64) -> Self;
	fn abs(self) -> Self;
	fn min(self, other: Self) -> Self;
	fn max(self, other: Self) -> Self;
	fn is_finite(self) -> bool;

	#[inline]
	fn zero() -> Self {
		Self::from_i32(0)
	}

	#[inline]
	fn one() -> Self {
		Self::from_i32(1)
	}
}

macro_rules! impl_real {
	($float:expr, $typ:ty) => {
		impl Real for $typ {
			const MAX: $typ = <$typ>::MAX;
			const MIN: $typ = <$typ>::MIN;

			#[inline]
			fn as_f64(&self) -> f64 {
				*self as f64
			}

			#[inline]
			fn from_i32(i: i32) -> Self {
				i as $typ
			}

			#[inline]
			fn from_f64(f: f64) -> Self {
				f as $typ
			}

			#[inline]
			fn abs(self) -> Self {
				<$typ>::abs(self)
			}

			#[inline]
			fn min(self, other: Self) -> Self {
				if other < self {
					other
				} else {
					self
				}
			}

			#[inline]
			fn max(self, other: Self) -> Self {
				if other > self {
					other
				} else {
					self
				}
			}

			#[inline]
			fn is_finite(self) -> bool {
				if $float {
					self.as_f64().is_finite()
				} else {
					true
				}
			}
		}
	};
}

impl_real!(true, f32);
impl_real!(true, f64);
impl_real!(false, i32);
impl_real!(false, i64);

/// Variable labels: graph vertices, qubit indices, names.
pub trait Label: Clone + Ord + Hash + Debug + Display + Send + Sync + 'static {}

impl<T> Label for T where T: Clone + Ord + Hash + Debug + Display + Send + Sync + 'static {}

/// Formats a bias the way the model printer expects (`1.0`, `-0.5`).
pub fn format_real<R: Real>(r: R) -> String {
	format!("{:?}", r.as_f64())
}
