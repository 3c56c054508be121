use crate::error::ModelError;
use crate::variable::Label;

/// Unordered pair of distinct variables, the key of a coupling.
///
/// The smaller label is always stored first, so `(u, v)` and `(v, u)` name
/// the same interaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interaction<V>(V, V);

impl<V: Label> Interaction<V> {
	pub fn new(u: V, v: V) -> Result<Self, ModelError> {
		if u == v {
			return Err(ModelError::SelfLoop(u.to_string()));
		}
		Ok(if u < v { Self(u, v) } else { Self(v, u) })
	}

	#[inline]
	pub fn first(&self) -> &V {
		&self.0
	}

	#[inline]
	pub fn second(&self) -> &V {
		&self.1
	}

	#[inline]
	pub fn contains(&self, v: &V) -> bool {
		&self.0 == v || &self.1 == v
	}

	/// The other end of the interaction, if `v` is one of its ends.
	pub fn other(&self, v: &V) -> Option<&V> {
		if &self.0 == v {
			Some(&self.1)
		} else if &self.1 == v {
			Some(&self.0)
		} else {
			None
		}
	}

	pub fn into_pair(self) -> (V, V) {
		(self.0, self.1)
	}
}

#[test]
fn interaction_is_unordered() {
	assert_eq!(Interaction::new(3, 1).unwrap(), Interaction::new(1, 3).unwrap());
	assert_eq!(Interaction::new(3, 1).unwrap().into_pair(), (1, 3));
	assert_eq!(Interaction::new(1, 3).unwrap().other(&3), Some(&1));
	assert!(Interaction::new(2, 2).is_err());
}
