use rand::prelude::*;

/// Packed state of a set of two-valued variables, one bit per variable.
///
/// Bits past `len()` are kept zero, so two states compare and hash equal
/// exactly when every variable agrees.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinaryRepr {
	state: Vec<u8>,
	len: usize,
}

static BITVALUES: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];
const BYTESIZE: usize = 8;

impl BinaryRepr {
	/// All bits `false`.
	pub fn new(len: usize) -> Self {
		Self {
			state: vec![0; (len + BYTESIZE - 1) / BYTESIZE],
			len,
		}
	}

	#[inline]
	pub fn new_random<T: Rng>(len: usize, r: &mut T) -> Self {
		let mut ret = Self::new(len);
		r.fill_bytes(&mut ret.state);
		ret.clear_tail();
		ret
	}

	pub fn from_vec(v: &[bool]) -> Self {
		let mut ret = Self::new(v.len());
		for (i, b) in v.iter().enumerate() {
			ret.set(i, *b);
		}
		ret
	}

	/// Bit `i` of the state is bit `i` of `bits`. Only the low `len` bits are
	/// used.
	pub fn from_bits(len: usize, bits: u64) -> Self {
		assert!(len <= 64);
		let mut ret = Self::new(len);
		for (i, byte) in ret.state.iter_mut().enumerate() {
			*byte = (bits >> (i * BYTESIZE)) as u8;
		}
		ret.clear_tail();
		ret
	}

	pub fn to_vec(&self) -> Vec<bool> {
		self.iter().collect()
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	#[inline]
	pub fn get(&self, loc: usize) -> bool {
		assert!(loc < self.len());
		unsafe { self.get_unchecked(loc) }
	}

	#[inline]
	pub fn set(&mut self, loc: usize, val: bool) {
		assert!(loc < self.len);
		unsafe { self.set_unchecked(loc, val) }
	}

	/// # Safety
	/// Given loc is less than len()
	#[inline]
	pub unsafe fn set_unchecked(&mut self, loc: usize, val: bool) {
		if val {
			*self.state.get_unchecked_mut(loc / BYTESIZE) |= BITVALUES[loc % BYTESIZE];
		} else {
			*self.state.get_unchecked_mut(loc / BYTESIZE) &= !BITVALUES[loc % BYTESIZE];
		}
	}

	/// # Safety
	/// Given loc is less than len()
	#[inline]
	pub unsafe fn get_unchecked(&self, loc: usize) -> bool {
		(self.state.get_unchecked(loc / BYTESIZE) & BITVALUES.get_unchecked(loc % BYTESIZE)) > 0
	}

	#[inline]
	pub fn flip(&mut self, loc: usize) {
		assert!(loc < self.len());
		unsafe { self.flip_unchecked(loc) }
	}

	/// # Safety
	/// Given loc is less than len()
	#[inline]
	pub unsafe fn flip_unchecked(&mut self, loc: usize) {
		*self.state.get_unchecked_mut(loc / BYTESIZE) ^= BITVALUES.get_unchecked(loc % BYTESIZE);
	}

	/// Number of `true` bits.
	pub fn count_ones(&self) -> usize {
		self.state.iter().map(|b| b.count_ones() as usize).sum()
	}

	pub fn iter(&self) -> BinaryReprIter<'_> {
		BinaryReprIter(self, 0)
	}

	fn clear_tail(&mut self) {
		let rem = self.len % BYTESIZE;
		if rem != 0 {
			if let Some(last) = self.state.last_mut() {
				*last &= BITVALUES[rem] - 1;
			}
		}
	}
}

pub struct BinaryReprIter<'a>(&'a BinaryRepr, usize);

impl<'a> Iterator for BinaryReprIter<'a> {
	type Item = bool;
	fn next(&mut self) -> Option<bool> {
		if self.1 < self.0.len() {
			let b = unsafe { self.0.get_unchecked(self.1) };
			self.1 += 1;
			Some(b)
		} else {
			None
		}
	}
}

impl std::ops::Index<usize> for BinaryRepr {
	type Output = bool;
	fn index(&self, loc: usize) -> &bool {
		if self.get(loc) {
			&crate::TRUE_VAL
		} else {
			&crate::FALSE_VAL
		}
	}
}

impl std::fmt::Debug for BinaryRepr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for b in self.iter() {
			f.write_str(if b { "1" } else { "0" })?;
		}
		Ok(())
	}
}
