use crate::error::{Error, Result};
use annealers::error::ModelError;
use annealers::variable::Label;
use std::collections::{BTreeMap, BTreeSet};

/// Undirected weighted graph. Each edge is stored once, smaller endpoint
/// first; parallel edges add up.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph<V: Label = usize> {
	vertices: BTreeSet<V>,
	edges: BTreeMap<(V, V), f64>,
}

impl<V: Label> Graph<V> {
	/// Graph whose vertices are the endpoints of `edges`.
	pub fn from_edges<E>(edges: E) -> Result<Self>
	where
		E: IntoIterator<Item = ((V, V), f64)>,
	{
		let mut ret = Self {
			vertices: BTreeSet::new(),
			edges: BTreeMap::new(),
		};
		for ((u, v), w) in edges {
			ret.vertices.insert(u.clone());
			ret.vertices.insert(v.clone());
			ret.add_edge(u, v, w)?;
		}
		Ok(ret)
	}

	/// Graph over `vertices`; every edge must join two of them.
	pub fn with_vertices<N, E>(vertices: N, edges: E) -> Result<Self>
	where
		N: IntoIterator<Item = V>,
		E: IntoIterator<Item = ((V, V), f64)>,
	{
		let mut ret = Self {
			vertices: vertices.into_iter().collect(),
			edges: BTreeMap::new(),
		};
		for ((u, v), w) in edges {
			for x in [&u, &v].iter() {
				if !ret.vertices.contains(*x) {
					return Err(Error::UndeclaredVertex(x.to_string()));
				}
			}
			ret.add_edge(u, v, w)?;
		}
		Ok(ret)
	}

	fn add_edge(&mut self, u: V, v: V, w: f64) -> Result<()> {
		if u == v {
			return Err(ModelError::SelfLoop(u.to_string()).into());
		}
		let key = if u < v { (u, v) } else { (v, u) };
		*self.edges.entry(key).or_insert(0.0) += w;
		Ok(())
	}

	pub fn vertices(&self) -> impl Iterator<Item = &V> {
		self.vertices.iter()
	}

	pub fn edges(&self) -> impl Iterator<Item = (&V, &V, f64)> {
		self.edges.iter().map(|((u, v), w)| (u, v, *w))
	}

	pub fn num_vertices(&self) -> usize {
		self.vertices.len()
	}

	pub fn num_edges(&self) -> usize {
		self.edges.len()
	}

	pub fn total_weight(&self) -> f64 {
		self.edges.values().sum()
	}

	/// Weight of the edges whose endpoints get different values.
	pub fn cut_weight(&self, assignment: &BTreeMap<V, i8>) -> Result<f64> {
		let value = |v: &V| {
			assignment
				.get(v)
				.copied()
				.ok_or_else(|| Error::from(ModelError::MissingVariable(v.to_string())))
		};
		let mut cut = 0.0;
		for ((u, v), w) in self.edges.iter() {
			if value(u)? != value(v)? {
				cut += *w;
			}
		}
		Ok(cut)
	}
}

impl Graph<usize> {
	/// Two vertices joined by one edge.
	pub fn single_edge() -> Self {
		Self {
			vertices: (0..2).collect(),
			edges: vec![((0, 1), 1.0)].into_iter().collect(),
		}
	}

	/// Five vertices: the triangle 0-1-2 and the square 1-3-4-2, sharing the
	/// edge (1, 2).
	pub fn triangle_and_square() -> Self {
		Self {
			vertices: (0..5).collect(),
			edges: vec![(0, 1), (0, 2), (1, 2), (1, 3), (2, 4), (3, 4)]
				.into_iter()
				.map(|e| (e, 1.0))
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fixtures() {
		let g = Graph::single_edge();
		assert_eq!(g.num_vertices(), 2);
		assert_eq!(g.edges().collect::<Vec<_>>(), vec![(&0, &1, 1.0)]);
		let g = Graph::triangle_and_square();
		assert_eq!(g.num_vertices(), 5);
		assert_eq!(g.num_edges(), 6);
		assert!(g.edges().all(|(_, _, w)| w == 1.0));
		assert_eq!(g.total_weight(), 6.0);
	}

	#[test]
	fn undeclared_vertex() {
		let r = Graph::with_vertices(vec![0, 1], vec![((0, 1), 1.0), ((1, 2), 1.0)]);
		assert!(matches!(r, Err(Error::UndeclaredVertex(v)) if v == "2"));
	}

	#[test]
	fn edges_are_undirected() {
		let g = Graph::from_edges(vec![(("b", "a"), 1.0), (("a", "b"), 0.5)]).unwrap();
		assert_eq!(g.num_edges(), 1);
		assert_eq!(g.edges().next(), Some((&"a", &"b", 1.5)));
		assert!(matches!(
			Graph::from_edges(vec![((1, 1), 1.0)]),
			Err(Error::Model(ModelError::SelfLoop(_)))
		));
	}

	#[test]
	fn cut_weight_counts_split_edges() {
		let g = Graph::triangle_and_square();
		let a: BTreeMap<usize, i8> = vec![(0, 1), (1, -1), (2, 1), (3, 1), (4, -1)].into_iter().collect();
		// split: (0,1), (1,2), (1,3), (2,4), (3,4)
		assert_eq!(g.cut_weight(&a).unwrap(), 5.0);
		let mut b = a.clone();
		b.remove(&4);
		assert!(g.cut_weight(&b).is_err());
	}
}
