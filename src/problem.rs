use crate::error::Result;
use crate::graph::Graph;
use annealers::model::BinaryQuadraticModel;
use annealers::variable::Label;
use annealers::vartype::Vartype;

/// Maximum cut of a weighted graph, as an Ising model.
///
/// With `s_v = ±1` marking the side of each vertex, an edge contributes
/// `w s_u s_v`: `-w` when cut, `+w` otherwise. Hence
/// `E = total_weight - 2 cut` and the ground states are the maximum cuts.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxCut<V: Label = usize> {
	graph: Graph<V>,
}

impl<V: Label> MaxCut<V> {
	pub fn new(graph: Graph<V>) -> Self {
		Self { graph }
	}

	pub fn graph(&self) -> &Graph<V> {
		&self.graph
	}

	/// Spin model with no linear biases, one coupling per edge and a zero
	/// offset.
	pub fn to_model(&self) -> Result<BinaryQuadraticModel<V>> {
		let mut model = BinaryQuadraticModel::empty(Vartype::Spin);
		for v in self.graph.vertices() {
			model.add_variable(v.clone(), 0.0);
		}
		for (u, v, w) in self.graph.edges() {
			model.add_interaction(u.clone(), v.clone(), w)?;
		}
		Ok(model)
	}

	/// Cut weight of a state of energy `energy`.
	pub fn cut_from_energy(&self, energy: f64) -> f64 {
		(self.graph.total_weight() - energy) / 2.0
	}
}
