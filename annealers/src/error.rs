use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
	#[error("variable {0} cannot interact with itself")]
	SelfLoop(String),
	#[error("variable {0} is missing from the assignment")]
	MissingVariable(String),
	#[error("value {value} of variable {variable} is not in the {vartype} domain")]
	InvalidValue {
		variable: String,
		value: i8,
		vartype: crate::vartype::Vartype,
	},
}
