//! Core problem abstraction: variables, values, constraints, and the
//! model that ties them together.
//!
//! # Key Components
//!
//! - **Variables**: [`Variable`] — assignable slots with an ordered domain
//! - **Values**: [`Value`] — domain candidates carrying cost, penalty, and
//!   a consumer-defined payload
//! - **Constraints**: [`Constraint`] — relations that identify the
//!   assignments conflicting with a candidate value
//! - **Model**: [`Model`] — owner of all of the above, providing conflict
//!   computation and transactional assignment
//!
//! # Design
//!
//! Consumers describe their domain by choosing a value payload type and
//! implementing [`Constraint`] over it. The model supplies conflict
//! computation ([`Model::conflict_values`]), the total objective value,
//! and the transactional [`Model::assign`]/[`Model::unassign`] operations
//! all search strategies build on: assigning a value retracts every
//! conflicting assignment within the same transaction, so hard constraints
//! hold after every mutation.
//!
//! # References
//!
//! Müller (2005), "Constraint-based Timetabling", PhD thesis, Charles
//! University in Prague — the iterative forward search model layer.

mod constraint;
#[allow(clippy::module_inception)]
mod model;
mod variable;

pub use constraint::{ConflictSet, Constraint};
pub use model::{Model, ModelInfo};
pub use variable::{ConstraintId, Value, ValueId, Variable, VariableId};
