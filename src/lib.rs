//! Domain-agnostic iterative forward search framework.
//!
//! Provides the machinery for building constraint-based local search
//! solvers (timetabling, sectioning, resource assignment): values are
//! assigned to variables one move at a time, hard constraints retract
//! whatever a new assignment conflicts with, and pluggable strategies
//! decide which move to make next.
//!
//! - **Model layer** ([`model`]): variables, values, constraints, conflict
//!   computation, and transactional assignment.
//! - **Solution layer** ([`solution`]): iteration bookkeeping and the
//!   best-assignment snapshot; [`solution::Neighbour`] describes one
//!   candidate move.
//! - **Standard selection** ([`standard`]): the greedy baseline — pick one
//!   variable, pick one value, propose the reassignment.
//! - **Backtracking selection** ([`backtrack`]): depth-bounded search that
//!   resolves the conflicts a candidate creates, returning the best joint
//!   reassignment found within depth/time/iteration budgets.
//! - **Round-robin selection** ([`roundrobin`]): rotates over registered
//!   strategies, advancing whenever the active one runs dry.
//! - **Branch-and-bound selection** ([`branchbound`]): schedules one
//!   entity's requests to a per-entity optimum without disturbing the
//!   rest of the assignment.
//!
//! # Architecture
//!
//! The crate contains no domain concepts — lectures, rooms, students,
//! exams are all defined by consumers, which plug in a value payload type
//! and [`model::Constraint`] implementations over it. An outer solver
//! loop (not part of this crate) drives a
//! [`selection::NeighbourSelection`] to convergence and decides when to
//! save or restore the best solution.
//!
//! All search is single-threaded and cooperative: strategies mutate the
//! model only in a strict commit/restore discipline around recursion, and
//! timeouts are polled, never preemptive. Independent solver instances
//! may run on separate threads as long as no model is shared.

pub mod backtrack;
pub mod branchbound;
pub mod config;
pub mod context;
pub mod model;
pub mod roundrobin;
pub mod selection;
pub mod solution;
pub mod standard;
