//! Structured backend for anvil queries.
//!
//! [`CriteriaCompiler`] turns a [`Query`](anvil_core::Query) into an object
//! graph of roots, joins, predicates and selections that an engine walks
//! directly. [`MemorySession`] evaluates single-root graphs over in-process
//! records.

pub mod compiler;
pub mod memory;
pub mod nodes;
pub mod session;

pub use compiler::{CriteriaCompiler, compile};
pub use memory::{MemorySession, Record};
pub use nodes::{
    Comparison, CriteriaQuery, Expression, FetchNode, JoinNode, JoinTarget, OrderNode, Path,
    Predicate, SelectItem, Selection, Source, TypedQuery,
};
pub use session::{CriteriaBackend, CriteriaSession};
