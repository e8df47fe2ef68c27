use anvil_core::{Executor, Query, Result, Row};

use crate::compiler::CriteriaCompiler;
use crate::nodes::TypedQuery;

/// Engine entry point for compiled object graphs
pub trait CriteriaSession {
    fn list(&self, query: &TypedQuery) -> Result<Vec<Row>>;
}

impl<S: CriteriaSession + ?Sized> CriteriaSession for &S {
    fn list(&self, query: &TypedQuery) -> Result<Vec<Row>> {
        (**self).list(query)
    }
}

/// [`Executor`] that compiles with the structured backend and runs on `S`
#[derive(Debug, Clone, Default)]
pub struct CriteriaBackend<S> {
    session: S,
    compiler: CriteriaCompiler,
}

impl<S: CriteriaSession> CriteriaBackend<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            compiler: CriteriaCompiler::new(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }
}

impl<S: CriteriaSession> Executor for CriteriaBackend<S> {
    fn fetch(&self, query: &Query) -> Result<Vec<Row>> {
        let typed = self.compiler.compile(query)?;
        self.session.list(&typed)
    }
}
