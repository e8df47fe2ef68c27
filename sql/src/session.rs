use anvil_core::{Executor, Query, Result, Row};

use crate::compiler::SqlCompiler;
use crate::statement::Statement;

/// Engine entry point for named-parameter statements
pub trait SqlSession {
    fn execute(&self, statement: &Statement) -> Result<Vec<Row>>;
}

impl<S: SqlSession + ?Sized> SqlSession for &S {
    fn execute(&self, statement: &Statement) -> Result<Vec<Row>> {
        (**self).execute(statement)
    }
}

/// [`Executor`] that compiles with the textual backend and runs on `S`
#[derive(Debug, Clone, Default)]
pub struct SqlBackend<S> {
    session: S,
    compiler: SqlCompiler,
}

impl<S: SqlSession> SqlBackend<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            compiler: SqlCompiler::new(),
        }
    }

    pub fn with_compiler(session: S, compiler: SqlCompiler) -> Self {
        Self { session, compiler }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn compiler(&self) -> &SqlCompiler {
        &self.compiler
    }
}

impl<S: SqlSession> Executor for SqlBackend<S> {
    fn fetch(&self, query: &Query) -> Result<Vec<Row>> {
        let statement = self.compiler.compile(query)?;
        self.session.execute(&statement)
    }
}
