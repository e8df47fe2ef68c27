//! Execution facade over a compiled backend.
//!
//! A [`Finder`] owns a query and borrows an [`Executor`]; every operation
//! compiles a fresh variant of the query, so count and data lookups never
//! see each other's limit or projection changes.

use serde::de::DeserializeOwned;

use crate::error::{AnvilError, Result};
use crate::expressions::Operator;
use crate::page::Page;
use crate::query::{Conditional, Query};
use crate::row::Row;
use crate::value::Value;

/// Compiles a query with one backend and runs it against an engine
pub trait Executor {
    fn fetch(&self, query: &Query) -> Result<Vec<Row>>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn fetch(&self, query: &Query) -> Result<Vec<Row>> {
        (**self).fetch(query)
    }
}

pub struct Finder<'s, E: Executor + ?Sized> {
    query: Query,
    session: Option<&'s E>,
}

impl<'s, E: Executor + ?Sized> Finder<'s, E> {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            session: None,
        }
    }

    /// Attaches the execution context
    pub fn session(mut self, session: &'s E) -> Self {
        self.session = Some(session);
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    fn executor(&self) -> Result<&'s E> {
        self.session
            .ok_or_else(|| AnvilError::Configuration("session is not set".into()))
    }

    fn rows(&self, query: &Query) -> Result<Vec<Row>> {
        self.executor()?.fetch(query)
    }

    /// All matching rows
    pub fn get<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let rows = self.rows(&self.query)?;
        crate::anvil_trace_exec!("get", rows.len());
        rows.iter().map(Row::deserialize).collect()
    }

    /// First matching row, fetched with a limit of one
    pub fn find_first<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let query = self.query.paged(Some(1), self.query.offset_value());
        let rows = self.rows(&query)?;
        crate::anvil_trace_exec!("find_first", rows.len());
        rows.first().map(Row::deserialize).transpose()
    }

    /// First row with `field = value` added to the filters
    pub fn find_first_by<T: DeserializeOwned>(
        &self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<T>> {
        let query = self
            .query
            .clone()
            .where_op(field, Operator::Equal, value)
            .paged(Some(1), self.query.offset_value());
        let rows = self.rows(&query)?;
        rows.first().map(Row::deserialize).transpose()
    }

    /// Number of rows matching the filters and joins
    pub fn count_results(&self) -> Result<u64> {
        let rows = self.rows(&self.query.count_query())?;
        crate::anvil_trace_exec!("count", rows.len());
        match rows.as_slice() {
            [] => Ok(0),
            [row] => row.deserialize(),
            rows => Err(AnvilError::Mapping(format!(
                "count returned {} rows, expected one",
                rows.len()
            ))),
        }
    }

    pub fn exist(&self) -> Result<bool> {
        Ok(self.count_results()? > 0)
    }

    /// Counts the unpaged query, then fetches `limit` rows starting at `offset`
    pub fn page<T: DeserializeOwned>(&self, limit: u64, offset: u64) -> Result<Page<T>> {
        let total = self.count_results()?;
        let rows = self.rows(&self.query.paged(Some(limit), Some(offset)))?;
        crate::anvil_trace_exec!("page", rows.len());
        let data = rows.iter().map(Row::deserialize).collect::<Result<Vec<T>>>()?;
        Ok(Page {
            data,
            offset,
            limit,
            total,
        })
    }

    /// Rows of a projection-only query, in the caller's result shape
    pub fn find_for<R: DeserializeOwned>(&self) -> Result<Vec<R>> {
        self.require_projection()?;
        self.get()
    }

    /// First row of a projection-only query; [`AnvilError::NotFound`] when empty
    pub fn find_first_for<R: DeserializeOwned>(&self) -> Result<R> {
        self.require_projection()?;
        self.find_first()?.ok_or(AnvilError::NotFound)
    }

    fn require_projection(&self) -> Result<()> {
        if self.query.selects().is_empty() {
            return Err(AnvilError::query("at least one select is required"));
        }
        Ok(())
    }
}

impl Query {
    /// Wraps the query in a [`Finder`] without a session
    pub fn finder<'s, E: Executor + ?Sized>(self) -> Finder<'s, E> {
        Finder::new(self)
    }

    pub fn with_session<'s, E: Executor + ?Sized>(self, session: &'s E) -> Finder<'s, E> {
        Finder::new(self).session(session)
    }
}
