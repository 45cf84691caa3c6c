//! Execution backend trait.

use std::future::Future;
use std::sync::Arc;

use crate::error::CraftResult;
use crate::qb::Parameters;
use crate::row::Row;

/// Runs rendered SQL against a database.
///
/// The core never opens connections or manages transactions; it hands the SQL
/// text and its [`Parameters`] to an implementation of this trait. Placeholders
/// in the text are named `@p0`, `@p1`, ... and every one of them has a value in
/// `params`.
///
/// Errors are returned to the caller unchanged.
pub trait Executor: Send + Sync {
    /// Run a statement that produces rows.
    fn query(
        &self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = CraftResult<Vec<Row>>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &Parameters) -> impl Future<Output = CraftResult<u64>> + Send;
}

impl<E: Executor> Executor for &E {
    fn query(
        &self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = CraftResult<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }

    fn execute(&self, sql: &str, params: &Parameters) -> impl Future<Output = CraftResult<u64>> + Send {
        (**self).execute(sql, params)
    }
}

impl<E: Executor> Executor for Arc<E> {
    fn query(
        &self,
        sql: &str,
        params: &Parameters,
    ) -> impl Future<Output = CraftResult<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }

    fn execute(&self, sql: &str, params: &Parameters) -> impl Future<Output = CraftResult<u64>> + Send {
        (**self).execute(sql, params)
    }
}
