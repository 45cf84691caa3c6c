//! SELECT query builder and renderer.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::cache::Cache;
use crate::client::Executor;
use crate::db::Db;
use crate::error::{CraftError, CraftResult};
use crate::qb::expr::{Expr, Selectable};
use crate::qb::param::Parameters;
use crate::qb::table::{Join, Joinable, Table};
use crate::qb::traits::{SqlNode, Statement, StatementKind, write_separated, write_where};
use crate::row::{FromRow, Row};

/// SELECT builder.
///
/// Clauses accumulate in call order and render in a fixed order:
///
/// ```text
/// (select [top N] <columns>
/// from <source>
/// where <filters joined with and>
/// union <query>...
/// group by <expressions>
/// )
/// order by <expressions>
/// ```
///
/// `order by` sits outside the closing parenthesis so it sorts the combined
/// result of every unioned branch.
#[derive(Clone, Debug, Default)]
pub struct Query {
    /// SELECT list; empty renders `*`
    columns: Vec<Selectable>,
    /// FROM source
    from: Option<Joinable>,
    /// Base table of the first FROM, used to resolve bare-name join conditions
    root: Option<Table>,
    /// Joins added before any FROM was set
    pending_joins: Vec<Join>,
    /// WHERE predicates
    conditions: Vec<Expr>,
    /// GROUP BY
    group_by: Vec<Expr>,
    /// ORDER BY
    order_by: Vec<Expr>,
    /// TOP; 0 means unlimited
    limit: u64,
    /// UNION branches
    unions: Vec<Query>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table bare-name join conditions are resolved against.
    pub fn root(&self) -> Option<&Table> {
        self.root.as_ref()
    }

    /// The current FROM source.
    pub fn source(&self) -> Option<&Joinable> {
        self.from.as_ref()
    }

    // ==================== SELECT list ====================

    /// Append columns to the SELECT list.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selectable>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append one column to the SELECT list.
    pub fn column(mut self, column: impl Into<Selectable>) -> Self {
        self.columns.push(column.into());
        self
    }

    // ==================== FROM / JOIN ====================

    /// Set the FROM source.
    ///
    /// The first call fixes the root table. Joins queued before a source existed
    /// are attached now, in the order they were added.
    pub fn from(mut self, source: impl Into<Joinable>) -> Self {
        let source = source.into();
        if self.root.is_none() {
            self.root = Some(source.base_table().clone());
        }
        self.from = Some(source);

        for join in std::mem::take(&mut self.pending_joins) {
            self = self.join(join);
        }
        self
    }

    /// Inner-join onto the current source. The prior source becomes the left side.
    pub fn join(mut self, join: Join) -> Self {
        match (self.from.take(), &self.root) {
            (Some(left), Some(root)) => {
                self.from = Some(Joinable::from(join.attach(left, root)));
            }
            (left, _) => {
                self.from = left;
                self.pending_joins.push(join);
            }
        }
        self
    }

    /// Left-outer-join onto the current source.
    pub fn outer_join(self, join: Join) -> Self {
        self.join(join.outer())
    }

    // ==================== WHERE ====================

    /// Add a WHERE predicate, AND-ed with the others.
    pub fn filter(mut self, condition: impl Into<Expr>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Add several WHERE predicates.
    pub fn filter_all<I, E>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.conditions.extend(conditions.into_iter().map(Into::into));
        self
    }

    /// Add `exists (<query>)` as a WHERE predicate.
    pub fn where_exists(self, query: Query) -> Self {
        self.filter(Expr::exists(query))
    }

    // ==================== GROUP / ORDER / TOP ====================

    /// Append GROUP BY expressions.
    pub fn group_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.group_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Append ORDER BY expressions. Use [`Expr::desc`] for descending order.
    pub fn order_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.order_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Set the row limit (`top N`). Zero removes it.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = n;
        self
    }

    // ==================== UNION / composition ====================

    /// Append a UNION branch.
    pub fn union(mut self, other: Query) -> Self {
        self.unions.push(other);
        self
    }

    /// Run a reusable transform over this query.
    ///
    /// ```ignore
    /// fn visible_only(q: Query) -> Query {
    ///     let posts = Table::new("Posts");
    ///     q.filter(posts.col("hidden").equals(false))
    /// }
    ///
    /// let q = select([posts.all()]).from(&posts).apply(visible_only);
    /// ```
    pub fn apply<F>(self, transform: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        transform(self)
    }

    /// Use this query as a scalar or set subquery: `(<query>)`.
    pub fn into_expr(self) -> Expr {
        Expr::subquery(self)
    }

    // ==================== Execution ====================

    /// Render and fetch all rows, consulting the database's cache first.
    pub async fn fetch_all<E, C>(&self, db: &Db<E, C>) -> CraftResult<Arc<Vec<Row>>>
    where
        E: Executor,
        C: Cache,
    {
        let built = self.build()?;
        db.fetch(&built).await
    }

    /// Render, fetch, and map every row to `T`.
    pub async fn fetch_as<T, E, C>(&self, db: &Db<E, C>) -> CraftResult<Vec<T>>
    where
        T: FromRow,
        E: Executor,
        C: Cache,
    {
        let rows = self.fetch_all(db).await?;
        rows.iter().map(T::from_row).collect()
    }
}

impl SqlNode for Query {
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()> {
        let from = self.from.as_ref().ok_or(CraftError::MissingFromClause)?;

        out.push_str("(select ");
        if self.limit > 0 {
            let _ = write!(out, "top {} ", self.limit);
        }
        if self.columns.is_empty() {
            out.push('*');
        } else {
            write_separated(out, params, &self.columns, ", ")?;
        }

        out.push_str("\nfrom ");
        from.write_sql(out, params)?;

        write_where(out, params, &self.conditions)?;

        for union in &self.unions {
            out.push_str("\nunion ");
            union.write_sql(out, params)?;
        }

        if !self.group_by.is_empty() {
            out.push_str("\ngroup by ");
            write_separated(out, params, &self.group_by, ", ")?;
        }

        out.push_str("\n)");

        if !self.order_by.is_empty() {
            out.push_str("\norder by ");
            write_separated(out, params, &self.order_by, ", ")?;
        }

        Ok(())
    }
}

impl Statement for Query {
    const KIND: StatementKind = StatementKind::Select;
}

impl From<Query> for Expr {
    fn from(query: Query) -> Self {
        Expr::subquery(query)
    }
}
