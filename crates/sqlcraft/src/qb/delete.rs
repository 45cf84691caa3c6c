//! DELETE builder.

use crate::cache::Cache;
use crate::client::Executor;
use crate::db::Db;
use crate::error::CraftResult;
use crate::qb::expr::Expr;
use crate::qb::param::Parameters;
use crate::qb::table::Table;
use crate::qb::traits::{SqlNode, Statement, StatementKind, write_where};

/// DELETE builder with AND-joined WHERE predicates.
///
/// Without any predicate the statement removes every row of the table.
#[derive(Clone, Debug)]
pub struct Delete {
    table: Table,
    conditions: Vec<Expr>,
}

impl Delete {
    /// Create a new DELETE builder.
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            conditions: Vec::new(),
        }
    }

    /// Add a WHERE predicate.
    pub fn filter(mut self, condition: impl Into<Expr>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Run the statement and return the number of deleted rows.
    pub async fn execute<E, C>(&self, db: &Db<E, C>) -> CraftResult<u64>
    where
        E: Executor,
        C: Cache,
    {
        let built = self.build()?;
        db.execute(&built).await
    }
}

impl SqlNode for Delete {
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()> {
        if self.table.is_aliased() {
            out.push_str("delete ");
            self.table.write_ref(out);
            out.push_str("\nfrom ");
            self.table.write_sql(out, params)?;
        } else {
            out.push_str("delete from ");
            self.table.write_name(out);
        }
        write_where(out, params, &self.conditions)
    }
}

impl Statement for Delete {
    const KIND: StatementKind = StatementKind::Delete;
}
