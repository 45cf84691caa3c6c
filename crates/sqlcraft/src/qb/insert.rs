//! INSERT builder with same-round-trip identity retrieval.

use crate::cache::Cache;
use crate::client::Executor;
use crate::db::Db;
use crate::error::{CraftError, CraftResult};
use crate::qb::expr::Expr;
use crate::qb::param::Parameters;
use crate::qb::table::{Column, Table};
use crate::qb::traits::{SqlNode, Statement, StatementKind};

/// Statement appended to every INSERT so the new row's key comes back with it.
pub const IDENTITY_QUERY: &str = "SELECT @@IDENTITY AS ix;";

/// Field holding the generated identity in the result row.
pub const IDENTITY_FIELD: &str = "ix";

/// A `column = value` pair used by INSERT and UPDATE.
#[derive(Clone, Debug)]
pub(crate) struct Assignment {
    pub(crate) column: Column,
    pub(crate) value: Expr,
}

/// INSERT builder.
///
/// ```ignore
/// let people = Table::new("People");
/// let id = insert(&people)
///     .set(people.col("name"), "Ada")
///     .set(people.col("age"), 36)
///     .execute(&db)
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct Insert {
    /// Target table
    table: Table,
    /// Column/value pairs in call order
    assignments: Vec<Assignment>,
}

impl Insert {
    /// Create a new INSERT builder.
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            assignments: Vec::new(),
        }
    }

    /// Assign a value to a column.
    pub fn set(mut self, column: Column, value: impl Into<Expr>) -> Self {
        self.assignments.push(Assignment {
            column,
            value: value.into(),
        });
        self
    }

    /// Assign a value only when present.
    pub fn set_opt<T: Into<Expr>>(self, column: Column, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Target table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Run the statement and return the generated identity.
    pub async fn execute<E, C>(&self, db: &Db<E, C>) -> CraftResult<i64>
    where
        E: Executor,
        C: Cache,
    {
        let built = self.build()?;
        let rows = db.fetch_uncached(&built).await?;
        let row = rows
            .first()
            .ok_or_else(|| CraftError::not_found("INSERT returned no identity row"))?;
        row.try_get::<i64>(IDENTITY_FIELD)
    }
}

impl SqlNode for Insert {
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()> {
        if self.assignments.is_empty() {
            return Err(CraftError::EmptyAssignments("INSERT"));
        }

        out.push_str("insert into ");
        self.table.write_name(out);

        out.push_str("\n (");
        for (i, a) in self.assignments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            a.column.write_bare(out);
        }
        out.push_str(") \nVALUES (");
        for (i, a) in self.assignments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            a.value.write_sql(out, params)?;
        }
        out.push_str(");");
        out.push_str(IDENTITY_QUERY);
        Ok(())
    }
}

impl Statement for Insert {
    const KIND: StatementKind = StatementKind::Insert;
}
