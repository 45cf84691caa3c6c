//! UPDATE builder.

use crate::cache::Cache;
use crate::client::Executor;
use crate::db::Db;
use crate::error::{CraftError, CraftResult};
use crate::qb::expr::Expr;
use crate::qb::insert::Assignment;
use crate::qb::param::Parameters;
use crate::qb::table::{Column, Table};
use crate::qb::traits::{SqlNode, Statement, StatementKind, write_where};

/// UPDATE builder with AND-joined WHERE predicates.
#[derive(Clone, Debug)]
pub struct Update {
    /// Target table
    table: Table,
    /// SET pairs
    assignments: Vec<Assignment>,
    /// WHERE predicates
    conditions: Vec<Expr>,
}

impl Update {
    /// Create a new UPDATE builder.
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            assignments: Vec::new(),
            conditions: Vec::new(),
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

    /// Add a WHERE predicate.
    pub fn filter(mut self, condition: impl Into<Expr>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Run the statement and return the number of affected rows.
    pub async fn execute<E, C>(&self, db: &Db<E, C>) -> CraftResult<u64>
    where
        E: Executor,
        C: Cache,
    {
        let built = self.build()?;
        db.execute(&built).await
    }
}

impl SqlNode for Update {
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()> {
        if self.assignments.is_empty() {
            return Err(CraftError::EmptyAssignments("UPDATE"));
        }

        // an aliased target is named by its alias and bound in a FROM clause
        out.push_str("update ");
        self.table.write_ref(out);
        out.push_str("\nset ");
        for (i, a) in self.assignments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            a.column.write_bare(out);
            out.push_str(" = ");
            a.value.write_sql(out, params)?;
        }
        if self.table.is_aliased() {
            out.push_str("\nfrom ");
            self.table.write_sql(out, params)?;
        }

        write_where(out, params, &self.conditions)
    }
}

impl Statement for Update {
    const KIND: StatementKind = StatementKind::Update;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::expr::ExprExt;

    #[test]
    fn update_with_where() {
        let people = Table::new("People");
        let built = Update::new(&people)
            .set(people.col("name"), "Grace")
            .filter(people.col("id").equals(7))
            .build()
            .unwrap();
        assert_eq!(
            built.sql,
            "update \"People\"\nset \"name\" = @p0\nwhere (\"People\".\"id\" = @p1)"
        );
        assert_eq!(built.params.len(), 2);
    }

    #[test]
    fn update_set_can_reference_columns() {
        let w = Table::new("Weather");
        let sql = Update::new(&w)
            .set(w.col("temperature"), w.col("temperature").plus(1))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "update \"Weather\"\nset \"temperature\" = (\"Weather\".\"temperature\" + @p0)"
        );
    }

    #[test]
    fn update_aliased_target_binds_alias() {
        let p = Table::new("People").alias("p");
        let sql = Update::new(&p)
            .set(p.col("name"), "x")
            .filter(p.col("id").equals(1))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "update \"p\"\nset \"name\" = @p0\nfrom \"People\" as \"p\"\nwhere (\"p\".\"id\" = @p1)"
        );
    }

    #[test]
    fn update_without_set_fails() {
        let people = Table::new("People");
        let err = Update::new(&people)
            .filter(people.col("id").equals(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, CraftError::EmptyAssignments("UPDATE")));
    }
}
