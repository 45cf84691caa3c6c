//! Tables, columns and the join graph.
//!
//! A [`Table`] is a value: aliasing returns a new table and never touches the
//! original. Joins are composed left to right into a [`Joinable`] tree whose
//! rightmost leaf is the table the next `.on(...)` talks about.
//!
//! A join condition may be written before the left side exists. A bare column
//! name (`people.on("id")`) is kept as [`JoinCondition::Unresolved`] and becomes
//! `left."id" = right."id"` once the join is attached to a FROM clause.

use std::sync::Arc;

use crate::error::CraftResult;
use crate::ident::Ident;
use crate::qb::expr::{Expr, ExprExt, Selectable};
use crate::qb::param::Parameters;
use crate::qb::traits::SqlNode;

/// A table reference, optionally aliased.
#[derive(Clone, Debug)]
pub struct Table {
    name: Ident,
    alias: Option<Ident>,
    columns: Option<Arc<[String]>>,
}

impl Table {
    /// Reference a table by name.
    pub fn new(name: impl Into<Ident>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            columns: None,
        }
    }

    /// Reference a table together with its known column names.
    ///
    /// The column list is informational: [`Table::col`] still accepts any name.
    pub fn define<I, S>(name: impl Into<Ident>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            alias: None,
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }

    /// The raw table name.
    pub fn name(&self) -> &str {
        self.name.name()
    }

    /// The raw alias, if any.
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_ref().map(Ident::name)
    }

    /// A copy of this table under `alias`. The receiver is unchanged.
    pub fn alias(&self, alias: impl Into<Ident>) -> Table {
        Table {
            name: self.name.clone(),
            alias: Some(alias.into()),
            columns: self.columns.clone(),
        }
    }

    /// A column of this table, qualified by the alias when one is set.
    pub fn col(&self, name: impl Into<Ident>) -> Column {
        Column {
            table: self.clone(),
            name: name.into(),
        }
    }

    /// `"table".*`
    pub fn all(&self) -> Selectable {
        Selectable::from_expr(Expr::all(self.clone()))
    }

    /// Columns declared through [`Table::define`].
    pub fn columns(&self) -> Option<Vec<Column>> {
        self.columns
            .as_ref()
            .map(|names| names.iter().map(|n| self.col(n.as_str())).collect())
    }

    /// Prepare a join against this table under `condition`.
    pub fn on(&self, condition: impl Into<JoinCondition>) -> Join {
        Joinable::from(self).on(condition)
    }

    /// Inner-join `join` onto this table.
    pub fn join(&self, join: Join) -> Joinable {
        Joinable::from(self).join(join)
    }

    /// Left-outer-join `join` onto this table.
    pub fn outer_join(&self, join: Join) -> Joinable {
        Joinable::from(self).outer_join(join)
    }

    /// Write the name used to qualify columns: the alias, else the name.
    pub(crate) fn write_ref(&self, out: &mut String) {
        self.alias.as_ref().unwrap_or(&self.name).write_sql(out);
    }

    /// Write the bare table name, as INSERT expects.
    pub(crate) fn write_name(&self, out: &mut String) {
        self.name.write_sql(out);
    }

    /// Whether columns of this table are qualified by an alias.
    pub(crate) fn is_aliased(&self) -> bool {
        self.alias.is_some()
    }
}

impl SqlNode for Table {
    /// `"name"` or `"name" as "alias"`
    fn write_sql(&self, out: &mut String, _params: &mut Parameters) -> CraftResult<()> {
        self.name.write_sql(out);
        if let Some(alias) = &self.alias {
            out.push_str(" as ");
            alias.write_sql(out);
        }
        Ok(())
    }
}

/// A column belonging to a [`Table`].
#[derive(Clone, Debug)]
pub struct Column {
    table: Table,
    name: Ident,
}

impl Column {
    /// The table this column belongs to.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The raw column name.
    pub fn name(&self) -> &str {
        self.name.name()
    }

    /// Write the unqualified quoted name, as INSERT and UPDATE column lists expect.
    pub(crate) fn write_bare(&self, out: &mut String) {
        self.name.write_sql(out);
    }
}

impl SqlNode for Column {
    /// `"table"."column"`
    fn write_sql(&self, out: &mut String, _params: &mut Parameters) -> CraftResult<()> {
        self.table.write_ref(out);
        out.push('.');
        self.name.write_sql(out);
        Ok(())
    }
}

/// How two sides of a join are connected.
#[derive(Clone, Debug)]
pub enum JoinCondition {
    /// Column name shared by both sides, expanded at attach time.
    Unresolved(String),
    /// Explicit predicate.
    Resolved(Expr),
}

impl JoinCondition {
    /// Turn the condition into a predicate between `left` and `right`.
    pub fn resolve(self, left: &Table, right: &Table) -> Expr {
        match self {
            JoinCondition::Resolved(expr) => expr,
            JoinCondition::Unresolved(name) => left.col(name.as_str()).equals(right.col(name)),
        }
    }
}

impl From<Expr> for JoinCondition {
    fn from(expr: Expr) -> Self {
        JoinCondition::Resolved(expr)
    }
}

impl From<&str> for JoinCondition {
    fn from(name: &str) -> Self {
        JoinCondition::Unresolved(name.to_string())
    }
}

impl From<String> for JoinCondition {
    fn from(name: String) -> Self {
        JoinCondition::Unresolved(name)
    }
}

/// A join not yet attached to a left side.
#[derive(Clone, Debug)]
pub struct Join {
    right: Joinable,
    condition: JoinCondition,
    outer: bool,
}

impl Join {
    /// Mark this join as a left outer join.
    pub fn outer(mut self) -> Self {
        self.outer = true;
        self
    }

    pub fn is_outer(&self) -> bool {
        self.outer
    }

    /// The right-hand side.
    pub fn right(&self) -> &Joinable {
        &self.right
    }

    pub fn condition(&self) -> &JoinCondition {
        &self.condition
    }

    /// Attach to `left`, resolving a bare column name against `root`.
    pub(crate) fn attach(self, left: Joinable, root: &Table) -> Joined {
        let condition = self.condition.resolve(root, self.right.table());
        Joined {
            left,
            right: self.right,
            condition,
            outer: self.outer,
        }
    }
}

/// Two sources joined under a resolved condition.
#[derive(Clone, Debug)]
pub struct Joined {
    left: Joinable,
    right: Joinable,
    condition: Expr,
    outer: bool,
}

impl Joined {
    pub fn left(&self) -> &Joinable {
        &self.left
    }

    pub fn right(&self) -> &Joinable {
        &self.right
    }

    pub fn is_outer(&self) -> bool {
        self.outer
    }
}

impl SqlNode for Joined {
    /// `(left [left ]join right on condition)`
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()> {
        out.push('(');
        self.left.write_sql(out, params)?;
        out.push_str(if self.outer { " left join " } else { " join " });
        self.right.write_sql(out, params)?;
        out.push_str(" on ");
        self.condition.write_sql(out, params)?;
        out.push(')');
        Ok(())
    }
}

/// Anything usable as a FROM source: a table or a join tree.
#[derive(Clone, Debug)]
pub enum Joinable {
    Table(Table),
    Joined(Arc<Joined>),
}

impl Joinable {
    /// The rightmost table, which `.on(...)` conditions refer to.
    pub fn table(&self) -> &Table {
        match self {
            Joinable::Table(t) => t,
            Joinable::Joined(j) => j.right.table(),
        }
    }

    /// The leftmost table.
    pub fn base_table(&self) -> &Table {
        match self {
            Joinable::Table(t) => t,
            Joinable::Joined(j) => j.left.base_table(),
        }
    }

    /// Prepare a join with this source on the right-hand side.
    pub fn on(self, condition: impl Into<JoinCondition>) -> Join {
        Join {
            right: self,
            condition: condition.into(),
            outer: false,
        }
    }

    /// Inner-join `join` onto this source, resolving bare names against the
    /// rightmost table.
    pub fn join(self, join: Join) -> Joinable {
        let root = self.table().clone();
        Joinable::Joined(Arc::new(join.attach(self, &root)))
    }

    /// Left-outer-join `join` onto this source.
    pub fn outer_join(self, join: Join) -> Joinable {
        self.join(join.outer())
    }
}

impl SqlNode for Joinable {
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()> {
        match self {
            Joinable::Table(t) => t.write_sql(out, params),
            Joinable::Joined(j) => j.write_sql(out, params),
        }
    }
}

impl From<Table> for Joinable {
    fn from(t: Table) -> Self {
        Joinable::Table(t)
    }
}

impl From<&Table> for Joinable {
    fn from(t: &Table) -> Self {
        Joinable::Table(t.clone())
    }
}

impl From<Joined> for Joinable {
    fn from(j: Joined) -> Self {
        Joinable::Joined(Arc::new(j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(node: &impl SqlNode) -> String {
        node.to_sql_with(&mut Parameters::new()).unwrap()
    }

    #[test]
    fn table_render() {
        let people = Table::new("People");
        assert_eq!(render(&people), r#""People""#);
        assert_eq!(render(&people.alias("p")), r#""People" as "p""#);
    }

    #[test]
    fn alias_leaves_original_untouched() {
        let people = Table::new("People");
        let p = people.alias("p");
        assert_eq!(people.alias_name(), None);
        assert_eq!(p.alias_name(), Some("p"));
        assert_eq!(p.name(), "People");
    }

    #[test]
    fn column_uses_alias_when_set() {
        let people = Table::new("People");
        assert_eq!(render(&people.col("id")), r#""People"."id""#);
        assert_eq!(render(&people.alias("p").col("id")), r#""p"."id""#);
    }

    #[test]
    fn column_name_is_quoted() {
        let people = Table::new("People");
        assert_eq!(render(&people.col(r#"id", name"#)), r#""People"."id"", name""#);
    }

    #[test]
    fn all_columns() {
        let people = Table::new("People");
        assert_eq!(render(&people.all()), r#""People".*"#);
        assert_eq!(render(&people.alias("p").all()), r#""p".*"#);
    }

    #[test]
    fn defined_columns() {
        let posts = Table::define("Posts", ["id", "title"]);
        let cols = posts.columns().unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[1].name(), "title");
        assert!(Table::new("Posts").columns().is_none());
    }

    #[test]
    fn join_with_explicit_condition() {
        let people = Table::new("People");
        let posts = Table::new("Posts");
        let source = people.join(posts.on(posts.col("author").equals(people.col("id"))));
        assert_eq!(
            render(&source),
            r#"("People" join "Posts" on ("Posts"."author" = "People"."id"))"#
        );
        assert_eq!(source.table().name(), "Posts");
        assert_eq!(source.base_table().name(), "People");
    }

    #[test]
    fn join_with_bare_column_name() {
        let a = Table::new("A");
        let b = Table::new("B");
        let source = a.outer_join(b.on("id"));
        assert_eq!(render(&source), r#"("A" left join "B" on ("A"."id" = "B"."id"))"#);
    }

    #[test]
    fn chained_joins_nest_left() {
        let a = Table::new("A");
        let b = Table::new("B");
        let c = Table::new("C");
        let source = a.join(b.on("id")).join(c.on("ref"));
        assert_eq!(
            render(&source),
            r#"(("A" join "B" on ("A"."id" = "B"."id")) join "C" on ("B"."ref" = "C"."ref"))"#
        );
    }

    #[test]
    fn join_condition_literals_are_bound() {
        let a = Table::new("A");
        let b = Table::new("B");
        let source = a.join(b.on(b.col("kind").equals("x")));
        let mut params = Parameters::new();
        let sql = source.to_sql_with(&mut params).unwrap();
        assert_eq!(sql, r#"("A" join "B" on ("B"."kind" = @p0))"#);
        assert_eq!(params.len(), 1);
    }
}
