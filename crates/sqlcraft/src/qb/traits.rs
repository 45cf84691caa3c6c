//! Trait definitions shared by every renderable node and statement builder.

use crate::error::CraftResult;
use crate::qb::param::Parameters;

/// Anything that renders itself to SQL text within a render pass.
///
/// Literals encountered while rendering are bound through `params`, never written
/// into `out`.
pub trait SqlNode {
    /// Append this node's SQL to `out`.
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()>;

    /// Render this node into a new string.
    fn to_sql_with(&self, params: &mut Parameters) -> CraftResult<String> {
        let mut out = String::new();
        self.write_sql(&mut out, params)?;
        Ok(out)
    }
}

/// The kind of statement a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// SELECT query (possibly unioned)
    Select,
    /// INSERT statement followed by identity retrieval
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        }
    }
}

/// A top-level statement builder.
pub trait Statement: SqlNode {
    /// What kind of statement this builder renders.
    const KIND: StatementKind;

    /// Render with a fresh [`Parameters`] instance.
    fn build(&self) -> CraftResult<BuiltQuery> {
        let mut params = Parameters::new();
        let sql = self.to_sql_with(&mut params)?;
        Ok(BuiltQuery::new(Self::KIND, sql, params))
    }

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> CraftResult<String> {
        self.build().map(|built| built.sql)
    }
}

/// The result of rendering a statement.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub kind: StatementKind,
    pub sql: String,
    pub params: Parameters,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(kind: StatementKind, sql: String, params: Parameters) -> Self {
        Self { kind, sql, params }
    }

    /// Key under which this statement's rows are memoized.
    ///
    /// Combines the SQL text with the sorted parameter serialization, so two
    /// renders of the same statement with the same values share a key.
    pub fn cache_key(&self) -> String {
        format!("query:{}:{}", self.sql, self.params.serialize())
    }
}

/// Render `items` separated by `sep`.
pub(crate) fn write_separated<T: SqlNode>(
    out: &mut String,
    params: &mut Parameters,
    items: &[T],
    sep: &str,
) -> CraftResult<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        item.write_sql(out, params)?;
    }
    Ok(())
}

/// Append `\nwhere a and b ...` when `conditions` is non-empty.
pub(crate) fn write_where<T: SqlNode>(
    out: &mut String,
    params: &mut Parameters,
    conditions: &[T],
) -> CraftResult<()> {
    if conditions.is_empty() {
        return Ok(());
    }
    out.push_str("\nwhere ");
    write_separated(out, params, conditions, " and ")
}
