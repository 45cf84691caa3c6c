//! Immutable expression tree for predicates, select lists and assignments.
//!
//! An [`Expr`] is a shared, never-mutated node. Every combinator (`equals`, `and`,
//! `contains`, ...) consumes its operands and wraps them in a new node, so an
//! expression handed to one query can be reused in another without surprises.
//!
//! Literal values are carried as [`Value`]s and only turn into `@pN` placeholders
//! when the tree is rendered against a [`Parameters`] store:
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//!
//! let weather = Table::new("Weather");
//! let cold = weather.col("temperature").le(0) & weather.col("description").contains("snow");
//! // (("Weather"."temperature" <= @p0) and ("Weather"."description" like @p1))
//! ```

use std::fmt::Write as _;
use std::ops;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{CraftError, CraftResult};
use crate::ident::{Ident, escape_like};
use crate::qb::func::DataType;
use crate::qb::param::Parameters;
use crate::qb::select::Query;
use crate::qb::table::{Column, Table};
use crate::qb::traits::{SqlNode, write_separated};
use crate::value::Value;

/// Upper bound on the number of literals in one `IN (...)` list.
pub const MAX_IN_LIST: usize = 20;

/// Expression node.
///
/// Cloning is cheap: children are shared behind an [`Arc`] and never mutated.
#[derive(Clone, Debug)]
pub struct Expr(Arc<Node>);

#[derive(Debug)]
enum Node {
    /// Bound value, rendered as a placeholder.
    Literal(Value),
    /// Fixed SQL text. Only ever built from crate constants.
    Raw(&'static str),
    Column(Column),
    /// `table.*`
    All(Table),
    /// `expr as "name"`
    Alias { expr: Expr, name: Ident },
    /// `(left op right)`
    Binary {
        left: Expr,
        op: &'static str,
        right: Expr,
    },
    /// `(op operand)`
    Unary { op: &'static str, operand: Expr },
    /// `expr is NULL`
    IsNull(Expr),
    /// `expr desc`
    Desc(Expr),
    /// `(a, b, c)`
    List(Vec<Expr>),
    /// `(<query>)`
    Subquery(Box<Query>),
    /// `exists (<query>)`
    Exists(Box<Query>),
    /// `NAME(arg, ...)`
    Function {
        name: &'static str,
        args: Vec<Expr>,
    },
    /// `CAST(expr AS type)`
    Cast { expr: Expr, ty: DataType },
    Case {
        whens: Vec<(Expr, Expr)>,
        otherwise: Option<Expr>,
    },
}

impl Expr {
    fn node(node: Node) -> Self {
        Expr(Arc::new(node))
    }

    /// A bound literal value.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::node(Node::Literal(value.into()))
    }

    pub(crate) fn raw(sql: &'static str) -> Self {
        Self::node(Node::Raw(sql))
    }

    pub(crate) fn column(column: Column) -> Self {
        Self::node(Node::Column(column))
    }

    pub(crate) fn all(table: Table) -> Self {
        Self::node(Node::All(table))
    }

    pub(crate) fn function(name: &'static str, args: Vec<Expr>) -> Self {
        Self::node(Node::Function { name, args })
    }

    pub(crate) fn cast(expr: Expr, ty: DataType) -> Self {
        Self::node(Node::Cast { expr, ty })
    }

    pub(crate) fn case(whens: Vec<(Expr, Expr)>, otherwise: Option<Expr>) -> Self {
        Self::node(Node::Case { whens, otherwise })
    }

    /// `(<query>)`
    pub fn subquery(query: Query) -> Self {
        Self::node(Node::Subquery(Box::new(query)))
    }

    /// `exists (<query>)`
    pub fn exists(query: Query) -> Self {
        Self::node(Node::Exists(Box::new(query)))
    }

    fn binary(self, op: &'static str, right: impl Into<Expr>) -> Self {
        Self::node(Node::Binary {
            left: self,
            op,
            right: right.into(),
        })
    }

    /// The bound value, if this node is a literal.
    pub fn as_literal(&self) -> Option<&Value> {
        match &*self.0 {
            Node::Literal(v) => Some(v),
            _ => None,
        }
    }

    // ==================== Comparisons ====================

    /// `(self = rhs)`
    pub fn equals(self, rhs: impl Into<Expr>) -> Self {
        self.binary("=", rhs)
    }

    /// `(self <> rhs)`
    pub fn not_equals(self, rhs: impl Into<Expr>) -> Self {
        self.binary("<>", rhs)
    }

    /// `(self > rhs)`
    pub fn gt(self, rhs: impl Into<Expr>) -> Self {
        self.binary(">", rhs)
    }

    /// `(self >= rhs)`
    pub fn ge(self, rhs: impl Into<Expr>) -> Self {
        self.binary(">=", rhs)
    }

    /// `(self < rhs)`
    pub fn lt(self, rhs: impl Into<Expr>) -> Self {
        self.binary("<", rhs)
    }

    /// `(self <= rhs)`
    pub fn le(self, rhs: impl Into<Expr>) -> Self {
        self.binary("<=", rhs)
    }

    // ==================== Boolean / arithmetic ====================

    /// `(self and rhs)`
    pub fn and(self, rhs: impl Into<Expr>) -> Self {
        self.binary("and", rhs)
    }

    /// `(self or rhs)`
    pub fn or(self, rhs: impl Into<Expr>) -> Self {
        self.binary("or", rhs)
    }

    /// `(not self)`
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::node(Node::Unary {
            op: "not",
            operand: self,
        })
    }

    /// `(self + rhs)`
    pub fn plus(self, rhs: impl Into<Expr>) -> Self {
        self.binary("+", rhs)
    }

    /// `(self - rhs)`
    pub fn minus(self, rhs: impl Into<Expr>) -> Self {
        self.binary("-", rhs)
    }

    // ==================== Pattern matching ====================

    /// `(self like pattern)` with a caller-supplied pattern; wildcards are kept.
    pub fn like(self, pattern: impl Into<String>) -> Self {
        self.binary("like", Expr::literal(pattern.into()))
    }

    /// Substring match: `%text%` with `text`'s wildcards escaped.
    pub fn contains(self, text: &str) -> Self {
        self.like(format!("%{}%", escape_like(text)))
    }

    /// Prefix match: `text%` with `text`'s wildcards escaped.
    pub fn starts_with(self, text: &str) -> Self {
        self.like(format!("{}%", escape_like(text)))
    }

    /// Suffix match: `%text` with `text`'s wildcards escaped.
    pub fn ends_with(self, text: &str) -> Self {
        self.like(format!("%{}", escape_like(text)))
    }

    // ==================== NULL / membership ====================

    /// `self is NULL`
    pub fn is_null(self) -> Self {
        Self::node(Node::IsNull(self))
    }

    /// `(not self is NULL)`
    pub fn is_not_null(self) -> Self {
        self.is_null().not()
    }

    /// `(self in (@p0, @p1, ...))`
    ///
    /// Fails right away, before any rendering, when given more than
    /// [`MAX_IN_LIST`] values. An empty list matches nothing and renders `1 = 0`.
    pub fn in_list<I, V>(self, values: I) -> CraftResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        let values: Vec<Expr> = values.into_iter().map(Into::into).collect();
        if values.len() > MAX_IN_LIST {
            return Err(CraftError::TooManyValues {
                count: values.len(),
                max: MAX_IN_LIST,
            });
        }
        if values.is_empty() {
            return Ok(Self::raw("1 = 0"));
        }
        Ok(self.binary("in", Self::node(Node::List(values))))
    }

    /// `(self in ((select ...)))`
    pub fn in_query(self, query: Query) -> Self {
        self.binary("in", Self::subquery(query))
    }

    // ==================== Ordering / select list ====================

    /// `self desc`
    pub fn desc(self) -> Self {
        Self::node(Node::Desc(self))
    }

    /// `self desc` when `descending`, otherwise `self` unchanged.
    pub fn desc_if(self, descending: bool) -> Self {
        if descending { self.desc() } else { self }
    }

    /// `self as "name"`, usable in a select list.
    pub fn alias(self, name: impl Into<Ident>) -> Selectable {
        Selectable(Self::node(Node::Alias {
            expr: self,
            name: name.into(),
        }))
    }
}

impl SqlNode for Expr {
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()> {
        match &*self.0 {
            Node::Literal(value) => out.push_str(&params.next(value.clone())),
            Node::Raw(sql) => out.push_str(sql),
            Node::Column(column) => column.write_sql(out, params)?,
            Node::All(table) => {
                table.write_ref(out);
                out.push_str(".*");
            }
            Node::Alias { expr, name } => {
                expr.write_sql(out, params)?;
                out.push_str(" as ");
                name.write_sql(out);
            }
            Node::Binary { left, op, right } => {
                out.push('(');
                left.write_sql(out, params)?;
                let _ = write!(out, " {op} ");
                right.write_sql(out, params)?;
                out.push(')');
            }
            Node::Unary { op, operand } => {
                let _ = write!(out, "({op} ");
                operand.write_sql(out, params)?;
                out.push(')');
            }
            Node::IsNull(expr) => {
                expr.write_sql(out, params)?;
                out.push_str(" is NULL");
            }
            Node::Desc(expr) => {
                expr.write_sql(out, params)?;
                out.push_str(" desc");
            }
            Node::List(values) => {
                out.push('(');
                write_separated(out, params, values, ", ")?;
                out.push(')');
            }
            Node::Subquery(query) => {
                out.push('(');
                query.write_sql(out, params)?;
                out.push(')');
            }
            Node::Exists(query) => {
                out.push_str("exists (");
                query.write_sql(out, params)?;
                out.push(')');
            }
            Node::Function { name, args } => {
                out.push_str(name);
                out.push('(');
                write_separated(out, params, args, ", ")?;
                out.push(')');
            }
            Node::Cast { expr, ty } => {
                out.push_str("CAST(");
                expr.write_sql(out, params)?;
                out.push_str(" AS ");
                ty.write_sql(out);
                out.push(')');
            }
            Node::Case { whens, otherwise } => {
                out.push_str("case");
                for (condition, value) in whens {
                    out.push_str("\n\twhen ");
                    condition.write_sql(out, params)?;
                    out.push_str(" then ");
                    value.write_sql(out, params)?;
                }
                if let Some(otherwise) = otherwise {
                    out.push_str("\n\telse ");
                    otherwise.write_sql(out, params)?;
                }
                out.push_str("\nend");
            }
        }
        Ok(())
    }
}

/// An expression legal in a SELECT list: a column, `table.*`, an aliased
/// expression, a function result, or a literal.
#[derive(Clone, Debug)]
pub struct Selectable(Expr);

impl Selectable {
    /// A bound literal in the select list.
    pub fn literal(value: impl Into<Value>) -> Self {
        Selectable(Expr::literal(value))
    }

    pub(crate) fn from_expr(expr: Expr) -> Self {
        Selectable(expr)
    }

    /// The underlying expression.
    pub fn expr(&self) -> &Expr {
        &self.0
    }

    /// Unwrap into the underlying expression.
    pub fn into_expr(self) -> Expr {
        self.0
    }
}

impl SqlNode for Selectable {
    fn write_sql(&self, out: &mut String, params: &mut Parameters) -> CraftResult<()> {
        self.0.write_sql(out, params)
    }
}

impl From<Selectable> for Expr {
    fn from(s: Selectable) -> Self {
        s.0
    }
}

impl From<Column> for Selectable {
    fn from(c: Column) -> Self {
        Selectable(Expr::column(c))
    }
}

impl From<&Column> for Selectable {
    fn from(c: &Column) -> Self {
        Selectable(Expr::column(c.clone()))
    }
}

impl From<Column> for Expr {
    fn from(c: Column) -> Self {
        Expr::column(c)
    }
}

impl From<&Column> for Expr {
    fn from(c: &Column) -> Self {
        Expr::column(c.clone())
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

macro_rules! impl_expr_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(v: $ty) -> Self {
                    Expr::literal(v)
                }
            }
        )*
    };
}

impl_expr_from_value!(
    Value,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    &String,
    Vec<u8>,
    Uuid,
    DateTime<Utc>,
    NaiveDate,
    serde_json::Value,
);

#[cfg(feature = "rust_decimal")]
impl_expr_from_value!(rust_decimal::Decimal);

impl<T: Into<Value>> From<Option<T>> for Expr {
    fn from(v: Option<T>) -> Self {
        Expr::literal(v)
    }
}

/// Expression combinators for values that convert into an [`Expr`], such as
/// [`Column`] and [`Selectable`].
///
/// Every method converts `self` and delegates to the [`Expr`] method of the same
/// name.
pub trait ExprExt: Into<Expr> + Sized {
    fn equals(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).equals(rhs)
    }

    fn not_equals(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).not_equals(rhs)
    }

    fn gt(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).gt(rhs)
    }

    fn ge(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).ge(rhs)
    }

    fn lt(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).lt(rhs)
    }

    fn le(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).le(rhs)
    }

    fn and(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).and(rhs)
    }

    fn or(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).or(rhs)
    }

    fn not(self) -> Expr {
        Into::<Expr>::into(self).not()
    }

    fn plus(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).plus(rhs)
    }

    fn minus(self, rhs: impl Into<Expr>) -> Expr {
        Into::<Expr>::into(self).minus(rhs)
    }

    fn like(self, pattern: impl Into<String>) -> Expr {
        Into::<Expr>::into(self).like(pattern)
    }

    fn contains(self, text: &str) -> Expr {
        Into::<Expr>::into(self).contains(text)
    }

    fn starts_with(self, text: &str) -> Expr {
        Into::<Expr>::into(self).starts_with(text)
    }

    fn ends_with(self, text: &str) -> Expr {
        Into::<Expr>::into(self).ends_with(text)
    }

    fn is_null(self) -> Expr {
        Into::<Expr>::into(self).is_null()
    }

    fn is_not_null(self) -> Expr {
        Into::<Expr>::into(self).is_not_null()
    }

    fn in_list<I, V>(self, values: I) -> CraftResult<Expr>
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        Into::<Expr>::into(self).in_list(values)
    }

    fn in_query(self, query: Query) -> Expr {
        Into::<Expr>::into(self).in_query(query)
    }

    fn desc(self) -> Expr {
        Into::<Expr>::into(self).desc()
    }

    fn desc_if(self, descending: bool) -> Expr {
        Into::<Expr>::into(self).desc_if(descending)
    }

    fn alias(self, name: impl Into<Ident>) -> Selectable {
        Into::<Expr>::into(self).alias(name)
    }
}

impl ExprExt for Column {}
impl ExprExt for Selectable {}

// Operator sugar over the named combinators.

impl<R: Into<Expr>> ops::BitAnd<R> for Expr {
    type Output = Expr;

    fn bitand(self, rhs: R) -> Expr {
        self.and(rhs)
    }
}

impl<R: Into<Expr>> ops::BitOr<R> for Expr {
    type Output = Expr;

    fn bitor(self, rhs: R) -> Expr {
        self.or(rhs)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::not(self)
    }
}

impl<R: Into<Expr>> ops::Add<R> for Expr {
    type Output = Expr;

    fn add(self, rhs: R) -> Expr {
        self.plus(rhs)
    }
}

impl<R: Into<Expr>> ops::Sub<R> for Expr {
    type Output = Expr;

    fn sub(self, rhs: R) -> Expr {
        self.minus(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(expr: &Expr) -> (String, Parameters) {
        let mut params = Parameters::new();
        let sql = expr.to_sql_with(&mut params).unwrap();
        (sql, params)
    }

    fn weather() -> Table {
        Table::new("Weather")
    }

    #[test]
    fn test_literal_becomes_placeholder() {
        let (sql, params) = render(&weather().col("temperature").gt(0));
        assert_eq!(sql, r#"("Weather"."temperature" > @p0)"#);
        assert_eq!(params.get("@p0"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_injection_value_stays_bound() {
        let people = Table::new("People");
        let (sql, params) = render(&people.col("name").equals(r#"" OR 1 == 1"#));
        assert_eq!(sql, r#"("People"."name" = @p0)"#);
        assert!(!sql.contains("OR 1"));
        assert_eq!(params.get("@p0"), Some(&Value::from(r#"" OR 1 == 1"#)));
    }

    #[test]
    fn test_and_or_not() {
        let w = weather();
        let expr = (w.col("temperature").le(0) | w.col("temperature").ge(10)) & !w.col("description").is_null();
        let (sql, params) = render(&expr);
        assert_eq!(
            sql,
            r#"((("Weather"."temperature" <= @p0) or ("Weather"."temperature" >= @p1)) and (not "Weather"."description" is NULL))"#
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_is_not_null() {
        let (sql, _) = render(&weather().col("description").is_not_null());
        assert_eq!(sql, r#"(not "Weather"."description" is NULL)"#);
    }

    #[test]
    fn test_arithmetic() {
        let w = weather();
        let (sql, params) = render(&(w.col("temperature").plus(5) - 3));
        assert_eq!(sql, r#"(("Weather"."temperature" + @p0) - @p1)"#);
        assert_eq!(params.values().cloned().collect::<Vec<_>>(), vec![Value::Int(5), Value::Int(3)]);
    }

    #[test]
    fn test_contains_escapes_wildcards() {
        let (sql, params) = render(&weather().col("description").contains("5%_[x"));
        assert_eq!(sql, r#"("Weather"."description" like @p0)"#);
        assert_eq!(params.get("@p0"), Some(&Value::from("%5[%][_][[]x%")));
    }

    #[test]
    fn test_starts_and_ends_with() {
        let (_, params) = render(&weather().col("description").starts_with("cloudy"));
        assert_eq!(params.get("@p0"), Some(&Value::from("cloudy%")));

        let (_, params) = render(&weather().col("description").ends_with("ing"));
        assert_eq!(params.get("@p0"), Some(&Value::from("%ing")));
    }

    #[test]
    fn test_like_keeps_pattern() {
        let (_, params) = render(&weather().col("description").like("c_oudy%"));
        assert_eq!(params.get("@p0"), Some(&Value::from("c_oudy%")));
    }

    #[test]
    fn test_in_list() {
        let expr = Table::new("t").col("col").in_list([1, 2, 3]).unwrap();
        let (sql, params) = render(&expr);
        assert_eq!(sql, r#"("t"."col" in (@p0, @p1, @p2))"#);
        assert_eq!(
            params.iter().map(|(n, v)| (n.to_string(), v.clone())).collect::<Vec<_>>(),
            vec![
                ("@p0".to_string(), Value::Int(1)),
                ("@p1".to_string(), Value::Int(2)),
                ("@p2".to_string(), Value::Int(3)),
            ]
        );
    }

    #[test]
    fn test_in_list_limit() {
        let col = Table::new("t").col("col");
        assert!(col.clone().in_list(0..20).is_ok());

        let err = col.in_list(0..21).unwrap_err();
        assert!(matches!(err, CraftError::TooManyValues { count: 21, max: 20 }));
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let expr = Table::new("t").col("col").in_list(Vec::<i64>::new()).unwrap();
        let (sql, params) = render(&expr);
        assert_eq!(sql, "1 = 0");
        assert!(params.is_empty());

        let (sql, _) = render(&expr.not());
        assert_eq!(sql, "(not 1 = 0)");
    }

    #[test]
    fn test_desc_and_alias() {
        let w = weather();
        let (sql, _) = render(&w.col("temperature").desc());
        assert_eq!(sql, r#""Weather"."temperature" desc"#);

        let (sql, _) = render(&w.col("temperature").desc_if(false));
        assert_eq!(sql, r#""Weather"."temperature""#);

        let alias = w.col("id").alias(r#"id", name"#);
        let (sql, _) = render(&alias.into_expr());
        assert_eq!(sql, r#""Weather"."id" as "id"", name""#);
    }

    #[test]
    fn test_composition_does_not_mutate_operands() {
        let w = weather();
        let warm = w.col("temperature").ge(10);
        let snowing = w.col("description").contains("snow");
        let either = warm.clone().or(snowing.clone());

        let (warm_sql, _) = render(&warm);
        assert_eq!(warm_sql, r#"("Weather"."temperature" >= @p0)"#);
        let (either_sql, params) = render(&either);
        assert_eq!(
            either_sql,
            r#"(("Weather"."temperature" >= @p0) or ("Weather"."description" like @p1))"#
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_option_literal() {
        let (sql, params) = render(&weather().col("description").equals(None::<String>));
        assert_eq!(sql, r#"("Weather"."description" = @p0)"#);
        assert_eq!(params.get("@p0"), Some(&Value::Null));
    }
}
