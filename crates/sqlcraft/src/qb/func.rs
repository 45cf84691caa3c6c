//! SQL function calls, casts, CASE expressions and constant predicates.

use std::fmt::Write as _;

use crate::qb::expr::{Expr, Selectable};
use crate::qb::select::Query;
use crate::value::Value;

/// `COUNT(expr)`
pub fn count(expr: impl Into<Expr>) -> Selectable {
    Selectable::from_expr(Expr::function("COUNT", vec![expr.into()]))
}

/// `COUNT(*)`
pub fn count_all() -> Selectable {
    Selectable::from_expr(Expr::function("COUNT", vec![Expr::raw("*")]))
}

/// `MAX(expr)`
pub fn max(expr: impl Into<Expr>) -> Selectable {
    Selectable::from_expr(Expr::function("MAX", vec![expr.into()]))
}

/// `SUBSTRING(expr, @start, @length)`, positions are 1-based.
pub fn substring(expr: impl Into<Expr>, start: i64, length: i64) -> Selectable {
    Selectable::from_expr(Expr::function(
        "SUBSTRING",
        vec![expr.into(), Expr::literal(start), Expr::literal(length)],
    ))
}

/// `DATALENGTH(expr)`, the storage size of the value in bytes.
pub fn data_length(expr: impl Into<Expr>) -> Selectable {
    Selectable::from_expr(Expr::function("DATALENGTH", vec![expr.into()]))
}

/// `CAST(expr AS type)`
pub fn cast(expr: impl Into<Expr>, ty: DataType) -> Selectable {
    Selectable::from_expr(Expr::cast(expr.into(), ty))
}

/// A bound literal for use in a select list or comparison.
pub fn literal(value: impl Into<Value>) -> Selectable {
    Selectable::literal(value)
}

/// Always-true predicate, `1 = 1`.
pub fn true_() -> Expr {
    Expr::raw("1 = 1")
}

/// Always-false predicate, `1 = 0`.
pub fn false_() -> Expr {
    Expr::raw("1 = 0")
}

/// `exists (<query>)`
pub fn exists(query: Query) -> Expr {
    Expr::exists(query)
}

/// Start a searched CASE expression with its first branch.
///
/// ```ignore
/// let label = case_when(t.col("temperature").lt(0), "freezing")
///     .when(t.col("temperature").lt(15), "cold")
///     .otherwise("warm")
///     .alias("label");
/// ```
pub fn case_when(condition: impl Into<Expr>, then: impl Into<Expr>) -> CaseBuilder {
    CaseBuilder {
        whens: vec![(condition.into(), then.into())],
    }
}

/// Builder for `case when ... then ... [else ...] end`.
#[derive(Clone, Debug)]
#[must_use = "call .otherwise() or .end() to finish the CASE expression"]
pub struct CaseBuilder {
    whens: Vec<(Expr, Expr)>,
}

impl CaseBuilder {
    /// Add another `when condition then value` branch.
    pub fn when(mut self, condition: impl Into<Expr>, then: impl Into<Expr>) -> Self {
        self.whens.push((condition.into(), then.into()));
        self
    }

    /// Finish with an `else` branch.
    pub fn otherwise(self, value: impl Into<Expr>) -> Expr {
        Expr::case(self.whens, Some(value.into()))
    }

    /// Finish without an `else` branch (unmatched rows yield NULL).
    pub fn end(self) -> Expr {
        Expr::case(self.whens, None)
    }
}

/// SQL Server scalar types usable as a CAST target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Binary,
    Bit,
    Char,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Float,
    Image,
    Int,
    Money,
    NChar,
    NText,
    NVarChar,
    Real,
    SmallDateTime,
    SmallInt,
    SmallMoney,
    SqlVariant,
    Text,
    Time,
    Timestamp,
    TinyInt,
    UniqueIdentifier,
    VarBinary,
    VarChar,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Binary => "BINARY",
            SqlType::Bit => "BIT",
            SqlType::Char => "CHAR",
            SqlType::Date => "DATE",
            SqlType::DateTime => "DATETIME",
            SqlType::DateTime2 => "DATETIME2",
            SqlType::DateTimeOffset => "DATETIMEOFFSET",
            SqlType::Decimal => "DECIMAL",
            SqlType::Float => "FLOAT",
            SqlType::Image => "IMAGE",
            SqlType::Int => "INT",
            SqlType::Money => "MONEY",
            SqlType::NChar => "NCHAR",
            SqlType::NText => "NTEXT",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::Real => "REAL",
            SqlType::SmallDateTime => "SMALLDATETIME",
            SqlType::SmallInt => "SMALLINT",
            SqlType::SmallMoney => "SMALLMONEY",
            SqlType::SqlVariant => "SQL_VARIANT",
            SqlType::Text => "TEXT",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::TinyInt => "TINYINT",
            SqlType::UniqueIdentifier => "UNIQUEIDENTIFIER",
            SqlType::VarBinary => "VARBINARY",
            SqlType::VarChar => "VARCHAR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeArg {
    Num(u32),
    Max,
}

/// A CAST target: a [`SqlType`] plus its length/precision arguments.
///
/// Arguments are numbers fixed at construction, so they are written into the SQL
/// text directly instead of being bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    ty: SqlType,
    args: Vec<TypeArg>,
}

impl DataType {
    fn plain(ty: SqlType) -> Self {
        Self { ty, args: Vec::new() }
    }

    fn sized(ty: SqlType, len: impl Into<Option<u32>>) -> Self {
        Self {
            ty,
            args: len.into().map(TypeArg::Num).into_iter().collect(),
        }
    }

    fn max(ty: SqlType) -> Self {
        Self {
            ty,
            args: vec![TypeArg::Max],
        }
    }

    pub fn sql_type(&self) -> SqlType {
        self.ty
    }

    pub fn bigint() -> Self {
        Self::plain(SqlType::BigInt)
    }

    pub fn binary(len: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::Binary, len)
    }

    pub fn bit() -> Self {
        Self::plain(SqlType::Bit)
    }

    pub fn char(len: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::Char, len)
    }

    pub fn date() -> Self {
        Self::plain(SqlType::Date)
    }

    pub fn datetime() -> Self {
        Self::plain(SqlType::DateTime)
    }

    pub fn datetime2(precision: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::DateTime2, precision)
    }

    pub fn datetimeoffset(precision: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::DateTimeOffset, precision)
    }

    /// `DECIMAL`, `DECIMAL(precision)` or `DECIMAL(precision, scale)`.
    ///
    /// A scale without a precision is dropped, since SQL cannot express it.
    pub fn decimal(precision: impl Into<Option<u32>>, scale: impl Into<Option<u32>>) -> Self {
        let mut args = Vec::new();
        if let Some(p) = precision.into() {
            args.push(TypeArg::Num(p));
            if let Some(s) = scale.into() {
                args.push(TypeArg::Num(s));
            }
        }
        Self {
            ty: SqlType::Decimal,
            args,
        }
    }

    pub fn float(size: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::Float, size)
    }

    pub fn image() -> Self {
        Self::plain(SqlType::Image)
    }

    pub fn int() -> Self {
        Self::plain(SqlType::Int)
    }

    pub fn money() -> Self {
        Self::plain(SqlType::Money)
    }

    pub fn nchar(len: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::NChar, len)
    }

    pub fn ntext() -> Self {
        Self::plain(SqlType::NText)
    }

    pub fn nvarchar(len: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::NVarChar, len)
    }

    /// `NVARCHAR(MAX)`
    pub fn nvarchar_max() -> Self {
        Self::max(SqlType::NVarChar)
    }

    pub fn real() -> Self {
        Self::plain(SqlType::Real)
    }

    pub fn smalldatetime() -> Self {
        Self::plain(SqlType::SmallDateTime)
    }

    pub fn smallint() -> Self {
        Self::plain(SqlType::SmallInt)
    }

    pub fn smallmoney() -> Self {
        Self::plain(SqlType::SmallMoney)
    }

    pub fn sql_variant() -> Self {
        Self::plain(SqlType::SqlVariant)
    }

    pub fn text() -> Self {
        Self::plain(SqlType::Text)
    }

    pub fn time(precision: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::Time, precision)
    }

    pub fn timestamp() -> Self {
        Self::plain(SqlType::Timestamp)
    }

    pub fn tinyint() -> Self {
        Self::plain(SqlType::TinyInt)
    }

    pub fn uniqueidentifier() -> Self {
        Self::plain(SqlType::UniqueIdentifier)
    }

    pub fn varbinary(len: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::VarBinary, len)
    }

    /// `VARBINARY(MAX)`
    pub fn varbinary_max() -> Self {
        Self::max(SqlType::VarBinary)
    }

    pub fn varchar(len: impl Into<Option<u32>>) -> Self {
        Self::sized(SqlType::VarChar, len)
    }

    /// `VARCHAR(MAX)`
    pub fn varchar_max() -> Self {
        Self::max(SqlType::VarChar)
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push_str(self.ty.as_str());
        if self.args.is_empty() {
            return;
        }
        out.push('(');
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match arg {
                TypeArg::Num(n) => {
                    let _ = write!(out, "{n}");
                }
                TypeArg::Max => out.push_str("MAX"),
            }
        }
        out.push(')');
    }

    /// Render the type name as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::expr::ExprExt;
    use crate::qb::param::Parameters;
    use crate::qb::table::Table;
    use crate::qb::traits::SqlNode;

    fn render(expr: impl Into<Expr>) -> (String, Parameters) {
        let expr: Expr = expr.into();
        let mut params = Parameters::new();
        let sql = expr.to_sql_with(&mut params).unwrap();
        (sql, params)
    }

    #[test]
    fn count_and_max() {
        let posts = Table::new("Posts");
        assert_eq!(render(count(posts.col("id"))).0, r#"COUNT("Posts"."id")"#);
        assert_eq!(render(count_all()).0, "COUNT(*)");
        assert_eq!(render(max(posts.col("id"))).0, r#"MAX("Posts"."id")"#);
    }

    #[test]
    fn substring_binds_positions() {
        let posts = Table::new("Posts");
        let (sql, params) = render(substring(posts.col("title"), 1, 10));
        assert_eq!(sql, r#"SUBSTRING("Posts"."title", @p0, @p1)"#);
        assert_eq!(params.get("@p0"), Some(&Value::Int(1)));
        assert_eq!(params.get("@p1"), Some(&Value::Int(10)));
    }

    #[test]
    fn data_length_call() {
        let posts = Table::new("Posts");
        assert_eq!(render(data_length(posts.col("body"))).0, r#"DATALENGTH("Posts"."body")"#);
    }

    #[test]
    fn cast_with_type_arguments() {
        let w = Table::new("Weather");
        assert_eq!(
            render(cast(w.col("temperature"), DataType::decimal(10, 2))).0,
            r#"CAST("Weather"."temperature" AS DECIMAL(10, 2))"#
        );
        assert_eq!(
            render(cast(w.col("description"), DataType::nvarchar_max())).0,
            r#"CAST("Weather"."description" AS NVARCHAR(MAX))"#
        );
        assert_eq!(DataType::int().to_sql(), "INT");
        assert_eq!(DataType::varchar(50).to_sql(), "VARCHAR(50)");
    }

    #[test]
    fn type_arguments_are_optional() {
        assert_eq!(DataType::varchar(None).to_sql(), "VARCHAR");
        assert_eq!(DataType::nvarchar(None).to_sql(), "NVARCHAR");
        assert_eq!(DataType::char(None).to_sql(), "CHAR");
        assert_eq!(DataType::binary(16).to_sql(), "BINARY(16)");
        assert_eq!(DataType::varbinary(None).to_sql(), "VARBINARY");
        assert_eq!(DataType::float(None).to_sql(), "FLOAT");
        assert_eq!(DataType::float(53).to_sql(), "FLOAT(53)");
        assert_eq!(DataType::datetime2(3).to_sql(), "DATETIME2(3)");
        assert_eq!(DataType::datetimeoffset(None).to_sql(), "DATETIMEOFFSET");
        assert_eq!(DataType::time(Some(7)).to_sql(), "TIME(7)");
        assert_eq!(DataType::decimal(None, None).to_sql(), "DECIMAL");
        assert_eq!(DataType::decimal(18, None).to_sql(), "DECIMAL(18)");
        assert_eq!(DataType::decimal(None, 2).to_sql(), "DECIMAL");
    }

    #[test]
    fn case_expression() {
        let w = Table::new("Weather");
        let expr = case_when(w.col("temperature").lt(0), "freezing")
            .when(w.col("temperature").lt(15), "cold")
            .otherwise("warm");
        let (sql, params) = render(expr);
        assert_eq!(
            sql,
            "case\n\twhen (\"Weather\".\"temperature\" < @p0) then @p1\n\twhen (\"Weather\".\"temperature\" < @p2) then @p3\n\telse @p4\nend"
        );
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn case_without_else() {
        let w = Table::new("Weather");
        let (sql, _) = render(case_when(w.col("temperature").is_null(), 0).end());
        assert_eq!(sql, "case\n\twhen \"Weather\".\"temperature\" is NULL then @p0\nend");
    }

    #[test]
    fn constant_predicates() {
        assert_eq!(render(true_()).0, "1 = 1");
        assert_eq!(render(false_()).0, "1 = 0");
        assert_eq!(render(true_().and(false_())).0, "(1 = 1 and 1 = 0)");
    }

    #[test]
    fn literal_in_select_list() {
        let (sql, params) = render(literal("x").alias("tag"));
        assert_eq!(sql, r#"@p0 as "tag""#);
        assert_eq!(params.get("@p0"), Some(&Value::from("x")));
    }
}
