//! Query builder: expression tree, join graph, statements and the renderer.
//!
//! Everything here is a plain value. Builders accumulate clauses, and a render
//! pass walks them once, swapping each literal for an `@pN` placeholder held in a
//! [`Parameters`] store.
//!
//! # Usage
//!
//! ```ignore
//! use sqlcraft::qb;
//! use sqlcraft::prelude::*;
//!
//! let people = Table::new("People");
//! let posts = Table::new("Posts");
//!
//! // SELECT with a join and a filter
//! let q = qb::select([people.col("name").into(), count(posts.col("id"))])
//!     .from(&posts)
//!     .join(people.on(people.col("id").equals(posts.col("author"))))
//!     .filter(posts.col("hidden").equals(false))
//!     .group_by([people.col("name")])
//!     .order_by([people.col("name")]);
//!
//! // INSERT, then read back the identity
//! let id = qb::insert(&people).set(people.col("name"), "Ada").execute(&db).await?;
//!
//! // UPDATE
//! qb::update(&people)
//!     .set(people.col("name"), "Grace")
//!     .filter(people.col("id").equals(id))
//!     .execute(&db)
//!     .await?;
//!
//! // DELETE
//! qb::delete(&posts).filter(posts.col("author").equals(id)).execute(&db).await?;
//! ```

mod delete;
mod expr;
pub mod func;
mod insert;
mod param;
mod select;
mod table;
mod traits;
mod update;


pub use delete::Delete;
pub use expr::{Expr, ExprExt, MAX_IN_LIST, Selectable};
pub use func::{CaseBuilder, DataType, SqlType};
pub use insert::{IDENTITY_FIELD, IDENTITY_QUERY, Insert};
pub use param::{PLACEHOLDER_PREFIX, Parameters};
pub use select::Query;
pub use table::{Column, Join, JoinCondition, Joinable, Joined, Table};
pub use traits::{BuiltQuery, SqlNode, Statement, StatementKind};
pub use update::Update;

/// Start a SELECT with the given columns.
///
/// # Example
/// ```ignore
/// let q = sqlcraft::qb::select([weather.all()]).from(&weather);
/// ```
pub fn select<I, S>(columns: I) -> Query
where
    I: IntoIterator<Item = S>,
    S: Into<Selectable>,
{
    Query::new().select(columns)
}

/// Start an INSERT into `table`.
pub fn insert(table: &Table) -> Insert {
    Insert::new(table)
}

/// Start an UPDATE of `table`.
pub fn update(table: &Table) -> Update {
    Update::new(table)
}

/// Start a DELETE from `table`.
pub fn delete(table: &Table) -> Delete {
    Delete::new(table)
}
