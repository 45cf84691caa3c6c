//! # sqlcraft
//!
//! Composable SQL query builder that renders parameterized statements.
//!
//! ## Features
//!
//! - **Immutable expressions**: predicates, functions, casts and CASE built from
//!   shared values that never change once created
//! - **Injection-safe rendering**: identifiers are always quoted and every literal
//!   becomes an `@pN` placeholder
//! - **Join graph**: joins written as reusable fragments, with bare-name
//!   conditions resolved when they are attached
//! - **Unions and subqueries**: one placeholder numbering across the whole statement
//! - **Mutations**: INSERT (with identity retrieval), UPDATE, DELETE
//! - **Pluggable execution**: bring an [`Executor`]; optionally a [`Cache`]
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//!
//! let people = Table::new("People");
//! let posts = Table::new("Posts");
//!
//! let q = select([people.col("name"), posts.col("title")])
//!     .from(&posts)
//!     .join(people.on(people.col("id").equals(posts.col("author"))))
//!     .filter(posts.col("title").contains("rust"))
//!     .order_by([posts.col("id").desc()])
//!     .limit(10);
//!
//! let built = q.build()?;
//! // (select top 10 "People"."name", "Posts"."title"
//! // from ("Posts" join "People" on ("People"."id" = "Posts"."author"))
//! // where ("Posts"."title" like @p0)
//! // )
//! // order by "Posts"."id" desc
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod ident;
pub mod prelude;
pub mod qb;
pub mod row;
pub mod value;

pub use cache::{Cache, MemoryCache, NoopCache};
pub use client::Executor;
pub use config::DbConfig;
pub use db::Db;
pub use error::{CraftError, CraftResult};
pub use ident::{Ident, escape_like, quote_ident};
pub use row::{FromRow, FromValue, Row};
pub use value::Value;

// Re-export qb module for easy access
pub use qb::{
    BuiltQuery, Column, DataType, Delete, Expr, ExprExt, Insert, Join, JoinCondition, Joinable,
    Parameters, Query, Selectable, SqlNode, Statement, StatementKind, Table, Update, delete, insert,
    select, update,
};
