//! Convenient imports for typical `sqlcraft` usage.
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//! ```

pub use crate::qb::func::{
    case_when, cast, count, count_all, data_length, exists, false_, literal, max, substring, true_,
};
pub use crate::{
    Cache, Column, CraftError, CraftResult, DataType, Db, DbConfig, Executor, Expr, ExprExt,
    FromRow, FromValue, Joinable, MemoryCache, NoopCache, Parameters, Query, Row, Selectable,
    Statement, Table, Value, delete, insert, select, update,
};
