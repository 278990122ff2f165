//! Common imports.
//!
//! ```ignore
//! use sqlcraft::prelude::*;
//! ```

pub use crate::args;
pub use crate::backend::Backend;
pub use crate::connection::Connection;
pub use crate::dialect::Dialect;
pub use crate::error::{SqlError, SqlResult};
pub use crate::expr::{Arg, Expression};
pub use crate::query::{Direction, Query};
pub use crate::row::Row;
pub use crate::value::Value;
pub use futures_util::StreamExt;
