//! Query options for the generic record adapter.

use sea_orm::{Order, Value};

/// Row lock requested by a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lock {
    #[default]
    None,
    ForUpdate,
    /// Fails immediately instead of waiting for a conflicting lock.
    ForUpdateNoWait,
}

/// Comparison applied to a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Eq(Value),
    Ne(Value),
    Lte(Value),
    Gte(Value),
    In(Vec<Value>),
    IsNull,
    IsNotNull,
}

/// A `{column, value, op}` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub column: &'static str,
    pub op: Op,
}

impl Param {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            op: Op::Eq(value.into()),
        }
    }

    pub fn ne(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            op: Op::Ne(value.into()),
        }
    }

    pub fn is_null(column: &'static str) -> Self {
        Self {
            column,
            op: Op::IsNull,
        }
    }
}

/// Options for `get_many` / `count`.
///
/// Soft-deleted rows are excluded unless `include_deleted` is set. Without an
/// explicit sort, rows come back ordered by `(created_at, id)`.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub params: Vec<Param>,
    pub limit: Option<u64>,
    pub sort: Vec<(&'static str, Order)>,
    pub lock: Lock,
    pub include_deleted: bool,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn eq(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.with_param(Param::eq(column, value))
    }

    pub fn ne(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.with_param(Param::ne(column, value))
    }

    pub fn lte(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.with_param(Param {
            column,
            op: Op::Lte(value.into()),
        })
    }

    pub fn is_in<V: Into<Value>>(
        self,
        column: &'static str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.with_param(Param {
            column,
            op: Op::In(values.into_iter().map(Into::into).collect()),
        })
    }

    pub fn is_null(self, column: &'static str) -> Self {
        self.with_param(Param::is_null(column))
    }

    pub fn is_not_null(self, column: &'static str) -> Self {
        self.with_param(Param {
            column,
            op: Op::IsNotNull,
        })
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_sort(mut self, column: &'static str, order: Order) -> Self {
        self.sort.push((column, order));
        self
    }

    pub fn with_lock(mut self, lock: Lock) -> Self {
        self.lock = lock;
        self
    }

    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}
