//! In-memory backend for unit tests.

use super::{Backend, BackendError};
use crate::dialect::DialectKind;
use crate::row::Row;
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) enum Reply {
    Rows(Vec<Row>),
    Affected(u64),
    Fail(BackendError),
}

/// Records every statement it receives and answers from a script.
///
/// With an empty script, fetches return no rows and executes affect nothing.
pub(crate) struct MockBackend {
    kind: DialectKind,
    pub(crate) log: Mutex<Vec<(String, Vec<Value>)>>,
    script: Mutex<VecDeque<Reply>>,
}

impl MockBackend {
    pub(crate) fn new(kind: DialectKind) -> Self {
        Self {
            kind,
            log: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn reply(self, reply: Reply) -> Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn last_sql(&self) -> String {
        self.log
            .lock()
            .unwrap()
            .last()
            .map(|(sql, _)| sql.clone())
            .unwrap_or_default()
    }

    fn next(&self, sql: &str, params: &[Value]) -> Option<Reply> {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        self.script.lock().unwrap().pop_front()
    }
}

impl Backend for MockBackend {
    fn dialect_kind(&self) -> DialectKind {
        self.kind
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, BackendError> {
        match self.next(sql, params) {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Affected(_)) | None => Ok(Vec::new()),
        }
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, BackendError> {
        match self.next(sql, params) {
            Some(Reply::Affected(n)) => Ok(n),
            Some(Reply::Rows(rows)) => Ok(rows.len() as u64),
            Some(Reply::Fail(e)) => Err(e),
            None => Ok(0),
        }
    }
}

/// Build a row from `(column, value)` pairs.
pub(crate) fn row<const N: usize>(cells: [(&str, Value); N]) -> Row {
    cells.into_iter().collect()
}
