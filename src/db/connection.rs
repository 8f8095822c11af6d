//! Transactional SQLite connection that captures results as text rows.
//!
//! A [`Connection`] owns at most one engine handle for its whole life. Once
//! open, it always sits inside a transaction: opening begins one, and a
//! successful [`Connection::commit`] immediately begins the next. Statements run
//! through [`Connection::execute`] accumulate in that transaction until commit;
//! dropping the connection without committing discards them.

use crate::db::query::QueryBinder;
use crate::db::rows::{RowStore, value_to_text};
use crate::errors::{DbError, DbResult};
use rusqlite::Batch;
use rusqlite::fallible_iterator::FallibleIterator;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Anything [`Connection::execute`] accepts: raw SQL text or a [`QueryBinder`].
pub trait SqlSource {
    /// Final SQL text to send to the engine.
    fn to_sql(&self) -> DbResult<Cow<'_, str>>;
}

impl SqlSource for str {
    fn to_sql(&self) -> DbResult<Cow<'_, str>> {
        Ok(Cow::Borrowed(self))
    }
}

impl SqlSource for String {
    fn to_sql(&self) -> DbResult<Cow<'_, str>> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl SqlSource for QueryBinder {
    fn to_sql(&self) -> DbResult<Cow<'_, str>> {
        self.bind().map(Cow::Owned)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Active,
    None,
}

#[derive(Debug, Default)]
pub struct Connection {
    handle: Option<rusqlite::Connection>,
    path: Option<PathBuf>,
    results: RowStore,
    last_error: Option<DbError>,
}

impl Connection {
    /// Create a connection and open `path` right away.
    ///
    /// An empty path defers opening: the connection stays unopened until
    /// [`Connection::open`] is called.
    pub fn new(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let mut conn = Self::deferred();
        if !path.as_os_str().is_empty() {
            conn.open(path)?;
        }
        Ok(conn)
    }

    /// A connection with no handle yet.
    pub fn deferred() -> Self {
        Self::default()
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Self::new(":memory:")
    }

    /// Open the database at `path` and begin a transaction.
    ///
    /// Fails with [`DbError::AlreadyOpen`] if this connection already holds a
    /// handle; the existing handle is kept. A failed open leaves the
    /// connection unopened, so it may be retried.
    pub fn open(&mut self, path: impl AsRef<Path>) -> DbResult<()> {
        let path = path.as_ref();

        if self.handle.is_some() {
            let current = self.path_display();
            return self.fail(DbError::AlreadyOpen { path: current });
        }

        // rusqlite releases the native handle itself when the open fails.
        let conn = match rusqlite::Connection::open(path) {
            Ok(conn) => conn,
            Err(e) => {
                return self.fail(DbError::OpenFailure {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        };

        // Never hand out a handle that is not inside a transaction.
        if let Err(e) = conn.execute_batch("BEGIN;") {
            drop(conn);
            return self.fail(e.into());
        }

        debug!(path = %path.display(), "database opened, transaction started");
        self.handle = Some(conn);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Run `source` inside the current transaction and capture its rows.
    ///
    /// The result store is cleared first, unless the connection is unopened
    /// or the query cannot be bound; in those cases nothing reaches the
    /// engine and the previous results stay as they were. When the engine
    /// fails part-way, rows captured before the failure are kept.
    pub fn execute<S: SqlSource + ?Sized>(&mut self, source: &S) -> DbResult<()> {
        if self.handle.is_none() {
            return self.fail(DbError::NotConnected);
        }

        let sql = match source.to_sql() {
            Ok(sql) => sql,
            Err(e) => return self.fail(e),
        };

        self.results.clear();
        trace!(sql = %sql, "executing");

        let outcome = match self.handle.as_ref() {
            Some(conn) => capture_rows(conn, &sql, &mut self.results),
            None => Err(DbError::NotConnected),
        };

        match outcome {
            Ok(statements) => {
                debug!(statements, rows = self.results.len(), "execute finished");
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Commit the current transaction and begin a new one.
    ///
    /// On failure no new transaction is started by this call; the
    /// connection stays open and [`Connection::rollback`] can be used to
    /// get back to a clean transaction.
    pub fn commit(&mut self) -> DbResult<()> {
        let result = match self.handle.as_ref() {
            Some(conn) => conn.execute_batch("COMMIT;").map_err(DbError::from),
            None => Err(DbError::NotConnected),
        };

        match result {
            Ok(()) => {
                debug!("transaction committed");
                self.begin()
            }
            Err(e) => self.fail(e),
        }
    }

    /// Roll back the current transaction, if any, and begin a new one.
    pub fn rollback(&mut self) -> DbResult<()> {
        let result = match self.handle.as_ref() {
            Some(conn) if conn.is_autocommit() => Ok(()),
            Some(conn) => conn.execute_batch("ROLLBACK;").map_err(DbError::from),
            None => Err(DbError::NotConnected),
        };

        match result {
            Ok(()) => {
                debug!("transaction rolled back");
                self.begin()
            }
            Err(e) => self.fail(e),
        }
    }

    /// Close the handle, reporting any error the engine raises while
    /// closing. Uncommitted work is discarded.
    pub fn close(mut self) -> DbResult<()> {
        match self.handle.take() {
            Some(conn) => {
                debug!(path = %self.path_display(), "closing database");
                conn.close().map_err(|(_, e)| DbError::from(e))
            }
            None => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Transaction state as reported by the engine.
    pub fn tx_state(&self) -> TxState {
        match &self.handle {
            Some(conn) if !conn.is_autocommit() => TxState::Active,
            _ => TxState::None,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.tx_state() == TxState::Active
    }

    pub fn row_count(&self) -> usize {
        self.results.len()
    }

    /// Rows captured by the last execute.
    pub fn results(&self) -> &RowStore {
        &self.results
    }

    pub fn columns(&self) -> &[String] {
        self.results.columns()
    }

    /// Direct access to the underlying rusqlite handle.
    ///
    /// This is an interoperability escape hatch. Anything done through the
    /// handle (committing, rolling back, closing transactions) bypasses this
    /// wrapper's bookkeeping, so the "always inside a transaction" guarantee
    /// and the recorded last error no longer hold after using it.
    pub fn raw_handle(&self) -> Option<&rusqlite::Connection> {
        self.handle.as_ref()
    }

    /// Mutable variant of [`Connection::raw_handle`], with the same caveats.
    pub fn raw_handle_mut(&mut self) -> Option<&mut rusqlite::Connection> {
        self.handle.as_mut()
    }

    /// The most recent failure recorded by any operation on this connection.
    pub fn last_error(&self) -> Option<&DbError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn begin(&mut self) -> DbResult<()> {
        let result = match self.handle.as_ref() {
            Some(conn) => conn.execute_batch("BEGIN;").map_err(DbError::from),
            None => Err(DbError::NotConnected),
        };
        result.or_else(|e| self.fail(e))
    }

    fn fail<T>(&mut self, err: DbError) -> DbResult<T> {
        warn!(code = err.code(), error = %err, "database operation failed");
        self.last_error = Some(err.clone());
        Err(err)
    }

    fn path_display(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

/// Execute every statement in `sql` and append each produced row to `store`.
///
/// Returns the number of statements run. Errors are returned as values; rows
/// pushed before an error stay in the store.
fn capture_rows(conn: &rusqlite::Connection, sql: &str, store: &mut RowStore) -> DbResult<usize> {
    let mut batch = Batch::new(conn, sql);
    let mut statements = 0;

    while let Some(mut stmt) = batch.next()? {
        statements += 1;
        let width = stmt.column_count();
        if width > 0 {
            store.set_columns(stmt.column_names().into_iter().map(String::from).collect());
        }

        // Parameters left in raw SQL stay unbound and read as NULL.
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            let mut fields = Vec::with_capacity(width);
            for i in 0..width {
                fields.push(value_to_text(row.get_ref(i)?));
            }
            store.push(fields);
        }
    }

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Connection {
        Connection::open_in_memory().expect("open in-memory db")
    }

    #[test]
    fn open_begins_a_transaction() {
        let conn = memory();
        assert!(conn.is_open());
        assert_eq!(conn.tx_state(), TxState::Active);
    }

    #[test]
    fn empty_path_defers_open() {
        let conn = Connection::new("").unwrap();
        assert!(!conn.is_open());
        assert_eq!(conn.tx_state(), TxState::None);
        assert!(conn.path().is_none());
    }

    #[test]
    fn select_union_yields_two_rows() {
        let mut conn = memory();
        conn.execute("SELECT 1 UNION SELECT 2").unwrap();
        assert_eq!(conn.row_count(), 2);
        assert_eq!(conn.results().rows(), &[vec!["1".to_string()], vec!["2".to_string()]]);
    }

    #[test]
    fn null_becomes_sentinel_text() {
        let mut conn = memory();
        conn.execute("SELECT NULL").unwrap();
        assert_eq!(conn.row_count(), 1);
        assert_eq!(conn.results().rows()[0][0], "NULL");
    }

    #[test]
    fn unbound_parameters_in_raw_sql_are_null() {
        let mut conn = memory();
        conn.execute("SELECT ?").unwrap();
        assert_eq!(conn.results().rows(), &[vec!["NULL".to_string()]]);

        conn.execute("SELECT :x, 1").unwrap();
        assert_eq!(conn.results().rows(), &[vec!["NULL".to_string(), "1".to_string()]]);
    }

    #[test]
    fn reals_match_engine_text() {
        let mut conn = memory();
        for expr in [
            "1.0/3", "0.1+0.2", "1e20", "1e15", "-0.0", "2.0", "1.5", "123.456", "1e-5",
            "-2.5e-7", "100.0", "0.0001", "123456789012345.6",
        ] {
            conn.execute(format!("SELECT {expr}, CAST({expr} AS TEXT)").as_str())
                .unwrap();
            let row = &conn.results().rows()[0];
            assert_eq!(row[0], row[1], "{expr}");
        }
    }

    #[test]
    fn results_are_replaced_not_accumulated() {
        let mut conn = memory();
        conn.execute("SELECT 1 UNION SELECT 2").unwrap();
        conn.execute("SELECT 'a' AS letter").unwrap();
        assert_eq!(conn.row_count(), 1);
        assert_eq!(conn.columns(), &["letter".to_string()]);
    }

    #[test]
    fn multiple_statements_run_in_order() {
        let mut conn = memory();
        conn.execute(
            "CREATE TABLE t (id INTEGER, v REAL); \
             INSERT INTO t VALUES (1, 2.0), (2, 1.5); \
             SELECT id, v FROM t ORDER BY id;",
        )
        .unwrap();
        assert_eq!(
            conn.results().rows(),
            &[
                vec!["1".to_string(), "2.0".to_string()],
                vec!["2".to_string(), "1.5".to_string()]
            ]
        );
    }

    #[test]
    fn binder_is_resolved_before_execution() {
        let mut conn = memory();
        let mut q = QueryBinder::new("SELECT :a + ?");
        q.set("a", 40).push(2);
        conn.execute(&q).unwrap();
        assert_eq!(conn.results().rows()[0][0], "42");
    }

    #[test]
    fn bind_failure_leaves_results_untouched() {
        let mut conn = memory();
        conn.execute("SELECT 'kept'").unwrap();

        let q = QueryBinder::new("SELECT * FROM t WHERE id = :id");
        let err = conn.execute(&q).unwrap_err();
        assert_eq!(
            err,
            DbError::BindFailure {
                placeholder: ":id".into()
            }
        );
        assert_eq!(conn.last_error(), Some(&err));
        assert_eq!(conn.results().rows(), &[vec!["kept".to_string()]]);
    }

    #[test]
    fn execute_without_handle_is_not_connected() {
        let mut conn = Connection::deferred();
        assert_eq!(conn.execute("SELECT 1"), Err(DbError::NotConnected));
        assert_eq!(conn.row_count(), 0);
        assert_eq!(conn.commit(), Err(DbError::NotConnected));
        assert_eq!(conn.rollback(), Err(DbError::NotConnected));
    }

    #[test]
    fn engine_failure_keeps_earlier_rows() {
        let mut conn = memory();
        let err = conn
            .execute("SELECT 1; SELECT * FROM missing_table;")
            .unwrap_err();
        match err {
            DbError::EngineFailure(msg) => assert!(msg.contains("missing_table"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(conn.results().rows(), &[vec!["1".to_string()]]);
        // The transaction is still there.
        assert!(conn.in_transaction());
    }

    #[test]
    fn double_open_keeps_original_handle() {
        let mut conn = memory();
        conn.execute("CREATE TABLE marker (x)").unwrap();

        let err = conn.open("/definitely/not/a/real/dir/other.db").unwrap_err();
        assert_eq!(
            err,
            DbError::AlreadyOpen {
                path: ":memory:".into()
            }
        );

        conn.execute("SELECT count(*) FROM marker").unwrap();
        assert_eq!(conn.results().rows()[0][0], "0");
    }

    #[test]
    fn failed_open_can_be_retried() {
        let mut conn = Connection::deferred();
        let err = conn.open("/definitely/not/a/real/dir/x.db").unwrap_err();
        assert_eq!(err.code(), 1);
        assert!(!conn.is_open());

        conn.open(":memory:").unwrap();
        assert!(conn.in_transaction());
    }

    #[test]
    fn commit_begins_next_transaction() {
        let mut conn = memory();
        conn.execute("CREATE TABLE t (x)").unwrap();
        conn.commit().unwrap();
        assert!(conn.in_transaction());
    }

    #[test]
    fn failed_commit_does_not_begin_and_rollback_recovers() {
        let mut conn = memory();
        // Ending the transaction behind the wrapper's back makes COMMIT fail.
        conn.raw_handle()
            .unwrap()
            .execute_batch("COMMIT;")
            .unwrap();

        let err = conn.commit().unwrap_err();
        assert_eq!(err.code(), 127);
        assert_eq!(conn.tx_state(), TxState::None);

        conn.rollback().unwrap();
        assert_eq!(conn.tx_state(), TxState::Active);
    }

    #[test]
    fn rollback_discards_pending_work() {
        let mut conn = memory();
        conn.execute("CREATE TABLE t (x)").unwrap();
        conn.commit().unwrap();
        conn.execute("INSERT INTO t VALUES (1)").unwrap();
        conn.rollback().unwrap();
        conn.execute("SELECT count(*) FROM t").unwrap();
        assert_eq!(conn.results().rows()[0][0], "0");
    }

    #[test]
    fn clear_error_resets_last_error() {
        let mut conn = Connection::deferred();
        let _ = conn.execute("SELECT 1");
        assert!(conn.last_error().is_some());
        conn.clear_error();
        assert!(conn.last_error().is_none());
    }

    #[test]
    fn close_on_unopened_is_ok() {
        assert!(Connection::deferred().close().is_ok());
        assert!(memory().close().is_ok());
    }
}
