//! Storefront handle and sessions
//!
//! A [`Storefront`] owns the lazily opened connection and the identity
//! caches. Work happens in a [`Session`], which holds the connection lock
//! for its lifetime so statements from different threads never interleave.
//!
//! Multi-step operations run in savepoint-delimited regions. Every cache
//! insertion, eviction and in-place entity mutation made inside a region is
//! recorded in an undo log; if the region fails, the store is rolled back to
//! the savepoint and the log is replayed in reverse so the caches match the
//! store again. Rows inserted in the region are always evicted. Rows that
//! were only read stay cached while anything outside the cache still holds
//! them, so a rollback never leaves two live instances of one id.

use std::cell::{Cell, RefCell};
use std::sync::MutexGuard;
use std::time::Instant;

use rusqlite::{Connection, Params};
use storefront_core::errors::{ExError, Result, StorefrontError};
use storefront_core::model::Handle;
use storefront_core::types::schema::{EVENT_CACHE_HIT, EVENT_CACHE_MISS, EVENT_ROLLBACK};
use storefront_core::types::SessionId;
use storefront_core::{log_op_end, log_op_error, log_op_start};

use crate::cache::{Cached, IdentityMap};
use crate::cursor::ResultCursor;
use crate::db::{Database, DbConfig};
use crate::errors::from_rusqlite;

/// Database plus identity caches
#[derive(Debug)]
pub struct Storefront {
    db: Database,
    caches: IdentityMap,
}

impl Storefront {
    /// Create a storefront; nothing is opened until the first session
    pub fn new(config: DbConfig) -> Self {
        Self {
            db: Database::new(config),
            caches: IdentityMap::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(DbConfig::in_memory())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn caches(&self) -> &IdentityMap {
        &self.caches
    }

    /// Start a session, connecting on first use
    ///
    /// Blocks while another session holds the connection.
    ///
    /// # Errors
    /// * `DataAccess` - the connection could not be opened or migrated
    pub fn session(&self) -> Result<Session<'_>> {
        let conn = self.db.lock()?;
        let session = Session {
            conn,
            caches: &self.caches,
            id: SessionId::new(),
            depth: Cell::new(0),
            undo: RefCell::new(Vec::new()),
        };
        tracing::trace!(component = module_path!(), session_id = %session.id, "session opened");
        Ok(session)
    }
}

type Undo<'s> = Box<dyn FnOnce() + 's>;

/// Exclusive use of the connection plus access to the identity caches
pub struct Session<'s> {
    conn: MutexGuard<'s, Connection>,
    caches: &'s IdentityMap,
    id: SessionId,
    depth: Cell<usize>,
    undo: RefCell<Vec<Undo<'s>>>,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("depth", &self.depth.get())
            .field("pending_undo", &self.undo.borrow().len())
            .finish()
    }
}

impl<'s> Session<'s> {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Raw connection, for statements the repositories do not cover
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn caches(&self) -> &'s IdentityMap {
        self.caches
    }

    /// True while inside an [`atomically`](Self::atomically) region
    pub fn in_region(&self) -> bool {
        self.depth.get() > 0
    }

    // ---------- statements ----------

    /// Run a query and buffer its rows
    ///
    /// # Errors
    /// * `DataAccess` - the statement failed
    pub fn query<P: Params>(&self, sql: &str, params: P) -> Result<ResultCursor> {
        ResultCursor::execute(&self.conn, sql, params)
    }

    /// Run an INSERT and return the generated row id
    ///
    /// # Errors
    /// * `ConstraintViolation` - the row violated a store constraint
    /// * `DataAccess` - the statement failed
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.conn.execute(sql, params).map_err(from_rusqlite)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Run a statement and return the number of affected rows
    ///
    /// # Errors
    /// * `ConstraintViolation` - the write violated a store constraint
    /// * `DataAccess` - the statement failed
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.conn.execute(sql, params).map_err(from_rusqlite)
    }

    /// Run a statement that must affect exactly one row of `table`
    ///
    /// # Errors
    /// * `ConstraintViolation` - zero or several rows were affected
    /// * `DataAccess` - the statement failed
    pub fn execute_one<P: Params>(&self, table: &'static str, sql: &str, params: P) -> Result<()> {
        let actual = self.execute(sql, params)?;
        if actual != 1 {
            return Err(StorefrontError::RowCountMismatch {
                table,
                expected: 1,
                actual,
            }
            .into());
        }
        Ok(())
    }

    // ---------- regions ----------

    /// Run `f` inside a savepoint
    ///
    /// On success the savepoint is released (committing when outermost). On
    /// failure the store is rolled back to the savepoint, every cache change
    /// recorded since it was opened is undone, and the error is returned.
    ///
    /// # Errors
    /// Returns the error produced by `f`, or `DataAccess` if the savepoint
    /// itself could not be opened or released
    pub fn atomically<R>(&self, op: &str, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let depth = self.depth.get();
        let name = format!("sp_{}", depth);
        self.conn
            .execute_batch(&format!("SAVEPOINT {}", name))
            .map_err(from_rusqlite)?;
        self.depth.set(depth + 1);
        let mark = self.undo.borrow().len();

        let result = f().and_then(|value| {
            self.conn
                .execute_batch(&format!("RELEASE {}", name))
                .map_err(from_rusqlite)?;
            Ok(value)
        });
        self.depth.set(depth);

        match result {
            Ok(value) => {
                if depth == 0 {
                    self.undo.borrow_mut().clear();
                }
                Ok(value)
            }
            Err(err) => {
                let rollback = self
                    .conn
                    .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"));
                let undone = self.revert_to(mark);
                tracing::warn!(
                    component = module_path!(),
                    op,
                    event = EVENT_ROLLBACK,
                    session_id = %self.id,
                    undone,
                    err.code = err.code(),
                );
                match rollback {
                    Ok(()) => Err(err),
                    Err(rb) => Err(from_rusqlite(rb).with_op(op.to_string()).with_source(err)),
                }
            }
        }
    }

    /// [`atomically`](Self::atomically) with start/end/end_error logging
    pub(crate) fn instrumented<R>(&self, op: &'static str, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let start = Instant::now();
        log_op_start!(op, session_id = %self.id);

        let result = self.atomically(op, f).map_err(|err| tag_op(err, op));

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => {
                log_op_end!(op, duration_ms = duration_ms, session_id = %self.id);
            }
            Err(err) => {
                log_op_error!(op, err.clone(), duration_ms = duration_ms, session_id = %self.id);
            }
        }
        result
    }

    fn record_undo(&self, undo: impl FnOnce() + 's) {
        if self.in_region() {
            self.undo.borrow_mut().push(Box::new(undo));
        }
    }

    fn revert_to(&self, mark: usize) -> usize {
        let mut undone = 0;
        loop {
            let next = {
                let mut log = self.undo.borrow_mut();
                if log.len() > mark {
                    log.pop()
                } else {
                    None
                }
            };
            match next {
                Some(undo) => {
                    undo();
                    undone += 1;
                }
                None => return undone,
            }
        }
    }

    // ---------- identity cache ----------

    /// Cached instance, if any
    pub(crate) fn cached<T: Cached>(&self, id: T::Id) -> Option<Handle<T>> {
        self.caches.of::<T>().get(id)
    }

    /// Cache hit, or hydrate with `load` and cache the result
    pub(crate) fn fetch<T: Cached>(
        &self,
        id: T::Id,
        load: impl FnOnce() -> Result<T>,
    ) -> Result<Handle<T>> {
        if let Some(handle) = self.cached::<T>(id) {
            tracing::trace!(
                component = module_path!(),
                event = EVENT_CACHE_HIT,
                entity.kind = T::KIND.as_str(),
                entity.id = %id,
            );
            return Ok(handle);
        }
        tracing::debug!(
            component = module_path!(),
            event = EVENT_CACHE_MISS,
            entity.kind = T::KIND.as_str(),
            entity.id = %id,
        );

        let loaded = Handle::new(load()?);
        let caches = self.caches;
        let canonical = caches.of::<T>().put(loaded.clone());
        if canonical.ptr_eq(&loaded) {
            // A rolled-back read must not orphan an instance a caller still holds
            self.record_undo(move || {
                caches.of::<T>().remove_unshared(id);
            });
        }
        Ok(canonical)
    }

    /// Mark a freshly inserted instance so a rollback evicts it
    pub(crate) fn created<T: Cached>(&self, handle: Handle<T>) -> Handle<T> {
        let caches = self.caches;
        let id = handle.id();
        self.record_undo(move || {
            caches.of::<T>().remove(id);
        });
        handle
    }

    /// Drop the cache entry for `id`
    pub(crate) fn forget<T: Cached>(&self, id: T::Id) {
        let caches = self.caches;
        if let Some(handle) = caches.of::<T>().remove(id) {
            self.record_undo(move || {
                caches.of::<T>().put(handle);
            });
        }
    }

    /// Mutate a cached instance in place
    ///
    /// Inside a region the previous state is snapshotted first so a rollback
    /// restores it.
    pub(crate) fn modify<T: Cached, R>(&self, handle: &Handle<T>, f: impl FnOnce(&mut T) -> R) -> R {
        if self.in_region() {
            let before = handle.read().clone();
            let target = handle.clone();
            self.record_undo(move || {
                *target.write() = before;
            });
        }
        let mut guard = handle.write();
        f(&mut guard)
    }

    /// [`modify`](Self::modify) the cached instance of `id`, if there is one
    pub(crate) fn modify_cached<T: Cached>(&self, id: T::Id, f: impl FnOnce(&mut T)) {
        if let Some(handle) = self.cached::<T>(id) {
            self.modify(&handle, f);
        }
    }
}

fn tag_op(err: ExError, op: &'static str) -> ExError {
    if err.op().is_none() {
        err.with_op(op)
    } else {
        err
    }
}
