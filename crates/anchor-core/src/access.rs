//! Read/write access discipline.
//!
//! All tree reads (resolution, restoration, tree-state capture) require a
//! read permit and all document/tree mutation requires exclusive write
//! access. Enforcement lives in the host; the core only *asserts* the
//! precondition at its entry points. A violation is caller misuse, not a
//! recoverable condition, so implementations are expected to panic.

/// Host-enforced access discipline, consulted as a precondition check.
pub trait AccessPolicy: Send + Sync {
    /// Assert that the current thread holds a read permit.
    fn assert_read_allowed(&self);

    /// Assert that the current thread holds exclusive write access.
    fn assert_write_allowed(&self);
}

/// An [`AccessPolicy`] that allows everything.
///
/// The default for scopes without a host access model (tests, single-threaded
/// embedding).
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveAccess;

impl AccessPolicy for PermissiveAccess {
    fn assert_read_allowed(&self) {}

    fn assert_write_allowed(&self) {}
}
