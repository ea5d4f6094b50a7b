use std::sync::{Arc, OnceLock};

use tokio::sync::{Mutex, OwnedMutexGuard};

static PERMISSION_LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();

fn shared() -> Arc<Mutex<()>> {
    Arc::clone(PERMISSION_LOCK.get_or_init(|| Arc::new(Mutex::new(()))))
}

/// Acquires the process-wide permission change lock.
///
/// Every job takes this lock before its first mutation and holds it until
/// the job reaches a terminal state. Callers that need to keep other
/// permission changes out of a subtree while doing their own work (for
/// example, inspecting a directory before granting access into it) can
/// take it directly; the guard releases the lock on drop.
pub async fn acquire_permission_lock() -> OwnedMutexGuard<()> {
    shared().lock_owned().await
}
