//! Device lookup for camera-scoped alerts.
//!
//! The dispatcher only ever reads two shapes from the keyed store: a device's
//! display metadata and its group memberships. Anything that can answer
//! those can stand in for the store.

mod cache;
mod memory;

pub use cache::CachedResolver;
pub use memory::{MemoryDirectory, TableKey};

use crate::error::Result;
use crate::types::Device;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Read-only lookup of device context.
///
/// Implementations must be safe to call from several dispatch workers at
/// once.
pub trait EntityResolver: Send + Sync {
    /// Look up a device. `Ok(None)` when no such device is registered.
    fn resolve_device(&self, account_id: &str, thing_name: &str) -> Result<Option<Device>>;

    /// Group ids the device belongs to. Empty when it belongs to none.
    fn resolve_groups(&self, account_id: &str, thing_name: &str) -> Result<BTreeSet<String>>;
}

impl<R: EntityResolver + ?Sized> EntityResolver for Arc<R> {
    fn resolve_device(&self, account_id: &str, thing_name: &str) -> Result<Option<Device>> {
        (**self).resolve_device(account_id, thing_name)
    }

    fn resolve_groups(&self, account_id: &str, thing_name: &str) -> Result<BTreeSet<String>> {
        (**self).resolve_groups(account_id, thing_name)
    }
}
