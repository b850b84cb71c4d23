//! In-process keyed directory of devices and group memberships.

use super::EntityResolver;
use crate::error::Result;
use crate::types::Device;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};

/// Partition/sort key pair addressing one item.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub pk: String,
    pub sk: String,
}

impl TableKey {
    /// Key of a registered camera.
    pub fn camera(account_id: &str, thing_name: &str) -> Self {
        Self {
            pk: format!("Cameras:{account_id}"),
            sk: thing_name.to_string(),
        }
    }

    /// Key of one camera-to-group membership.
    pub fn membership(account_id: &str, thing_name: &str, group_id: &str) -> Self {
        Self {
            pk: membership_partition(account_id, thing_name),
            sk: group_id.to_string(),
        }
    }
}

fn membership_partition(account_id: &str, thing_name: &str) -> String {
    format!("CamerasToGroups:{account_id}:{thing_name}")
}

/// Devices and memberships keyed the same way the shared table keys them.
#[derive(Default)]
pub struct MemoryDirectory {
    devices: RwLock<HashMap<TableKey, Device>>,
    /// Membership partitions to their group ids.
    memberships: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a device.
    pub fn put_device(&self, account_id: &str, device: Device) {
        let key = TableKey::camera(account_id, &device.thing_name);
        self.devices.write().insert(key, device);
    }

    /// Remove a device. Its memberships are left alone.
    pub fn remove_device(&self, account_id: &str, thing_name: &str) -> Option<Device> {
        self.devices
            .write()
            .remove(&TableKey::camera(account_id, thing_name))
    }

    pub fn add_membership(&self, account_id: &str, thing_name: &str, group_id: &str) {
        let key = TableKey::membership(account_id, thing_name, group_id);
        self.memberships
            .write()
            .entry(key.pk)
            .or_default()
            .insert(key.sk);
    }

    /// Returns whether the membership existed.
    pub fn remove_membership(&self, account_id: &str, thing_name: &str, group_id: &str) -> bool {
        let partition = membership_partition(account_id, thing_name);
        let mut memberships = self.memberships.write();
        let Some(groups) = memberships.get_mut(&partition) else {
            return false;
        };
        let removed = groups.remove(group_id);
        if groups.is_empty() {
            memberships.remove(&partition);
        }
        removed
    }

    pub fn device_count(&self) -> usize {
        self.devices.read().len()
    }
}

impl EntityResolver for MemoryDirectory {
    fn resolve_device(&self, account_id: &str, thing_name: &str) -> Result<Option<Device>> {
        Ok(self
            .devices
            .read()
            .get(&TableKey::camera(account_id, thing_name))
            .cloned())
    }

    fn resolve_groups(&self, account_id: &str, thing_name: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .memberships
            .read()
            .get(&membership_partition(account_id, thing_name))
            .cloned()
            .unwrap_or_default())
    }
}
