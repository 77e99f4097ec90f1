use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::model::{Proxy, Snapshot};

use super::{ClashApi, ClashError, DelayProbe};

/// In-memory stand-in for the daemon, selected with `MOCK_CLASH=1`.
///
/// The table seeds lazily on the first fetch and after that behaves
/// like a tiny daemon: selections mutate it, later fetches observe
/// them. Workers share the instance, so the table sits behind a
/// read/write lock.
pub struct MockApi {
    proxies: RwLock<Option<HashMap<String, Proxy>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            proxies: RwLock::new(None),
        }
    }

    fn read_table(&self) -> RwLockReadGuard<'_, Option<HashMap<String, Proxy>>> {
        self.proxies.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, Option<HashMap<String, Proxy>>> {
        self.proxies.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ClashApi for MockApi {
    fn fetch_snapshot(&self) -> Result<Snapshot, ClashError> {
        if let Some(table) = self.read_table().as_ref() {
            return Ok(Snapshot::from_proxies(table.clone()));
        }
        debug!("seeding mock proxy table");
        let mut guard = self.write_table();
        let table = guard.get_or_insert_with(seed_table);
        Ok(Snapshot::from_proxies(table.clone()))
    }

    // The table seeds on first fetch only; selecting against an
    // unseeded table reports the group as missing.
    fn select(&self, group: &str, member: &str) -> Result<(), ClashError> {
        let mut guard = self.write_table();
        let Some(proxy) = guard.as_mut().and_then(|table| table.get_mut(group)) else {
            return Err(ClashError::NotFound(format!("group {group} not found")));
        };
        if !proxy.all.iter().any(|m| m == member) {
            return Err(ClashError::NotFound(format!(
                "proxy {member} not found in group {group}"
            )));
        }
        proxy.now = member.to_string();
        Ok(())
    }

    fn measure_delay(
        &self,
        group: &str,
        member: &str,
        _probe: &DelayProbe,
    ) -> Result<u64, ClashError> {
        let guard = self.read_table();
        let Some(proxy) = guard.as_ref().and_then(|table| table.get(group)) else {
            return Err(ClashError::NotFound(format!("group {group} not found")));
        };
        let Some(idx) = proxy.member_index(member) else {
            return Err(ClashError::NotFound(format!(
                "proxy {member} not found in group {group}"
            )));
        };
        // Synthetic but stable per member.
        Ok(60 + 15 * idx as u64)
    }
}

fn seed_table() -> HashMap<String, Proxy> {
    let groups = [
        group(
            "Proxy Group A",
            "Selector",
            "Proxy-1",
            &[
                "Proxy-1", "Proxy-2", "Proxy-3", "Proxy-4", "Proxy-5", "Proxy-6", "Proxy-7",
            ],
        ),
        group(
            "Proxy Group B",
            "URLTest",
            "Auto-2",
            &["Auto-1", "Auto-2", "Auto-3", "Auto-4", "Auto-5", "Auto-6"],
        ),
        group(
            "Proxy Group C",
            "Selector",
            "Direct-1",
            &[
                "Direct-1", "Direct-2", "Direct-3", "Direct-4", "Direct-5", "Direct-6",
                "Direct-7", "Direct-8",
            ],
        ),
    ];
    groups.into_iter().map(|g| (g.name.clone(), g)).collect()
}

fn group(name: &str, kind: &str, now: &str, members: &[&str]) -> Proxy {
    Proxy {
        name: name.to_string(),
        proxy_type: kind.to_string(),
        now: now.to_string(),
        all: members.iter().map(|m| m.to_string()).collect(),
        ..Proxy::default()
    }
}

#[cfg(test)]
#[path = "../tests/clash/mock_tests.rs"]
mod tests;
