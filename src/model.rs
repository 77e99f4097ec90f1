use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry of `GET /proxies`: either a plain node or a switchable group.
///
/// Every field is optional on the wire; the daemon omits what does not
/// apply (plain nodes have no `all`, fresh groups may have no `history`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Proxy {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub proxy_type: String,

    /// Active member name; empty for non-groups.
    #[serde(default)]
    pub now: String,

    /// Member names in the daemon's order (display order, not sorted).
    #[serde(default)]
    pub all: Vec<String>,

    #[serde(default)]
    pub history: Vec<DelayHistoryEntry>,

    #[serde(default)]
    pub uptime: String,

    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Proxy {
    pub fn kind(&self) -> Option<GroupKind> {
        GroupKind::from_wire(&self.proxy_type)
    }

    /// Position of `member` in the member list.
    pub fn member_index(&self, member: &str) -> Option<usize> {
        self.all.iter().position(|m| m == member)
    }

    /// Position of the active member, if it appears in the member list.
    /// The daemon is trusted to keep `now` consistent with `all`, but a
    /// violation must degrade gracefully, so this stays an `Option`.
    pub fn active_index(&self) -> Option<usize> {
        if self.now.is_empty() {
            return None;
        }
        self.member_index(&self.now)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DelayHistoryEntry {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub delay: u64,
}

/// Which group kinds an operator can switch by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
    /// Manual choice; the daemon keeps it until told otherwise.
    Selector,
    /// The daemon may re-pick the active member on its own (latency tests).
    UrlTest,
}

impl GroupKind {
    pub fn from_wire(proxy_type: &str) -> Option<Self> {
        match proxy_type {
            "Selector" => Some(Self::Selector),
            "URLTest" => Some(Self::UrlTest),
            _ => None,
        }
    }
}

/// The complete replace-on-load view of the daemon's proxies, plus the
/// derived list of selectable group names in stable display order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    proxies: HashMap<String, Proxy>,
    groups: Vec<String>,
}

impl Snapshot {
    pub fn from_proxies(proxies: HashMap<String, Proxy>) -> Self {
        let mut groups: Vec<String> = proxies
            .iter()
            .filter(|(_, proxy)| proxy.kind().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        groups.sort();
        Self { proxies, groups }
    }

    /// Selectable group names, sorted lexicographically.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&Proxy> {
        self.proxies.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
