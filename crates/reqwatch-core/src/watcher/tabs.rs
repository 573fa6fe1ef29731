//! Tab registry collaborators used to resolve page title and URL.

use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use crate::model::{TabId, TabInfo};

/// Host-side lookup of a tab's title and URL.
///
/// A failed lookup means the record for that request is not emitted.
pub trait TabRegistry: Send + Sync + 'static {
    fn get(&self, tab_id: TabId) -> impl Future<Output = Result<TabInfo>> + Send;
}

/// Registry for hosts without tabs: every lookup fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTabs;

impl TabRegistry for NoTabs {
    async fn get(&self, tab_id: TabId) -> Result<TabInfo> {
        anyhow::bail!("no tab registry; tab {} unavailable", tab_id)
    }
}

/// In-memory registry the host keeps current as tabs change.
#[derive(Debug, Default)]
pub struct StaticTabs {
    tabs: RwLock<HashMap<TabId, TabInfo>>,
}

impl StaticTabs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(tabs: HashMap<TabId, TabInfo>) -> Self {
        Self {
            tabs: RwLock::new(tabs),
        }
    }

    pub fn insert(&self, tab_id: TabId, info: TabInfo) {
        self.tabs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(tab_id, info);
    }

    pub fn remove(&self, tab_id: TabId) {
        self.tabs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&tab_id);
    }
}

impl TabRegistry for StaticTabs {
    async fn get(&self, tab_id: TabId) -> Result<TabInfo> {
        let tabs = self.tabs.read().unwrap_or_else(|e| e.into_inner());
        tabs.get(&tab_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown tab {}", tab_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_tabs_lookup() {
        let tabs = StaticTabs::new();
        tabs.insert(
            4,
            TabInfo {
                title: "Docs".to_string(),
                url: "https://example.com/docs".to_string(),
            },
        );
        assert_eq!(tabs.get(4).await.unwrap().title, "Docs");
        assert!(tabs.get(5).await.is_err());
        tabs.remove(4);
        assert!(tabs.get(4).await.is_err());
    }

    #[tokio::test]
    async fn no_tabs_always_fails() {
        assert!(NoTabs.get(1).await.is_err());
    }
}
