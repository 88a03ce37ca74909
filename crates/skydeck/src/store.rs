//! Application data store.
//!
//! [`AppStore`] caches lists fetched from the backend so pages can share
//! them without refetching. It is constructed explicitly by the console root
//! and handed to whatever needs it; there is no global instance.
//!
//! Each cached list is `None` until first loaded, so "not loaded yet" and
//! "loaded, but empty" stay distinct.

use skydeck_core::logging::targets;
use skydeck_core::{Property, Signal};

use crate::models::{Application, CloudAccount};

/// Identifies a cached collection in [`AppStore::changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    CloudAccounts,
    Applications,
}

/// Shared cache of backend lists.
///
/// # Signals
///
/// - `changed(StoreKey)`: a collection was replaced, edited or invalidated
#[derive(Debug, Default)]
pub struct AppStore {
    cloud_accounts: Property<Option<Vec<CloudAccount>>>,
    applications: Property<Option<Vec<Application>>>,

    /// Emitted when a collection's contents change.
    pub changed: Signal<StoreKey>,
}

impl AppStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, key: StoreKey, changed: bool) -> bool {
        if changed {
            tracing::trace!(target: targets::STORE, ?key, "store changed");
            self.changed.emit(key);
        }
        changed
    }

    // =========================================================================
    // Cloud accounts
    // =========================================================================

    /// Cached cloud accounts, `None` if never loaded.
    pub fn cloud_accounts(&self) -> Option<Vec<CloudAccount>> {
        self.cloud_accounts.get()
    }

    /// Look up a cached cloud account.
    pub fn cloud_account(&self, id: &str) -> Option<CloudAccount> {
        self.cloud_accounts
            .with(|list| list.as_ref()?.iter().find(|a| a.id == id).cloned())
    }

    /// Replace the cached cloud accounts.
    pub fn set_cloud_accounts(&self, accounts: Vec<CloudAccount>) -> bool {
        let changed = self.cloud_accounts.set(Some(accounts));
        self.notify(StoreKey::CloudAccounts, changed)
    }

    /// Insert or replace one cloud account, matched by id.
    ///
    /// Starts the list if it was never loaded.
    pub fn upsert_cloud_account(&self, account: CloudAccount) -> bool {
        let changed = self
            .cloud_accounts
            .update(|list| upsert(list.get_or_insert_with(Vec::new), account, |a| &a.id));
        self.notify(StoreKey::CloudAccounts, changed)
    }

    /// Remove one cloud account by id.
    pub fn remove_cloud_account(&self, id: &str) -> bool {
        let changed = self.cloud_accounts.update(|list| {
            if let Some(list) = list {
                list.retain(|a| a.id != id);
            }
        });
        self.notify(StoreKey::CloudAccounts, changed)
    }

    // =========================================================================
    // Applications
    // =========================================================================

    /// Cached applications, `None` if never loaded.
    pub fn applications(&self) -> Option<Vec<Application>> {
        self.applications.get()
    }

    /// Look up a cached application.
    pub fn application(&self, id: &str) -> Option<Application> {
        self.applications
            .with(|list| list.as_ref()?.iter().find(|a| a.id == id).cloned())
    }

    /// Replace the cached applications.
    pub fn set_applications(&self, applications: Vec<Application>) -> bool {
        let changed = self.applications.set(Some(applications));
        self.notify(StoreKey::Applications, changed)
    }

    /// Insert or replace one application, matched by id.
    pub fn upsert_application(&self, application: Application) -> bool {
        let changed = self
            .applications
            .update(|list| upsert(list.get_or_insert_with(Vec::new), application, |a| &a.id));
        self.notify(StoreKey::Applications, changed)
    }

    /// Remove one application by id.
    pub fn remove_application(&self, id: &str) -> bool {
        let changed = self.applications.update(|list| {
            if let Some(list) = list {
                list.retain(|a| a.id != id);
            }
        });
        self.notify(StoreKey::Applications, changed)
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Drop a cached collection so the next reader refetches it.
    pub fn invalidate(&self, key: StoreKey) -> bool {
        let changed = match key {
            StoreKey::CloudAccounts => self.cloud_accounts.set(None),
            StoreKey::Applications => self.applications.set(None),
        };
        self.notify(key, changed)
    }

    /// Drop every cached collection (e.g. on logout).
    pub fn clear(&self) {
        self.invalidate(StoreKey::CloudAccounts);
        self.invalidate(StoreKey::Applications);
    }
}

fn upsert<T>(list: &mut Vec<T>, item: T, id: impl Fn(&T) -> &String) {
    match list.iter().position(|existing| id(existing) == id(&item)) {
        Some(pos) => list[pos] = item,
        None => list.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CloudProvider;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn account(id: &str, name: &str) -> CloudAccount {
        CloudAccount {
            id: id.to_string(),
            name: name.to_string(),
            provider: CloudProvider::Gcp,
            description: None,
            status: None,
            created_at: None,
        }
    }

    #[test]
    fn test_unloaded_vs_empty() {
        let store = AppStore::new();
        assert_eq!(store.cloud_accounts(), None);
        store.set_cloud_accounts(Vec::new());
        assert_eq!(store.cloud_accounts(), Some(Vec::new()));
    }

    #[test]
    fn test_upsert_and_remove() {
        let store = AppStore::new();
        assert!(store.upsert_cloud_account(account("a", "one")));
        assert!(store.upsert_cloud_account(account("b", "two")));
        assert!(store.upsert_cloud_account(account("a", "renamed")));

        let accounts = store.cloud_accounts().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(store.cloud_account("a").unwrap().name, "renamed");

        assert!(store.remove_cloud_account("a"));
        assert!(!store.remove_cloud_account("a"));
        assert_eq!(store.cloud_account("a"), None);
    }

    #[test]
    fn test_changed_signal_only_on_change() {
        let store = AppStore::new();
        let keys = Arc::new(Mutex::new(Vec::new()));
        let keys_clone = keys.clone();
        store.changed.connect(move |&key| keys_clone.lock().push(key));

        store.set_cloud_accounts(vec![account("a", "one")]);
        // Same contents: no emission
        store.set_cloud_accounts(vec![account("a", "one")]);
        store.invalidate(StoreKey::Applications);
        store.invalidate(StoreKey::CloudAccounts);

        assert_eq!(
            *keys.lock(),
            vec![StoreKey::CloudAccounts, StoreKey::CloudAccounts]
        );
    }
}
