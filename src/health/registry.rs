//! Registered checks and their identities.

use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::check::Check;

/// Suffix appended to an identity that is already taken.
const DUPLICATE_SUFFIX: &str = "_x";

/// A check together with the identity it was registered under.
#[derive(Clone)]
pub struct RegistryEntry {
    pub id: String,
    pub check: Arc<dyn Check>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("name", &self.check.name())
            .finish()
    }
}

/// Append-only, insertion-ordered set of checks.
///
/// Registration takes the write lock; snapshots for report runs take the read
/// lock and clone the entry list, so a run never holds the lock while checks
/// execute.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<Vec<RegistryEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a check and return the identity it was assigned.
    ///
    /// The requested name is lower-cased with dashes replaced by underscores.
    /// An identity that is already taken gets `_x` appended until it is unique.
    /// Both adjustments are logged as warnings and never rejected. Checks owning
    /// a polling task start it here, bound to `token`.
    pub fn register<C: Check>(&self, token: &CancellationToken, check: C) -> String {
        self.register_shared(token, Arc::new(check))
    }

    /// Register an already shared check.
    pub fn register_shared(&self, token: &CancellationToken, check: Arc<dyn Check>) -> String {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        let requested = check.name();
        let (mut id, unchanged) = normalize_name(requested);
        if !unchanged {
            warn!(
                name = %requested,
                better_name = %id,
                "Choose a better check name: lowercase letters, digits and underscores"
            );
        }

        while entries.iter().any(|entry| entry.id == id) {
            let new_id = format!("{}{}", id, DUPLICATE_SUFFIX);
            warn!(name = %requested, new_name = %new_id, "Check name is duplicated, adding suffix");
            id = new_id;
        }

        check.start(token.clone());

        entries.push(RegistryEntry {
            id: id.clone(),
            check,
        });

        id
    }

    /// Copy of the current entries, in registration order.
    pub fn snapshot(&self) -> Vec<RegistryEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registered identities, in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| entry.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalize a requested check name into an identity.
///
/// Returns the identity and whether it equals the requested name.
pub fn normalize_name(name: &str) -> (String, bool) {
    let id = name.to_lowercase().replace('-', "_");
    let unchanged = id == name;
    (id, unchanged)
}
