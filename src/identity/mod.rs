//! Read-only view of the identity store
//!
//! Key generation, address derivation, and signing belong to an external
//! collaborator that owns this store. The ledger only ever reads name to
//! address associations from it.

use crate::error::Result;
use crate::storage::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One identity record. Collaborator-written records may carry extra
/// fields; they are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    name: String,
    address: String,
    #[serde(default)]
    public_key: String,
}

impl Identity {
    pub fn new(name: &str, address: &str) -> Identity {
        Identity {
            name: name.to_string(),
            address: address.to_string(),
            public_key: String::new(),
        }
    }

    pub fn get_name(&self) -> &str {
        self.name.as_str()
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_public_key(&self) -> &str {
        self.public_key.as_str()
    }
}

#[derive(Clone)]
pub struct IdentityRegistry {
    store: Arc<dyn RecordStore<Identity>>,
}

impl IdentityRegistry {
    pub fn new(store: Arc<dyn RecordStore<Identity>>) -> IdentityRegistry {
        IdentityRegistry { store }
    }

    pub fn find(&self, name: &str) -> Result<Option<Identity>> {
        let identities = self.store.load()?;
        Ok(identities.into_iter().find(|i| i.name == name))
    }

    pub fn address_of(&self, name: &str) -> Result<Option<String>> {
        Ok(self.find(name)?.map(|i| i.address))
    }

    pub fn all(&self) -> Result<Vec<Identity>> {
        self.store.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_address_lookup() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(&[Identity::new("Carol", "addr-carol")])
            .unwrap();

        let registry = IdentityRegistry::new(store);
        assert_eq!(
            registry.address_of("Carol").unwrap().as_deref(),
            Some("addr-carol")
        );
        assert!(registry.address_of("Mallory").unwrap().is_none());
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        let text = r#"[{"name":"Carol","address":"addr-carol","public_key":"abc","curve":"p256"}]"#;
        let identities: Vec<Identity> = serde_json::from_str(text).unwrap();

        assert_eq!(identities[0].get_name(), "Carol");
        assert_eq!(identities[0].get_public_key(), "abc");
    }

    #[test]
    fn test_missing_public_key_defaults_to_empty() {
        let text = r#"[{"name":"Carol","address":"addr-carol"}]"#;
        let identities: Vec<Identity> = serde_json::from_str(text).unwrap();

        assert!(identities[0].get_public_key().is_empty());
    }
}
