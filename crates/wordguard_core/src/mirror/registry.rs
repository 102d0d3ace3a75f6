//! In-process registry resolving mirror addresses to store handles.

use super::types::{is_valid_authority, MirrorAddress, MirrorError, MirrorResult, MirrorStore};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Mirror registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorRegistryError {
    InvalidAuthority(String),
    DuplicateAuthority(String),
}

impl Display for MirrorRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAuthority(value) => write!(f, "mirror authority is invalid: {value}"),
            Self::DuplicateAuthority(value) => {
                write!(f, "mirror authority already registered: {value}")
            }
        }
    }
}

impl Error for MirrorRegistryError {}

/// Runtime mirror registry keyed by provider authority.
#[derive(Default)]
pub struct MirrorRegistry {
    mirrors: BTreeMap<String, Arc<dyn MirrorStore>>,
}

impl MirrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one mirror under its own authority.
    pub fn register(&mut self, mirror: Arc<dyn MirrorStore>) -> Result<(), MirrorRegistryError> {
        let authority = mirror.authority().trim().to_string();
        if !is_valid_authority(&authority) {
            return Err(MirrorRegistryError::InvalidAuthority(authority));
        }
        if self.mirrors.contains_key(authority.as_str()) {
            return Err(MirrorRegistryError::DuplicateAuthority(authority));
        }

        self.mirrors.insert(authority, mirror);
        Ok(())
    }

    /// Removes a mirror, as when the providing application is uninstalled.
    pub fn unregister(&mut self, authority: &str) -> Option<Arc<dyn MirrorStore>> {
        self.mirrors.remove(authority.trim())
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }

    /// Returns sorted authorities.
    pub fn authorities(&self) -> Vec<String> {
        self.mirrors.keys().cloned().collect()
    }

    /// Resolves an address to its mirror.
    pub fn resolve(&self, address: &MirrorAddress) -> MirrorResult<Arc<dyn MirrorStore>> {
        self.mirrors
            .get(address.authority())
            .cloned()
            .ok_or_else(|| MirrorError::NotAvailable(address.authority().to_string()))
    }
}
