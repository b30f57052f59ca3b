//! Registry entries and their keys.

use std::sync::Arc;

use super::token::ComponentToken;
use crate::engine::StyleHandle;
use crate::style::Options;

/// Key of a registry entry: component identity plus resolved stylesheet id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub component: ComponentToken,
    pub id: String,
}

impl EntryKey {
    pub fn new(component: ComponentToken, id: impl Into<String>) -> Self {
        Self {
            component,
            id: id.into(),
        }
    }
}

/// Shared record for one stylesheet: who owns it, how many live instances
/// use it, and the handle currently standing for it.
///
/// Values handed out by the registry are snapshots; the counter reflects
/// the moment the snapshot was taken.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub(crate) key: EntryKey,
    pub(crate) counter: usize,
    pub(crate) handle: Arc<dyn StyleHandle>,
    pub(crate) options: Options,
}

impl RegistryEntry {
    pub fn key(&self) -> &EntryKey {
        &self.key
    }

    pub fn component(&self) -> ComponentToken {
        self.key.component
    }

    pub fn id(&self) -> &str {
        &self.key.id
    }

    /// Live instances sharing this entry.
    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn handle(&self) -> &Arc<dyn StyleHandle> {
        &self.handle
    }

    /// Normalized options the handle was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }
}
