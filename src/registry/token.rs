//! Opaque component identities.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ISSUED: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Identity {
    Type(TypeId),
    Issued(u64),
}

/// Identity of a component definition, used as half of a registry key.
///
/// Two tokens are equal only if they name the same definition: the same
/// Rust type for [`of`](Self::of), or the same call to
/// [`issue`](Self::issue). The name is carried for diagnostics and takes no
/// part in comparisons.
#[derive(Clone, Copy)]
pub struct ComponentToken {
    identity: Identity,
    name: &'static str,
}

impl ComponentToken {
    /// Token for the component type `C`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            identity: Identity::Type(TypeId::of::<C>()),
            name: type_name::<C>(),
        }
    }

    /// Issues a token distinct from every other token, for definitions that
    /// share a Rust type.
    pub fn issue(name: &'static str) -> Self {
        Self {
            identity: Identity::Issued(NEXT_ISSUED.fetch_add(1, Ordering::Relaxed)),
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentToken {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for ComponentToken {}

impl Hash for ComponentToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Debug for ComponentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentToken").field(&self.name).finish()
    }
}

impl fmt::Display for ComponentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
