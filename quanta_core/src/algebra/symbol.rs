//! Identity-bearing symbols.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named symbol with a unique identity.
///
/// Two symbols created with the same name are different symbols: equality and
/// hashing use the id only. Re-declaring a quantity therefore produces a new
/// symbol that never collides with the superseded one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    id: Uuid,
    name: String,
}

impl Symbol {
    /// Create a fresh symbol
    pub fn new(name: impl Into<String>) -> Self {
        Symbol {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Unique identity of this symbol
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
