//! Core identity and payload types shared across the crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Identity of a component targeted by a service bind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentIdentity {
    /// Package the component lives in.
    pub package: String,
    /// Entry name within the package.
    pub class: String,
}

impl ComponentIdentity {
    /// Build a component identity from its package and entry name.
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

/// Kernel-assigned identity of a calling or receiving party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartyId(pub u32);

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Description of a payload the host is about to deliver.
///
/// All fields are optional: a payload may be addressed by action, by
/// explicit component, by data URI, or any combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadDescriptor {
    /// Action verb (e.g. `"net.firegate.action.SYNC"`).
    pub action: Option<String>,
    /// Explicit target component, when addressed directly.
    pub component: Option<ComponentIdentity>,
    /// Data URI the payload operates on.
    pub data: Option<Url>,
}

impl PayloadDescriptor {
    /// Payload addressed by action verb only.
    pub fn for_action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            ..Self::default()
        }
    }

    /// Payload addressed at an explicit component.
    pub fn for_component(component: ComponentIdentity) -> Self {
        Self {
            component: Some(component),
            ..Self::default()
        }
    }
}
