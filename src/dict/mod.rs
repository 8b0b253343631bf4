//! Attribute Tree Dictionary
//!
//! The dictionary maps dotted numeric OIDs onto a tree of typed attribute
//! definitions. It is built once at startup, then shared read-only by the
//! path codec, the varbind formatter and the wire codec.
//!
//! ## Tree shape
//! ```text
//! root (group)
//!  ├── 26 "SNMP" (group)            ← subtree the bridge serves
//!  │    ├── 1 (integer)             ← plain scalar leaf
//!  │    └── 3 (group)               ← table
//!  │         ├── 0 (integer)        ← index slot
//!  │         └── 1 (group)          ← entry (one row)
//!  │              └── 2 (string)    ← column leaf
//!  ├── 40 "SNMP-Operation" (integer)
//!  └── 41 "Message-Authenticator" (octets)
//! ```
//!
//! By convention a table group has an integer child `0` (the index slot)
//! and a group child `1` (the entry describing one row).

mod tree;
mod loader;

pub use tree::{AttrKind, Dictionary, NodeId};
pub use loader::{load_dictionary, parse_dictionary};

use crate::error::{BridgeError, Result};

/// Well-known attributes the session needs beyond the OID subtree itself.
///
/// Resolved by name once at startup; a missing definition means the
/// dictionary cannot support the bridge and is a startup error.
#[derive(Debug, Clone, Copy)]
pub struct SnmpAttrs {
    /// Root of the served OID subtree; paths are evaluated from here
    pub root: NodeId,

    /// Operation marker attribute (carries the numeric command code)
    pub op: NodeId,

    /// Type marker attribute sent by the backend alongside each value
    pub ty: NodeId,

    /// Error-indicator attribute present in failed `set` replies
    pub failure: NodeId,

    /// Integrity placeholder attribute required by the backend protocol
    pub authenticator: NodeId,
}

impl SnmpAttrs {
    /// Names looked up in the dictionary, in resolution order.
    const ROOT: &'static str = "SNMP";
    const OPERATION: &'static str = "SNMP-Operation";
    const TYPE: &'static str = "SNMP-Type";
    const FAILURE: &'static str = "SNMP-Failure";
    const AUTHENTICATOR: &'static str = "Message-Authenticator";

    /// Resolve all well-known attributes, failing on the first one missing.
    pub fn resolve(dict: &Dictionary) -> Result<Self> {
        let lookup = |name: &str| {
            dict.attr_by_name(name).ok_or_else(|| {
                BridgeError::Dictionary(format!("incomplete dictionary: missing definition for \"{name}\""))
            })
        };

        let root = lookup(Self::ROOT)?;
        if dict.kind(root) != AttrKind::Group {
            return Err(BridgeError::Dictionary(format!(
                "\"{}\" must be a group, found {:?}",
                Self::ROOT,
                dict.kind(root)
            )));
        }

        Ok(Self {
            root,
            op: lookup(Self::OPERATION)?,
            ty: lookup(Self::TYPE)?,
            failure: lookup(Self::FAILURE)?,
            authenticator: lookup(Self::AUTHENTICATOR)?,
        })
    }
}
