//! Dictionary tree storage
//!
//! Arena-backed attribute tree. Nodes are owned by the [`Dictionary`];
//! everything else holds [`NodeId`] handles, which stay valid for the
//! dictionary's lifetime (nodes are never removed).

use std::collections::{BTreeMap, HashMap};

use crate::error::{BridgeError, Result};

/// Value kind of a dictionary attribute
///
/// A closed set: value parsing and rendering dispatch on this enum in one
/// place (`Value::parse` / `Value::render`) instead of inspecting nodes
/// throughout the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// 32-bit unsigned integer leaf
    Integer,

    /// Text leaf (raw bytes on the wire, no encoding enforced)
    String,

    /// Opaque byte-sequence leaf
    Bytes,

    /// Any other scalar (counters, gauges, timeticks); 64-bit unsigned
    OtherScalar,

    /// Branch node with numbered children, no value of its own
    Group,
}

/// Handle to a node inside a [`Dictionary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// One attribute definition
#[derive(Debug)]
struct AttrNode {
    name: String,
    number: u32,
    kind: AttrKind,
    parent: Option<NodeId>,
    children: BTreeMap<u32, NodeId>,
}

/// The attribute tree dictionary
///
/// Invariant: a node has children if and only if its kind is
/// [`AttrKind::Group`]; `insert` enforces this.
#[derive(Debug)]
pub struct Dictionary {
    nodes: Vec<AttrNode>,
    by_name: HashMap<String, NodeId>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    /// Create a dictionary containing only the (anonymous) root group
    pub fn new() -> Self {
        Self {
            nodes: vec![AttrNode {
                name: String::new(),
                number: 0,
                kind: AttrKind::Group,
                parent: None,
                children: BTreeMap::new(),
            }],
            by_name: HashMap::new(),
        }
    }

    /// Handle of the tree root
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Add an attribute under `parent`
    ///
    /// Fails if `parent` is not a group, the number is already taken at that
    /// level, or the (non-empty) name is already defined.
    pub fn insert(&mut self, parent: NodeId, number: u32, name: &str, kind: AttrKind) -> Result<NodeId> {
        if self.node(parent).kind != AttrKind::Group {
            return Err(BridgeError::Dictionary(format!(
                "cannot add \"{name}\" beneath \"{}\": not a group",
                self.node(parent).name
            )));
        }
        if self.node(parent).children.contains_key(&number) {
            return Err(BridgeError::Dictionary(format!(
                "duplicate attribute number {number} beneath \"{}\"",
                self.node(parent).name
            )));
        }
        if !name.is_empty() && self.by_name.contains_key(name) {
            return Err(BridgeError::Dictionary(format!("duplicate attribute name \"{name}\"")));
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AttrNode {
            name: name.to_string(),
            number,
            kind,
            parent: Some(parent),
            children: BTreeMap::new(),
        });
        self.nodes[parent.0 as usize].children.insert(number, id);
        if !name.is_empty() {
            self.by_name.insert(name.to_string(), id);
        }

        Ok(id)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Child of `parent` with the given attribute number
    pub fn child_by_num(&self, parent: NodeId, number: u32) -> Option<NodeId> {
        self.node(parent).children.get(&number).copied()
    }

    /// Attribute with the given name, if defined
    pub fn attr_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Parent of a node (`None` for the root)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Value kind of a node
    pub fn kind(&self, id: NodeId) -> AttrKind {
        self.node(id).kind
    }

    /// Attribute number of a node within its parent
    pub fn number(&self, id: NodeId) -> u32 {
        self.node(id).number
    }

    /// Attribute name (empty for unnamed nodes and the root)
    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    /// Human-readable label for diagnostics: the name when present,
    /// otherwise the absolute dotted position.
    pub fn label(&self, id: NodeId) -> String {
        let name = self.name(id);
        if !name.is_empty() {
            return name.to_string();
        }
        let path: Vec<String> = self.node_path(id).iter().map(|n| n.to_string()).collect();
        format!(".{}", path.join("."))
    }

    /// Whether `node` is `ancestor` itself or lies beneath it
    pub fn is_beneath(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.node(id).parent;
        }
        false
    }

    /// Attribute numbers from `ancestor` (exclusive) down to `node`
    /// (inclusive), shallowest first
    ///
    /// Returns `None` when `node` is not beneath `ancestor`; returns an
    /// empty vector when they are the same node.
    pub fn oid_suffix(&self, ancestor: NodeId, node: NodeId) -> Option<Vec<u32>> {
        let mut components = Vec::new();
        let mut cur = node;
        while cur != ancestor {
            components.push(self.node(cur).number);
            cur = self.node(cur).parent?;
        }
        components.reverse();
        Some(components)
    }

    /// Absolute attribute numbers from the tree root down to `node`
    pub fn node_path(&self, node: NodeId) -> Vec<u32> {
        self.oid_suffix(self.root(), node)
            .unwrap_or_default()
    }

    /// Node at an absolute component path, if every component resolves
    pub fn node_at_path(&self, path: &[u32]) -> Option<NodeId> {
        let mut cur = self.root();
        for &number in path {
            cur = self.child_by_num(cur, number)?;
        }
        Some(cur)
    }

    fn node(&self, id: NodeId) -> &AttrNode {
        &self.nodes[id.0 as usize]
    }
}
