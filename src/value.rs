//! Value data model
//!
//! The units the codec, formatter and transport pass between each other:
//! typed scalar values ([`Value`]), tree-positioned values ([`TypedValue`])
//! grouped into ordered [`ValueSet`]s, and the externally visible
//! [`Varbind`] result triple.

use crate::dict::{AttrKind, NodeId};

/// A typed scalar value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 32-bit unsigned integer
    Integer(u32),

    /// Text value, kept as raw bytes (passed through verbatim)
    String(Vec<u8>),

    /// Opaque byte sequence
    Bytes(Vec<u8>),

    /// Other scalar kinds (counters, gauges, timeticks)
    Scalar(u64),
}

impl Value {
    /// Kind-appropriate empty placeholder for read operations
    ///
    /// The wire format requires a non-empty value, so string-like kinds get
    /// a single zero byte and numeric kinds a zero value. `None` for groups,
    /// which never carry values.
    pub fn placeholder(kind: AttrKind) -> Option<Value> {
        match kind {
            AttrKind::Integer => Some(Value::Integer(0)),
            AttrKind::String => Some(Value::String(vec![0])),
            AttrKind::Bytes => Some(Value::Bytes(vec![0])),
            AttrKind::OtherScalar => Some(Value::Scalar(0)),
            AttrKind::Group => None,
        }
    }

    /// Parse a value string according to the declared kind
    pub fn parse(kind: AttrKind, s: &str) -> std::result::Result<Value, String> {
        match kind {
            AttrKind::Integer => s
                .parse::<u32>()
                .map(Value::Integer)
                .map_err(|_| format!("invalid integer value \"{s}\"")),
            AttrKind::OtherScalar => s
                .parse::<u64>()
                .map(Value::Scalar)
                .map_err(|_| format!("invalid numeric value \"{s}\"")),
            AttrKind::String => Ok(Value::String(s.as_bytes().to_vec())),
            AttrKind::Bytes => {
                // Octet values arrive as hex text (0x prefix optional)
                let hex_str = s.strip_prefix("0x").unwrap_or(s);
                hex::decode(hex_str)
                    .map(Value::Bytes)
                    .map_err(|_| format!("invalid octet value \"{s}\""))
            }
            AttrKind::Group => Err("groups cannot carry a value".to_string()),
        }
    }

    /// Render the value for the control channel
    ///
    /// String and byte kinds pass through their raw bytes verbatim and
    /// length-exact; numeric kinds render as decimal text.
    pub fn render(&self) -> Vec<u8> {
        match self {
            Value::Integer(n) => n.to_string().into_bytes(),
            Value::Scalar(n) => n.to_string().into_bytes(),
            Value::String(bytes) | Value::Bytes(bytes) => bytes.clone(),
        }
    }

    /// Integer view, for index values and operation markers
    pub fn as_integer(&self) -> Option<u32> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// Position of a value within the request/reply structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Synthesized iteration position within a table group; always carries
    /// an integer and is tagged with the index slot (child 0) of the group
    Index,

    /// Terminal value named by the full path
    ///
    /// `zero_instance` records that the leaf was selected through a
    /// terminal `.0` component, so the formatter can reproduce the exact
    /// instance path in its reply.
    Leaf { zero_instance: bool },
}

/// One tree-positioned value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    pub node: NodeId,
    pub role: Role,
    pub value: Value,
}

impl TypedValue {
    /// Index value for a table iteration position
    pub fn index(node: NodeId, position: u32) -> Self {
        Self {
            node,
            role: Role::Index,
            value: Value::Integer(position),
        }
    }

    /// Terminal leaf value
    pub fn leaf(node: NodeId, zero_instance: bool, value: Value) -> Self {
        Self {
            node,
            role: Role::Leaf { zero_instance },
            value,
        }
    }
}

/// Ordered sequence of tree-positioned values
///
/// Insertion order is significant: index selections shallowest first,
/// followed by the terminal leaf. Created per command, consumed once,
/// never cached across commands.
pub type ValueSet = Vec<TypedValue>;

/// One externally visible result unit: path, type tag and rendered value
///
/// Produced only by the varbind formatter and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varbind {
    /// Dotted instance path, with leading dot
    pub path: String,

    /// Type tag captured from the backend's type marker
    pub type_tag: String,

    /// Rendered value bytes (raw for string/byte kinds, decimal otherwise)
    pub value: Vec<u8>,
}
