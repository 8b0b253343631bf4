//! Path Codec — decode
//!
//! Builds the value set representing an OID string, adding index values
//! where required.
//!
//! An OID string such as `.26.3.5.2.0` is evaluated from a starting node.
//! Components resolving to direct numeric children descend the tree. When a
//! component does not match a child, but the current level has children `0`
//! (integer index slot) and `1` (entry group), the component is taken as a
//! table position: an Index value carrying the child-`0` node and that
//! number is appended, and evaluation resumes inside the entry group. This
//! represents table traversals as a value sequence and supports the full
//! range of row positions, which literal tree children could not.
//!
//! By convention a terminal `0` names the current group's representative
//! value: `.26.1.0` selects the leaf at `.26.1` itself.

use crate::dict::{AttrKind, Dictionary, NodeId};
use crate::error::{BridgeError, Result};
use crate::value::{TypedValue, Value, ValueSet};

/// Outcome of resolving a run of path components as direct children
enum Step {
    /// The final component was reached; `attr` is its number and `parent`
    /// the node it was evaluated against
    Resolved { parent: NodeId, attr: u32, end: usize },

    /// A non-terminal component did not match a child of `parent`
    Unresolved {
        parent: NodeId,
        offset: usize,
        number: u32,
        resume: usize,
    },
}

/// Convert an OID string into a value set
///
/// `value` is `None` for read operations; for write operations it is parsed
/// according to the leaf's declared kind. Returns the value set (index
/// values shallowest first, terminal leaf last) and the count of path
/// characters consumed.
///
/// On failure the error carries the byte offset into `path` at which
/// evaluation stopped, for caret-aligned diagnostics.
pub fn path_to_values(
    dict: &Dictionary,
    root: NodeId,
    path: &str,
    value: Option<&str>,
) -> Result<(ValueSet, usize)> {
    // Leading dot is optional
    let mut pos = usize::from(path.starts_with('.'));

    let mut values = ValueSet::new();
    let mut parent = root;

    // Index discovery loop: exits only on first successful resolution of a
    // terminal component, or on an unrecoverable parse error.
    let (leaf_parent, attr, end) = loop {
        match resolve_chain(dict, parent, path, pos)? {
            Step::Resolved { parent, attr, end } => break (parent, attr, end),
            Step::Unresolved {
                parent: at,
                offset,
                number,
                resume,
            } => {
                let index_attr = dict.child_by_num(at, 0).ok_or_else(|| {
                    oid_error(offset, "unknown OID component: no index attribute at this level")
                })?;
                if dict.kind(index_attr) != AttrKind::Integer {
                    return Err(oid_error(offset, "index attribute is not an integer"));
                }

                // By convention table entries sit at child 1
                let entry = dict.child_by_num(at, 1).ok_or_else(|| {
                    oid_error(offset, "unknown OID component: no entry attribute at this level")
                })?;
                if dict.kind(entry) != AttrKind::Group {
                    return Err(oid_error(offset, "entry attribute is not a group"));
                }

                values.push(TypedValue::index(index_attr, number));
                parent = entry;
                pos = resume;
            }
        }
    };

    // A terminal 0 requests the group's representative leaf: the node the
    // final component was evaluated against, rather than a child of it.
    let (leaf, zero_instance) = if attr != 0 {
        let child = dict
            .child_by_num(leaf_parent, attr)
            .ok_or_else(|| oid_error(end, format!("unknown leaf attribute {attr}")))?;
        (child, false)
    } else {
        (leaf_parent, true)
    };

    let kind = dict.kind(leaf);
    if kind == AttrKind::Group {
        return Err(oid_error(
            end,
            format!("OID must specify a leaf, \"{}\" is a group", dict.label(leaf)),
        ));
    }

    let leaf_value = match value {
        None => Value::placeholder(kind)
            .ok_or_else(|| oid_error(end, "leaf kind carries no value"))?,
        Some(s) => Value::parse(kind, s).map_err(|cause| oid_error(end, cause))?,
    };

    values.push(TypedValue::leaf(leaf, zero_instance, leaf_value));

    Ok((values, end))
}

/// Resolve consecutive components as direct numeric children of `parent`
///
/// Descends for every non-terminal component that matches a child. The
/// terminal component is parsed but never looked up: the caller decides
/// whether it names a child or the group itself.
fn resolve_chain(dict: &Dictionary, mut parent: NodeId, path: &str, mut pos: usize) -> Result<Step> {
    loop {
        let (number, end) = parse_component(path, pos)?;

        if end == path.len() {
            return Ok(Step::Resolved { parent, attr: number, end });
        }
        if path.as_bytes()[end] != b'.' {
            return Err(oid_error(end, "expected '.' between OID components"));
        }

        match dict.child_by_num(parent, number) {
            Some(child) => {
                parent = child;
                pos = end + 1;
            }
            None => {
                return Ok(Step::Unresolved {
                    parent,
                    offset: pos,
                    number,
                    resume: end + 1,
                })
            }
        }
    }
}

/// Parse one non-negative numeric component starting at `pos`
fn parse_component(path: &str, pos: usize) -> Result<(u32, usize)> {
    let rest = &path[pos..];
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(oid_error(pos, "invalid OID component"));
    }

    let number = rest[..digits]
        .parse::<u32>()
        .map_err(|_| oid_error(pos, "OID component out of range"))?;

    Ok((number, pos + digits))
}

fn oid_error(offset: usize, cause: impl Into<String>) -> BridgeError {
    BridgeError::OidParse {
        offset,
        cause: cause.into(),
    }
}
