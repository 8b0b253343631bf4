//! Varbind Formatter — encode
//!
//! Reconstructs (path, type, value) varbind triples from the value list the
//! backend returns for one exchange.
//!
//! The backend is contractually required to return index values in order of
//! depth (shallowest first) ahead of the leaf they position, and to send a
//! type marker before each leaf. Values outside the served subtree are
//! skipped; the type marker updates the held type tag without producing a
//! varbind of its own.
//!
//! The path accumulator is growable but explicitly bounded: exceeding
//! [`MAX_OID_LEN`] is an error, never a silent truncation.

use std::fmt::Write as _;

use crate::dict::{AttrKind, Dictionary, NodeId};
use crate::error::{BridgeError, Result};
use crate::value::{Role, Varbind, ValueSet};

/// Upper bound on a reconstructed path string, in bytes
pub const MAX_OID_LEN: usize = 512;

/// Convert a reply value list into varbinds
///
/// `root` marks where returned values begin being relevant; `type_attr` is
/// the out-of-band type marker attribute. Returns the varbinds in reply
/// order; an empty vector means the backend had no data at the requested
/// position, which is not an error.
pub fn values_to_varbinds(
    dict: &Dictionary,
    root: NodeId,
    type_attr: NodeId,
    reply: &ValueSet,
) -> Result<Vec<Varbind>> {
    let mut varbinds = Vec::new();

    let mut parent = root;
    let mut path = String::new();
    let mut type_tag: Option<String> = None;

    for tv in reply {
        // The type marker annotates the next leaf; it is not itself a varbind.
        if tv.node == type_attr {
            type_tag = Some(String::from_utf8_lossy(&tv.value.render()).into_owned());
            continue;
        }

        // Values at or beside the root (operation markers, authenticators,
        // unrelated attributes) are not ours to report.
        if !dict.is_beneath(tv.node, root) {
            continue;
        }

        // Ordering contract: each value must sit beneath the cursor
        // established by the preceding index values (or the root after a
        // reset).
        if !dict.is_beneath(tv.node, parent) {
            return Err(BridgeError::Varbind(format!(
                "out of order index attributes: \"{}\" is not beneath \"{}\"",
                dict.label(tv.node),
                dict.label(parent)
            )));
        }

        // Index values are recognized by their position: the index slot is
        // always child 0 of its table group.
        if dict.number(tv.node) == 0 {
            if dict.kind(tv.node) != AttrKind::Integer {
                return Err(BridgeError::Varbind(format!(
                    "index attribute \"{}\" is not an integer",
                    dict.label(tv.node)
                )));
            }
            let position = tv.value.as_integer().ok_or_else(|| {
                BridgeError::Varbind(format!(
                    "index attribute \"{}\" carries a non-integer value",
                    dict.label(tv.node)
                ))
            })?;

            let group = dict.parent(tv.node).ok_or_else(|| {
                BridgeError::Varbind("index attribute has no owning group".to_string())
            })?;

            // Path from the cursor down to the owning group, then the row
            // position itself as the next component.
            for number in suffix(dict, parent, group) {
                push_component(&mut path, number)?;
            }
            push_component(&mut path, position)?;

            // Subsequent values are evaluated inside the row the index
            // addresses.
            parent = dict.child_by_num(group, 1).ok_or_else(|| {
                BridgeError::Varbind(format!(
                    "no entry attribute beneath \"{}\"",
                    dict.label(group)
                ))
            })?;
            continue;
        }

        // Terminal leaf: complete the path and emit one varbind.
        for number in suffix(dict, parent, tv.node) {
            push_component(&mut path, number)?;
        }
        if matches!(tv.role, Role::Leaf { zero_instance: true }) {
            push_component(&mut path, 0)?;
        }

        let tag = type_tag.take().ok_or_else(|| {
            BridgeError::Varbind(format!(
                "no type marker found before value \"{}\"",
                dict.label(tv.node)
            ))
        })?;

        // Kind-appropriate rendering: string/byte kinds verbatim and
        // length-exact, numeric kinds as decimal text.
        varbinds.push(Varbind {
            path: std::mem::take(&mut path),
            type_tag: tag,
            value: tv.value.render(),
        });

        // Reset for the next varbind in a multi-value reply.
        parent = root;
    }

    Ok(varbinds)
}

/// Components from `ancestor` (exclusive) to `node` (inclusive)
///
/// Callers have already established the ancestry with `is_beneath`, so a
/// missing suffix cannot occur; an empty suffix (same node) is valid.
fn suffix(dict: &Dictionary, ancestor: NodeId, node: NodeId) -> Vec<u32> {
    dict.oid_suffix(ancestor, node).unwrap_or_default()
}

/// Append one `.N` component, enforcing the accumulator bound
fn push_component(path: &mut String, number: u32) -> Result<()> {
    if path.len() >= MAX_OID_LEN {
        return Err(BridgeError::Varbind(format!(
            "OID buffer limit of {MAX_OID_LEN} bytes exceeded"
        )));
    }
    // Writing to a String cannot fail
    let _ = write!(path, ".{number}");
    Ok(())
}
