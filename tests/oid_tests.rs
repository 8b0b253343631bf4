//! Path Codec Tests
//!
//! Tests for OID string decoding: direct descent, index synthesis, the
//! terminal-zero convention, set-value parsing and error offsets.

use snmpbridge::codec::{path_to_values, values_to_varbinds};
use snmpbridge::dict::{AttrKind, Dictionary, NodeId};
use snmpbridge::value::{Role, TypedValue, Value};
use snmpbridge::BridgeError;

/// SNMP subtree used throughout:
///
/// ```text
/// 26 "SNMP" (group)
///  ├── 1 (group)
///  │    ├── 2 (group)
///  │    │    └── 3 (integer)
///  │    └── 5 (string)
///  └── 3 (group)                 table
///       ├── 0 (integer)          index slot
///       └── 1 (group)            entry
///            └── 2 (string)      column
/// ```
struct TestTree {
    dict: Dictionary,
    snmp: NodeId,
    uptime: NodeId,
    name: NodeId,
    index: NodeId,
    column: NodeId,
    type_attr: NodeId,
}

fn test_tree() -> TestTree {
    let mut dict = Dictionary::new();
    let root = dict.root();

    let snmp = dict.insert(root, 26, "SNMP", AttrKind::Group).unwrap();
    let a = dict.insert(snmp, 1, "Stats", AttrKind::Group).unwrap();
    let b = dict.insert(a, 2, "Packets", AttrKind::Group).unwrap();
    let uptime = dict.insert(b, 3, "Packets-Total", AttrKind::Integer).unwrap();
    let name = dict.insert(a, 5, "Contact", AttrKind::String).unwrap();

    let table = dict.insert(snmp, 3, "Client-Table", AttrKind::Group).unwrap();
    let index = dict.insert(table, 0, "Client-Index", AttrKind::Integer).unwrap();
    let entry = dict.insert(table, 1, "Client-Entry", AttrKind::Group).unwrap();
    let column = dict.insert(entry, 2, "Client-Name", AttrKind::String).unwrap();

    let type_attr = dict.insert(root, 41, "SNMP-Type", AttrKind::String).unwrap();

    TestTree {
        dict,
        snmp,
        uptime,
        name,
        index,
        column,
        type_attr,
    }
}

fn oid_err(t: &TestTree, path: &str) -> (usize, String) {
    match path_to_values(&t.dict, t.snmp, path, None).unwrap_err() {
        BridgeError::OidParse { offset, cause } => (offset, cause),
        other => panic!("expected OID parse error, got {other:?}"),
    }
}

// =============================================================================
// Direct Descent
// =============================================================================

#[test]
fn test_scalar_leaf() {
    let t = test_tree();
    let (values, consumed) = path_to_values(&t.dict, t.snmp, ".1.2.3", None).unwrap();

    assert_eq!(consumed, 6);
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].node, t.uptime);
    assert_eq!(values[0].role, Role::Leaf { zero_instance: false });
    assert_eq!(values[0].value, Value::Integer(0));
}

#[test]
fn test_terminal_zero_selects_parent() {
    let t = test_tree();
    let (values, _) = path_to_values(&t.dict, t.snmp, ".1.2.3.0", None).unwrap();

    assert_eq!(values.len(), 1);
    assert_eq!(values[0].node, t.uptime);
    assert_eq!(values[0].role, Role::Leaf { zero_instance: true });
}

#[test]
fn test_leading_dot_is_optional() {
    let t = test_tree();
    let (with_dot, _) = path_to_values(&t.dict, t.snmp, ".1.2.3.0", None).unwrap();
    let (without, _) = path_to_values(&t.dict, t.snmp, "1.2.3.0", None).unwrap();

    assert_eq!(with_dot, without);
}

#[test]
fn test_string_placeholder_for_reads() {
    let t = test_tree();
    let (values, _) = path_to_values(&t.dict, t.snmp, ".1.5.0", None).unwrap();

    assert_eq!(values[0].node, t.name);
    // String reads still need a non-empty placeholder on the wire
    assert_eq!(values[0].value, Value::String(vec![0]));
}

// =============================================================================
// Index Synthesis
// =============================================================================

#[test]
fn test_table_position_becomes_index_value() {
    let t = test_tree();
    let (values, _) = path_to_values(&t.dict, t.snmp, ".3.7.2", None).unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values[0].node, t.index);
    assert_eq!(values[0].role, Role::Index);
    assert_eq!(values[0].value, Value::Integer(7));
    assert_eq!(values[1].node, t.column);
    assert_eq!(values[1].role, Role::Leaf { zero_instance: false });
}

#[test]
fn test_table_leaf_with_terminal_zero() {
    let t = test_tree();
    let (values, _) = path_to_values(&t.dict, t.snmp, ".3.7.2.0", None).unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values[1].node, t.column);
    assert_eq!(values[1].role, Role::Leaf { zero_instance: true });
}

#[test]
fn test_unresolved_component_without_index_slot() {
    let t = test_tree();
    // 99 is not a child of the subtree root, which has no index slot
    let (offset, cause) = oid_err(&t, ".99.1.0");

    assert_eq!(offset, 1);
    assert!(cause.contains("no index attribute"), "got: {cause}");
}

#[test]
fn test_index_slot_must_be_integer() {
    let mut dict = Dictionary::new();
    let root = dict.root();
    let group = dict.insert(root, 26, "SNMP", AttrKind::Group).unwrap();
    dict.insert(group, 0, "Bad-Index", AttrKind::String).unwrap();
    dict.insert(group, 1, "Entry", AttrKind::Group).unwrap();

    let err = path_to_values(&dict, group, ".7.2", None).unwrap_err();
    assert!(err.to_string().contains("not an integer"), "got: {err}");
}

#[test]
fn test_entry_attribute_must_exist() {
    let mut dict = Dictionary::new();
    let root = dict.root();
    let group = dict.insert(root, 26, "SNMP", AttrKind::Group).unwrap();
    dict.insert(group, 0, "Index", AttrKind::Integer).unwrap();

    let err = path_to_values(&dict, group, ".7.2", None).unwrap_err();
    assert!(err.to_string().contains("no entry attribute"), "got: {err}");
}

#[test]
fn test_entry_attribute_must_be_group() {
    let mut dict = Dictionary::new();
    let root = dict.root();
    let group = dict.insert(root, 26, "SNMP", AttrKind::Group).unwrap();
    dict.insert(group, 0, "Index", AttrKind::Integer).unwrap();
    dict.insert(group, 1, "Bad-Entry", AttrKind::Integer).unwrap();

    let err = path_to_values(&dict, group, ".7.2", None).unwrap_err();
    assert!(err.to_string().contains("not a group"), "got: {err}");
}

// =============================================================================
// Leaf Validation
// =============================================================================

#[test]
fn test_group_cannot_terminate_path() {
    let t = test_tree();
    let (_, cause) = oid_err(&t, ".3.0");
    assert!(cause.contains("is a group"), "got: {cause}");
}

#[test]
fn test_unknown_leaf_attribute() {
    let t = test_tree();
    let (offset, cause) = oid_err(&t, ".1.2.9");
    assert_eq!(offset, 6);
    assert!(cause.contains("unknown leaf attribute 9"), "got: {cause}");
}

// =============================================================================
// Syntax Errors
// =============================================================================

#[test]
fn test_empty_component_offset() {
    let t = test_tree();
    let (offset, cause) = oid_err(&t, ".1..2");
    assert_eq!(offset, 3);
    assert!(cause.contains("invalid OID component"), "got: {cause}");
}

#[test]
fn test_component_out_of_range() {
    let t = test_tree();
    let (_, cause) = oid_err(&t, ".1.99999999999");
    assert!(cause.contains("out of range"), "got: {cause}");
}

#[test]
fn test_non_numeric_component() {
    let t = test_tree();
    let (offset, _) = oid_err(&t, ".1.x.3");
    assert_eq!(offset, 3);
}

// =============================================================================
// Set Values
// =============================================================================

#[test]
fn test_set_value_parsed_by_leaf_kind() {
    let t = test_tree();
    let (values, _) = path_to_values(&t.dict, t.snmp, ".1.2.3.0", Some("42")).unwrap();
    assert_eq!(values[0].value, Value::Integer(42));

    let (values, _) = path_to_values(&t.dict, t.snmp, ".1.5.0", Some("hello")).unwrap();
    assert_eq!(values[0].value, Value::String(b"hello".to_vec()));
}

#[test]
fn test_set_value_rejected_by_leaf_kind() {
    let t = test_tree();
    let err = path_to_values(&t.dict, t.snmp, ".1.2.3.0", Some("abc")).unwrap_err();
    assert!(err.to_string().contains("invalid integer value"), "got: {err}");
}

// =============================================================================
// Round Trip
// =============================================================================

/// Decoding a path and formatting the resulting values back reproduces the
/// original path, including a terminal `.0`.
#[test]
fn test_decode_format_round_trip() {
    let t = test_tree();

    for path in [".1.2.3.0", ".1.2.3", ".1.5.0", ".3.7.2", ".3.7.2.0", ".3.250.2"] {
        let (decoded, _) = path_to_values(&t.dict, t.snmp, path, None).unwrap();

        // Replay as a backend reply: a type marker ahead of the leaf.
        let mut reply = decoded;
        let marker = TypedValue::leaf(t.type_attr, false, Value::String(b"INTEGER".to_vec()));
        reply.insert(reply.len() - 1, marker);

        let varbinds = values_to_varbinds(&t.dict, t.snmp, t.type_attr, &reply).unwrap();
        assert_eq!(varbinds.len(), 1, "path {path}");
        assert_eq!(varbinds[0].path, path, "path {path}");
    }
}
