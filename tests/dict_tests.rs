//! Dictionary Tests
//!
//! Tests for tree construction, queries, the file loader and well-known
//! attribute resolution.

use std::io::Write;

use snmpbridge::dict::{load_dictionary, parse_dictionary, AttrKind, Dictionary, SnmpAttrs};
use snmpbridge::BridgeError;

// =============================================================================
// Tree Construction and Queries
// =============================================================================

#[test]
fn test_insert_and_lookup() {
    let mut dict = Dictionary::new();
    let root = dict.root();

    let snmp = dict.insert(root, 26, "SNMP", AttrKind::Group).unwrap();
    let uptime = dict.insert(snmp, 1, "SNMP-Uptime", AttrKind::OtherScalar).unwrap();

    assert_eq!(dict.child_by_num(root, 26), Some(snmp));
    assert_eq!(dict.child_by_num(snmp, 1), Some(uptime));
    assert_eq!(dict.child_by_num(snmp, 2), None);
    assert_eq!(dict.attr_by_name("SNMP-Uptime"), Some(uptime));
    assert_eq!(dict.attr_by_name("missing"), None);
    assert_eq!(dict.kind(uptime), AttrKind::OtherScalar);
    assert_eq!(dict.number(uptime), 1);
    assert_eq!(dict.parent(uptime), Some(snmp));
    assert_eq!(dict.parent(root), None);
}

#[test]
fn test_insert_under_leaf_rejected() {
    let mut dict = Dictionary::new();
    let root = dict.root();
    let leaf = dict.insert(root, 1, "Leaf", AttrKind::Integer).unwrap();

    let err = dict.insert(leaf, 1, "Child", AttrKind::Integer).unwrap_err();
    assert!(matches!(err, BridgeError::Dictionary(_)));
}

#[test]
fn test_insert_duplicate_number_rejected() {
    let mut dict = Dictionary::new();
    let root = dict.root();
    dict.insert(root, 1, "A", AttrKind::Integer).unwrap();

    let err = dict.insert(root, 1, "B", AttrKind::Integer).unwrap_err();
    assert!(matches!(err, BridgeError::Dictionary(_)));
}

#[test]
fn test_insert_duplicate_name_rejected() {
    let mut dict = Dictionary::new();
    let root = dict.root();
    dict.insert(root, 1, "A", AttrKind::Integer).unwrap();

    let err = dict.insert(root, 2, "A", AttrKind::Integer).unwrap_err();
    assert!(matches!(err, BridgeError::Dictionary(_)));
}

#[test]
fn test_ancestry_and_suffixes() {
    let mut dict = Dictionary::new();
    let root = dict.root();
    let a = dict.insert(root, 3, "A", AttrKind::Group).unwrap();
    let b = dict.insert(a, 1, "B", AttrKind::Group).unwrap();
    let c = dict.insert(b, 7, "C", AttrKind::Integer).unwrap();
    let other = dict.insert(root, 9, "Other", AttrKind::Integer).unwrap();

    assert!(dict.is_beneath(c, root));
    assert!(dict.is_beneath(c, a));
    assert!(dict.is_beneath(a, a));
    assert!(!dict.is_beneath(other, a));
    assert!(!dict.is_beneath(a, c));

    assert_eq!(dict.oid_suffix(a, c), Some(vec![1, 7]));
    assert_eq!(dict.oid_suffix(a, a), Some(vec![]));
    assert_eq!(dict.oid_suffix(a, other), None);

    assert_eq!(dict.node_path(c), vec![3, 1, 7]);
    assert_eq!(dict.node_at_path(&[3, 1, 7]), Some(c));
    assert_eq!(dict.node_at_path(&[3, 2]), None);
    assert_eq!(dict.node_at_path(&[]), Some(root));
}

// =============================================================================
// Loader Tests
// =============================================================================

const SAMPLE: &str = "\
# sample bridge dictionary
ATTRIBUTE   SNMP                 26        tlv
ATTRIBUTE   SNMP-Uptime          26.1      timeticks

ATTRIBUTE   SNMP-Client-Table    26.3      tlv
ATTRIBUTE   SNMP-Client-Index    26.3.0    integer
ATTRIBUTE   SNMP-Client-Entry    26.3.1    tlv
ATTRIBUTE   SNMP-Client-Name     26.3.1.2  string

ATTRIBUTE   SNMP-Operation       40        integer
ATTRIBUTE   SNMP-Type            41        string
ATTRIBUTE   SNMP-Failure         42        string
ATTRIBUTE   Message-Authenticator 43       octets
";

#[test]
fn test_parse_sample_dictionary() {
    let dict = parse_dictionary(SAMPLE).unwrap();

    let snmp = dict.attr_by_name("SNMP").unwrap();
    assert_eq!(dict.kind(snmp), AttrKind::Group);
    assert_eq!(dict.node_path(snmp), vec![26]);

    let name = dict.attr_by_name("SNMP-Client-Name").unwrap();
    assert_eq!(dict.kind(name), AttrKind::String);
    assert_eq!(dict.node_path(name), vec![26, 3, 1, 2]);

    let index = dict.attr_by_name("SNMP-Client-Index").unwrap();
    assert_eq!(dict.kind(index), AttrKind::Integer);
    assert_eq!(dict.number(index), 0);
}

#[test]
fn test_loader_rejects_unknown_keyword() {
    let err = parse_err("FOO Bar 1 integer");
    assert!(err.contains("unknown keyword"));
}

#[test]
fn test_loader_rejects_unknown_type() {
    let err = parse_err("ATTRIBUTE Bar 1 blob");
    assert!(err.contains("unknown type"));
}

#[test]
fn test_loader_rejects_undefined_parent() {
    let err = parse_err("ATTRIBUTE Bar 5.1 integer");
    assert!(err.contains("undefined parent"));
}

#[test]
fn test_loader_rejects_missing_fields() {
    let err = parse_err("ATTRIBUTE Bar 1");
    assert!(err.contains("missing attribute type"));
}

#[test]
fn test_loader_rejects_trailing_garbage() {
    let err = parse_err("ATTRIBUTE Bar 1 integer extra");
    assert!(err.contains("trailing garbage"));
}

#[test]
fn test_loader_rejects_empty_dictionary() {
    let err = parse_err("# nothing here\n\n");
    assert!(err.contains("no attributes"));
}

#[test]
fn test_loader_reports_line_numbers() {
    let err = parse_err("ATTRIBUTE A 1 integer\nATTRIBUTE B 1 integer");
    assert!(err.contains("line 2"), "got: {err}");
}

#[test]
fn test_load_dictionary_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let dict = load_dictionary(file.path()).unwrap();
    assert!(dict.attr_by_name("SNMP-Client-Name").is_some());
}

#[test]
fn test_load_dictionary_missing_file() {
    let err = load_dictionary(std::path::Path::new("/nonexistent/dictionary")).unwrap_err();
    assert!(matches!(err, BridgeError::Io(_)));
}

// =============================================================================
// Well-Known Attribute Resolution
// =============================================================================

#[test]
fn test_resolve_well_known_attrs() {
    let dict = parse_dictionary(SAMPLE).unwrap();
    let attrs = SnmpAttrs::resolve(&dict).unwrap();

    assert_eq!(Some(attrs.root), dict.attr_by_name("SNMP"));
    assert_eq!(Some(attrs.op), dict.attr_by_name("SNMP-Operation"));
    assert_eq!(Some(attrs.ty), dict.attr_by_name("SNMP-Type"));
    assert_eq!(Some(attrs.failure), dict.attr_by_name("SNMP-Failure"));
    assert_eq!(Some(attrs.authenticator), dict.attr_by_name("Message-Authenticator"));
}

#[test]
fn test_resolve_fails_on_missing_definition() {
    let dict = parse_dictionary("ATTRIBUTE SNMP 26 tlv\n").unwrap();

    let err = SnmpAttrs::resolve(&dict).unwrap_err();
    assert!(err.to_string().contains("SNMP-Operation"));
}

#[test]
fn test_resolve_fails_on_non_group_root() {
    let text = "\
ATTRIBUTE SNMP 26 integer
ATTRIBUTE SNMP-Operation 40 integer
ATTRIBUTE SNMP-Type 41 string
ATTRIBUTE SNMP-Failure 42 string
ATTRIBUTE Message-Authenticator 43 octets
";
    let dict = parse_dictionary(text).unwrap();

    let err = SnmpAttrs::resolve(&dict).unwrap_err();
    assert!(err.to_string().contains("must be a group"));
}

fn parse_err(text: &str) -> String {
    parse_dictionary(text).unwrap_err().to_string()
}
