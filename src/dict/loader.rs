//! Dictionary file loader
//!
//! Parses the line-oriented dictionary format:
//!
//! ```text
//! # comment
//! ATTRIBUTE   SNMP                26          tlv
//! ATTRIBUTE   SNMP-Uptime         26.1        timeticks
//! ATTRIBUTE   SNMP-Client-Table   26.3        tlv
//! ATTRIBUTE   SNMP-Client-Index   26.3.0      integer
//! ATTRIBUTE   SNMP-Client-Entry   26.3.1      tlv
//! ATTRIBUTE   SNMP-Client-Name    26.3.1.2    string
//! ```
//!
//! Positions are dotted numbers relative to the tree root. Parents must be
//! defined before their children, exactly as the definitions above read.

use std::fs;
use std::path::Path;

use crate::dict::{AttrKind, Dictionary};
use crate::error::{BridgeError, Result};

/// Load a dictionary from a file
pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let text = fs::read_to_string(path)?;
    let dict = parse_dictionary(&text)?;
    tracing::debug!("Loaded dictionary from {}", path.display());
    Ok(dict)
}

/// Parse dictionary text into a tree
pub fn parse_dictionary(text: &str) -> Result<Dictionary> {
    let mut dict = Dictionary::new();
    let mut defined = 0usize;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let keyword = fields.next().unwrap_or("");
        if keyword != "ATTRIBUTE" {
            return Err(dict_error(lineno, format!("unknown keyword \"{keyword}\"")));
        }

        let name = fields
            .next()
            .ok_or_else(|| dict_error(lineno, "missing attribute name".into()))?;
        let oid = fields
            .next()
            .ok_or_else(|| dict_error(lineno, "missing attribute position".into()))?;
        let type_str = fields
            .next()
            .ok_or_else(|| dict_error(lineno, "missing attribute type".into()))?;
        if let Some(extra) = fields.next() {
            return Err(dict_error(lineno, format!("trailing garbage \"{extra}\"")));
        }

        let kind = parse_kind(type_str).ok_or_else(|| dict_error(lineno, format!("unknown type \"{type_str}\"")))?;

        let components = parse_position(oid).map_err(|cause| dict_error(lineno, cause))?;
        let (last, parents) = components
            .split_last()
            .ok_or_else(|| dict_error(lineno, "empty attribute position".into()))?;

        let parent = dict
            .node_at_path(parents)
            .ok_or_else(|| dict_error(lineno, format!("undefined parent for \"{name}\" at {oid}")))?;

        dict.insert(parent, *last, name, kind)
            .map_err(|e| dict_error(lineno, e.to_string()))?;
        defined += 1;
    }

    if defined == 0 {
        return Err(BridgeError::Dictionary("dictionary defines no attributes".into()));
    }

    tracing::debug!("Dictionary defines {} attributes", defined);
    Ok(dict)
}

/// Map a dictionary type keyword onto a value kind
fn parse_kind(s: &str) -> Option<AttrKind> {
    match s {
        "integer" => Some(AttrKind::Integer),
        "string" => Some(AttrKind::String),
        "octets" => Some(AttrKind::Bytes),
        "tlv" => Some(AttrKind::Group),
        "counter" | "gauge" | "timeticks" => Some(AttrKind::OtherScalar),
        _ => None,
    }
}

/// Parse a dotted position (leading dot optional) into component numbers
fn parse_position(oid: &str) -> std::result::Result<Vec<u32>, String> {
    let trimmed = oid.strip_prefix('.').unwrap_or(oid);
    trimmed
        .split('.')
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| format!("invalid position component \"{part}\""))
        })
        .collect()
}

fn dict_error(lineno: usize, cause: String) -> BridgeError {
    BridgeError::Dictionary(format!("line {}: {cause}", lineno + 1))
}
