//! Path Codec and Varbind Formatter
//!
//! The bidirectional translation engine:
//!
//! - [`path_to_values`] — dotted OID string → ordered [`crate::value::ValueSet`]
//!   (outbound; synthesizes Index values for table positions).
//! - [`values_to_varbinds`] — backend reply value list → (path, type, value)
//!   varbind triples (inbound; the inverse of the decode).
//!
//! Both directions share the dictionary's notion of tables: a group with an
//! integer child `0` (index slot) and a group child `1` (entry).

mod oid;
mod varbind;

pub use oid::path_to_values;
pub use varbind::{values_to_varbinds, MAX_OID_LEN};
