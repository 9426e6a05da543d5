//! Directory entry model shared by the scope filter and the rewrite engine.

use std::collections::BTreeMap;

/// One directory entry, keyed by distinguished name.
///
/// `typed` holds the values that decode as UTF-8 and is what the scope
/// filter matches against; `raw` holds every value undecoded and is what the
/// rewrite engine mutates. Both maps carry the same attribute names: an
/// attribute whose values are all binary appears in `typed` with an empty
/// value list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub dn: String,
    pub typed: BTreeMap<String, Vec<String>>,
    pub raw: BTreeMap<String, Vec<Vec<u8>>>,
}

impl Record {
    /// Build a record from the directory client's split string/binary value
    /// maps. String values come first in `raw`, in their delivered order,
    /// followed by any binary values for the same attribute.
    pub fn new(
        dn: String,
        string_attrs: BTreeMap<String, Vec<String>>,
        binary_attrs: BTreeMap<String, Vec<Vec<u8>>>,
    ) -> Self {
        let mut raw: BTreeMap<String, Vec<Vec<u8>>> = string_attrs
            .iter()
            .map(|(name, values)| {
                let bytes = values.iter().map(|value| value.clone().into_bytes()).collect();
                (name.clone(), bytes)
            })
            .collect();
        let mut typed = string_attrs;
        for (name, values) in binary_attrs {
            raw.entry(name.clone()).or_default().extend(values);
            typed.entry(name).or_default();
        }
        Self { dn, typed, raw }
    }
}
