//! Expansion directives: turning the `expand` parameter's dotted paths into
//! a tree the generator walks while rendering a response.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Expansions requested for one level of a resource. Children carry the
/// expansions meant for resources nested below this one; `wildcard` expands
/// every expandable field at this level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpansionLevel {
    pub children: HashMap<String, ExpansionLevel>,
    pub wildcard: bool,
}

impl ExpansionLevel {
    /// Whether the named field should be rendered as a full object at this
    /// level.
    pub fn expands(&self, field: &str) -> bool {
        self.wildcard || self.children.contains_key(field)
    }
}

/// Build an expansion tree from raw dotted paths, e.g.
/// `["customer", "customer.default_source", "items.data.price"]`.
///
/// Inputs are sorted first so the result is independent of request ordering,
/// and duplicates merge structurally.
pub fn parse_expansion_level(raw: &[String]) -> ExpansionLevel {
    let mut sorted: Vec<&str> = raw.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut level = ExpansionLevel::default();
    let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for expansion in sorted {
        match expansion.split_once('.') {
            None if expansion == "*" => level.wildcard = true,
            None => {
                level
                    .children
                    .entry(expansion.to_string())
                    .or_default();
            }
            Some((head, tail)) => groups.entry(head).or_default().push(tail.to_string()),
        }
    }

    for (key, subexpansions) in groups {
        level
            .children
            .insert(key.to_string(), parse_expansion_level(&subexpansions));
    }

    level
}

/// Pull the `expand` parameter out of a parsed request payload. It may be a
/// single dotted path or a list of them; anything else is ignored. Returns
/// the built tree along with the raw paths for diagnostics.
pub fn extract_expansions(data: &Value) -> (Option<ExpansionLevel>, Vec<String>) {
    let raw: Vec<String> = match data.get("expand") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => return (None, Vec::new()),
    };
    if raw.is_empty() {
        return (None, Vec::new());
    }
    (Some(parse_expansion_level(&raw)), raw)
}
