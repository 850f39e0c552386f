use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure while interpreting the structure of a form key.
///
/// Percent-decoding itself never fails (any byte sequence decodes to
/// something); errors come from bracket structure that cannot describe a
/// tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unbalanced brackets in parameter `{0}`")]
    UnbalancedBrackets(String),
    #[error("parameter `{0}` mixes integer indices with named keys")]
    MixedKeys(String),
    #[error("parameter `{0}` is assigned both a value and nested keys")]
    ConflictingAssignment(String),
}

/// Decode a URL-encoded form or query string into a nested JSON document
/// whose leaves are all strings.
///
/// Bracketed sub-keys nest (`a[b][c]=v` → `{"a":{"b":{"c":"v"}}}`), integer
/// indices build arrays ordered by numeric value, and bare `[]` appends in
/// encounter order. A repeated non-indexed key keeps its last value. Empty
/// input produces an empty object.
pub fn parse_form_string(input: &str) -> Result<Value, ParseError> {
    let mut root: IndexMap<String, Node> = IndexMap::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        let (name, segments) = split_key(&key)?;
        let slot = root.entry(name).or_insert(Node::Unset);
        slot.insert(&key, &segments, value.into_owned())?;
    }
    Ok(Value::Object(
        root.into_iter().map(|(k, node)| (k, node.into_value())).collect(),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Named(String),
    Index(usize),
    Append,
}

fn split_key(key: &str) -> Result<(String, Vec<Segment>), ParseError> {
    let Some(open) = key.find('[') else {
        if key.contains(']') {
            return Err(ParseError::UnbalancedBrackets(key.to_string()));
        }
        return Ok((key.to_string(), Vec::new()));
    };

    let name = key[..open].to_string();
    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(ParseError::UnbalancedBrackets(key.to_string()));
        }
        let close = rest
            .find(']')
            .ok_or_else(|| ParseError::UnbalancedBrackets(key.to_string()))?;
        let inner = &rest[1..close];
        if inner.contains('[') {
            return Err(ParseError::UnbalancedBrackets(key.to_string()));
        }
        segments.push(if inner.is_empty() {
            Segment::Append
        } else if let Ok(index) = inner.parse::<usize>() {
            Segment::Index(index)
        } else {
            Segment::Named(inner.to_string())
        });
        rest = &rest[close + 1..];
    }
    Ok((name, segments))
}

/// Intermediate tree node. Containers stay mutable while pairs stream in and
/// collapse into `serde_json::Value` once the whole input is consumed.
#[derive(Debug)]
enum Node {
    Unset,
    Leaf(String),
    Map(IndexMap<String, Node>),
    Seq(BTreeMap<usize, Node>),
}

impl Node {
    fn insert(&mut self, key: &str, segments: &[Segment], value: String) -> Result<(), ParseError> {
        let Some((head, tail)) = segments.split_first() else {
            return match self {
                Node::Unset | Node::Leaf(_) => {
                    // last occurrence wins
                    *self = Node::Leaf(value);
                    Ok(())
                }
                _ => Err(ParseError::ConflictingAssignment(key.to_string())),
            };
        };

        match head {
            Segment::Named(name) => {
                let map = match self {
                    Node::Unset => {
                        *self = Node::Map(IndexMap::new());
                        match self {
                            Node::Map(map) => map,
                            _ => unreachable!(),
                        }
                    }
                    Node::Map(map) => map,
                    Node::Seq(_) => return Err(ParseError::MixedKeys(key.to_string())),
                    Node::Leaf(_) => return Err(ParseError::ConflictingAssignment(key.to_string())),
                };
                map.entry(name.clone())
                    .or_insert(Node::Unset)
                    .insert(key, tail, value)
            }
            Segment::Index(_) | Segment::Append => {
                let seq = match self {
                    Node::Unset => {
                        *self = Node::Seq(BTreeMap::new());
                        match self {
                            Node::Seq(seq) => seq,
                            _ => unreachable!(),
                        }
                    }
                    Node::Seq(seq) => seq,
                    Node::Map(_) => return Err(ParseError::MixedKeys(key.to_string())),
                    Node::Leaf(_) => return Err(ParseError::ConflictingAssignment(key.to_string())),
                };
                let index = match head {
                    Segment::Index(index) => *index,
                    _ => seq.keys().next_back().map_or(0, |last| last + 1),
                };
                seq.entry(index)
                    .or_insert(Node::Unset)
                    .insert(key, tail, value)
            }
        }
    }

    fn into_value(self) -> Value {
        match self {
            Node::Unset => Value::String(String::new()),
            Node::Leaf(s) => Value::String(s),
            Node::Map(map) => Value::Object(
                map.into_iter()
                    .map(|(k, node)| (k, node.into_value()))
                    .collect::<Map<String, Value>>(),
            ),
            // keys are already ascending; gaps compact away
            Node::Seq(seq) => Value::Array(seq.into_values().map(Node::into_value).collect()),
        }
    }
}
