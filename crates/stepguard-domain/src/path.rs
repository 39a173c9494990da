//! Property path resolution inside structured resource documents.
//!
//! Syntax: segments separated by `.`; a segment is either `name` (mapping key) or
//! `name[index]` (mapping key, then sequence index). Resolution never fails loudly: anything
//! that cannot be followed yields "not found".

use serde_json::Value;
use stepguard_types::{Mapping, StructuredValue};

/// A resolved property: the value (Null when absent) and whether the path was found.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub value: StructuredValue,
    pub found: bool,
}

impl Resolved {
    pub fn found(value: StructuredValue) -> Self {
        Self { value, found: true }
    }

    pub fn missing() -> Self {
        Self {
            value: Value::Null,
            found: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Indexed(&'a str, usize),
}

/// Resolve `path` starting at `root`.
pub fn resolve(root: &StructuredValue, path: &str) -> Resolved {
    match lookup(root, path) {
        Some(v) => Resolved::found(v.clone()),
        None => Resolved::missing(),
    }
}

/// Resolve `path` inside a property mapping.
pub fn resolve_in(props: &Mapping, path: &str) -> Resolved {
    match lookup_in(props, path) {
        Some(v) => Resolved::found(v.clone()),
        None => Resolved::missing(),
    }
}

/// Borrowing variant of [`resolve`].
pub fn lookup<'a>(root: &'a StructuredValue, path: &str) -> Option<&'a StructuredValue> {
    if path.is_empty() {
        return None;
    }
    let mut current = root;
    for raw in path.split('.') {
        current = descend(current.as_object()?, raw)?;
    }
    Some(current)
}

/// Borrowing variant of [`resolve_in`].
pub fn lookup_in<'a>(props: &'a Mapping, path: &str) -> Option<&'a StructuredValue> {
    if path.is_empty() {
        return None;
    }
    let mut segments = path.split('.');
    let mut current = descend(props, segments.next()?)?;
    for raw in segments {
        current = descend(current.as_object()?, raw)?;
    }
    Some(current)
}

fn descend<'a>(map: &'a Mapping, raw: &str) -> Option<&'a StructuredValue> {
    match parse_segment(raw)? {
        Segment::Key(key) => map.get(key),
        Segment::Indexed(key, index) => map.get(key)?.as_array()?.get(index),
    }
}

/// `name[digits]` must match exactly; anything else containing `[` is malformed.
fn parse_segment(raw: &str) -> Option<Segment<'_>> {
    if !raw.contains('[') {
        return Some(Segment::Key(raw));
    }
    let (name, rest) = raw.split_once('[')?;
    if name.is_empty() {
        return None;
    }
    let digits = rest.strip_suffix(']')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse::<usize>().ok()?;
    Some(Segment::Indexed(name, index))
}
