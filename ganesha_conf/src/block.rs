// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

use std::fmt::{self, Write};

/// Attributes whose string values are written wrapped in double quotes.
pub const QUOTED_ATTRIBUTES: &[&str] = &["PATH", "PSEUDO", "USER_ID", "FILESYSTEM"];

/// Name of the single attribute carried by a directive (section) node.
pub const SECTION_VALUE: &str = "value";

/// A parsed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    /// A comma separated list. The parser never nests lists.
    List(Vec<Value>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets the value as a list of integers. A single integer is a list of one, since a
    /// one-element list reads back from a file as a scalar. An empty string is an empty list,
    /// which is how one is written out.
    pub fn to_ints(&self) -> Option<Vec<i64>> {
        match self {
            Value::Str(s) if s.is_empty() => Some(Vec::new()),
            Value::Int(n) => Some(vec![*n]),
            Value::List(items) => items.iter().map(Value::as_int).collect(),
            _ => None,
        }
    }

    /// Interprets the value as a list of strings, rendering any scalar element in its textual
    /// form (a client pattern like `10` parses as an integer).
    pub fn to_strings(&self) -> Option<Vec<String>> {
        match self {
            Value::Str(s) if s.is_empty() => Some(Vec::new()),
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::List(_) => None,
                    scalar => Some(scalar.to_string()),
                })
                .collect(),
            scalar => Some(vec![scalar.to_string()]),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// A node of a configuration document: a tagged block with ordered attributes and nested child
/// blocks, or a `%name value` directive.
#[derive(Debug, Clone)]
pub struct Block {
    tag: String,
    /// Kept in insertion order, which is the order they are written back out in. Keys are unique.
    attributes: Vec<(String, Value)>,
    children: Vec<Block>,
}

impl Block {
    pub fn new(tag: impl Into<String>) -> Self {
        Block {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A directive node such as `%url rados://pool/namespace/object`. `name` includes the `%`.
    pub fn section(name: impl Into<String>, value: impl Into<String>) -> Self {
        Block::new(name).with_attribute(SECTION_VALUE, Value::Str(value.into()))
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_child(mut self, child: Block) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_section(&self) -> bool {
        self.tag.starts_with('%')
    }

    /// Looks up an attribute of this block only, without descending into children.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Sets an attribute of this block. An existing key keeps its position.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn children(&self) -> &[Block] {
        &self.children
    }

    pub fn push_child(&mut self, child: Block) {
        self.children.push(child);
    }

    /// Depth-first lookup. A key set on this block wins over any descendant; otherwise children
    /// are searched in order and the first match is returned.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.attribute(key) {
            return Some(value);
        }
        self.children.iter().find_map(|child| child.get(key))
    }

    /// Overwrites `key` on this block if it is set here. Otherwise the update is passed on to
    /// *every* child, so several branches may be changed, unlike [`Block::get`] which stops at
    /// the first match.
    ///
    /// Returns the number of attributes that were overwritten.
    pub fn update(&mut self, key: &str, value: &Value) -> usize {
        if let Some((_, v)) = self.attributes.iter_mut().find(|(k, _)| k == key) {
            *v = value.clone();
            return 1;
        }
        self.children
            .iter_mut()
            .map(|child| child.update(key, value))
            .sum()
    }

    /// Writes the block out in configuration file syntax, starting at the given indentation.
    pub fn serialize(&self, indent: usize) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out, indent);
        out
    }

    fn write_to(&self, out: &mut String, indent: usize) -> fmt::Result {
        let pad = " ".repeat(indent);

        if self.is_section() {
            let value = self.attribute(SECTION_VALUE).map(Value::to_string);
            return writeln!(out, "{pad}{} \"{}\"", self.tag, value.unwrap_or_default());
        }

        writeln!(out, "{pad}{} {{", self.tag)?;
        for (key, value) in self.attributes.iter() {
            match value {
                Value::Str(s) if QUOTED_ATTRIBUTES.contains(&key.as_str()) => {
                    writeln!(out, "{pad}  {key} = \"{s}\";")?
                }
                _ => writeln!(out, "{pad}  {key} = {value};")?,
            }
        }
        for child in self.children.iter() {
            writeln!(out)?;
            child.write_to(out, indent + 2)?;
        }
        writeln!(out, "{pad}}}")
    }
}

/// Blocks are equal when their tags, attribute sets and (ordered) children are equal. Attribute
/// order does not matter.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .all(|(k, v)| other.attribute(k) == Some(v))
            && self.children == other.children
    }
}

impl Eq for Block {}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.serialize(0))
    }
}
