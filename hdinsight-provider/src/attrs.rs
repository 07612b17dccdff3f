//! Boundary between declarative `Value` maps and typed cluster settings
//!
//! Reading goes through `Attrs`, which remembers the attribute path so a
//! wrongly shaped value produces an error like `roles.worker_node.vm_size:
//! expected a string`. Writing goes through `AttrsBuilder`.

use std::collections::{BTreeMap, HashMap};

use hdinsight_core::provider::{ProviderError, ProviderResult};
use hdinsight_core::resource::Value;

/// Typed read access to one level of declarative attributes
#[derive(Debug, Clone, Copy)]
pub struct Attrs<'a> {
    path: Option<&'a str>,
    map: &'a HashMap<String, Value>,
}

/// Owned path prefix for nested blocks; kept separate so `Attrs` stays `Copy`
#[derive(Debug, Clone)]
pub struct BlockAttrs<'a> {
    path: String,
    map: &'a HashMap<String, Value>,
}

impl<'a> Attrs<'a> {
    pub fn root(map: &'a HashMap<String, Value>) -> Self {
        Self { path: None, map }
    }
}

/// Shared accessors for the root level and nested blocks
pub trait AttrSource<'a> {
    fn map(&self) -> &'a HashMap<String, Value>;

    fn path_prefix(&self) -> Option<&str>;

    fn path_of(&self, key: &str) -> String {
        match self.path_prefix() {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn invalid(&self, key: &str, expected: &str) -> ProviderError {
        ProviderError::validation(format!("`{}`: expected {}", self.path_of(key), expected))
    }

    fn contains(&self, key: &str) -> bool {
        self.map().contains_key(key)
    }

    fn required_string(&self, key: &str) -> ProviderResult<String> {
        self.optional_string(key)?.ok_or_else(|| {
            ProviderError::validation(format!("`{}` is required", self.path_of(key)))
        })
    }

    /// Empty strings count as absent
    fn optional_string(&self, key: &str) -> ProviderResult<Option<String>> {
        match self.map().get(key) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(key, "a string")),
        }
    }

    fn optional_bool(&self, key: &str) -> ProviderResult<Option<bool>> {
        match self.map().get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.invalid(key, "a bool")),
        }
    }

    fn bool_or(&self, key: &str, default: bool) -> ProviderResult<bool> {
        Ok(self.optional_bool(key)?.unwrap_or(default))
    }

    fn optional_int(&self, key: &str) -> ProviderResult<Option<i64>> {
        match self.map().get(key) {
            None => Ok(None),
            Some(Value::Int(i)) => Ok(Some(*i)),
            Some(_) => Err(self.invalid(key, "an integer")),
        }
    }

    fn string_list(&self, key: &str) -> ProviderResult<Vec<String>> {
        match self.map().get(key) {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(self.invalid(key, "a list of strings")),
                })
                .collect(),
            Some(_) => Err(self.invalid(key, "a list of strings")),
        }
    }

    fn string_map(&self, key: &str) -> ProviderResult<BTreeMap<String, String>> {
        match self.map().get(key) {
            None => Ok(BTreeMap::new()),
            Some(Value::Map(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k.clone(), s.clone())),
                    _ => Err(self.invalid(key, "a map of strings")),
                })
                .collect(),
            Some(_) => Err(self.invalid(key, "a map of strings")),
        }
    }

    /// A singleton settings block. Accepts a map, or a list holding at most
    /// one map.
    fn block(&self, key: &str) -> ProviderResult<Option<BlockAttrs<'a>>> {
        let path = self.path_of(key);
        match self.map().get(key) {
            None => Ok(None),
            Some(Value::Map(map)) => Ok(Some(BlockAttrs { path, map })),
            Some(Value::List(items)) => match items.as_slice() {
                [] => Ok(None),
                [Value::Map(map)] => Ok(Some(BlockAttrs { path, map })),
                [_] => Err(self.invalid(key, "a block")),
                _ => Err(ProviderError::validation(format!(
                    "`{}`: at most one block may be specified, got {}",
                    path,
                    items.len()
                ))),
            },
            Some(_) => Err(self.invalid(key, "a block")),
        }
    }

    fn required_block(&self, key: &str) -> ProviderResult<BlockAttrs<'a>> {
        self.block(key)?.ok_or_else(|| {
            ProviderError::validation(format!("`{}` is required", self.path_of(key)))
        })
    }

    /// A repeated block
    fn blocks(&self, key: &str) -> ProviderResult<Vec<BlockAttrs<'a>>> {
        match self.map().get(key) {
            None => Ok(Vec::new()),
            Some(Value::Map(map)) => Ok(vec![BlockAttrs {
                path: format!("{}.0", self.path_of(key)),
                map,
            }]),
            Some(Value::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Map(map) => Ok(BlockAttrs {
                        path: format!("{}.{}", self.path_of(key), i),
                        map,
                    }),
                    _ => Err(self.invalid(key, "a list of blocks")),
                })
                .collect(),
            Some(_) => Err(self.invalid(key, "a list of blocks")),
        }
    }
}

impl<'a> AttrSource<'a> for Attrs<'a> {
    fn map(&self) -> &'a HashMap<String, Value> {
        self.map
    }

    fn path_prefix(&self) -> Option<&str> {
        self.path
    }
}

impl<'a> AttrSource<'a> for BlockAttrs<'a> {
    fn map(&self) -> &'a HashMap<String, Value> {
        self.map
    }

    fn path_prefix(&self) -> Option<&str> {
        Some(&self.path)
    }
}

/// Builder for declarative attribute maps
#[derive(Debug, Default, Clone)]
pub struct AttrsBuilder {
    map: HashMap<String, Value>,
}

impl AttrsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.map.insert(key.to_string(), Value::String(value.into()));
        self
    }

    pub fn opt_string(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.string(key, v),
            None => self,
        }
    }

    pub fn bool(mut self, key: &str, value: bool) -> Self {
        self.map.insert(key.to_string(), Value::Bool(value));
        self
    }

    pub fn opt_bool(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.bool(key, v),
            None => self,
        }
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.map.insert(key.to_string(), Value::Int(value));
        self
    }

    pub fn opt_int(self, key: &str, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.int(key, v),
            None => self,
        }
    }

    /// Empty lists are left out
    pub fn strings(mut self, key: &str, values: &[String]) -> Self {
        if !values.is_empty() {
            self.map.insert(
                key.to_string(),
                Value::List(values.iter().cloned().map(Value::String).collect()),
            );
        }
        self
    }

    pub fn string_map(mut self, key: &str, values: &BTreeMap<String, String>) -> Self {
        self.map.insert(
            key.to_string(),
            Value::Map(
                values
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        );
        self
    }

    pub fn block(mut self, key: &str, block: HashMap<String, Value>) -> Self {
        self.map.insert(key.to_string(), Value::Map(block));
        self
    }

    pub fn opt_block(self, key: &str, block: Option<HashMap<String, Value>>) -> Self {
        match block {
            Some(b) => self.block(key, b),
            None => self,
        }
    }

    /// Empty lists are left out
    pub fn blocks(mut self, key: &str, blocks: Vec<HashMap<String, Value>>) -> Self {
        if !blocks.is_empty() {
            self.map.insert(
                key.to_string(),
                Value::List(blocks.into_iter().map(Value::Map).collect()),
            );
        }
        self
    }

    pub fn value(mut self, key: &str, value: Value) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> HashMap<String, Value> {
        self.map
    }
}
