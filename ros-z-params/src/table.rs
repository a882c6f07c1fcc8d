//! The node × parameter table produced by the parser.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ParamError, Result};
use crate::types::ParameterValue;

/// Initial number of node slots.
pub const DEFAULT_NODE_CAPACITY: usize = 128;
/// Initial number of parameter slots per node.
pub const DEFAULT_PARAM_CAPACITY: usize = 128;

const PRINT_PARAM_COLUMN: usize = 50;

/// Make room for one more element, doubling the capacity when full.
fn reserve_one<T>(items: &mut Vec<T>, what: &str) -> Result<()> {
    if items.len() == items.capacity() {
        let additional = items.capacity().max(1);
        items
            .try_reserve_exact(additional)
            .map_err(|e| ParamError::alloc(what, e))?;
    }
    Ok(())
}

fn try_vec<T>(capacity: usize, what: &str) -> Result<Vec<T>> {
    let mut items = Vec::new();
    items
        .try_reserve_exact(capacity)
        .map_err(|e| ParamError::alloc(what, e))?;
    Ok(items)
}

/// Parameters of a single node.
///
/// Names and values are kept in two parallel vectors: `names()[i]` is the
/// name of `values()[i]`. Names are unique and use `.` to separate
/// sub-namespaces, e.g. `group.subgroup.leaf`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeParams {
    names: Vec<String>,
    values: Vec<ParameterValue>,
}

impl NodeParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            names: try_vec(capacity, "parameter names")?,
            values: try_vec(capacity, "parameter values")?,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.find(name).map(|idx| &self.values[idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ParameterValue> {
        let idx = self.find(name)?;
        self.values.get_mut(idx)
    }

    pub fn name_at(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn value_at(&self, idx: usize) -> Option<&ParameterValue> {
        self.values.get(idx)
    }

    pub fn value_at_mut(&mut self, idx: usize) -> Option<&mut ParameterValue> {
        self.values.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Index of `name`, appending an unset entry when it is not present.
    pub fn find_or_create(&mut self, name: &str) -> Result<usize> {
        if let Some(idx) = self.find(name) {
            return Ok(idx);
        }

        reserve_one(&mut self.names, "parameter names")?;
        reserve_one(&mut self.values, "parameter values")?;
        let mut owned = String::new();
        owned
            .try_reserve_exact(name.len())
            .map_err(|e| ParamError::alloc("parameter name", e))?;
        owned.push_str(name);

        self.names.push(owned);
        self.values.push(ParameterValue::NotSet);
        tracing::debug!("created parameter {:?}", name);
        Ok(self.names.len() - 1)
    }

    /// Drop the entry at `idx`, keeping the order of the others.
    pub(crate) fn remove(&mut self, idx: usize) -> Option<(String, ParameterValue)> {
        if idx >= self.names.len() {
            return None;
        }
        Some((self.names.remove(idx), self.values.remove(idx)))
    }
}

impl Serialize for NodeParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parameters of every node named in one or more parameter files.
///
/// Node names are unique. They are either fully qualified names as written
/// in the file (`/ns/node`, `node`) or the wildcard selectors `/**` and
/// `/*`.
#[derive(Debug, Clone)]
pub struct ParameterTable {
    node_names: Vec<String>,
    params: Vec<NodeParams>,
    param_capacity: usize,
}

impl Default for ParameterTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ParameterTable {
    fn eq(&self, other: &Self) -> bool {
        self.node_names == other.node_names && self.params == other.params
    }
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_NODE_CAPACITY)
    }

    pub fn with_capacity(node_capacity: usize) -> Self {
        Self {
            node_names: Vec::with_capacity(node_capacity),
            params: Vec::with_capacity(node_capacity),
            param_capacity: DEFAULT_PARAM_CAPACITY,
        }
    }

    /// Like [`ParameterTable::with_capacity`] but reports allocation failure
    /// instead of aborting. `param_capacity` is the initial size of every
    /// node entry created later.
    pub fn try_with_capacity(node_capacity: usize, param_capacity: usize) -> Result<Self> {
        Ok(Self {
            node_names: try_vec(node_capacity, "node names")?,
            params: try_vec(node_capacity, "node parameters")?,
            param_capacity,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.node_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_names.is_empty()
    }

    pub fn node_names(&self) -> &[String] {
        &self.node_names
    }

    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.node_names.iter().position(|n| n == name)
    }

    pub fn node(&self, name: &str) -> Option<&NodeParams> {
        self.find_node(name).map(|idx| &self.params[idx])
    }

    pub fn node_at(&self, idx: usize) -> Option<&NodeParams> {
        self.params.get(idx)
    }

    pub(crate) fn node_at_mut(&mut self, idx: usize) -> Option<&mut NodeParams> {
        self.params.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeParams)> {
        self.node_names.iter().map(String::as_str).zip(self.params.iter())
    }

    /// Index of node `name`, appending an empty entry when it is not present.
    pub fn find_or_create_node(&mut self, name: &str) -> Result<usize> {
        if let Some(idx) = self.find_node(name) {
            return Ok(idx);
        }

        reserve_one(&mut self.node_names, "node names")?;
        reserve_one(&mut self.params, "node parameters")?;
        let node = NodeParams::try_with_capacity(self.param_capacity)?;
        let mut owned = String::new();
        owned
            .try_reserve_exact(name.len())
            .map_err(|e| ParamError::alloc("node name", e))?;
        owned.push_str(name);

        self.node_names.push(owned);
        self.params.push(node);
        tracing::debug!("created node {:?}", name);
        Ok(self.node_names.len() - 1)
    }

    /// Index of parameter `name` in node `node_idx`, creating it if needed.
    pub fn find_or_create_parameter(&mut self, node_idx: usize, name: &str) -> Result<usize> {
        let num_nodes = self.num_nodes();
        self.params
            .get_mut(node_idx)
            .ok_or_else(|| {
                ParamError::InvalidArgument(format!(
                    "node index {} out of range for {} nodes",
                    node_idx, num_nodes
                ))
            })?
            .find_or_create(name)
    }

    /// Look up a value without creating anything.
    pub fn get(&self, node: &str, param: &str) -> Option<&ParameterValue> {
        self.node(node)?.get(param)
    }

    pub fn get_mut(&mut self, node: &str, param: &str) -> Option<&mut ParameterValue> {
        let idx = self.find_node(node)?;
        self.params[idx].get_mut(param)
    }

    /// Install `value` for `node`/`param`, creating both entries as needed.
    pub fn set(&mut self, node: &str, param: &str, value: impl Into<ParameterValue>) -> Result<()> {
        if node.is_empty() || param.is_empty() {
            return Err(ParamError::InvalidArgument(
                "node and parameter names must not be empty".to_string(),
            ));
        }
        let node_idx = self.find_or_create_node(node)?;
        let node_params = &mut self.params[node_idx];
        let param_idx = node_params.find_or_create(param)?;
        node_params.values[param_idx] = value.into();
        Ok(())
    }

    /// The parameters that apply to the node `node_fqn`.
    ///
    /// Entries are applied from least to most specific selector: `/**`,
    /// then `/ns/**`, then `/ns/*`, then the node's own name. Within the
    /// same rank table order is kept, so later entries win.
    pub fn overrides_for(&self, node_fqn: &str) -> BTreeMap<String, ParameterValue> {
        let fqn = absolute(node_fqn);
        let mut matching: Vec<(u8, &NodeParams)> = self
            .iter()
            .filter_map(|(selector, params)| {
                selector_rank(selector, &fqn).map(|rank| (rank, params))
            })
            .collect();
        matching.sort_by_key(|(rank, _)| *rank);

        let mut result = BTreeMap::new();
        for (_, params) in matching {
            for (name, value) in params.iter() {
                if value.is_set() {
                    result.insert(name.to_string(), value.clone());
                }
            }
        }
        result
    }
}

fn absolute(name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{}", name)
    }
}

/// How specific `selector` is for `node_fqn`, or `None` when it does not
/// apply.
fn selector_rank(selector: &str, node_fqn: &str) -> Option<u8> {
    if selector == "/**" || selector == "**" {
        return Some(0);
    }

    let selector = absolute(selector);
    if let Some(prefix) = selector.strip_suffix("/**") {
        let rest = node_fqn.strip_prefix(prefix)?;
        return (prefix.is_empty() || rest.starts_with('/')).then_some(1);
    }

    if let Some(prefix) = selector.strip_suffix("/*") {
        // One level only: /ns/* matches /ns/foo but not /ns/foo/bar
        let rest = node_fqn.strip_prefix(prefix)?;
        let rest = rest.strip_prefix('/')?;
        return (!rest.is_empty() && !rest.contains('/')).then_some(2);
    }

    (selector == node_fqn).then_some(3)
}

impl Serialize for ParameterTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.num_nodes()))?;
        for (name, params) in self.iter() {
            map.serialize_entry(name, params)?;
        }
        map.end()
    }
}

/// Dump in the tabular form used for diagnostics.
impl std::fmt::Display for ParameterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, " Node Name\t\t\t\tParameters")?;
        for (node, params) in self.iter() {
            writeln!(f, "{}", node)?;
            for (name, value) in params.iter() {
                writeln!(f, "{:>width$}: {}", name, value, width = PRINT_PARAM_COLUMN)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_create_node_is_idempotent() {
        let mut table = ParameterTable::new();
        let a = table.find_or_create_node("/ns/node").unwrap();
        let b = table.find_or_create_node("/ns/node").unwrap();
        assert_eq!(a, b);
        assert_eq!(table.num_nodes(), 1);

        let c = table.find_or_create_node("/other").unwrap();
        assert_eq!(c, 1);
        assert_eq!(table.node_names(), ["/ns/node", "/other"]);
    }

    #[test]
    fn test_find_or_create_parameter_is_idempotent() {
        let mut table = ParameterTable::new();
        let node = table.find_or_create_node("robot").unwrap();
        let a = table.find_or_create_parameter(node, "max_speed").unwrap();
        let b = table.find_or_create_parameter(node, "max_speed").unwrap();
        assert_eq!(a, b);
        assert_eq!(table.node("robot").unwrap().len(), 1);
        assert_eq!(table.get("robot", "max_speed"), Some(&ParameterValue::NotSet));

        let err = table.find_or_create_parameter(5, "x").unwrap_err();
        assert!(matches!(err, ParamError::InvalidArgument(_)));
    }

    #[test]
    fn test_growth_past_initial_capacity() {
        let mut table = ParameterTable::try_with_capacity(1, 1).unwrap();
        for i in 0..10 {
            table.set(&format!("node_{}", i), "p", i as i64).unwrap();
            let node = table.find_node(&format!("node_{}", 0)).unwrap();
            table.find_or_create_parameter(node, &format!("q{}", i)).unwrap();
        }
        assert_eq!(table.num_nodes(), 10);
        assert_eq!(table.node("node_0").unwrap().len(), 11);
        assert_eq!(table.get("node_9", "p"), Some(&ParameterValue::Integer(9)));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut table = ParameterTable::new();
        table.set("n", "list", vec!["a".to_string()]).unwrap();
        let copy = table.clone();
        assert_eq!(copy, table);

        if let Some(ParameterValue::StringArray(items)) = table.get_mut("n", "list") {
            items.push("b".to_string());
        }
        assert_eq!(
            copy.get("n", "list"),
            Some(&ParameterValue::StringArray(vec!["a".to_string()]))
        );
        assert_ne!(copy, table);
    }

    #[test]
    fn test_set_rejects_empty_names() {
        let mut table = ParameterTable::new();
        assert!(matches!(
            table.set("", "p", true),
            Err(ParamError::InvalidArgument(_))
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut node = NodeParams::new();
        for name in ["a", "b", "c"] {
            node.find_or_create(name).unwrap();
        }
        assert_eq!(node.remove(1), Some(("b".to_string(), ParameterValue::NotSet)));
        assert_eq!(node.names(), ["a", "c"]);
        assert_eq!(node.remove(7), None);
    }

    #[test]
    fn test_selector_rank() {
        assert_eq!(selector_rank("/**", "/any/node"), Some(0));
        assert_eq!(selector_rank("/my_ns/**", "/my_ns/node"), Some(1));
        assert_eq!(selector_rank("/my_ns/**", "/my_ns_other/node"), None);
        assert_eq!(selector_rank("/my_ns/*", "/my_ns/node"), Some(2));
        assert_eq!(selector_rank("/my_ns/*", "/my_ns/a/node"), None);
        assert_eq!(selector_rank("/*", "/node"), Some(2));
        assert_eq!(selector_rank("/my_node", "/my_node"), Some(3));
        assert_eq!(selector_rank("my_node", "/my_node"), Some(3));
        assert_eq!(selector_rank("/my_node", "/other_node"), None);
    }

    #[test]
    fn test_overrides_for_applies_most_specific_last() {
        let mut table = ParameterTable::new();
        table.set("/my_node", "speed", 2.0).unwrap();
        table.set("/**", "speed", 1.0).unwrap();
        table.set("/**", "global", true).unwrap();
        table.set("/other", "not_mine", 1_i64).unwrap();

        let overrides = table.overrides_for("/my_node");
        assert_eq!(overrides["speed"], ParameterValue::Double(2.0));
        assert_eq!(overrides["global"], ParameterValue::Bool(true));
        assert!(!overrides.contains_key("not_mine"));
    }

    #[test]
    fn test_display_dump() {
        let mut table = ParameterTable::new();
        table.set("robot", "ids", vec![1_i64, 2]).unwrap();
        let dump = table.to_string();
        let expected = format!("\n Node Name\t\t\t\tParameters\nrobot\n{:>50}: 1, 2, \n", "ids");
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_serialize_as_nested_maps() {
        let mut table = ParameterTable::new();
        table.set("robot", "max_speed", 3.5).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "robot": { "max_speed": { "Double": 3.5 } } })
        );
    }
}
