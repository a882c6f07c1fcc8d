//! The event router: turns a YAML event stream into table entries.
//!
//! A parameter file looks like
//!
//! ```yaml
//! ns:
//!   node:
//!     ros__parameters:
//!       group:
//!         leaf: 5
//!       list: [1, 2, 3]
//! ```
//!
//! Keys above `ros__parameters` build the node name (`ns/node`), keys below
//! it build dotted parameter names (`group.leaf`).

use crate::arrays::append_value;
use crate::classify::{ValueType, classify};
use crate::error::{ParamError, Result};
use crate::event::{EventSource, MarkedEvent, Scalar, YamlEvent};
use crate::name::validate_fully_qualified_node_name;
use crate::namespace::{NamespaceKind, NamespaceTracker};
use crate::table::ParameterTable;
use crate::types::ParameterValue;

/// Key that opens the parameter section of a node.
pub const PARAMS_KEY: &str = "ros__parameters";

/// Default cap on the number of parameters of a single node.
pub const MAX_NUM_PARAMS_PER_NODE: usize = 512;

/// Where the router is relative to `ros__parameters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum MapLevel {
    Uninitialized,
    NodeName,
    Params,
}

/// Limits and checks applied while routing a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    pub max_params_per_node: usize,
    pub validate_node_names: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_params_per_node: MAX_NUM_PARAMS_PER_NODE,
            validate_node_names: true,
        }
    }
}

/// Classify `scalar` and write it into `slot`, or append it when a
/// sequence is open.
pub(crate) fn store_value(
    slot: &mut ParameterValue,
    scalar: Scalar,
    in_seq: bool,
    seq_type: &mut Option<ValueType>,
    line: usize,
) -> Result<()> {
    if !scalar.style.is_quoted() && scalar.value.is_empty() {
        return Err(ParamError::parse_at(line, "No value"));
    }

    let value = classify(&scalar.value, scalar.style, scalar.tag.as_deref());
    if in_seq {
        append_value(slot, value, seq_type, line)
    } else {
        *slot = value.into();
        Ok(())
    }
}

struct EventRouter<'t> {
    table: &'t mut ParameterTable,
    ns: NamespaceTracker,
    options: RouterOptions,
    level: MapLevel,
    depth: usize,
    is_key: bool,
    is_seq: bool,
    is_new_map: bool,
    seq_type: Option<ValueType>,
    node_idx: Option<usize>,
    param_idx: Option<usize>,
}

impl<'t> EventRouter<'t> {
    fn new(table: &'t mut ParameterTable, options: RouterOptions) -> Self {
        Self {
            table,
            ns: NamespaceTracker::new(),
            options,
            level: MapLevel::NodeName,
            depth: 0,
            is_key: true,
            is_seq: false,
            is_new_map: false,
            seq_type: None,
            node_idx: None,
            param_idx: None,
        }
    }

    fn run(&mut self, source: &mut dyn EventSource) -> Result<()> {
        loop {
            let MarkedEvent { event, line } = source.next_event()?;
            match event {
                YamlEvent::StreamEnd => return Ok(()),
                YamlEvent::StreamStart | YamlEvent::DocumentStart | YamlEvent::DocumentEnd => {}
                YamlEvent::Scalar(scalar) => {
                    if self.is_key {
                        self.parse_key(&scalar.value, line)?;
                        self.is_key = false;
                    } else {
                        self.parse_value(scalar, line)?;
                    }
                }
                YamlEvent::SequenceStart => self.sequence_start(line)?,
                YamlEvent::SequenceEnd => {
                    self.is_seq = false;
                    self.is_key = true;
                }
                YamlEvent::MappingStart => self.mapping_start(line)?,
                YamlEvent::MappingEnd => self.mapping_end(),
                YamlEvent::Alias => {
                    return Err(ParamError::parse_at(line, "Will not support aliasing"));
                }
                YamlEvent::NoEvent => {
                    return Err(ParamError::parse_at(line, "Received an empty event"));
                }
            }
        }
    }

    fn parse_key(&mut self, key: &str, line: usize) -> Result<()> {
        if key.is_empty() {
            return Err(ParamError::parse_at(line, "No key"));
        }

        match self.level {
            MapLevel::Uninitialized => {
                Err(ParamError::parse_at(line, "Uninitialized map level"))
            }
            MapLevel::NodeName => self.node_key(key, line),
            MapLevel::Params => self.parameter_key(key, line),
        }
    }

    fn node_key(&mut self, key: &str, line: usize) -> Result<()> {
        if !key.starts_with(PARAMS_KEY) {
            return self.ns.push(key, NamespaceKind::Node);
        }

        let node_name = match self.ns.node_ns() {
            Some(name) if self.ns.node_count() > 0 => name,
            _ => {
                return Err(ParamError::parse_at(
                    line,
                    format!("There are no node names before {}", PARAMS_KEY),
                ));
            }
        };

        if self.options.validate_node_names {
            validate_fully_qualified_node_name(node_name).map_err(|e| {
                ParamError::parse_at(line, format!("Invalid node name '{}': {}", node_name, e))
            })?;
        }

        let node_idx = self.table.find_or_create_node(node_name)?;
        tracing::debug!("parameters of node {:?} start at line {}", node_name, line);
        self.node_idx = Some(node_idx);
        self.param_idx = None;
        self.ns.pop(NamespaceKind::Node);
        self.level = MapLevel::Params;
        Ok(())
    }

    fn parameter_key(&mut self, key: &str, line: usize) -> Result<()> {
        let node_idx = self
            .node_idx
            .ok_or_else(|| ParamError::parse_at(line, "Parameter key without a node"))?;
        let num_nodes = self.table.num_nodes();
        let node = self.table.node_at_mut(node_idx).ok_or_else(|| {
            ParamError::parse_at(
                line,
                format!("Node index {} out of range for {} nodes", node_idx, num_nodes),
            )
        })?;

        if self.is_new_map {
            // The previous key opened this mapping, so it names a namespace
            // rather than a parameter.
            let prev = self.param_idx.filter(|&idx| idx < node.len()).ok_or_else(|| {
                ParamError::parse_at(line, "Cannot create a parameter namespace without a key")
            })?;
            let prev_name = node.name_at(prev).unwrap_or_default().to_string();
            self.ns.replace(
                NamespaceKind::Parameter,
                &prev_name,
                self.ns.parameter_count() + 1,
            )?;
            if node.value_at(prev).is_some_and(|v| !v.is_set()) {
                node.remove(prev);
            }
            self.param_idx = None;
            self.is_new_map = false;
        }

        let full_name = match self.ns.parameter_ns() {
            Some(ns) => format!("{}.{}", ns, key),
            None => key.to_string(),
        };

        if node.find(&full_name).is_none() && node.len() >= self.options.max_params_per_node {
            return Err(ParamError::Parse(format!(
                "Exceeded maximum allowed number of parameters for a node ({})",
                self.options.max_params_per_node
            )));
        }

        self.param_idx = Some(node.find_or_create(&full_name)?);
        Ok(())
    }

    fn parse_value(&mut self, scalar: Scalar, line: usize) -> Result<()> {
        let before_params = || {
            ParamError::parse_at(line, format!("Cannot have a value before {}", PARAMS_KEY))
        };
        if self.level < MapLevel::Params {
            return Err(before_params());
        }
        let (node_idx, param_idx) = self
            .node_idx
            .zip(self.param_idx)
            .ok_or_else(before_params)?;
        let slot = self
            .table
            .node_at_mut(node_idx)
            .and_then(|node| node.value_at_mut(param_idx))
            .ok_or_else(before_params)?;

        store_value(slot, scalar, self.is_seq, &mut self.seq_type, line)?;
        if !self.is_seq {
            self.is_key = true;
        }
        Ok(())
    }

    fn sequence_start(&mut self, line: usize) -> Result<()> {
        if self.is_key {
            return Err(ParamError::parse_at(line, "Sequences cannot be key"));
        }
        if self.level < MapLevel::Params {
            return Err(ParamError::Parse(format!(
                "Sequences can only be values and not keys in params. Error at line {}",
                line
            )));
        }
        if self.is_seq {
            return Err(ParamError::parse_at(line, "Nested sequences are not supported"));
        }
        self.is_seq = true;
        self.seq_type = None;
        Ok(())
    }

    fn mapping_start(&mut self, line: usize) -> Result<()> {
        if self.is_seq {
            return Err(ParamError::parse_at(line, "Sequences can only contain scalars"));
        }
        self.depth += 1;
        self.is_new_map = true;
        self.is_key = true;
        // The mapping right under `ros__parameters` does not open a
        // parameter namespace.
        if self.level == MapLevel::Params
            && self.depth.checked_sub(self.ns.node_count() + 1) == Some(2)
        {
            self.is_new_map = false;
        }
        Ok(())
    }

    fn mapping_end(&mut self) {
        match self.level {
            MapLevel::Params => {
                if self.ns.parameter_count() > 0 {
                    self.ns.pop(NamespaceKind::Parameter);
                } else {
                    self.level = MapLevel::NodeName;
                }
            }
            MapLevel::NodeName => {
                if self.depth == self.ns.node_count() + 1 {
                    self.ns.pop(NamespaceKind::Node);
                }
            }
            MapLevel::Uninitialized => {}
        }
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Route every event of a parameter file into `table`.
///
/// On error `table` may hold a partial result; callers that need atomicity
/// route into a scratch table.
pub fn parse_file_events(
    source: &mut dyn EventSource,
    table: &mut ParameterTable,
    options: RouterOptions,
) -> Result<()> {
    EventRouter::new(table, options).run(source)
}

/// Route the events of a single YAML value into `slot`.
///
/// Only scalars and one flat sequence of scalars are accepted.
pub fn parse_value_events(source: &mut dyn EventSource, slot: &mut ParameterValue) -> Result<()> {
    let mut is_seq = false;
    let mut seq_type = None;
    loop {
        let MarkedEvent { event, line } = source.next_event()?;
        match event {
            YamlEvent::StreamEnd => return Ok(()),
            YamlEvent::StreamStart | YamlEvent::DocumentStart | YamlEvent::DocumentEnd => {}
            YamlEvent::Scalar(scalar) => store_value(slot, scalar, is_seq, &mut seq_type, line)?,
            YamlEvent::SequenceStart => {
                if is_seq {
                    return Err(ParamError::parse_at(line, "Nested sequences are not supported"));
                }
                is_seq = true;
                seq_type = None;
            }
            YamlEvent::SequenceEnd => is_seq = false,
            YamlEvent::NoEvent => {
                return Err(ParamError::parse_at(line, "Received an empty event"));
            }
            other => {
                return Err(ParamError::parse_at(
                    line,
                    format!("Unsupported YAML event {} in a value", other),
                ));
            }
        }
    }
}
