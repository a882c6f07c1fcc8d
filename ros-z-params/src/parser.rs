//! File and string entry points.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Builder;
use crate::error::{ParamError, Result};
use crate::event::SaphyrEvents;
use crate::parse::{MAX_NUM_PARAMS_PER_NODE, RouterOptions, parse_file_events, parse_value_events};
use crate::table::{DEFAULT_NODE_CAPACITY, DEFAULT_PARAM_CAPACITY, ParameterTable};

/// Parser settings.
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Node slots reserved when a table is created
    pub node_capacity: usize,
    /// Parameter slots reserved for every new node
    pub param_capacity: usize,
    pub max_params_per_node: usize,
    /// Reject node names that are not valid ROS 2 names
    pub validate_node_names: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            param_capacity: DEFAULT_PARAM_CAPACITY,
            max_params_per_node: MAX_NUM_PARAMS_PER_NODE,
            validate_node_names: true,
        }
    }
}

impl ParserConfig {
    fn router_options(&self) -> RouterOptions {
        RouterOptions {
            max_params_per_node: self.max_params_per_node,
            validate_node_names: self.validate_node_names,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParserBuilder {
    config: ParserConfig,
}

impl ParserBuilder {
    pub fn from_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.config.node_capacity = capacity;
        self
    }

    pub fn with_param_capacity(mut self, capacity: usize) -> Self {
        self.config.param_capacity = capacity;
        self
    }

    pub fn with_max_params_per_node(mut self, max: usize) -> Self {
        self.config.max_params_per_node = max;
        self
    }

    pub fn with_node_name_validation(mut self, enabled: bool) -> Self {
        self.config.validate_node_names = enabled;
        self
    }
}

impl Builder for ParserBuilder {
    type Output = ParamParser;

    fn build(self) -> Result<ParamParser> {
        let config = self.config;
        for (field, value) in [
            ("node_capacity", config.node_capacity),
            ("param_capacity", config.param_capacity),
            ("max_params_per_node", config.max_params_per_node),
        ] {
            if value == 0 {
                return Err(ParamError::InvalidArgument(format!(
                    "{} must be greater than zero",
                    field
                )));
            }
        }
        Ok(ParamParser { config })
    }
}

/// Parses ROS 2 parameter files into [`ParameterTable`]s.
///
/// Holds only its configuration, so one parser can serve any number of
/// independent parses.
#[derive(Debug, Clone, Default)]
pub struct ParamParser {
    config: ParserConfig,
}

impl ParamParser {
    pub fn builder() -> ParserBuilder {
        ParserBuilder::default()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn new_table(&self) -> Result<ParameterTable> {
        ParameterTable::try_with_capacity(self.config.node_capacity, self.config.param_capacity)
    }

    /// Parse the parameter file at `path` into a new table.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParameterTable> {
        let mut table = self.new_table()?;
        self.parse_file_into(&mut table, path)?;
        Ok(table)
    }

    pub fn parse_str(&self, yaml: &str) -> Result<ParameterTable> {
        let mut table = self.new_table()?;
        self.parse_str_into(&mut table, yaml)?;
        Ok(table)
    }

    /// Overlay the file at `path` onto `table`.
    ///
    /// `table` is only modified when the whole file parses.
    pub fn parse_file_into(&self, table: &mut ParameterTable, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            let err = ParamError::Parse(format!(
                "Error opening YAML file {}: {}",
                path.display(),
                e
            ));
            tracing::error!("{}", err);
            err
        })?;
        self.parse_str_into(table, &yaml)
    }

    /// Overlay the parameter document `yaml` onto `table`.
    ///
    /// `table` is only modified when the whole document parses.
    pub fn parse_str_into(&self, table: &mut ParameterTable, yaml: &str) -> Result<()> {
        let mut scratch = table.clone();
        let mut source = SaphyrEvents::new(yaml);
        if let Err(e) = parse_file_events(&mut source, &mut scratch, self.config.router_options()) {
            tracing::error!("Failed to parse parameters: {}", e);
            return Err(e);
        }
        tracing::debug!("parsed parameters for {} nodes", scratch.num_nodes());
        *table = scratch;
        Ok(())
    }

    /// Parse `yaml_value` as the value of `param` in `node`.
    ///
    /// The value is a scalar or a flat sequence of scalars. `table` is only
    /// modified when it parses.
    pub fn parse_value(
        &self,
        table: &mut ParameterTable,
        node: &str,
        param: &str,
        yaml_value: &str,
    ) -> Result<()> {
        for (what, arg) in [("node name", node), ("parameter name", param), ("value", yaml_value)] {
            if arg.is_empty() {
                return Err(ParamError::InvalidArgument(format!("{} is empty", what)));
            }
        }

        let mut slot = table.get(node, param).cloned().unwrap_or_default();
        let mut source = SaphyrEvents::new(yaml_value);
        if let Err(e) = parse_value_events(&mut source, &mut slot) {
            tracing::error!("Failed to parse value of {}/{}: {}", node, param, e);
            return Err(e);
        }
        table.set(node, param, slot)
    }
}

/// Parse the file at `path` with the default configuration.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParameterTable> {
    ParamParser::default().parse_file(path)
}

/// Parse a parameter document held in memory with the default configuration.
pub fn parse_str(yaml: &str) -> Result<ParameterTable> {
    ParamParser::default().parse_str(yaml)
}

pub fn parse_file_into(table: &mut ParameterTable, path: impl AsRef<Path>) -> Result<()> {
    ParamParser::default().parse_file_into(table, path)
}

pub fn parse_str_into(table: &mut ParameterTable, yaml: &str) -> Result<()> {
    ParamParser::default().parse_str_into(table, yaml)
}

pub fn parse_value(
    table: &mut ParameterTable,
    node: &str,
    param: &str,
    yaml_value: &str,
) -> Result<()> {
    ParamParser::default().parse_value(table, node, param, yaml_value)
}
