//! ROS 2 parameter file parsing.
//!
//! ```yaml
//! /**:
//!   ros__parameters:
//!     use_sim_time: true
//!
//! /my_ns/my_node:
//!   ros__parameters:
//!     max_speed: 3.5
//!     camera:
//!       brands: [Bosch, Novatek]
//! ```
//!
//! Parsing the file above produces a [`ParameterTable`] with the nodes
//! `/**` and `/my_ns/my_node`, the latter holding `max_speed` and
//! `camera.brands`.

pub mod arrays;
pub mod classify;
pub mod error;
pub mod event;
pub mod name;
pub mod namespace;
pub mod parse;
pub mod parser;
pub mod table;
pub mod types;

pub use error::{ErrorKind, ParamError, Result};
pub use parser::{
    ParamParser, ParserBuilder, ParserConfig, parse_file, parse_file_into, parse_str,
    parse_str_into, parse_value,
};
pub use table::{NodeParams, ParameterTable};
pub use types::{ParameterType, ParameterValue};

pub trait Builder {
    type Output;
    fn build(self) -> Result<Self::Output>;
}
