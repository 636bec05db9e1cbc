//! Parameter configuration for the managed service.
//!
//! Client-facing parameter paths such as `["driver", "rate"]` map onto shell
//! variables in the service's defaults file (`JACKD_SR=48000`). This module
//! holds the mapping table, value typing and validation, and the pure text
//! transforms used to read and rewrite the defaults file. File I/O lives in
//! the runtime crate.

mod defaults_file;
mod error;
mod params;

pub use defaults_file::{format_assignment, read_variable, upsert_variable};
pub use error::ConfigureError;
pub use params::{
    Constraint, PARAMETERS, ParamKind, ParamSpec, ParamValue, ParameterValue, find_param,
};
