//! Connection URL parsing and parameter validation for MonetDB.
//!
//! This crate turns a `monetdb://` / `monetdbs://` URL (and/or named
//! key/value overrides) into a validated, typed set of connection
//! parameters, and derives the concrete values a transport layer needs to
//! open the connection:
//!
//! - [`Parameter`] and friends - the catalog of recognized parameters
//! - [`Settings`] - the typed parameter store with URL parsing, named
//!   sets, validation and change tracking
//! - [`TlsVerify`] / [`CerthashAlgorithm`] - the derived TLS settings
//! - [`Error`] - parse, value and validation failures
//!
//! No network I/O happens here; the crate only computes the parameters a
//! caller would use to connect.
//!
//! # Example
//!
//! ```
//! use monetdb_url::{Settings, TlsVerify};
//!
//! let mut settings = Settings::new();
//! settings.parse_url("monetdbs://db.example.com/demo?cert=/etc/ssl/mdb.pem")?;
//! settings.validate()?;
//!
//! assert_eq!(settings.connect_tcp_host(), "db.example.com");
//! assert_eq!(settings.connect_port(), 50000);
//! assert_eq!(settings.connect_tls_verify(), TlsVerify::Cert);
//! # Ok::<(), monetdb_url::Error>(())
//! ```

pub mod catalog;
pub mod error;
pub mod settings;
pub mod validate;

mod parse;
mod scan;

pub use catalog::{
    ALL_PARAMETERS, BoolParameter, IntParameter, Lookup, Parameter, StrParameter,
};
pub use error::{Error, ParseError, Result, ValidationError, ValueError, ValueErrorKind};
pub use settings::{Settings, parse_bool};
pub use validate::{CerthashAlgorithm, TlsVerify};
