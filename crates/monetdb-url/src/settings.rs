//! The typed, mutable connection parameter store.
//!
//! A [`Settings`] holds one value per recognized parameter plus an
//! insertion-ordered bag of ignored extension parameters. Any mutation
//! clears the validity flag; only a successful [`Settings::validate`]
//! pass sets it again, and the derived `connect_*` accessors may only be
//! read while it is set.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::catalog::{
    ALL_PARAMETERS, BoolParameter, IntParameter, Lookup, Parameter, StrParameter,
};
use crate::error::{Result, ValueError};
use crate::validate::CerthashAlgorithm;

/// Parse the textual form of a boolean parameter.
///
/// Accepts `true`/`yes`/`on` and `false`/`no`/`off`, case-insensitively.
/// Returns `None` for anything else.
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    const VARIANTS: &[(&str, bool)] = &[
        ("true", true),
        ("false", false),
        ("yes", true),
        ("no", false),
        ("on", true),
        ("off", false),
    ];
    VARIANTS
        .iter()
        .find(|(word, _)| word.eq_ignore_ascii_case(text))
        .map(|&(_, value)| value)
}

/// All parameters needed to connect to MonetDB.
///
/// Created with the documented defaults, mutated by URL parsing and/or
/// direct field sets, then checked with [`validate`](Settings::validate).
///
/// # Example
///
/// ```
/// use monetdb_url::{Settings, StrParameter};
///
/// let mut settings = Settings::new();
/// settings.parse_url("monetdb://localhost:12345/mydb?replysize=10")?;
/// settings.validate()?;
/// assert_eq!(settings.get_str(StrParameter::Database), "mydb");
/// assert_eq!(settings.connect_tcp_host(), "localhost");
/// # Ok::<(), monetdb_url::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    pub(crate) tls: bool,
    pub(crate) autocommit: bool,

    pub(crate) port: i64,
    pub(crate) timezone: i64,
    pub(crate) replysize: i64,

    pub(crate) sock: String,
    pub(crate) cert: String,
    pub(crate) clientkey: String,
    pub(crate) clientcert: String,
    pub(crate) host: String,
    pub(crate) database: String,
    pub(crate) tableschema: String,
    pub(crate) table: String,
    pub(crate) certhash: String,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) language: String,
    pub(crate) schema: String,
    pub(crate) binary: String,

    ignored: Vec<(String, String)>,
    user_generation: u64,
    password_generation: u64,

    pub(crate) validated: bool,
    // derived state, only meaningful while `validated` is set
    pub(crate) unix_sock_name: String,
    pub(crate) certhash_algo: CerthashAlgorithm,
    pub(crate) certhash_digits: String,
    pub(crate) binary_level: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tls: false,
            autocommit: true,

            port: -1,
            timezone: 0,
            replysize: 100,

            sock: String::new(),
            cert: String::new(),
            clientkey: String::new(),
            clientcert: String::new(),
            host: String::new(),
            database: String::new(),
            tableschema: String::new(),
            table: String::new(),
            certhash: String::new(),
            user: String::new(),
            password: String::new(),
            language: "sql".to_string(),
            schema: String::new(),
            binary: "on".to_string(),

            ignored: Vec::new(),
            user_generation: 0,
            password_generation: 0,

            validated: false,
            unix_sock_name: String::new(),
            certhash_algo: CerthashAlgorithm::Sha1,
            certhash_digits: String::new(),
            binary_level: 0,
        }
    }
}

impl Settings {
    /// Create a store with the documented defaults applied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a boolean parameter.
    #[must_use]
    pub fn get_bool(&self, parm: BoolParameter) -> bool {
        match parm {
            BoolParameter::Tls => self.tls,
            BoolParameter::Autocommit => self.autocommit,
        }
    }

    /// Set a boolean parameter, clearing the validity flag.
    pub fn set_bool(&mut self, parm: BoolParameter, value: bool) {
        match parm {
            BoolParameter::Tls => self.tls = value,
            BoolParameter::Autocommit => self.autocommit = value,
        }
        self.validated = false;
    }

    /// Get an integer parameter.
    #[must_use]
    pub fn get_long(&self, parm: IntParameter) -> i64 {
        match parm {
            IntParameter::Port => self.port,
            IntParameter::Timezone => self.timezone,
            IntParameter::Replysize => self.replysize,
        }
    }

    /// Set an integer parameter, clearing the validity flag.
    ///
    /// Range rules (such as the port range) are checked by
    /// [`validate`](Settings::validate), not here.
    pub fn set_long(&mut self, parm: IntParameter, value: i64) {
        match parm {
            IntParameter::Port => self.port = value,
            IntParameter::Timezone => self.timezone = value,
            IntParameter::Replysize => self.replysize = value,
        }
        self.validated = false;
    }

    /// Get a string parameter. The empty string means "unset".
    #[must_use]
    pub fn get_str(&self, parm: StrParameter) -> &str {
        match parm {
            StrParameter::Sock => &self.sock,
            StrParameter::Cert => &self.cert,
            StrParameter::ClientKey => &self.clientkey,
            StrParameter::ClientCert => &self.clientcert,
            StrParameter::Host => &self.host,
            StrParameter::Database => &self.database,
            StrParameter::TableSchema => &self.tableschema,
            StrParameter::Table => &self.table,
            StrParameter::CertHash => &self.certhash,
            StrParameter::User => &self.user,
            StrParameter::Password => &self.password,
            StrParameter::Language => &self.language,
            StrParameter::Schema => &self.schema,
            StrParameter::Binary => &self.binary,
        }
    }

    /// Set a string parameter, clearing the validity flag.
    ///
    /// Writing to `user` or `password` increments the corresponding
    /// generation counter, whether or not the value changed.
    pub fn set_str(&mut self, parm: StrParameter, value: impl Into<String>) {
        let value = value.into();
        match parm {
            StrParameter::Sock => self.sock = value,
            StrParameter::Cert => self.cert = value,
            StrParameter::ClientKey => self.clientkey = value,
            StrParameter::ClientCert => self.clientcert = value,
            StrParameter::Host => self.host = value,
            StrParameter::Database => self.database = value,
            StrParameter::TableSchema => self.tableschema = value,
            StrParameter::Table => self.table = value,
            StrParameter::CertHash => self.certhash = value,
            StrParameter::User => {
                self.user = value;
                self.user_generation += 1;
            }
            StrParameter::Password => {
                self.password = value;
                self.password_generation += 1;
            }
            StrParameter::Language => self.language = value,
            StrParameter::Schema => self.schema = value,
            StrParameter::Binary => self.binary = value,
        }
        self.validated = false;
    }

    /// Convert text to the parameter's type class and store it.
    ///
    /// On a conversion failure the store is left unchanged for that field.
    pub fn set_from_text(&mut self, parm: Parameter, text: &str) -> Result<()> {
        match parm {
            Parameter::Bool(p) => {
                let Some(b) = parse_bool(text) else {
                    return Err(ValueError::invalid_bool(Some(parm.name())).into());
                };
                self.set_bool(p, b);
            }
            Parameter::Int(p) => {
                if text.is_empty() {
                    return Err(ValueError::invalid_int(Some(parm.name()), true).into());
                }
                let Ok(value) = text.parse::<i64>() else {
                    return Err(ValueError::invalid_int(Some(parm.name()), false).into());
                };
                self.set_long(p, value);
            }
            Parameter::Str(p) => self.set_str(p, text),
        }
        Ok(())
    }

    /// Render the parameter's current value as text.
    ///
    /// Booleans render as `true`/`false`, integers in decimal, strings
    /// verbatim. The inverse of [`set_from_text`](Settings::set_from_text).
    #[must_use]
    pub fn to_text(&self, parm: Parameter) -> String {
        match parm {
            Parameter::Bool(p) => {
                let rendered = if self.get_bool(p) { "true" } else { "false" };
                rendered.to_string()
            }
            Parameter::Int(p) => self.get_long(p).to_string(),
            Parameter::Str(p) => self.get_str(p).to_string(),
        }
    }

    /// Append a key/value pair to the ignored-parameter bag.
    ///
    /// Used for recognized-but-unmodeled names and for extension names
    /// containing an underscore. Pairs are kept verbatim in insertion
    /// order and never interpreted.
    pub fn set_ignored(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.ignored.push((key.into(), value.into()));
    }

    /// The ignored-parameter bag, in insertion order.
    #[must_use]
    pub fn ignored(&self) -> &[(String, String)] {
        &self.ignored
    }

    /// Store a named parameter, the single safe entry point for key/value
    /// pairs from external sources.
    ///
    /// Resolves `key` through the catalog: unknown names are rejected,
    /// ignored names go to the bag, and core parameters are rejected when
    /// `allow_core` is false (e.g. per-query settings from untrusted
    /// contexts). Everything else is routed through
    /// [`set_from_text`](Settings::set_from_text).
    pub fn set_named(&mut self, key: &str, value: &str, allow_core: bool) -> Result<()> {
        match Parameter::resolve(key) {
            Lookup::Unknown => Err(ValueError::unknown(key).into()),
            Lookup::Ignored => {
                self.set_ignored(key, value);
                Ok(())
            }
            Lookup::Known(parm) => {
                if !allow_core && parm.is_core() {
                    return Err(ValueError::core_not_allowed(key).into());
                }
                self.set_from_text(parm, value)
            }
        }
    }

    /// Number of successful writes to `user` since creation.
    ///
    /// Lets a caller detect credential changes without comparing values.
    #[must_use]
    pub fn user_generation(&self) -> u64 {
        self.user_generation
    }

    /// Number of successful writes to `password` since creation.
    #[must_use]
    pub fn password_generation(&self) -> u64 {
        self.password_generation
    }

    /// Whether the store currently passes validation.
    ///
    /// Cleared by any mutation, set only by a successful
    /// [`validate`](Settings::validate) pass.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validated
    }
}

/// Serializes every recognized parameter through
/// [`to_text`](Settings::to_text), followed by the ignored bag entries in
/// insertion order.
impl Serialize for Settings {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ALL_PARAMETERS.len() + self.ignored.len()))?;
        for parm in ALL_PARAMETERS {
            map.serialize_entry(parm.name(), &self.to_text(*parm))?;
        }
        for (key, value) in &self.ignored {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
