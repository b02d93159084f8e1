//! The catalog of recognized connection parameters.
//!
//! Every parameter is permanently bound to one type class. The classes are
//! separate enums ([`BoolParameter`], [`IntParameter`], [`StrParameter`])
//! unified under [`Parameter`], so handing a string parameter to an integer
//! accessor is a compile error rather than a runtime abort.

/// A boolean connection parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolParameter {
    /// Secure the connection using TLS
    Tls,
    /// Initial value of autocommit
    Autocommit,
}

/// An integer connection parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntParameter {
    /// TCP port, also used to pick the Unix domain socket path (-1 = unset)
    Port,
    /// Client time zone as minutes east of UTC
    Timezone,
    /// Rows beyond this limit are retrieved on demand
    Replysize,
}

/// A string connection parameter.
///
/// An absent value is represented as the empty string; there is no
/// separate "unset" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrParameter {
    /// Path to a Unix domain socket to connect to
    Sock,
    /// Path to a TLS certificate to authenticate the server with
    Cert,
    /// Path to a TLS key (+certs) to authenticate with as client
    ClientKey,
    /// Path to TLS certs for `clientkey`, if not included there
    ClientCert,
    /// IP number, domain name, or the special values `localhost` and `localhost.`
    Host,
    /// Name of the database to connect to
    Database,
    /// Schema name, only used for REMOTE TABLE
    TableSchema,
    /// Table name, only used for REMOTE TABLE
    Table,
    /// Pinned hash of the server TLS certificate; overrides `cert`
    CertHash,
    /// User name to authenticate as
    User,
    /// Password to authenticate with
    Password,
    /// Query language, for example "sql" or "mal"
    Language,
    /// Initial schema
    Schema,
    /// Whether to use the binary result set format (bool or level)
    Binary,
}

/// Any recognized connection parameter, tagged by type class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Bool(BoolParameter),
    Int(IntParameter),
    Str(StrParameter),
}

impl From<BoolParameter> for Parameter {
    fn from(p: BoolParameter) -> Self {
        Parameter::Bool(p)
    }
}

impl From<IntParameter> for Parameter {
    fn from(p: IntParameter) -> Self {
        Parameter::Int(p)
    }
}

impl From<StrParameter> for Parameter {
    fn from(p: StrParameter) -> Self {
        Parameter::Str(p)
    }
}

/// Outcome of resolving a parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The name maps to a recognized parameter.
    Known(Parameter),
    /// The name is an accepted-but-unmodeled extension; store it verbatim.
    Ignored,
    /// The name is not recognized at all.
    Unknown,
}

// Sorted by name. "fetchsize" is the JDBC alias for replysize.
const BY_NAME: &[(&str, Parameter)] = &[
    ("autocommit", Parameter::Bool(BoolParameter::Autocommit)),
    ("binary", Parameter::Str(StrParameter::Binary)),
    ("cert", Parameter::Str(StrParameter::Cert)),
    ("certhash", Parameter::Str(StrParameter::CertHash)),
    ("clientcert", Parameter::Str(StrParameter::ClientCert)),
    ("clientkey", Parameter::Str(StrParameter::ClientKey)),
    ("database", Parameter::Str(StrParameter::Database)),
    ("fetchsize", Parameter::Int(IntParameter::Replysize)),
    ("host", Parameter::Str(StrParameter::Host)),
    ("language", Parameter::Str(StrParameter::Language)),
    ("password", Parameter::Str(StrParameter::Password)),
    ("port", Parameter::Int(IntParameter::Port)),
    ("replysize", Parameter::Int(IntParameter::Replysize)),
    ("schema", Parameter::Str(StrParameter::Schema)),
    ("sock", Parameter::Str(StrParameter::Sock)),
    ("table", Parameter::Str(StrParameter::Table)),
    ("tableschema", Parameter::Str(StrParameter::TableSchema)),
    ("timezone", Parameter::Int(IntParameter::Timezone)),
    ("tls", Parameter::Bool(BoolParameter::Tls)),
    ("user", Parameter::Str(StrParameter::User)),
];

// Recognized extension parameters, accepted but not interpreted.
const IGNORED_NAMES: &[&str] = &["debug", "hash", "logfile"];

impl Parameter {
    /// Resolve a parameter name.
    ///
    /// Matching is case-sensitive. Unrecognized names containing an
    /// underscore follow the extension-parameter convention and resolve to
    /// [`Lookup::Ignored`]; all other unrecognized names are
    /// [`Lookup::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// use monetdb_url::{Lookup, Parameter, StrParameter};
    ///
    /// assert_eq!(
    ///     Parameter::resolve("host"),
    ///     Lookup::Known(Parameter::Str(StrParameter::Host)),
    /// );
    /// assert_eq!(Parameter::resolve("map_to_long"), Lookup::Ignored);
    /// assert_eq!(Parameter::resolve("hostname"), Lookup::Unknown);
    /// ```
    #[must_use]
    pub fn resolve(name: &str) -> Lookup {
        // linear scan; the table is small and this is not a bottleneck
        for (n, p) in BY_NAME {
            if *n == name {
                return Lookup::Known(*p);
            }
        }
        if IGNORED_NAMES.contains(&name) || name.contains('_') {
            Lookup::Ignored
        } else {
            Lookup::Unknown
        }
    }

    /// The canonical display name of this parameter.
    ///
    /// Total over the type; aliases render their canonical name
    /// (`fetchsize` renders as `"replysize"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Parameter::Bool(BoolParameter::Tls) => "tls",
            Parameter::Bool(BoolParameter::Autocommit) => "autocommit",
            Parameter::Int(IntParameter::Port) => "port",
            Parameter::Int(IntParameter::Timezone) => "timezone",
            Parameter::Int(IntParameter::Replysize) => "replysize",
            Parameter::Str(StrParameter::Sock) => "sock",
            Parameter::Str(StrParameter::Cert) => "cert",
            Parameter::Str(StrParameter::ClientKey) => "clientkey",
            Parameter::Str(StrParameter::ClientCert) => "clientcert",
            Parameter::Str(StrParameter::Host) => "host",
            Parameter::Str(StrParameter::Database) => "database",
            Parameter::Str(StrParameter::TableSchema) => "tableschema",
            Parameter::Str(StrParameter::Table) => "table",
            Parameter::Str(StrParameter::CertHash) => "certhash",
            Parameter::Str(StrParameter::User) => "user",
            Parameter::Str(StrParameter::Password) => "password",
            Parameter::Str(StrParameter::Language) => "language",
            Parameter::Str(StrParameter::Schema) => "schema",
            Parameter::Str(StrParameter::Binary) => "binary",
        }
    }

    /// Whether this is a core transport parameter.
    ///
    /// Core parameters (tls, host, port, database, tableschema, table) may
    /// be restricted from being overridden by untrusted per-query input;
    /// see [`Settings::set_named`](crate::Settings::set_named).
    #[must_use]
    pub const fn is_core(self) -> bool {
        matches!(
            self,
            Parameter::Bool(BoolParameter::Tls)
                | Parameter::Str(StrParameter::Host)
                | Parameter::Int(IntParameter::Port)
                | Parameter::Str(StrParameter::Database)
                | Parameter::Str(StrParameter::TableSchema)
                | Parameter::Str(StrParameter::Table)
        )
    }
}

/// All recognized parameters, in catalog order.
///
/// Useful for callers that want to enumerate a full configuration, e.g.
/// for display.
pub const ALL_PARAMETERS: &[Parameter] = &[
    Parameter::Bool(BoolParameter::Tls),
    Parameter::Bool(BoolParameter::Autocommit),
    Parameter::Int(IntParameter::Port),
    Parameter::Int(IntParameter::Timezone),
    Parameter::Int(IntParameter::Replysize),
    Parameter::Str(StrParameter::Sock),
    Parameter::Str(StrParameter::Cert),
    Parameter::Str(StrParameter::ClientKey),
    Parameter::Str(StrParameter::ClientCert),
    Parameter::Str(StrParameter::Host),
    Parameter::Str(StrParameter::Database),
    Parameter::Str(StrParameter::TableSchema),
    Parameter::Str(StrParameter::Table),
    Parameter::Str(StrParameter::CertHash),
    Parameter::Str(StrParameter::User),
    Parameter::Str(StrParameter::Password),
    Parameter::Str(StrParameter::Language),
    Parameter::Str(StrParameter::Schema),
    Parameter::Str(StrParameter::Binary),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known() {
        assert_eq!(
            Parameter::resolve("tls"),
            Lookup::Known(Parameter::Bool(BoolParameter::Tls))
        );
        assert_eq!(
            Parameter::resolve("replysize"),
            Lookup::Known(Parameter::Int(IntParameter::Replysize))
        );
        assert_eq!(
            Parameter::resolve("binary"),
            Lookup::Known(Parameter::Str(StrParameter::Binary))
        );
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        assert_eq!(Parameter::resolve("Host"), Lookup::Unknown);
        assert_eq!(Parameter::resolve("TLS"), Lookup::Unknown);
    }

    #[test]
    fn test_resolve_fetchsize_alias() {
        assert_eq!(
            Parameter::resolve("fetchsize"),
            Lookup::Known(Parameter::Int(IntParameter::Replysize))
        );
    }

    #[test]
    fn test_resolve_ignored() {
        assert_eq!(Parameter::resolve("debug"), Lookup::Ignored);
        assert_eq!(Parameter::resolve("hash"), Lookup::Ignored);
        assert_eq!(Parameter::resolve("logfile"), Lookup::Ignored);
        // extension convention: underscore in the name
        assert_eq!(Parameter::resolve("jdbc_fetch_hint"), Lookup::Ignored);
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(Parameter::resolve("hostname"), Lookup::Unknown);
        assert_eq!(Parameter::resolve(""), Lookup::Unknown);
    }

    #[test]
    fn test_name_round_trips_through_resolve() {
        for parm in ALL_PARAMETERS {
            assert_eq!(Parameter::resolve(parm.name()), Lookup::Known(*parm));
        }
    }

    #[test]
    fn test_alias_renders_canonical_name() {
        let Lookup::Known(parm) = Parameter::resolve("fetchsize") else {
            panic!("fetchsize should resolve");
        };
        assert_eq!(parm.name(), "replysize");
    }

    #[test]
    fn test_is_core() {
        for name in ["tls", "host", "port", "database", "tableschema", "table"] {
            let Lookup::Known(parm) = Parameter::resolve(name) else {
                panic!("{name} should resolve");
            };
            assert!(parm.is_core(), "{name} should be core");
        }
        for name in ["sock", "user", "password", "replysize", "autocommit"] {
            let Lookup::Known(parm) = Parameter::resolve(name) else {
                panic!("{name} should resolve");
            };
            assert!(!parm.is_core(), "{name} should not be core");
        }
    }
}
