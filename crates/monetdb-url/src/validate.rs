//! Cross-field validation and the derived connection parameters.
//!
//! [`Settings::validate`] checks the rules that relate fields to each
//! other (sock vs host, TLS vs certificates, identifier syntax, the port
//! range) and, on success, caches the derived values a transport layer
//! needs: the effective Unix socket path, the certificate-hash digest, and
//! the binary protocol level. The `connect_*` accessors expose those
//! values and may only be called while the store is valid.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result, ValidationError};
use crate::settings::{Settings, parse_bool};

/// How the peer's TLS certificate is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerify {
    /// TLS is not in use; nothing to verify
    #[default]
    Off,
    /// Compare the certificate digest against the pinned `certhash`
    Hash,
    /// Verify against the certificate file named by `cert`
    Cert,
    /// Verify against the platform trust store
    System,
}

impl TlsVerify {
    /// The conventional textual form: `hash`, `cert` or `system`, or the
    /// empty string when TLS is off.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TlsVerify::Off => "",
            TlsVerify::Hash => "hash",
            TlsVerify::Cert => "cert",
            TlsVerify::System => "system",
        }
    }
}

/// Digest algorithm of a pinned certificate hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CerthashAlgorithm {
    /// The default when `certhash` carries no `{...}` tag
    #[default]
    Sha1,
    Sha256,
}

impl CerthashAlgorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CerthashAlgorithm::Sha1 => "sha1",
            CerthashAlgorithm::Sha256 => "sha256",
        }
    }
}

// `["{" algorithm "}"] hexdigits-and-colons`, at most 64 characters of
// digest text. The algorithm tag is lowercase only; the digits are not.
fn certhash_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\{(sha1|sha256)\})?([0-9a-fA-F:]{1,64})$")
            .expect("certhash pattern compiles")
    })
}

// Letter or underscore first, then letters, digits, dashes, underscores.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][-A-Za-z0-9_]*$").expect("identifier pattern compiles")
    })
}

fn valid_identifier(name: &str) -> bool {
    name.is_empty() || identifier_pattern().is_match(name)
}

/// The binary negotiation level for a `binary` value, or `None` when the
/// text parses neither as a boolean nor as a non-negative integer.
/// `true` maps to an effectively unlimited level.
fn binary_level(text: &str) -> Option<i64> {
    if let Ok(level) = text.parse::<i64>() {
        return (level >= 0).then_some(level);
    }
    parse_bool(text).map(|b| if b { 65535 } else { 0 })
}

impl Settings {
    /// Check the cross-field rules and cache the derived values.
    ///
    /// Idempotent: returns immediately when the store is already valid.
    /// Rules are checked in a fixed order and the first failure wins.
    ///
    /// Rules, in order:
    ///
    /// 2. `sock` and `host` may only both be set when `host` is
    ///    `localhost` (sock- and host-based addressing cannot both point
    ///    elsewhere).
    /// 3. `binary` must parse as a boolean or a non-negative integer.
    /// 4. `sock` requires `tls` to be off.
    /// 5. `certhash`, when set, must match `["{" sha1|sha256 "}"]` followed
    ///    by hex digits and colons.
    /// 6. `cert` and `certhash` require `tls`.
    /// 7. `database`, `tableschema` and `table` must be empty or valid
    ///    identifiers.
    /// 8. `port` must be -1 (unset) or in 1..=65535.
    ///
    /// (Rule 1, type well-formedness, is guaranteed by the typed setters.)
    pub fn validate(&mut self) -> Result<()> {
        if self.validated {
            return Ok(());
        }
        self.validate_inner().map_err(|err| {
            tracing::debug!(error = %err, "connection settings failed validation");
            Error::Validation(err)
        })
    }

    fn validate_inner(&mut self) -> std::result::Result<(), ValidationError> {
        if !self.sock.is_empty() && !self.host.is_empty() && self.host != "localhost" {
            return Err(ValidationError::new("with sock=, host must be 'localhost'"));
        }

        let Some(level) = binary_level(&self.binary) else {
            return Err(ValidationError::new("invalid value for parameter 'binary'"));
        };

        if !self.sock.is_empty() && self.tls {
            return Err(ValidationError::new(
                "TLS cannot be used with Unix domain sockets",
            ));
        }

        let (certhash_algo, certhash_digits) = self.checked_certhash()?;

        if (!self.cert.is_empty() || !self.certhash.is_empty()) && !self.tls {
            return Err(ValidationError::new(
                "'cert' and 'certhash' can only be used with monetdbs:",
            ));
        }

        if !valid_identifier(&self.database) {
            return Err(ValidationError::new("invalid database name"));
        }
        if !valid_identifier(&self.tableschema) {
            return Err(ValidationError::new("invalid schema name"));
        }
        if !valid_identifier(&self.table) {
            return Err(ValidationError::new("invalid table name"));
        }

        if self.port != -1 && !(1..=65535).contains(&self.port) {
            return Err(ValidationError::new("invalid port"));
        }

        self.unix_sock_name = format!("/tmp/.s.monetdb.{}", self.connect_port());
        self.certhash_algo = certhash_algo;
        self.certhash_digits = certhash_digits;
        self.binary_level = level;
        self.validated = true;
        Ok(())
    }

    fn checked_certhash(
        &self,
    ) -> std::result::Result<(CerthashAlgorithm, String), ValidationError> {
        if self.certhash.is_empty() {
            return Ok((CerthashAlgorithm::default(), String::new()));
        }
        let Some(captures) = certhash_pattern().captures(&self.certhash) else {
            return Err(ValidationError::new("invalid certhash"));
        };
        let algo = match captures.get(1).map(|m| m.as_str()) {
            Some("sha256") => CerthashAlgorithm::Sha256,
            _ => CerthashAlgorithm::Sha1,
        };
        let digits: String = captures[2]
            .chars()
            .filter(|c| *c != ':')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if digits.is_empty() {
            return Err(ValidationError::new("certhash: need at least one digit"));
        }
        Ok((algo, digits))
    }

    /// The effective Unix domain socket path, or the empty string when the
    /// connection should not use one.
    ///
    /// An explicit `sock` wins; otherwise a local socket is only derived
    /// (from the effective port) when TLS is off and `host` is empty or
    /// `localhost`.
    ///
    /// # Panics
    ///
    /// Panics when the store has not been validated since its last
    /// mutation; reading derived values from an unvalidated store is a
    /// contract violation.
    #[must_use]
    pub fn connect_unix_sock(&self) -> &str {
        assert!(self.validated, "derived parameter read before validate()");
        if !self.sock.is_empty() {
            return &self.sock;
        }
        if self.tls {
            return "";
        }
        if self.host.is_empty() || self.host == "localhost" {
            return &self.unix_sock_name;
        }
        ""
    }

    /// The effective TCP host to dial, or the empty string when the
    /// connection goes over a Unix domain socket.
    ///
    /// An empty `host` and the trailing-dot alias `localhost.` both map to
    /// `localhost`.
    ///
    /// # Panics
    ///
    /// Panics when the store has not been validated since its last
    /// mutation.
    #[must_use]
    pub fn connect_tcp_host(&self) -> &str {
        assert!(self.validated, "derived parameter read before validate()");
        if !self.sock.is_empty() {
            return "";
        }
        if self.host.is_empty() || self.host == "localhost." {
            return "localhost";
        }
        &self.host
    }

    /// The TCP port to dial: the `port` parameter, or 50000 when unset.
    #[must_use]
    pub fn connect_port(&self) -> i64 {
        if self.port == -1 { 50000 } else { self.port }
    }

    /// How the peer's TLS certificate should be verified.
    ///
    /// # Panics
    ///
    /// Panics when the store has not been validated since its last
    /// mutation.
    #[must_use]
    pub fn connect_tls_verify(&self) -> TlsVerify {
        assert!(self.validated, "derived parameter read before validate()");
        if !self.tls {
            TlsVerify::Off
        } else if !self.certhash.is_empty() {
            TlsVerify::Hash
        } else if !self.cert.is_empty() {
            TlsVerify::Cert
        } else {
            TlsVerify::System
        }
    }

    /// The digest algorithm of the pinned certificate hash, defaulting to
    /// sha1 when `certhash` carries no tag or is unset.
    ///
    /// # Panics
    ///
    /// Panics when the store has not been validated since its last
    /// mutation.
    #[must_use]
    pub fn connect_certhash_algorithm(&self) -> CerthashAlgorithm {
        assert!(self.validated, "derived parameter read before validate()");
        self.certhash_algo
    }

    /// The pinned certificate digest as lowercase hex digits with the
    /// colons stripped, or the empty string when `certhash` is unset.
    ///
    /// # Panics
    ///
    /// Panics when the store has not been validated since its last
    /// mutation.
    #[must_use]
    pub fn connect_certhash_digits(&self) -> &str {
        assert!(self.validated, "derived parameter read before validate()");
        &self.certhash_digits
    }

    /// The negotiated binary result-set level: 0 when `binary` is false, a
    /// large sentinel when true, or the literal non-negative level.
    ///
    /// # Panics
    ///
    /// Panics when the store has not been validated since its last
    /// mutation.
    #[must_use]
    pub fn connect_binary(&self) -> i64 {
        assert!(self.validated, "derived parameter read before validate()");
        self.binary_level
    }

    /// Whether local socket discovery applies: a database is named but
    /// sock, host, port and tls are all at their defaults.
    #[must_use]
    pub fn connect_scan(&self) -> bool {
        !self.database.is_empty()
            && self.sock.is_empty()
            && self.host.is_empty()
            && self.port == -1
            && !self.tls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BoolParameter, IntParameter, StrParameter};

    fn validation_err(settings: &mut Settings) -> String {
        let err = settings.validate().unwrap_err();
        assert!(!settings.is_valid());
        err.to_string()
    }

    #[test]
    fn test_defaults_validate() {
        let mut settings = Settings::new();
        settings.validate().unwrap();
        assert!(settings.is_valid());
        assert_eq!(settings.connect_tcp_host(), "localhost");
        assert_eq!(settings.connect_port(), 50000);
        assert_eq!(settings.connect_unix_sock(), "/tmp/.s.monetdb.50000");
        assert_eq!(settings.connect_tls_verify(), TlsVerify::Off);
        assert_eq!(settings.connect_certhash_algorithm(), CerthashAlgorithm::Sha1);
        assert_eq!(settings.connect_certhash_digits(), "");
        assert_eq!(settings.connect_binary(), 65535); // default "on"
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut settings = Settings::new();
        settings.validate().unwrap();
        settings.validate().unwrap();
        assert!(settings.is_valid());

        settings.set_str(StrParameter::Binary, "nonsense");
        let first = validation_err(&mut settings);
        let second = validation_err(&mut settings);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sock_host_conflict() {
        let mut settings = Settings::new();
        settings.set_str(StrParameter::Sock, "/tmp/x");
        settings.set_str(StrParameter::Host, "example.com");
        assert_eq!(
            validation_err(&mut settings),
            "with sock=, host must be 'localhost'"
        );

        // localhost is the one host that may accompany sock
        settings.set_str(StrParameter::Host, "localhost");
        settings.validate().unwrap();
        assert_eq!(settings.connect_unix_sock(), "/tmp/x");
        assert_eq!(settings.connect_tcp_host(), "");
    }

    #[test]
    fn test_sock_requires_plain_tcp() {
        let mut settings = Settings::new();
        settings.set_str(StrParameter::Sock, "/tmp/x");
        settings.set_bool(BoolParameter::Tls, true);
        assert_eq!(
            validation_err(&mut settings),
            "TLS cannot be used with Unix domain sockets"
        );
    }

    #[test]
    fn test_binary_levels() {
        let cases = [("on", 65535), ("true", 65535), ("off", 0), ("no", 0), ("5", 5), ("0", 0)];
        for (text, level) in cases {
            let mut settings = Settings::new();
            settings.set_str(StrParameter::Binary, text);
            settings.validate().unwrap();
            assert_eq!(settings.connect_binary(), level, "binary={text}");
        }

        for text in ["", "-1", "maybe", "5x"] {
            let mut settings = Settings::new();
            settings.set_str(StrParameter::Binary, text);
            assert_eq!(
                validation_err(&mut settings),
                "invalid value for parameter 'binary'",
                "binary={text}"
            );
        }
    }

    #[test]
    fn test_certhash_tagged_sha256() {
        let mut settings = Settings::new();
        settings.set_bool(BoolParameter::Tls, true);
        settings.set_str(StrParameter::CertHash, "{sha256}AA:BB:cc");
        settings.validate().unwrap();
        assert_eq!(settings.connect_certhash_algorithm(), CerthashAlgorithm::Sha256);
        assert_eq!(settings.connect_certhash_digits(), "aabbcc");
        assert_eq!(settings.connect_tls_verify(), TlsVerify::Hash);
    }

    #[test]
    fn test_certhash_default_algorithm_is_sha1() {
        for certhash in ["deadbeef", "{sha1}deadbeef"] {
            let mut settings = Settings::new();
            settings.set_bool(BoolParameter::Tls, true);
            settings.set_str(StrParameter::CertHash, certhash);
            settings.validate().unwrap();
            assert_eq!(settings.connect_certhash_algorithm(), CerthashAlgorithm::Sha1);
            assert_eq!(settings.connect_certhash_digits(), "deadbeef");
        }
    }

    #[test]
    fn test_certhash_rejected() {
        let bad = [
            "{md5}aabb",     // unknown algorithm
            "{SHA256}aabb",  // tag is lowercase only
            "xyz",           // not hex
            "aa bb",         // no spaces
            "{sha256}",      // digits missing
            "::",            // colons but no digit
        ];
        for certhash in bad {
            let mut settings = Settings::new();
            settings.set_bool(BoolParameter::Tls, true);
            settings.set_str(StrParameter::CertHash, certhash);
            let msg = validation_err(&mut settings);
            assert!(msg.contains("certhash"), "{certhash}: {msg}");
        }

        // digest buffer capacity is fixed
        let mut settings = Settings::new();
        settings.set_bool(BoolParameter::Tls, true);
        settings.set_str(StrParameter::CertHash, "a".repeat(65));
        assert_eq!(validation_err(&mut settings), "invalid certhash");
    }

    #[test]
    fn test_cert_requires_tls() {
        let mut settings = Settings::new();
        settings.set_str(StrParameter::Cert, "/path/to/cert");
        assert_eq!(
            validation_err(&mut settings),
            "'cert' and 'certhash' can only be used with monetdbs:"
        );

        settings.set_bool(BoolParameter::Tls, true);
        settings.validate().unwrap();
        assert_eq!(settings.connect_tls_verify(), TlsVerify::Cert);
    }

    #[test]
    fn test_certhash_requires_tls() {
        let mut settings = Settings::new();
        settings.set_str(StrParameter::CertHash, "{sha256}aabb");
        assert_eq!(
            validation_err(&mut settings),
            "'cert' and 'certhash' can only be used with monetdbs:"
        );
    }

    #[test]
    fn test_tls_verify_system_default() {
        let mut settings = Settings::new();
        settings.set_bool(BoolParameter::Tls, true);
        settings.validate().unwrap();
        assert_eq!(settings.connect_tls_verify(), TlsVerify::System);
        assert_eq!(settings.connect_tls_verify().as_str(), "system");
        // TLS suppresses the derived local socket
        assert_eq!(settings.connect_unix_sock(), "");
    }

    #[test]
    fn test_identifier_rules() {
        let fields = [
            (StrParameter::Database, "invalid database name"),
            (StrParameter::TableSchema, "invalid schema name"),
            (StrParameter::Table, "invalid table name"),
        ];
        for (parm, message) in fields {
            for value in ["-bad", "9bad", "has space", "semi;colon"] {
                let mut settings = Settings::new();
                settings.set_str(parm, value);
                assert_eq!(validation_err(&mut settings), message, "{value}");
            }
            for value in ["", "good", "_ok", "a-b_c9", "X"] {
                let mut settings = Settings::new();
                settings.set_str(parm, value);
                settings.validate().unwrap();
            }
        }
    }

    #[test]
    fn test_port_range() {
        for port in [1, 80, 50000, 65535, -1] {
            let mut settings = Settings::new();
            settings.set_long(IntParameter::Port, port);
            settings.validate().unwrap();
        }
        for port in [0, -2, 65536, 1_000_000] {
            let mut settings = Settings::new();
            settings.set_long(IntParameter::Port, port);
            assert_eq!(validation_err(&mut settings), "invalid port");
        }
    }

    #[test]
    fn test_unix_sock_follows_effective_port() {
        let mut settings = Settings::new();
        settings.set_long(IntParameter::Port, 12345);
        settings.validate().unwrap();
        assert_eq!(settings.connect_unix_sock(), "/tmp/.s.monetdb.12345");
        assert_eq!(settings.connect_port(), 12345);

        // a remote host means no local socket
        settings.set_str(StrParameter::Host, "db.example.com");
        settings.validate().unwrap();
        assert_eq!(settings.connect_unix_sock(), "");
        assert_eq!(settings.connect_tcp_host(), "db.example.com");
    }

    #[test]
    fn test_tcp_host_localhost_aliases() {
        let cases = [("", "localhost"), ("localhost", "localhost"), ("localhost.", "localhost")];
        for (host, expected) in cases {
            let mut settings = Settings::new();
            settings.set_str(StrParameter::Host, host);
            settings.validate().unwrap();
            assert_eq!(settings.connect_tcp_host(), expected, "host={host:?}");
        }

        // only the exact alias maps; other dotted names stay verbatim
        let mut settings = Settings::new();
        settings.set_str(StrParameter::Host, "localhost.localdomain");
        settings.validate().unwrap();
        assert_eq!(settings.connect_tcp_host(), "localhost.localdomain");
        assert_eq!(settings.connect_unix_sock(), "");
    }

    #[test]
    fn test_connect_scan() {
        let mut settings = Settings::new();
        assert!(!settings.connect_scan()); // no database yet
        settings.set_str(StrParameter::Database, "demo");
        assert!(settings.connect_scan());

        let mut other = settings.clone();
        other.set_str(StrParameter::Host, "localhost");
        assert!(!other.connect_scan());

        let mut other = settings.clone();
        other.set_long(IntParameter::Port, 50000);
        assert!(!other.connect_scan());

        let mut other = settings.clone();
        other.set_bool(BoolParameter::Tls, true);
        assert!(!other.connect_scan());

        let mut other = settings.clone();
        other.set_str(StrParameter::Sock, "/tmp/x");
        assert!(!other.connect_scan());
    }

    #[test]
    #[should_panic(expected = "derived parameter read before validate()")]
    fn test_derived_read_requires_validation() {
        let settings = Settings::new();
        let _ = settings.connect_unix_sock();
    }

    #[test]
    #[should_panic(expected = "derived parameter read before validate()")]
    fn test_derived_read_stale_after_mutation() {
        let mut settings = Settings::new();
        settings.validate().unwrap();
        settings.set_str(StrParameter::Host, "example.com");
        let _ = settings.connect_tcp_host();
    }
}
