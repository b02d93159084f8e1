//! The connection URL parser.
//!
//! Grammar: `scheme ":" "//" host [":" port] ["/" database] ["?" query]
//! ["#" fragment]`, where `scheme` is `monetdb` (plain) or `monetdbs`
//! (TLS). The legacy `mapi:monetdb://` form is recognized and rejected as
//! unsupported. The host may be a bracketed IPv6-style literal or a bare
//! (percent-encoded) name; `/database` and `?query` are independently
//! optional; anything after `#` is ignored.

use crate::catalog::{BoolParameter, IntParameter, Parameter, StrParameter};
use crate::error::{Error, ParseError, Result, ValueErrorKind};
use crate::scan::{CharClass, Scanner, percent_decode};
use crate::settings::Settings;

impl Settings {
    /// Parse a connection URL into this store.
    ///
    /// The four core transport fields (tls, host, port, database) are
    /// reset to their defaults first, so re-parsing a new URL never leaks
    /// state from a previous one. Other fields written by the previous URL
    /// (for example query parameters) are left alone.
    ///
    /// On failure the error carries the first problem encountered; the
    /// store may hold a partial mix of old and new fields but is never
    /// marked valid.
    pub fn parse_url(&mut self, url: &str) -> Result<()> {
        self.set_bool(BoolParameter::Tls, false);
        self.set_str(StrParameter::Host, "");
        self.set_long(IntParameter::Port, -1);
        self.set_str(StrParameter::Database, "");

        let mut sc = Scanner::new(url);
        match parse(self, &mut sc) {
            Ok(()) => {
                tracing::debug!(url, "parsed connection URL");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(url, error = %err, "rejected connection URL");
                Err(err.into())
            }
        }
    }
}

fn parse(settings: &mut Settings, sc: &mut Scanner<'_>) -> std::result::Result<(), ParseError> {
    let scheme = sc.scan(CharClass::GenericSpecial);
    if sc.peek() == Some(b':') {
        sc.advance();
    } else {
        return Err(ParseError::new(
            "expected URL starting with monetdb:, monetdbs: or mapi:monetdb:",
        ));
    }
    match scheme {
        "monetdb" => {
            settings.set_bool(BoolParameter::Tls, false);
            parse_modern(settings, sc)
        }
        "monetdbs" => {
            settings.set_bool(BoolParameter::Tls, true);
            parse_modern(settings, sc)
        }
        "mapi" => parse_classic(sc),
        _ => Err(ParseError::new(format!("unknown scheme '{scheme}'"))),
    }
}

// The mapi:monetdb:// sub-scheme is a permanent non-goal: recognize it,
// then reject it with a dedicated message.
fn parse_classic(sc: &mut Scanner<'_>) -> std::result::Result<(), ParseError> {
    sc.consume("monetdb://")?;
    Err(ParseError::new("mapi: URLs are not supported yet"))
}

fn parse_modern(settings: &mut Settings, sc: &mut Scanner<'_>) -> std::result::Result<(), ParseError> {
    sc.consume("//")?;

    // parse the host
    if sc.peek() == Some(b'[') {
        sc.advance();
        // bracketed literal: hex digits and colons, stored verbatim
        let host = sc.scan_while(|c| c == b':' || c.is_ascii_hexdigit());
        sc.consume("]")?;
        store(settings, StrParameter::Host.into(), host)?;
    } else {
        let token = sc.scan(CharClass::GenericSpecial);
        let host = percent_decode(token, "host name")?;
        if host.is_empty() && sc.peek() == Some(b':') {
            // a port number without a host is not allowed: monetdb://:50000
            return Err(sc.unexpected());
        }
        store(settings, StrParameter::Host.into(), &host)?;
    }

    // parse the port
    if sc.peek() == Some(b':') {
        sc.advance();
        let port = sc.scan(CharClass::GenericSpecial);
        store(settings, IntParameter::Port.into(), port)?;
    }

    // parse the database name
    if sc.peek() == Some(b'/') {
        sc.advance();
        let token = sc.scan(CharClass::GenericSpecial);
        let database = percent_decode(token, "database name")?;
        store(settings, StrParameter::Database.into(), &database)?;
    }

    // parse query parameters
    if sc.peek() == Some(b'?') {
        loop {
            sc.advance();
            let token = sc.scan(CharClass::VerySpecial);
            if token.is_empty() {
                return Err(ParseError::new("parameter name must not be empty"));
            }
            let key = percent_decode(token, "parameter name")?;
            sc.consume("=")?;
            let token = sc.scan(CharClass::VerySpecial);
            let value = percent_decode(token, &key)?;
            // core parameters are legitimate in a URL
            match settings.set_named(&key, &value, true) {
                Ok(()) => {}
                Err(Error::Value(err)) if err.kind == ValueErrorKind::UnknownParameter => {
                    return Err(ParseError::new(err.message));
                }
                Err(err) => {
                    return Err(ParseError::new(format!(
                        "cannot set {key} to '{value}': {err}"
                    )));
                }
            }
            if sc.peek() != Some(b'&') {
                break;
            }
        }
    }

    // should have consumed everything except an ignored fragment
    match sc.peek() {
        None | Some(b'#') => Ok(()),
        Some(_) => Err(sc.unexpected()),
    }
}

fn store(
    settings: &mut Settings,
    parm: Parameter,
    value: &str,
) -> std::result::Result<(), ParseError> {
    settings.set_from_text(parm, value).map_err(|err| {
        ParseError::new(format!("cannot set {} to '{}': {}", parm.name(), value, err))
    })
}
