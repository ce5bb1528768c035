// Page body scanning
//
// The device exposes readings as numbered XML "pages" (`werte<N>.xml`).
// Each page is a flat, non-nested stream of identifier/value element
// pairs. A full XML parser buys nothing here -- a small token scanner
// over the two fixed tags covers the entire grammar.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A device variable identifier: the letter `v` followed by five digits
/// (e.g. `v00102`). Identifies one reading or settable parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(String);

impl VarId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for VarId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == 6
            && s.starts_with('v')
            && s[1..].bytes().all(|b| b.is_ascii_digit());
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(Error::InvalidVarId(s.to_owned()))
        }
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract every `(identifier, value)` pair from a page body.
///
/// The grammar is `<ID>vNNNNN</ID>` immediately followed by `<VA>...</VA>`,
/// with arbitrary whitespace between the two tags, repeated any number of
/// times. Surrounding markup (XML prolog, wrapper elements) is skipped.
///
/// A body with no pairs, or with an identifier that fails validation,
/// is rejected as [`Error::MalformedPage`] carrying the raw body -- the
/// caller logs it for diagnosis and writes nothing.
pub fn scan(body: &str) -> Result<Vec<(VarId, String)>, Error> {
    let mut pairs = Vec::new();
    let mut rest = body;

    while let Some(start) = rest.find("<ID>") {
        rest = &rest[start + 4..];
        let Some(id_end) = rest.find("</ID>") else {
            return Err(malformed(body));
        };
        let id_text = &rest[..id_end];
        rest = &rest[id_end + 5..];

        let id = VarId::from_str(id_text).map_err(|_| malformed(body))?;

        // Only whitespace may separate the identifier from its value.
        let after_ws = rest.trim_start();
        let Some(va_rest) = after_ws.strip_prefix("<VA>") else {
            return Err(malformed(body));
        };
        let Some(va_end) = va_rest.find("</VA>") else {
            return Err(malformed(body));
        };
        pairs.push((id, va_rest[..va_end].to_owned()));
        rest = &va_rest[va_end + 5..];
    }

    if pairs.is_empty() {
        return Err(malformed(body));
    }
    Ok(pairs)
}

fn malformed(body: &str) -> Error {
    Error::MalformedPage {
        body: body.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn var_id_accepts_canonical_form() {
        let id: VarId = "v00102".parse().unwrap();
        assert_eq!(id.as_str(), "v00102");
        assert_eq!(id.to_string(), "v00102");
    }

    #[test]
    fn var_id_rejects_bad_forms() {
        for bad in ["", "v123", "v123456", "x00102", "v0010a", "00102v"] {
            assert!(bad.parse::<VarId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn scans_single_pair() {
        let pairs = scan("<ID>v00001</ID><VA>23.5</VA>").unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.as_str(), "v00001");
        assert_eq!(pairs[0].1, "23.5");
    }

    #[test]
    fn scans_multiple_pairs_with_whitespace_and_wrapper() {
        let body = "<?xml version=\"1.0\"?><werte>\n\
                    <ID>v00104</ID>\n  <VA>18.2</VA>\n\
                    <ID>v00105</ID>\t<VA>21.0</VA>\n\
                    </werte>";
        let pairs = scan(body).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0.as_str(), "v00105");
        assert_eq!(pairs[1].1, "21.0");
    }

    #[test]
    fn empty_value_is_preserved() {
        let pairs = scan("<ID>v00303</ID><VA></VA>").unwrap();
        assert_eq!(pairs[0].1, "");
    }

    #[test]
    fn empty_body_is_malformed() {
        assert!(matches!(scan(""), Err(Error::MalformedPage { .. })));
    }

    #[test]
    fn body_without_pairs_is_malformed() {
        let res = scan("<html>login required</html>");
        assert!(matches!(res, Err(Error::MalformedPage { .. })));
    }

    #[test]
    fn bad_identifier_aborts_with_raw_body() {
        let body = "<ID>bogus</ID><VA>1</VA>";
        match scan(body) {
            Err(Error::MalformedPage { body: raw }) => assert_eq!(raw, body),
            other => panic!("expected MalformedPage, got {other:?}"),
        }
    }

    #[test]
    fn value_tag_must_follow_identifier() {
        let res = scan("<ID>v00001</ID><other/><VA>1</VA>");
        assert!(matches!(res, Err(Error::MalformedPage { .. })));
    }
}
