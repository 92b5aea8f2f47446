//! Header collection shared by [`Request`](crate::http::request::Request) and
//! [`ResponseWriter`](crate::http::response::ResponseWriter).
//!
//! Names are normalized to lower case on every access, so a collection never
//! holds two keys that differ only by case. Setting a name that is already
//! present appends `", " + value` to the stored value: repeated header lines
//! collapse into one comma-joined value. A value that itself contains `", "`
//! cannot be told apart from a repeated header afterwards; that loss is
//! accepted.
//!
//! Headers are stored in an ordered map to preserve insertion order, which
//! is also the order they are written back to the wire.

use indexmap::IndexMap;

use crate::error::ParseError;
use crate::http::{CRLF, find_crlf};

/// Symbols allowed in a header name besides ASCII letters and digits.
const TOKEN_SYMBOLS: &[u8] = b"!#$%&'*+-.^_`|~";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Headers {
    headers: IndexMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Stores `value`, or appends it to the existing value with `", "`.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.headers.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                self.headers.insert(name, value.to_string());
            }
        }
    }

    /// Value for `name`, or an empty string when absent.
    pub fn get(&self, name: &str) -> &str {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Overwrites whatever is stored for `name`.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn delete(&mut self, name: &str) {
        self.headers.shift_remove(&name.to_ascii_lowercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses at most one header line from the front of `buf`.
    ///
    /// Returns the number of bytes consumed and whether the blank line that
    /// ends the header section was reached. `(0, false)` means no complete
    /// line is buffered yet.
    pub fn parse_line(&mut self, buf: &[u8]) -> Result<(usize, bool), ParseError> {
        let line_end = match find_crlf(buf) {
            Some(idx) => idx,
            None => return Ok((0, false)),
        };

        if line_end == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = std::str::from_utf8(&buf[..line_end]).map_err(|_| ParseError::MalformedHeader)?;
        let (name, value) = line.split_once(':').ok_or(ParseError::MalformedHeader)?;

        // Only leading whitespace is tolerated before the name. Anything
        // between the name and the colon makes the line invalid.
        let name = name.trim_start_matches([' ', '\t']);
        if !is_valid_name(name) {
            return Err(ParseError::MalformedHeader);
        }

        let value = value.trim_matches([' ', '\t']);

        self.set(name, value);
        Ok((line_end + CRLF.len(), false))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || TOKEN_SYMBOLS.contains(&b))
}
