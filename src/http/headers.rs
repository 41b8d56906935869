use std::collections::HashMap;
use thiserror::Error;

/// Characters allowed in a header field name besides ASCII letters and digits.
const NAME_SYMBOLS: &[u8] = b"!#$%&'*+-.^_`|~";

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    #[error("found no colon while parsing header line")]
    NoColon,
    #[error("found no field name while parsing header line")]
    NoFieldName,
    #[error("whitespace between field name and colon")]
    SpaceBeforeColon,
    #[error("invalid character in header field name")]
    InvalidCharInName,
    #[error("invalid field name used for header lookup")]
    InvalidFieldName,
    #[error("header not found")]
    NotFound,
}

/// Case-insensitive header collection.
///
/// All stored keys are lowercase. Setting a name that is already present
/// merges the values with a `", "` separator, preserving the order in
/// which the duplicates were observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Case-insensitive lookup.
    ///
    /// Fails only when `name` contains characters outside the header
    /// field-name charset; a missing header is `Ok(None)`.
    pub fn get(&self, name: &str) -> Result<Option<&str>, HeaderError> {
        if !is_valid_field_name(name.as_bytes()) {
            return Err(HeaderError::InvalidFieldName);
        }
        Ok(self.map.get(&name.to_ascii_lowercase()).map(|v| v.as_str()))
    }

    /// Inserts a header, merging with `", "` if the name is already present.
    ///
    /// `set` trusts the caller to pass a valid field name and a trimmed
    /// value; server-generated headers go through this path.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.map.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                self.map.insert(name, value.to_string());
            }
        }
    }

    /// Overwrites an existing header value.
    ///
    /// Unlike `set` this never merges; it fails with `NotFound` when the
    /// header is absent.
    pub fn replace(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        if self.get(name)?.is_none() {
            return Err(HeaderError::NotFound);
        }
        self.map
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    /// Parses at most one header line from `data`.
    ///
    /// Returns `(consumed, done)`. Call repeatedly against a growing
    /// buffer: `(0, false)` means more data is needed, `(2, true)` means
    /// the blank header/body separator line was reached.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let Some(end_idx) = data.windows(CRLF.len()).position(|w| w == CRLF) else {
            // no CRLF yet, need more data
            return Ok((0, false));
        };

        let line = &data[..end_idx];

        // empty line means no more headers to parse
        if line.is_empty() {
            return Ok((CRLF.len(), true));
        }

        let colon_idx = match line.iter().position(|&b| b == b':') {
            None => return Err(HeaderError::NoColon),
            Some(0) => return Err(HeaderError::NoFieldName),
            Some(idx) => idx,
        };

        if line[colon_idx - 1].is_ascii_whitespace() {
            return Err(HeaderError::SpaceBeforeColon);
        }

        // leading whitespace before the field name is allowed and trimmed,
        // but the name itself must not contain spaces
        let name = line[..colon_idx].trim_ascii();
        if name.is_empty() {
            return Err(HeaderError::NoFieldName);
        }
        if !is_valid_field_name(name) {
            return Err(HeaderError::InvalidCharInName);
        }

        let value = line[colon_idx + 1..].trim_ascii();

        let name = String::from_utf8_lossy(name).to_ascii_lowercase();
        let value = String::from_utf8_lossy(value).to_string();
        self.set(&name, &value);

        // done stays false on a valid header line; there may be more to parse
        Ok((end_idx + CRLF.len(), false))
    }
}

fn is_valid_field_name(name: &[u8]) -> bool {
    name.iter()
        .all(|&b| b.is_ascii_alphanumeric() || NAME_SYMBOLS.contains(&b))
}
