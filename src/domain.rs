//! src/domain.rs
//!
//! Consolidates the core data structures of the location federation: the
//! signed geographic location string, the per-client report it is wrapped
//! in, and the monotonic-freshness skew arithmetic that both `IAMAT` and
//! `WHATSAT` rely on.

use std::fmt;

/// A client report as stored in the [`crate::registry::Registry`].
///
/// `origin_server`, `ts_sent`, and `location` always come from the same
/// inbound message — never from a merge of two reports (§3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientReport {
    pub location: Location,
    pub ts_sent: Timestamp,
    pub ts_received: Timestamp,
    pub origin_server: String,
}

/// A decimal-seconds-since-epoch timestamp, carried as text on the wire and
/// compared as a number. The textual form is preserved verbatim so it can be
/// echoed back byte-for-byte in responses and forwarded gossip lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the textual form as `f64` for comparison purposes. A
    /// malformed numeral parses as `NaN`, which compares false against
    /// everything and so is conservatively treated as never newer.
    fn as_f64(&self) -> f64 {
        self.0.parse().unwrap_or(f64::NAN)
    }

    /// True if `self` is strictly greater than `other` as a decimal number.
    pub fn is_strictly_after(&self, other: &Timestamp) -> bool {
        self.as_f64() > other.as_f64()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `±LAT±LON` location string (§4.1). The wire text is kept verbatim and
/// is the only thing stored — `as_places_center` slices the literal
/// `lat`/`lon` substrings back out of it rather than round-tripping through
/// a parsed `f64`, which would silently renormalize a value like
/// `+34.068930` to `34.06893` (trailing zero dropped) before it ever
/// reaches the Places provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location(String);

impl Location {
    /// Builds a `Location` from wire text with no validation at all. Used
    /// for `UPDATE`'s location field, which §4.1's arity table does not
    /// require to be well-formed.
    pub fn from_wire(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Parses and validates a `±LAT±LON` token per §4.1, for `IAMAT`:
    /// exactly two sign characters, the first at position 0, the second not
    /// the final character; the two halves each parse as a decimal within
    /// their respective ranges.
    pub fn parse(token: &str) -> Option<Self> {
        let (lat_str, lon_str) = split_signs(token)?;
        let lat: f64 = lat_str.parse().ok()?;
        let lon: f64 = lon_str.parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `"lat,lon"` with leading `+` stripped from each half, as required by
    /// the Places adapter's `location` query parameter (§4.4, §4.6). Slices
    /// the stored text directly rather than reformatting a parsed `f64`
    /// (§9). Returns `None` if the stored text isn't even sign-shaped,
    /// which can only happen for an `UPDATE`-sourced location that was
    /// never validated (§4.1).
    pub fn as_places_center(&self) -> Option<String> {
        let (lat_str, lon_str) = split_signs(&self.0)?;
        Some(format!("{},{}", strip_leading_plus(lat_str), strip_leading_plus(lon_str)))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a `±LAT±LON` token into its literal `lat`/`lon` substrings
/// (sign-shape only, no numeric validation) the way
/// `examples/original_source/server.py`'s `parse_location` does.
fn split_signs(token: &str) -> Option<(&str, &str)> {
    let sign_positions: Vec<usize> = token
        .char_indices()
        .filter(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .collect();

    if sign_positions.len() != 2 {
        return None;
    }
    let (first, second) = (sign_positions[0], sign_positions[1]);
    if first != 0 || second == token.len() - 1 {
        return None;
    }

    Some((&token[first..second], &token[second..]))
}

fn strip_leading_plus(value: &str) -> &str {
    value.strip_prefix('+').unwrap_or(value)
}

/// Computes `ts_received - ts_sent` and formats it in plain (non-exponential)
/// decimal with an explicit leading sign, per the open question in §9: never
/// let a float's default formatting fall back to scientific notation.
pub fn format_skew(ts_received: &Timestamp, ts_sent: &Timestamp) -> String {
    let skew = ts_received.as_f64() - ts_sent.as_f64();
    if skew >= 0.0 {
        format!("+{skew}")
    } else {
        format!("{skew}")
    }
}

/// Wall-clock time as a decimal-seconds [`Timestamp`], full precision.
pub fn now_timestamp() -> Timestamp {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch");
    Timestamp::new(format!("{}", duration.as_secs_f64()))
}
