// Dweve NCL - Nested Context Language document model
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value types for NCL attributes.
//!
//! Every type here owns the validation of its literal syntax: construction
//! either yields a well-formed value or an [`NclError`], so an invalid value
//! never reaches the element tree. `Display` renders the canonical literal,
//! which parses back to an equal value.

use crate::error::{NclError, NclResult};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// An element identifier following the NCL name grammar.
///
/// Non-empty; the first character is a letter or `_`; the remaining
/// characters are letters, digits, `_`, `-` or `.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identifier(String);

impl Identifier {
    /// Validate and wrap an identifier.
    pub fn new(id: impl Into<String>) -> NclResult<Self> {
        let id = id.into();
        if is_valid_identifier(&id) {
            Ok(Self(id))
        } else {
            Err(NclError::invalid_identifier(format!(
                "invalid identifier '{}'",
                id
            )))
        }
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_identifier(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = NclError;

    fn from_str(s: &str) -> NclResult<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A non-empty attribute string (labels, anchor text, names, values).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text(String);

impl Text {
    pub fn new(text: impl Into<String>) -> NclResult<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(NclError::empty_string("empty string value"));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Text {
    type Err = NclError;

    fn from_str(s: &str) -> NclResult<Self> {
        Self::new(s)
    }
}

/// Parse an unsigned decimal literal (`12`, `2.5`). Signs, exponents and
/// special values are rejected.
fn parse_decimal(s: &str) -> Option<f64> {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') {
        return None;
    }
    if !s.chars().all(|c| c.is_ascii_digit() || c == '.') || s.matches('.').count() > 1 {
        return None;
    }
    s.parse().ok()
}

fn parse_unsigned(s: &str) -> Option<u64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// A time point: either plain seconds (`12.5s`) or a clock value
/// (`hours:minutes:seconds`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeValue {
    Seconds(f64),
    Clock { hours: u32, minutes: u32, seconds: f64 },
}

impl TimeValue {
    /// Total duration in seconds.
    pub fn as_seconds(&self) -> f64 {
        match *self {
            Self::Seconds(s) => s,
            Self::Clock {
                hours,
                minutes,
                seconds,
            } => f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds,
        }
    }
}

impl FromStr for TimeValue {
    type Err = NclError;

    fn from_str(s: &str) -> NclResult<Self> {
        let invalid = || NclError::invalid_time(format!("invalid time value '{}'", s));

        if let Some(secs) = s.strip_suffix('s') {
            return parse_decimal(secs).map(Self::Seconds).ok_or_else(invalid);
        }

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let hours = parse_unsigned(parts[0])
            .and_then(|h| u32::try_from(h).ok())
            .ok_or_else(invalid)?;
        let minutes = parse_unsigned(parts[1])
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| *m < 60)
            .ok_or_else(invalid)?;
        let seconds = parse_decimal(parts[2])
            .filter(|s| *s < 60.0)
            .ok_or_else(invalid)?;

        Ok(Self::Clock {
            hours,
            minutes,
            seconds,
        })
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Seconds(s) => write!(f, "{}s", s),
            Self::Clock {
                hours,
                minutes,
                seconds,
            } => {
                let pad = if seconds < 10.0 { "0" } else { "" };
                write!(f, "{:02}:{:02}:{}{}", hours, minutes, pad, seconds)
            }
        }
    }
}

/// A media sample offset: samples (`30s`), frames (`24f`) or normal play
/// time (`1.5npt`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleValue {
    Samples(u64),
    Frames(u64),
    Npt(f64),
}

impl FromStr for SampleValue {
    type Err = NclError;

    fn from_str(s: &str) -> NclResult<Self> {
        let invalid = || NclError::invalid_sample(format!("invalid sample value '{}'", s));

        if let Some(npt) = s.strip_suffix("npt") {
            parse_decimal(npt).map(Self::Npt).ok_or_else(invalid)
        } else if let Some(frames) = s.strip_suffix('f') {
            parse_unsigned(frames).map(Self::Frames).ok_or_else(invalid)
        } else if let Some(samples) = s.strip_suffix('s') {
            parse_unsigned(samples).map(Self::Samples).ok_or_else(invalid)
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Samples(n) => write!(f, "{}s", n),
            Self::Frames(n) => write!(f, "{}f", n),
            Self::Npt(t) => write!(f, "{}npt", t),
        }
    }
}

/// One entry of a coordinate list.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Coord {
    Pixels(u32),
    Percent(f64),
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pixels(n) => write!(f, "{}", n),
            Self::Percent(p) => write!(f, "{}%", p),
        }
    }
}

/// Spatial anchor coordinates, `x1,y1,x2,y2,...`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coords(Vec<Coord>);

impl Coords {
    pub fn new(coords: Vec<Coord>) -> NclResult<Self> {
        if coords.is_empty() {
            return Err(NclError::invalid_coords("empty coordinate list"));
        }
        Ok(Self(coords))
    }

    pub fn as_slice(&self) -> &[Coord] {
        &self.0
    }
}

impl FromStr for Coords {
    type Err = NclError;

    fn from_str(s: &str) -> NclResult<Self> {
        let coords = s
            .split(',')
            .map(|item| {
                let item = item.trim();
                let coord = match item.strip_suffix('%') {
                    Some(p) => parse_decimal(p).map(Coord::Percent),
                    None => parse_unsigned(item)
                        .and_then(|n| u32::try_from(n).ok())
                        .map(Coord::Pixels),
                };
                coord.ok_or_else(|| {
                    NclError::invalid_coords(format!("invalid coordinate '{}' in '{}'", item, s))
                })
            })
            .collect::<NclResult<Vec<_>>>()?;
        Self::new(coords)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coord) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", coord)?;
        }
        Ok(())
    }
}

/// Comparison operator of a presentation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Comparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
        }
    }
}

impl FromStr for Comparator {
    type Err = NclError;

    fn from_str(s: &str) -> NclResult<Self> {
        match s {
            "eq" => Ok(Self::Eq),
            "ne" => Ok(Self::Ne),
            "gt" => Ok(Self::Gt),
            "lt" => Ok(Self::Lt),
            "gte" => Ok(Self::Gte),
            "lte" => Ok(Self::Lte),
            _ => Err(NclError::invalid_comparator(format!(
                "invalid comparator '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a text-anchor position. Negative values are rejected.
pub fn parse_position(s: &str) -> NclResult<u32> {
    let value: i64 = s
        .trim()
        .parse()
        .map_err(|_| NclError::invalid_number(format!("invalid position '{}'", s)))?;
    if value < 0 {
        return Err(NclError::negative_position(format!(
            "invalid position {}",
            value
        )));
    }
    u32::try_from(value)
        .map_err(|_| NclError::invalid_number(format!("position {} out of range", value)))
}
