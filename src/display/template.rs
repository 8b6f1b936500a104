/*
 *  display/template.rs
 *
 *  LyStats - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Line templates: literal text with {metric} substitutions
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::metrics::{MetricKey, MetricsSnapshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
    #[error("unclosed '{{' at byte {0}")]
    Unclosed(usize),
    #[error("unexpected '}}' at byte {0}")]
    UnexpectedClose(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Metric(MetricKey),
}

/// A parsed line template such as `"CPU: {cpu} | Temp: {temp}"`.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl LineTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, nc) in chars.by_ref() {
                        if nc == '}' {
                            closed = true;
                            break;
                        }
                        name.push(nc);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(pos));
                    }
                    let key = MetricKey::from_name(name.trim())
                        .ok_or_else(|| TemplateError::UnknownMetric(name.clone()))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Metric(key));
                }
                '}' => return Err(TemplateError::UnexpectedClose(pos)),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { source: source.to_string(), segments })
    }

    /// Render into a reusable buffer, clearing it first
    pub fn render_into(&self, snapshot: &MetricsSnapshot, out: &mut String) {
        out.clear();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Metric(key) => snapshot.write_value(*key, out),
            }
        }
    }

    pub fn render(&self, snapshot: &MetricsSnapshot) -> String {
        let mut out = String::new();
        self.render_into(snapshot, &mut out);
        out
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Metrics referenced, in order of appearance
    pub fn keys(&self) -> impl Iterator<Item = MetricKey> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Metric(k) => Some(*k),
            Segment::Literal(_) => None,
        })
    }

    /// True when the template has no substitutions
    pub fn is_constant(&self) -> bool {
        self.keys().next().is_none()
    }
}

impl FromStr for LineTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LineTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
