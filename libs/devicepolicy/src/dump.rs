// Copyright (C) 2025 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Dump
//!
//! Text helpers for diagnostic dumps: an indenting writer and renderers for
//! the ordered sets and maps held by the cache.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Write};

const DEFAULT_INDENT: &str = "  ";

/// A `fmt::Write` adapter that prefixes every line with the current indent.
pub struct IndentingWriter<W: Write> {
    inner: W,
    single_indent: &'static str,
    indent: String,
    at_line_start: bool,
}

impl<W: Write> IndentingWriter<W> {
    /// Wraps `inner` using two spaces per indentation level.
    pub fn new(inner: W) -> Self {
        Self::with_indent(inner, DEFAULT_INDENT)
    }

    /// Wraps `inner` using `single_indent` per indentation level.
    pub fn with_indent(inner: W, single_indent: &'static str) -> Self {
        Self { inner, single_indent, indent: String::new(), at_line_start: true }
    }

    /// Indents following lines by one more level.
    pub fn increase_indent(&mut self) {
        self.indent.push_str(self.single_indent);
    }

    /// Removes one indentation level. Does nothing at level zero.
    pub fn decrease_indent(&mut self) {
        let len = self.indent.len().saturating_sub(self.single_indent.len());
        self.indent.truncate(len);
    }

    /// Writes `line` followed by a newline.
    pub fn println(&mut self, line: impl Display) -> fmt::Result {
        writeln!(self, "{}", line)
    }

    /// Returns the wrapped sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for IndentingWriter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for chunk in s.split_inclusive('\n') {
            if self.at_line_start && chunk != "\n" {
                self.inner.write_str(&self.indent)?;
            }
            self.inner.write_str(chunk)?;
            self.at_line_start = chunk.ends_with('\n');
        }
        Ok(())
    }
}

/// Renders a set as `[a, b, c]`.
pub(crate) struct SetDisplay<'a, T>(pub &'a BTreeSet<T>);

impl<T: Display> Display for SetDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_char(']')
    }
}

/// Renders a map as `{k=v, k=v}`.
pub(crate) struct MapDisplay<'a, K, V>(pub &'a BTreeMap<K, V>);

impl<K: Display, V: Display> Display for MapDisplay<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_char('}')
    }
}
