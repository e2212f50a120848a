// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

/// Flattens a configuration file into the dense stream the parser works on.
///
/// Full-line comments (`#`) are dropped. Directive lines (`%url ...`) are kept on their own line
/// with quotes removed. Every other line has its whitespace removed, except inside double-quoted
/// segments, and is appended without any separator.
pub fn normalize(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    for line in raw.split('\n') {
        let line = line.trim_start();
        if line.starts_with('#') {
            continue;
        }
        if line.starts_with('%') {
            text.extend(line.trim_end().chars().filter(|ch| *ch != '"'));
            text.push('\n');
            continue;
        }

        // Quote state does not carry over to the next line.
        let mut quoted = false;
        for ch in line.chars() {
            if ch == '"' {
                quoted = !quoted;
            }
            if quoted || !ch.is_whitespace() {
                text.push(ch);
            }
        }
    }
    text
}
