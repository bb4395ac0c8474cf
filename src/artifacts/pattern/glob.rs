//! Source glob patterns
//!
//! `*` and `?` stay inside one path segment, `**` crosses directories
//! (`/**/` also matches a single `/`), `[abc]` and `[!abc]` are character
//! classes. Matching is case-sensitive and runs on canonical
//! [`ProjectPath`]s.

use crate::artifacts::paths::project_path::ProjectPath;
use crate::errors::{ConfigurationError, Result};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct SourceGlob {
    pattern: String,
    regex: Regex,
}

impl SourceGlob {
    pub fn compile(pattern: &str) -> Result<Self> {
        let pattern = ProjectPath::parse(pattern).as_str().to_string();
        let regex = Regex::new(&glob_to_regex(&pattern)).map_err(|error| {
            ConfigurationError::single(
                "",
                format!("invalid source pattern '{pattern}': {error}"),
            )
        })?;

        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, path: &ProjectPath) -> bool {
        self.regex.is_match(path.as_str())
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut regex = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let at_segment_start = i == 0 || chars[i - 1] == '/';
                let before_separator = chars.get(i + 2) == Some(&'/');

                if at_segment_start && before_separator {
                    regex.push_str("(?:[^/]+/)*");
                    i += 3;
                } else {
                    regex.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                regex.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                regex.push_str("[^/]");
                i += 1;
            }
            '[' => match character_class(&chars[i..]) {
                Some((class, consumed)) => {
                    regex.push_str(&class);
                    i += consumed;
                }
                None => {
                    regex.push_str(r"\[");
                    i += 1;
                }
            },
            c => {
                regex.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                i += 1;
            }
        }
    }

    regex.push('$');
    regex
}

/// Translates `[...]` starting at `chars[0]`; returns the regex class and the
/// number of glob characters consumed, or `None` if the bracket is unclosed.
fn character_class(chars: &[char]) -> Option<(String, usize)> {
    let mut i = 1;
    let mut class = String::from("[");

    if matches!(chars.get(i), Some('!') | Some('^')) {
        class.push('^');
        i += 1;
    }

    let body_start = i;
    while i < chars.len() {
        let c = chars[i];
        if c == ']' && i > body_start {
            class.push(']');
            return Some((class, i + 1));
        }
        if c == '/' {
            return None;
        }
        if c != '-' && c.is_ascii_punctuation() {
            class.push('\\');
        }
        class.push(c);
        i += 1;
    }

    None
}
