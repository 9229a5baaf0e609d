//! Line-oriented tree grammar descriptor.
//!
//! ```text
//! # comment
//! name Basic
//! axiom A
//! angle 22.5
//! generations 5
//! mode uniform
//! rule A [&FL!A]/////[&FL!A]///////[&FL!A]
//! rule F S/////F
//! rule F F 0.25
//! ```
//!
//! Tokens are whitespace separated. `angle` is in degrees. A `rule` line is
//! `rule <symbol> <replacement> [weight]`; repeating a symbol adds another
//! production. A malformed number is an error, never a default. Lines whose
//! first non-blank character is `#` are comments; elsewhere `#` is an ordinary
//! symbol.

use std::path::Path;

use thiserror::Error;

use crate::lsystem::{RuleSet, SelectionMode};

/// Failure reading or parsing a grammar descriptor.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("could not read grammar file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: `{key}` needs a value")]
    MissingValue { line: usize, key: &'static str },
    #[error("line {line}: `{value}` is not a valid {field}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: rule symbol `{value}` must be a single character")]
    InvalidSymbol { line: usize, value: String },
    #[error("line {line}: unknown selection mode `{value}`")]
    InvalidMode { line: usize, value: String },
}

impl RuleSet {
    /// Parse a descriptor. Unset scalars keep the [`RuleSet::empty`] defaults.
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        let mut set = RuleSet::empty();

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let content = raw.trim_start();
            if content.starts_with('#') {
                continue;
            }
            let mut tokens = content.split_whitespace();
            let Some(key) = tokens.next() else {
                continue;
            };

            match key {
                "name" => {
                    let name = tokens.collect::<Vec<_>>().join(" ");
                    if name.is_empty() {
                        return Err(GrammarError::MissingValue { line, key: "name" });
                    }
                    set.name = name;
                }
                "axiom" => {
                    let axiom = tokens.next().ok_or(GrammarError::MissingValue { line, key: "axiom" })?;
                    set.axiom = axiom.to_string();
                }
                "angle" => {
                    let value = tokens.next().ok_or(GrammarError::MissingValue { line, key: "angle" })?;
                    let degrees = parse_number::<f32>(value, line, "angle")?;
                    set.angle = degrees.to_radians();
                }
                "generations" => {
                    let value = tokens
                        .next()
                        .ok_or(GrammarError::MissingValue { line, key: "generations" })?;
                    set.generations = parse_number::<u32>(value, line, "generation count")?;
                }
                "mode" => {
                    let value = tokens.next().ok_or(GrammarError::MissingValue { line, key: "mode" })?;
                    set.mode = match value.to_ascii_lowercase().as_str() {
                        "uniform" => SelectionMode::Uniform,
                        "threshold" => SelectionMode::Threshold,
                        "weighted" => SelectionMode::Weighted,
                        _ => {
                            return Err(GrammarError::InvalidMode {
                                line,
                                value: value.to_string(),
                            })
                        }
                    };
                }
                "rule" => {
                    let symbol_token = tokens.next().ok_or(GrammarError::MissingValue { line, key: "rule" })?;
                    let mut chars = symbol_token.chars();
                    let symbol = match (chars.next(), chars.next()) {
                        (Some(c), None) => c,
                        _ => {
                            return Err(GrammarError::InvalidSymbol {
                                line,
                                value: symbol_token.to_string(),
                            })
                        }
                    };
                    let replacement = tokens.next().ok_or(GrammarError::MissingValue { line, key: "rule" })?;
                    let weight = match tokens.next() {
                        Some(w) => {
                            let weight = parse_number::<f32>(w, line, "rule weight")?;
                            if !weight.is_finite() || weight < 0.0 {
                                return Err(GrammarError::InvalidNumber {
                                    line,
                                    field: "rule weight",
                                    value: w.to_string(),
                                });
                            }
                            weight
                        }
                        None => 1.0,
                    };
                    set.add_production(symbol, replacement, weight);
                }
                other => log::warn!("grammar line {}: ignoring unknown key `{}`", line, other),
            }
        }

        let literals = set.literal_symbols();
        if !literals.is_empty() {
            log::debug!(
                "grammar '{}': symbols {:?} have no rule and no turtle meaning, copied as is",
                set.name,
                literals
            );
        }
        Ok(set)
    }

    /// Read and parse a descriptor file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Load a descriptor, falling back to [`RuleSet::basic`] on any failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(set) => {
                log::info!("Loaded tree grammar '{}' from {:?}", set.name, path);
                set
            }
            Err(e) => {
                log::warn!("Tree grammar {:?} unusable ({}), using built-in rules", path, e);
                Self::basic()
            }
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, line: usize, field: &'static str) -> Result<T, GrammarError> {
    value.parse().map_err(|_| GrammarError::InvalidNumber {
        line,
        field,
        value: value.to_string(),
    })
}
