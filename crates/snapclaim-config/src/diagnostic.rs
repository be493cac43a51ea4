// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics.
//!
//! Figment errors become [`ConfigError`]s that point at the offending line
//! of the file they came from. An unknown key is matched against
//! [`SECTIONS`]: a close spelling in the same section is suggested, and a key
//! written under the wrong section is sent to the section that owns it.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Every config section and its keys, in file order.
pub const SECTIONS: &[(&str, &[&str])] = &[
    ("daemon", &["log_level"]),
    ("discord", &["token"]),
    (
        "claim",
        &[
            "button_labels",
            "button_label",
            "allowed_guild_ids",
            "allowed_channel_ids",
            "on_message",
            "on_edit",
        ],
    ),
    (
        "dispatch",
        &[
            "workers",
            "queue_capacity",
            "dedup_ttl_secs",
            "stats_interval_secs",
            "metrics_window",
        ],
    ),
    ("prometheus", &["enabled", "listen_address"]),
];

/// Jaro-Winkler score a key must exceed to be offered as a correction.
const SIMILARITY_THRESHOLD: f64 = 0.8;

/// A fix offered for an unknown key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// A similarly spelled key of the same section.
    Spelling(&'static str),
    /// The key exists verbatim in this other section.
    Section(&'static str),
}

/// A configuration error, renderable through miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_title(.section))]
    #[diagnostic(
        code(snapclaim::config::unknown_key),
        help("{}", unknown_key_help(section, key, suggestion.as_ref()))
    )]
    UnknownKey {
        /// Containing section; empty at the top level.
        section: String,
        key: String,
        suggestion: Option<Suggestion>,
        #[label("not a snapclaim setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not fit its key's type or range.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(snapclaim::config::invalid_value))]
    InvalidValue {
        /// Dotted path, e.g. `dispatch.workers`.
        key: String,
        detail: String,
        #[label("{detail}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(snapclaim::config::missing_key),
        help("set `{key}` in snapclaim.toml or export {}", env_var(key))
    )]
    MissingKey { key: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(snapclaim::config::validation))]
    Validation { message: String },

    /// The file is not valid TOML.
    #[error("config file could not be parsed: {0}")]
    #[diagnostic(code(snapclaim::config::syntax))]
    Syntax(String),
}

fn section_title(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

/// Environment override for a dotted key.
fn env_var(key: &str) -> String {
    format!("SNAPCLAIM_{}", key.replace('.', "_").to_uppercase())
}

/// Keys accepted directly under `section`. The top level holds the sections.
fn keys_of(section: &str) -> Vec<&'static str> {
    if section.is_empty() {
        return SECTIONS.iter().map(|(name, _)| *name).collect();
    }
    SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| keys.to_vec())
        .unwrap_or_default()
}

fn unknown_key_help(section: &str, key: &str, suggestion: Option<&Suggestion>) -> String {
    let accepted = keys_of(section).join(", ");
    match suggestion {
        Some(Suggestion::Spelling(fix)) => {
            format!("did you mean `{fix}`? {} accepts: {accepted}", section_title(section))
        }
        Some(Suggestion::Section(owner)) => format!("`{key}` belongs in [{owner}]"),
        None => format!("{} accepts: {accepted}", section_title(section)),
    }
}

/// Best correction for `key` found under `section`.
pub fn suggest(section: &str, key: &str) -> Option<Suggestion> {
    let spelling = keys_of(section)
        .into_iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(key, candidate)))
        .filter(|(_, score)| *score > SIMILARITY_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| Suggestion::Spelling(candidate));

    spelling.or_else(|| {
        SECTIONS
            .iter()
            .find(|(name, keys)| *name != section && keys.contains(&key))
            .map(|(name, _)| Suggestion::Section(name))
    })
}

/// Byte offset of `key` in `content`: a `key =` line inside `[section]`, or
/// the `[key]` header itself when `section` is empty.
pub fn locate(content: &str, section: &str, key: &str) -> Option<usize> {
    let mut current = "";
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.split(']').next().unwrap_or_default().trim();
            if section.is_empty() && name == key {
                return Some(offset + indent + 1);
            }
            current = name;
        } else if current == section
            && let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Labels `key` in whichever source file the error came from.
fn source_span(
    error: &figment::Error,
    section: &str,
    key: &str,
    sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    // Inline strings carry no file path; a single source is unambiguous.
    let source = match origin {
        Some(path) => sources.iter().find(|(name, _)| *name == path),
        None if sources.len() == 1 => sources.first(),
        None => None,
    };

    let Some((name, content)) = source else {
        return (None, None);
    };
    match locate(content, section, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Converts every error inside a figment error.
///
/// `sources` pairs each TOML file path with its content, for spans.
pub fn from_figment(err: figment::Error, sources: &[(String, String)]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let path: Vec<&str> = error.path.iter().map(String::as_str).collect();

            if let Kind::UnknownField(key, _) = &error.kind {
                let section = path.join(".");
                let (span, src) = source_span(&error, &section, key, sources);
                return ConfigError::UnknownKey {
                    suggestion: suggest(&section, key),
                    section,
                    key: key.clone(),
                    span,
                    src,
                };
            }

            let Some((key, parents)) = path.split_last() else {
                return ConfigError::Syntax(error.kind.to_string());
            };
            let (span, src) = source_span(&error, &parents.join("."), key, sources);
            ConfigError::InvalidValue {
                key: path.join("."),
                detail: error.kind.to_string(),
                span,
                src,
            }
        })
        .collect()
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
