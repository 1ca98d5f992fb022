use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{Document, DocumentFactory, DocumentKind, Poi, PoiKind, Uri};
use crate::error::{IndexerError, Result};

const ATOM: &str = r"[a-z][A-Za-z0-9_@]*";

static MODULE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?m)^-module\(\s*({ATOM})\s*\)")).unwrap());
static FUNCTION_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?m)^({ATOM})\s*\(")).unwrap());
static SPEC_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?m)^-spec\s+({ATOM})\s*\(")).unwrap());
static RECORD_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?m)^-record\(\s*({ATOM})")).unwrap());
static DEFINE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^-define\(\s*([A-Za-z_][A-Za-z0-9_@]*)").unwrap());
static INCLUDE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^-include(?:_lib)?\(\s*"([^"]+)""#).unwrap());
static REMOTE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b({ATOM}):({ATOM})\s*\(")).unwrap());

/// Line-oriented Erlang source reader producing [`Document`]s with their
/// points of interest.
#[derive(Debug, Default)]
pub struct SourceDocumentFactory;

impl SourceDocumentFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_source(&self, uri: &Uri, source: &str) -> Document {
        let path = uri.to_path();
        let kind = DocumentKind::from_path(&path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let text = strip_comments(source);
        let mut pois = Vec::new();

        let mut id = stem;
        if let Some(m) = MODULE_ATTR.captures(&text).and_then(|c| c.get(1)) {
            id = m.as_str().to_string();
            pois.push(Poi::new(PoiKind::Module, m.as_str(), line_of(&text, m.start())));
        }

        let mut seen = HashSet::new();
        for caps in FUNCTION_CLAUSE.captures_iter(&text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let arity = count_args(&text[whole.end()..]);
            if seen.insert((name.as_str().to_string(), arity)) {
                pois.push(
                    Poi::new(PoiKind::Function, name.as_str(), line_of(&text, name.start()))
                        .with_arity(arity),
                );
            }
        }

        for caps in SPEC_ATTR.captures_iter(&text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let arity = count_args(&text[whole.end()..]);
            let spec_text = attribute_text(&text[whole.start()..]);
            pois.push(
                Poi::new(PoiKind::Spec, name.as_str(), line_of(&text, name.start()))
                    .with_arity(arity)
                    .with_data(spec_text),
            );
        }

        for (regex, kind) in [(&*RECORD_ATTR, PoiKind::Record), (&*DEFINE_ATTR, PoiKind::Define)] {
            for caps in regex.captures_iter(&text) {
                let Some(name) = caps.get(1) else {
                    continue;
                };
                pois.push(Poi::new(kind, name.as_str(), line_of(&text, name.start())));
            }
        }

        for caps in INCLUDE_ATTR.captures_iter(&text) {
            let Some(target) = caps.get(1) else {
                continue;
            };
            let file = Path::new(target.as_str())
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| target.as_str().to_string());
            pois.push(
                Poi::new(PoiKind::Include, file, line_of(&text, target.start()))
                    .with_data(target.as_str()),
            );
        }

        for caps in REMOTE_CALL.captures_iter(&text) {
            let (Some(whole), Some(module), Some(function)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let arity = count_args(&text[whole.end()..]);
            pois.push(
                Poi::new(
                    PoiKind::RemoteCall,
                    format!("{}:{}", module.as_str(), function.as_str()),
                    line_of(&text, module.start()),
                )
                .with_arity(arity),
            );
        }

        pois.sort_by_key(|p| p.line);

        Document {
            uri: uri.clone(),
            kind,
            id,
            text: source.to_string(),
            pois,
        }
    }
}

impl DocumentFactory for SourceDocumentFactory {
    fn create(&self, uri: &Uri, content: &[u8]) -> Result<Document> {
        let source = std::str::from_utf8(content)
            .map_err(|e| IndexerError::Parse(format!("{} is not valid UTF-8: {}", uri, e)))?;
        Ok(self.parse_source(uri, source))
    }
}

/// Blanks `%` comments while keeping byte offsets stable.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let mut in_string = false;
        let mut in_char = false;
        let mut cut = None;
        let mut prev = '\0';
        for (i, c) in line.char_indices() {
            if in_char {
                in_char = false;
            } else if c == '$' && !in_string {
                in_char = true;
            } else if c == '"' && prev != '\\' {
                in_string = !in_string;
            } else if c == '%' && !in_string {
                cut = Some(i);
                break;
            }
            prev = c;
        }
        match cut {
            Some(i) => {
                out.push_str(&line[..i]);
                for c in line[i..].chars() {
                    if c == '\n' {
                        out.push('\n');
                    } else {
                        out.extend(std::iter::repeat(' ').take(c.len_utf8()));
                    }
                }
            }
            None => out.push_str(line),
        }
    }
    out
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

/// Counts top-level arguments of a call whose opening parenthesis has
/// already been consumed.
fn count_args(rest: &str) -> usize {
    let mut depth = 0usize;
    let mut commas = 0usize;
    let mut seen_token = false;
    let mut in_string = false;
    let mut prev = '\0';

    for c in rest.chars() {
        if in_string {
            if c == '"' && prev != '\\' {
                in_string = false;
            }
            prev = c;
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                seen_token = true;
            }
            '(' | '[' | '{' => {
                depth += 1;
                seen_token = true;
            }
            ')' | ']' | '}' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            ',' if depth == 0 => commas += 1,
            c if !c.is_whitespace() => seen_token = true,
            _ => {}
        }
        prev = c;
    }

    if seen_token {
        commas + 1
    } else {
        0
    }
}

/// Attribute text up to its terminating full stop.
fn attribute_text(rest: &str) -> String {
    let mut end = rest.len();
    let bytes = rest.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'.' {
            let next = bytes.get(i + 1).copied();
            if next.map_or(true, |n| n.is_ascii_whitespace()) {
                end = i + 1;
                break;
            }
        }
    }
    rest[..end].split_whitespace().collect::<Vec<_>>().join(" ")
}
