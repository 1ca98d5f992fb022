//! Parsed source documents and their identifiers.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const FILE_SCHEME: &str = "file://";

/// Location identifier of a document, derived from its absolute path.
///
/// `%` and bytes that are not valid UTF-8 are percent-encoded, so distinct
/// paths always map to distinct URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(String);

impl Uri {
    pub fn from_path(path: &Path) -> Self {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        Self(format!("{}{}", FILE_SCHEME, encode_path(&absolute)))
    }

    /// Accepts either a `file://` URI or a bare absolute path.
    pub fn parse(value: &str) -> Option<Self> {
        match value.strip_prefix(FILE_SCHEME) {
            Some(rest) => {
                let uri = Self(value.to_string());
                (!rest.is_empty() && uri.to_path().is_absolute()).then_some(uri)
            }
            None => {
                let path = Path::new(value);
                path.is_absolute().then(|| Self::from_path(path))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path(&self) -> PathBuf {
        let raw = self.0.strip_prefix(FILE_SCHEME).unwrap_or(&self.0);
        path_from_bytes(decode(raw))
    }
}

fn encode_path(path: &Path) -> String {
    let bytes = path.as_os_str().as_encoded_bytes();
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            if c == '%' {
                out.push_str("%25");
            } else {
                out.push(c);
            }
        }
        for b in chunk.invalid() {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Undoes `%XX` escapes; a `%` not followed by two hex digits is kept.
fn decode(raw: &str) -> Vec<u8> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(b) = hex {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Module,
    Header,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("hrl") => DocumentKind::Header,
            _ => DocumentKind::Module,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoiKind {
    Module,
    Function,
    Spec,
    Record,
    Define,
    Include,
    RemoteCall,
}

/// Point of interest found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poi {
    pub kind: PoiKind,
    /// For remote calls this is `module:function`.
    pub name: String,
    pub arity: Option<usize>,
    /// 1-based
    pub line: usize,
    /// Raw text for specs, include path for includes.
    pub data: Option<String>,
}

impl Poi {
    pub fn new(kind: PoiKind, name: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            arity: None,
            line,
            data: None,
        }
    }

    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub uri: Uri,
    pub kind: DocumentKind,
    /// Module name (or header file stem).
    pub id: String,
    pub text: String,
    pub pois: Vec<Poi>,
}

impl Document {
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn pois_of(&self, kind: PoiKind) -> impl Iterator<Item = &Poi> {
        self.pois.iter().filter(move |p| p.kind == kind)
    }
}

/// Turns raw file content plus its derived URI into a [`Document`].
pub trait DocumentFactory: Send + Sync {
    fn create(&self, uri: &Uri, content: &[u8]) -> Result<Document>;
}
