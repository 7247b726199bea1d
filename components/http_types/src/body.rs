//! Request body variants
//!
//! `Body` is a closed sum type over the supported encodings (§9 design note: model
//! dynamic-dispatch protocols as enums with a closed set of variants plus a `Custom`
//! escape hatch, rather than a bare `dyn Trait`).

use bytes::Bytes;
use futures::stream::Stream;
use http_errors::HttpResult;
use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

/// A lazily-produced chunk stream.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Source of a streamed body (top-level `Body::Stream` or a multipart part).
///
/// `File` and `Bytes` are cheap to clone, so the data loader can produce a *fresh*
/// stream for each attempt (§4.2 point 6) without the caller doing anything special.
/// `Dynamic` covers a genuinely generative source (e.g. a caller-supplied encoder);
/// its factory is called once per attempt to produce a new stream.
#[derive(Clone)]
pub enum StreamSource {
    /// Stream the contents of a file on disk
    File(PathBuf),
    /// Present already-loaded bytes as a single-chunk stream
    Bytes(Bytes),
    /// Call a caller-supplied factory to produce a fresh stream per attempt
    Dynamic {
        /// Declared length in bytes, if known up front (used for `Content-Length`)
        length: Option<u64>,
        /// Stream factory; invoked once per transport attempt
        factory: Arc<dyn Fn() -> BodyStream + Send + Sync>,
    },
}

impl fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSource::File(path) => f.debug_tuple("File").field(path).finish(),
            StreamSource::Bytes(bytes) => f
                .debug_tuple("Bytes")
                .field(&format!("{} bytes", bytes.len()))
                .finish(),
            StreamSource::Dynamic { length, .. } => f
                .debug_struct("Dynamic")
                .field("length", length)
                .finish(),
        }
    }
}

/// JSON body encoding options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Sort object keys before serializing, keeping the encoded body (and therefore
    /// any URL/cache key derived from it) stable across equivalent inputs.
    pub sorted_keys: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self { sorted_keys: true }
    }
}

/// How array-valued form fields are serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayEncoding {
    /// `key[]=v1&key[]=v2`
    Brackets,
    /// `key=v1&key=v2`
    Plain,
}

/// How boolean-valued form fields are serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolEncoding {
    /// `0` / `1`
    Numeric,
    /// `true` / `false`
    Literal,
}

/// A value within a form-urlencoded body, supporting the nested-map/array shapes
/// described in §4.1 ("flatten nested maps with `parent[child]` bracket notation").
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// A scalar string value
    String(String),
    /// A boolean value, encoded per the body's [`BoolEncoding`]
    Bool(bool),
    /// An integer value
    Int(i64),
    /// A floating point value
    Float(f64),
    /// An ordered array of values, encoded per the body's [`ArrayEncoding`]
    Array(Vec<FormValue>),
    /// A nested object, flattened with `parent[child]` bracket notation
    Object(Vec<(String, FormValue)>),
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::String(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::String(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Int(value)
    }
}

/// One part of a `multipart/form-data` body
#[derive(Clone)]
pub struct MultipartPart {
    /// The `name` attribute of the part's `Content-Disposition` header
    pub name: String,
    /// The `filename` attribute, if this part represents a file upload
    pub filename: Option<String>,
    /// The part's `Content-Type`, if any
    pub content_type: Option<String>,
    /// Additional headers beyond `Content-Disposition` and `Content-Type`
    pub extra_headers: Vec<(String, String)>,
    /// The part's byte source
    pub source: StreamSource,
}

impl fmt::Debug for MultipartPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartPart")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("source", &self.source)
            .finish()
    }
}

impl MultipartPart {
    /// Build a part from in-memory bytes
    pub fn bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            extra_headers: Vec::new(),
            source: StreamSource::Bytes(bytes.into()),
        }
    }

    /// Build a file-upload part from in-memory bytes, setting `filename` and
    /// `Content-Type`
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            extra_headers: Vec::new(),
            source: StreamSource::Bytes(bytes.into()),
        }
    }

    /// Declared length of this part's source, if known without reading it
    pub fn known_length(&self) -> Option<u64> {
        match &self.source {
            StreamSource::Bytes(bytes) => Some(bytes.len() as u64),
            StreamSource::File(_) => None,
            StreamSource::Dynamic { length, .. } => *length,
        }
    }
}

/// Request body
///
/// A closed sum type over the supported body encodings, plus a `Custom` escape
/// hatch for callers who need an encoding this crate doesn't model directly.
#[derive(Clone)]
pub enum Body {
    /// No body
    Empty,
    /// Raw bytes with an optional `Content-Type` override
    Raw(Bytes, Option<String>),
    /// A text body; `Content-Type` defaults to `text/plain` unless overridden
    Text(String, Option<String>),
    /// A JSON body, serialized at encode time with the given options
    Json(serde_json::Value, JsonOptions),
    /// A form-urlencoded body
    FormUrlEncoded(Vec<(String, FormValue)>, ArrayEncoding, BoolEncoding),
    /// A streamed body with an optional `Content-Type` override
    Stream(StreamSource, Option<String>),
    /// A `multipart/form-data` body
    Multipart {
        /// Boundary delimiter; generated if not supplied
        boundary: String,
        /// Ordered parts
        parts: Vec<MultipartPart>,
        /// Optional preamble text emitted before the first boundary
        preamble: Option<String>,
    },
    /// A caller-supplied encoder, for encodings this crate does not model directly.
    /// Returns the encoded bytes and an optional `Content-Type`.
    Custom(Arc<dyn Fn() -> HttpResult<(Bytes, Option<String>)> + Send + Sync>),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.debug_tuple("Empty").finish(),
            Body::Raw(bytes, ct) => f
                .debug_tuple("Raw")
                .field(&format!("{} bytes", bytes.len()))
                .field(ct)
                .finish(),
            Body::Text(text, ct) => f.debug_tuple("Text").field(text).field(ct).finish(),
            Body::Json(value, opts) => f.debug_tuple("Json").field(value).field(opts).finish(),
            Body::FormUrlEncoded(pairs, arr, boolean) => f
                .debug_tuple("FormUrlEncoded")
                .field(pairs)
                .field(arr)
                .field(boolean)
                .finish(),
            Body::Stream(source, ct) => f.debug_tuple("Stream").field(source).field(ct).finish(),
            Body::Multipart {
                boundary, parts, ..
            } => f
                .debug_struct("Multipart")
                .field("boundary", boundary)
                .field("parts", parts)
                .finish(),
            Body::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Empty
    }
}

impl Body {
    /// Generate a boundary string with at least 16 random alphanumeric characters,
    /// satisfying §4.1's multipart boundary requirement.
    pub fn generate_boundary() -> String {
        format!(
            "CortenHTTPBoundary{}",
            uuid::Uuid::new_v4().simple().to_string()
        )
    }

    /// Build a multipart body, generating a boundary if one is not explicitly chosen
    pub fn multipart(parts: Vec<MultipartPart>) -> Self {
        Body::Multipart {
            boundary: Self::generate_boundary(),
            parts,
            preamble: None,
        }
    }

    /// The default `Content-Type` implied by this body variant, before any explicit
    /// override. Returns `None` for variants with no inherent content type.
    pub fn default_content_type(&self) -> Option<String> {
        match self {
            Body::Empty => None,
            Body::Raw(_, ct) => ct.clone(),
            Body::Text(_, ct) => Some(ct.clone().unwrap_or_else(|| "text/plain".to_string())),
            Body::Json(_, _) => Some("application/json".to_string()),
            Body::FormUrlEncoded(..) => {
                Some("application/x-www-form-urlencoded".to_string())
            }
            Body::Stream(_, ct) => ct.clone(),
            Body::Multipart { boundary, .. } => {
                Some(format!("multipart/form-data; boundary={boundary}"))
            }
            Body::Custom(_) => None,
        }
    }

    /// Whether this body carries no bytes at all
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}
