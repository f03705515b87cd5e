use std::collections::BTreeMap;

use lopdf::content::Content;

use crate::PdfError;

/// `(object number, generation)` of a page object, as in `lopdf::ObjectId`.
pub type PageId = (u32, u16);

/// US Letter, used when a page carries no readable MediaBox.
pub const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// A font resource visible from a page.
#[derive(Debug, Clone)]
pub struct FontResource {
    /// Resource key used by `Tf`, e.g. `b"F1"`.
    pub key: Vec<u8>,
    pub base_font: Option<String>,
}

/// Operand values detached from `lopdf`, so the layout state machine can be
/// driven by plain data.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

impl PdfValue {
    /// Numeric operands arrive as either integers or reals.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(f) => Some(*f),
            _ => None,
        }
    }
}

/// One content-stream instruction.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl From<&lopdf::Object> for PdfValue {
    fn from(obj: &lopdf::Object) -> Self {
        let dict_entries = |dict: &lopdf::Dictionary| {
            dict.iter()
                .map(|(k, v)| (k.clone(), PdfValue::from(v)))
                .collect()
        };
        match obj {
            lopdf::Object::Null => PdfValue::Null,
            lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
            lopdf::Object::Integer(i) => PdfValue::Integer(*i),
            lopdf::Object::Real(f) => PdfValue::Real(*f),
            lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
            lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
            lopdf::Object::Array(items) => {
                PdfValue::Array(items.iter().map(PdfValue::from).collect())
            }
            lopdf::Object::Dictionary(dict) => PdfValue::Dict(dict_entries(dict)),
            // Stream payloads are only reachable through `page_content`.
            lopdf::Object::Stream(stream) => PdfValue::Dict(dict_entries(&stream.dict)),
            lopdf::Object::Reference(id) => PdfValue::Reference(*id),
        }
    }
}

/// Decode string operand bytes without font knowledge.
///
/// A UTF-16BE byte order mark wins, then UTF-8, then Latin-1 byte by byte.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// The parsing backend seen by the layout pass.
///
/// Implemented for `lopdf` below and by an in-memory mock in tests.
pub trait PdfBackend {
    /// 1-based page number to page object.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontResource>, PdfError>;

    /// Raw, decompressed content stream bytes.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode the bytes of a text-showing operand set in `font_key`.
    fn decode_text(&self, page: PageId, font_key: &[u8], bytes: &[u8]) -> String;

    /// Page `(width, height)` in user space units.
    fn page_size(&self, page: PageId) -> Result<(f32, f32), PdfError>;
}

pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse an in-memory PDF. Encrypted documents are rejected.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Look up `key` on the page dictionary, then on its ancestors.
    fn inherited<'a>(&'a self, dict: &'a lopdf::Dictionary, key: &[u8]) -> Option<&'a lopdf::Object> {
        if let Ok(obj) = dict.get(key) {
            return Some(obj);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent = self.doc.get_object(parent).ok()?.as_dict().ok()?;
        self.inherited(parent, key)
    }

    fn resolve<'a>(&'a self, obj: &'a lopdf::Object) -> Result<&'a lopdf::Object, PdfError> {
        match obj {
            lopdf::Object::Reference(id) => self
                .doc
                .get_object(*id)
                .map_err(|e| PdfError::Parse(e.to_string())),
            other => Ok(other),
        }
    }

    fn font_encoding(&self, page: PageId, font_key: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font = fonts.get(font_key)?;
        match font.get(b"Encoding").ok()? {
            lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontResource>, PdfError> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {e}")))?;

        Ok(fonts
            .iter()
            .map(|(key, dict)| FontResource {
                key: key.clone(),
                base_font: dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).into_owned()),
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {e}")))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {e}")))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(PdfValue::from).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_key: &[u8], bytes: &[u8]) -> String {
        // Identity-H/V fonts carry two-byte codes; try them as UTF-16BE first.
        let identity = self
            .font_encoding(page, font_key)
            .is_some_and(|enc| enc.contains("Identity"));
        if identity && !bytes.is_empty() && bytes.len() % 2 == 0 {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            let decoded = String::from_utf16_lossy(&units);
            if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                return decoded;
            }
        }

        decode_text_simple(bytes)
    }

    fn page_size(&self, page: PageId) -> Result<(f32, f32), PdfError> {
        let dict = self
            .doc
            .get_object(page)
            .and_then(|o| o.as_dict())
            .map_err(|e| PdfError::Parse(format!("page {page:?} is not a dictionary: {e}")))?;

        let media_box = self
            .inherited(dict, b"MediaBox")
            .ok_or_else(|| PdfError::Parse("MediaBox not found for page".into()))?;
        let corners = self
            .resolve(media_box)?
            .as_array()
            .map_err(|e| PdfError::Parse(format!("MediaBox is not an array: {e}")))?;

        let nums = corners
            .iter()
            .map(|o| {
                self.resolve(o).and_then(|o| {
                    PdfValue::from(o)
                        .as_f32()
                        .ok_or_else(|| PdfError::Parse(format!("non-numeric MediaBox entry {o:?}")))
                })
            })
            .collect::<Result<Vec<f32>, PdfError>>()?;

        match nums.as_slice() {
            [llx, lly, urx, ury] => Ok(((urx - llx).abs(), (ury - lly).abs())),
            _ => Err(PdfError::Parse(format!(
                "MediaBox has {} elements, expected 4",
                nums.len()
            ))),
        }
    }
}
