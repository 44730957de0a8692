// src/mirror/charset.rs
// =============================================================================
// Turns the bytes of an HTML page into text for the rewriter, and the
// rewritten text back into bytes.
//
// Which charset a page is read in:
// 1. A byte-order mark, if there is one
// 2. The charset parameter of the Content-Type header
// 3. A charset declared near the top of the document (<meta charset=...> or
//    <meta http-equiv="Content-Type" content="...; charset=...">)
// 4. UTF-8
//
// Bytes that don't decode become U+FFFD. The page is still saved.
//
// A saved page has no Content-Type header any more, only its own <meta>. So
// it is written in the charset the document declares, or UTF-8 when it
// declares none. Characters that charset can't hold are written as numeric
// character references.
// =============================================================================

use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

// How far into the document we look for a declared charset
const PRESCAN_BYTES: usize = 1024;

/// How one page's bytes are read from the network and written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCharset {
    /// What the fetched bytes are decoded with (a BOM still wins)
    pub fetched: &'static Encoding,
    /// What the saved file is encoded in
    pub saved: &'static Encoding,
}

impl PageCharset {
    /// Works out the charsets of a page from its headers and its first bytes.
    pub fn detect(content_type: &str, body: &[u8]) -> Self {
        let declared = declared_charset(body);
        Self {
            fetched: header_charset(content_type).or(declared).unwrap_or(UTF_8),
            saved: declared.unwrap_or(UTF_8),
        }
    }

    pub fn decode_fetched(&self, body: &[u8]) -> String {
        decode(body, self.fetched)
    }

    pub fn decode_saved(&self, body: &[u8]) -> String {
        decode(body, self.saved)
    }

    pub fn encode(&self, markup: &str) -> Vec<u8> {
        let (bytes, _, _) = self.saved.encode(markup);
        bytes.into_owned()
    }
}

impl Default for PageCharset {
    fn default() -> Self {
        Self {
            fetched: UTF_8,
            saved: UTF_8,
        }
    }
}

fn decode(body: &[u8], encoding: &'static Encoding) -> String {
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(charset = used.name(), "replaced undecodable bytes");
    }
    text.into_owned()
}

fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| {
            let label = value.trim().trim_matches(|c| c == '"' || c == '\'');
            Encoding::for_label(label.as_bytes())
        })
}

fn declared_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = body[..body.len().min(PRESCAN_BYTES)].to_ascii_lowercase();
    let key = b"charset=";
    let start = head.windows(key.len()).position(|window| window == key)? + key.len();

    let rest = &head[start..];
    let rest = rest.strip_prefix(b"\"").or_else(|| rest.strip_prefix(b"'")).unwrap_or(rest);
    let end = rest
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':')))
        .unwrap_or(rest.len());

    // A document can't really declare UTF-16 about itself; output_encoding()
    // maps that to UTF-8
    Encoding::for_label(&rest[..end]).map(Encoding::output_encoding)
}
