//! Tiled TMX container handling: locates each `<layer>`'s `<data>` payload, hands the CSV
//! text to the optimizer and splices re-encoded payloads back, leaving every other byte of
//! the document as it was.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::optimizer::LayerInput;

const CSV_ENCODING: &str = "csv";

#[derive(Debug)]
pub enum TmxError {
    Read(std::io::Error),
    Write(std::io::Error),
    Malformed(String),
    UnsupportedEncoding { layer: String, encoding: String },
}

impl fmt::Display for TmxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read map file: {err}"),
            Self::Write(err) => write!(f, "failed to write map file: {err}"),
            Self::Malformed(msg) => write!(f, "malformed map document: {msg}"),
            Self::UnsupportedEncoding { layer, encoding } => write!(
                f,
                "layer '{layer}' uses encoding '{encoding}': only the row-major comma-separated \
                 encoding is supported (save the map with CSV layer format)"
            ),
        }
    }
}

impl std::error::Error for TmxError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmxLayer {
    pub name: String,
    pub width: usize,
    pub height: usize,
    /// Value of the `<data encoding>` attribute; None means Tiled's XML-element form.
    pub encoding: Option<String>,
    pub compression: Option<String>,
    /// Byte range of the `<data>` element's text content.
    data: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct TmxDocument {
    text: String,
    width: usize,
    height: usize,
    layers: Vec<TmxLayer>,
}

impl TmxDocument {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TmxError> {
        let text = fs::read_to_string(path).map_err(TmxError::Read)?;
        Self::parse(text)
    }

    pub fn parse(text: String) -> Result<Self, TmxError> {
        let map = find_start_tag(&text, "map", 0)
            .ok_or_else(|| TmxError::Malformed("no <map> element".to_string()))?;
        let map_attrs = &text[map.clone()];
        let width = dimension_attr(map_attrs, "width", "map")?
            .ok_or_else(|| TmxError::Malformed("<map> has no width attribute".to_string()))?;
        let height = dimension_attr(map_attrs, "height", "map")?
            .ok_or_else(|| TmxError::Malformed("<map> has no height attribute".to_string()))?;

        let mut layers = Vec::new();
        let mut cursor = map.end;
        while let Some(tag) = find_start_tag(&text, "layer", cursor) {
            let attrs = &text[tag.clone()];
            let name = attr(attrs, "name").unwrap_or_else(|| format!("layer{}", layers.len()));
            if attrs.trim_end().ends_with('/') {
                return Err(TmxError::Malformed(format!("layer '{name}' has no <data>")));
            }
            let layer_end = find_outside_comments(&text, "</layer>", tag.end)
                .ok_or_else(|| TmxError::Malformed(format!("layer '{name}' is not closed")))?;
            let data_tag = find_start_tag(&text, "data", tag.end)
                .filter(|data| data.end <= layer_end)
                .ok_or_else(|| TmxError::Malformed(format!("layer '{name}' has no <data>")))?;
            let data_attrs = &text[data_tag.clone()];
            if data_attrs.trim_end().ends_with('/') {
                return Err(TmxError::Malformed(format!("layer '{name}' has an empty <data>")));
            }
            let content_start = data_tag.end + 1;
            let content_end = find_outside_comments(&text, "</data>", content_start)
                .filter(|&end| end <= layer_end)
                .ok_or_else(|| TmxError::Malformed(format!("layer '{name}': <data> is not closed")))?;

            layers.push(TmxLayer {
                width: dimension_attr(attrs, "width", &name)?.unwrap_or(width),
                height: dimension_attr(attrs, "height", &name)?.unwrap_or(height),
                encoding: attr(data_attrs, "encoding"),
                compression: attr(data_attrs, "compression"),
                data: content_start..content_end,
                name,
            });
            cursor = layer_end;
        }

        Ok(Self {
            text,
            width,
            height,
            layers,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layers(&self) -> &[TmxLayer] {
        &self.layers
    }

    pub fn layer_data(&self, layer: &TmxLayer) -> &str {
        &self.text[layer.data.clone()]
    }

    /// Payloads for the optimizer. Any layer that is not plain CSV is rejected up front so
    /// nothing is processed.
    pub fn layer_inputs(&self) -> Result<Vec<LayerInput>, TmxError> {
        self.layers
            .iter()
            .map(|layer| {
                let encoding = layer.encoding.as_deref().unwrap_or("xml");
                if encoding != CSV_ENCODING || layer.compression.is_some() {
                    let encoding = match &layer.compression {
                        Some(compression) => format!("{encoding}+{compression}"),
                        None => encoding.to_string(),
                    };
                    return Err(TmxError::UnsupportedEncoding {
                        layer: layer.name.clone(),
                        encoding,
                    });
                }
                Ok(LayerInput {
                    name: layer.name.clone(),
                    csv: self.layer_data(layer).to_string(),
                    width: layer.width,
                    height: layer.height,
                })
            })
            .collect()
    }

    /// Document text with each layer's payload replaced by the matching entry of `payloads`.
    /// Whitespace that surrounded the original payload is kept.
    pub fn render_with_payloads(&self, payloads: &[String]) -> Result<String, TmxError> {
        if payloads.len() != self.layers.len() {
            return Err(TmxError::Malformed(format!(
                "{} payload(s) supplied for {} layer(s)",
                payloads.len(),
                self.layers.len()
            )));
        }
        let mut out = String::with_capacity(self.text.len());
        let mut copied = 0;
        for (layer, payload) in self.layers.iter().zip(payloads) {
            let original = &self.text[layer.data.clone()];
            let lead = original.len() - original.trim_start().len();
            let trail = original.len() - original.trim_end().len();
            out.push_str(&self.text[copied..layer.data.start + lead]);
            out.push_str(payload);
            copied = layer.data.end - trail.min(original.len() - lead);
        }
        out.push_str(&self.text[copied..]);
        Ok(out)
    }
}

/// Range of the attribute section of the first `<name ...>` start tag at or after `from`,
/// from just past the name to just before the closing `>`. Tags inside comments are skipped.
fn find_start_tag(text: &str, name: &str, from: usize) -> Option<Range<usize>> {
    let needle = format!("<{name}");
    let mut search = from;
    while let Some(start) = find_outside_comments(text, &needle, search) {
        let attrs_start = start + needle.len();
        let boundary = text[attrs_start..].chars().next()?;
        if boundary.is_whitespace() || boundary == '>' || boundary == '/' {
            let close = text[attrs_start..].find('>')?;
            return Some(attrs_start..attrs_start + close);
        }
        search = attrs_start;
    }
    None
}

/// Byte offset of the first `needle` at or after `from` that is not inside `<!-- ... -->`.
fn find_outside_comments(text: &str, needle: &str, from: usize) -> Option<usize> {
    let mut search = from;
    loop {
        let rest = text.get(search..)?;
        let hit = rest.find(needle)?;
        match rest.find("<!--") {
            Some(comment) if comment < hit => {
                let body = search + comment + "<!--".len();
                let close = text[body..].find("-->")?;
                search = body + close + "-->".len();
            }
            _ => return Some(search + hit),
        }
    }
}

fn attr(attrs: &str, name: &str) -> Option<String> {
    let mut rest = attrs;
    loop {
        rest = rest.trim_start();
        let eq = rest.find('=')?;
        let key = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value_len = after[1..].find(quote)?;
        let value = &after[1..1 + value_len];
        if key == name {
            return Some(unescape(value));
        }
        rest = &after[value_len + 2..];
    }
}

fn dimension_attr(attrs: &str, name: &str, owner: &str) -> Result<Option<usize>, TmxError> {
    attr(attrs, name)
        .map(|raw| {
            raw.trim().parse::<usize>().map_err(|_| {
                TmxError::Malformed(format!("{owner}: {name}='{raw}' is not a dimension"))
            })
        })
        .transpose()
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
