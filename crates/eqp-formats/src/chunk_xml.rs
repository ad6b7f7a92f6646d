//! XML documents carried inside container chunks.
//!
//! Some plugins store their state as XML text instead of binary. The text is
//! kept as written and validated with `roxmltree`; serializing it for a chunk
//! escapes apostrophes in character data and attribute values.

use std::fmt;

/// Well-formed XML text taken from (or destined for) a container chunk.
#[derive(Clone, PartialEq, Eq)]
pub struct XmlDocument {
    text: String,
}

impl XmlDocument {
    /// Validate `text` as an XML document.
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        roxmltree::Document::parse(text)?;
        Ok(Self {
            text: text.to_owned(),
        })
    }

    /// Best-effort interpretation of chunk bytes. Failures are logged only.
    pub(crate) fn sniff(bytes: &[u8]) -> Option<Self> {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("chunk is not UTF-8 text: {}", e);
                return None;
            }
        };
        match Self::parse(text) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("failed to parse chunk as XML: {}", e);
                None
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Name of the document element.
    pub fn root_name(&self) -> Option<String> {
        let doc = roxmltree::Document::parse(&self.text).ok()?;
        Some(doc.root_element().tag_name().name().to_owned())
    }

    /// Text as stored in a chunk: `'` becomes `&apos;` outside of markup
    /// delimiters.
    pub fn to_chunk_text(&self) -> String {
        escape_apostrophes(&self.text)
    }
}

impl fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument")
            .field("root", &self.root_name())
            .field("len", &self.text.len())
            .finish()
    }
}

const APOS: &str = "&apos;";

fn escape_apostrophes(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open].replace('\'', APOS));
        rest = &rest[open..];
        // Comments, CDATA, processing instructions and declarations pass through
        let verbatim_end = if rest.starts_with("<!--") {
            Some(rest.find("-->").map(|i| i + 3))
        } else if rest.starts_with("<![CDATA[") {
            Some(rest.find("]]>").map(|i| i + 3))
        } else if rest.starts_with("<?") {
            Some(rest.find("?>").map(|i| i + 2))
        } else if rest.starts_with("<!") {
            Some(rest.find('>').map(|i| i + 1))
        } else {
            None
        };
        let end = match verbatim_end {
            Some(end) => {
                let end = end.unwrap_or(rest.len());
                out.push_str(&rest[..end]);
                end
            }
            None => push_tag(&mut out, rest),
        };
        rest = &rest[end..];
    }
    out.push_str(&rest.replace('\'', APOS));
    out
}

/// Copy one tag, escaping apostrophes inside double-quoted attribute values.
/// Returns the number of bytes consumed.
fn push_tag(out: &mut String, tag: &str) -> usize {
    let mut quote: Option<char> = None;
    for (i, c) in tag.char_indices() {
        match quote {
            None => {
                out.push(c);
                if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if c == '>' {
                    return i + 1;
                }
            }
            Some(q) if c == q => {
                out.push(c);
                quote = None;
            }
            Some(_) if c == '\'' => out.push_str(APOS),
            Some(_) => out.push(c),
        }
    }
    tag.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_non_xml() {
        assert!(XmlDocument::parse("not xml").is_err());
        assert!(XmlDocument::sniff(&[0xFF, 0xFE, 0x00]).is_none());
    }

    #[test]
    fn root_name() {
        let doc = XmlDocument::parse("<Preset version=\"2\"><Band/></Preset>").unwrap();
        assert_eq!(doc.root_name().as_deref(), Some("Preset"));
    }

    #[test]
    fn escapes_text_and_double_quoted_values() {
        let doc = XmlDocument::parse("<p name=\"Rock 'n' Roll\">it's</p>").unwrap();
        assert_eq!(
            doc.to_chunk_text(),
            "<p name=\"Rock &apos;n&apos; Roll\">it&apos;s</p>"
        );
    }

    #[test]
    fn leaves_markup_delimiters_alone() {
        let source = "<?xml version='1.0'?><!-- it's --><p a='x'>y</p>";
        let doc = XmlDocument::parse(source).unwrap();
        assert_eq!(doc.to_chunk_text(), source);
    }
}
