//! Rich-text composition.
//!
//! Facet ranges on the wire are UTF-8 byte offsets into the post text, so
//! the builder records `String::len()` before and after each annotated
//! segment instead of counting characters.

use super::types::{ByteSlice, Facet, FacetFeature};

#[derive(Debug, Default, Clone)]
pub struct TextBuilder {
    text: String,
    facets: Vec<Facet>,
}

impl TextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append plain, unannotated text.
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    /// Append `text` as a hyperlink to `uri`.
    pub fn link(&mut self, text: &str, uri: &str) -> &mut Self {
        self.annotated(text, FacetFeature::Link { uri: uri.to_string() })
    }

    /// Append a hashtag. A leading `#` is shown in the text but not stored
    /// in the tag value.
    pub fn tag(&mut self, text: &str, tag: &str) -> &mut Self {
        let tag = tag.trim_start_matches('#').to_string();
        self.annotated(text, FacetFeature::Tag { tag })
    }

    /// Append a mention of `did`, displayed as `text` (usually `@handle`).
    pub fn mention(&mut self, text: &str, did: &str) -> &mut Self {
        self.annotated(text, FacetFeature::Mention { did: did.to_string() })
    }

    fn annotated(&mut self, text: &str, feature: FacetFeature) -> &mut Self {
        let byte_start = self.text.len();
        self.text.push_str(text);
        self.facets.push(Facet {
            index: ByteSlice {
                byte_start,
                byte_end: self.text.len(),
            },
            features: vec![feature],
        });
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn build(self) -> (String, Vec<Facet>) {
        (self.text, self.facets)
    }
}
