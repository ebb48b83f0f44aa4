//! Shape text and its formatting runs.

use super::list::{PatchList, Patchable};
use super::styles::{OptionalCharStyle, OptionalParaStyle, OptionalStyle};
use crate::common::binary::{decode_utf16le, decode_windows1252};
use bitflags::bitflags;

/// Encoding of a raw text payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf16Le,
    Windows1252,
}

/// Raw text of a shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub data: Vec<u8>,
    pub encoding: TextEncoding,
}

impl Text {
    pub fn new(data: Vec<u8>, encoding: TextEncoding) -> Self {
        Self { data, encoding }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode the payload into a string.
    pub fn decode(&self) -> String {
        match self.encoding {
            TextEncoding::Utf16Le => decode_utf16le(&self.data),
            TextEncoding::Windows1252 => decode_windows1252(&self.data),
        }
    }
}

bitflags! {
    /// First character modifier byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FontStyleBits: u8 {
        const BOLD = 0x01;
        const ITALIC = 0x02;
        const UNDERLINE = 0x04;
        const SMALLCAPS = 0x08;
    }
}

bitflags! {
    /// Second character modifier byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FontCaseBits: u8 {
        const ALLCAPS = 0x01;
        const INITCAPS = 0x02;
    }
}

bitflags! {
    /// Third character modifier byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FontPositionBits: u8 {
        const SUPERSCRIPT = 0x01;
        const SUBSCRIPT = 0x02;
    }
}

bitflags! {
    /// Trailing character modifier byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FontStrikeBits: u8 {
        const DOUBLE_UNDERLINE = 0x01;
        const STRIKEOUT = 0x04;
        const DOUBLE_STRIKEOUT = 0x20;
    }
}

/// A formatting run covering `char_count` characters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun<S> {
    pub char_count: u32,
    pub style: S,
}

/// Partial run record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRunPatch<S> {
    pub char_count: Option<u32>,
    pub style: S,
}

impl<S: OptionalStyle> Patchable for TextRun<S> {
    type Patch = TextRunPatch<S>;

    fn from_patch(patch: TextRunPatch<S>) -> Self {
        Self {
            char_count: patch.char_count.unwrap_or(0),
            style: patch.style,
        }
    }

    fn merge(&mut self, patch: TextRunPatch<S>) -> Result<(), TextRunPatch<S>> {
        if let Some(count) = patch.char_count {
            self.char_count = count;
        }
        self.style.override_with(&patch.style);
        Ok(())
    }
}

/// Character runs of a shape's text
pub type CharList = PatchList<TextRun<OptionalCharStyle>>;

/// Paragraph runs of a shape's text
pub type ParaList = PatchList<TextRun<OptionalParaStyle>>;
