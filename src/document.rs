use std::ops::Range;

use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range as LspRange};

/// An open text document with a rope for offset/position conversion.
///
/// Positions use UTF-16 columns as the protocol does; everything else in the crate works
/// in byte offsets.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    rope: Rope,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Document {
        let text = text.into();
        let rope = Rope::from_str(&text);
        Document { text, rope }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self, byte_offset: usize) -> Position {
        let char_idx = self.rope.byte_to_char(byte_offset.min(self.rope.len_bytes()));
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        let character =
            self.rope.char_to_utf16_cu(char_idx) - self.rope.char_to_utf16_cu(line_start);

        Position {
            line: line as u32,
            character: character as u32,
        }
    }

    /// Converts a byte range into a protocol range.
    pub fn range(&self, range: Range<usize>) -> LspRange {
        LspRange {
            start: self.position(range.start),
            end: self.position(range.end),
        }
    }

    /// Byte offset of `position`, clamped to the end of its line. `None` past the last line.
    pub fn offset(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        if line >= self.rope.len_lines() {
            return None;
        }

        let line_slice = self.rope.line(line);
        let mut line_len = line_slice.len_chars();
        while line_len > 0 && matches!(line_slice.char(line_len - 1), '\n' | '\r') {
            line_len -= 1;
        }

        let line_start = self.rope.line_to_char(line);
        let line_end = line_start + line_len;
        let start_cu = self.rope.char_to_utf16_cu(line_start);
        let end_cu = self.rope.char_to_utf16_cu(line_end);
        let cu = (start_cu + position.character as usize).min(end_cu);

        Some(self.rope.char_to_byte(self.rope.utf16_cu_to_char(cu)))
    }

    /// The document text from the start of the cursor's line up to the cursor.
    pub fn line_before(&self, position: Position) -> Option<&str> {
        let offset = self.offset(position)?;
        let line_start = self.rope.line_to_byte(position.line as usize);
        self.text.get(line_start..offset)
    }

    /// The document text up to the cursor.
    pub fn text_before(&self, position: Position) -> Option<&str> {
        self.text.get(..self.offset(position)?)
    }
}
