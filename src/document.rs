use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("range {offset}..{end} is outside the document (length {len})")]
    OutOfBounds { offset: usize, end: usize, len: usize },
    #[error("range {offset}..{end} does not fall on character boundaries")]
    NotCharBoundary { offset: usize, end: usize },
}

/// Mutable text buffer supporting indexed replacement.
///
/// Offsets are byte offsets into the current contents, so a replacement
/// shifts every offset after it. Callers applying several replacements from
/// the original coordinates must apply them from the highest offset down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn get(&self) -> &str {
        &self.text
    }

    /// Replace `length` bytes starting at `offset` with `text`.
    pub fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<(), DocumentError> {
        let end = offset + length;
        if end > self.text.len() {
            return Err(DocumentError::OutOfBounds {
                offset,
                end,
                len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(offset) || !self.text.is_char_boundary(end) {
            return Err(DocumentError::NotCharBoundary { offset, end });
        }
        self.text.replace_range(offset..end, text);
        Ok(())
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
