//! Request body sources: upload cursor, raw fields, multipart forms.

use curl::easy::Form;

use crate::error::TransferError;
use crate::http::{FormField, FormFields};

/// What the session sends as the request body.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// No body (GET, DELETE).
    Empty,
    /// Raw bytes posted as-is.
    Fields(&'a [u8]),
    /// Bytes pulled by the engine through the read callback (PUT).
    Upload(&'a [u8]),
    /// Multipart form, one part per field.
    Multipart(&'a FormFields),
}

/// Pull cursor over caller-owned bytes.
///
/// `offset + remaining() == len()` at every point; the cursor only moves
/// forward and never reads past the end of the slice.
#[derive(Debug, Clone)]
pub struct UploadSource<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> UploadSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Length of the original buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Copy up to `buf.len()` bytes into `buf` and advance. Returns 0 once
    /// the source is exhausted.
    pub fn pull(&mut self, buf: &mut [u8]) -> usize {
        let count = self.remaining().min(buf.len());
        buf[..count].copy_from_slice(&self.data[self.offset..self.offset + count]);
        self.offset += count;
        count
    }
}

/// Assemble a multipart form. Text fields are copied into the form; file
/// fields only record the path, which the engine opens during the transfer.
pub fn build_form(fields: &FormFields) -> Result<Form, TransferError> {
    let mut form = Form::new();
    for (name, field) in fields {
        match field {
            FormField::Text(value) => form.part(name).contents(value.as_bytes()).add()?,
            FormField::File(path) => form.part(name).file(path).add()?,
        }
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_respects_requested_size() {
        let data = b"hello world";
        let mut source = UploadSource::new(data);
        let mut buf = [0u8; 5];

        assert_eq!(source.pull(&mut buf), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(source.offset(), 5);
        assert_eq!(source.remaining(), 6);
    }

    #[test]
    fn pull_returns_short_final_chunk_then_zero() {
        let mut source = UploadSource::new(b"abcdefg");
        let mut buf = [0u8; 4];

        assert_eq!(source.pull(&mut buf), 4);
        assert_eq!(source.pull(&mut buf), 3);
        assert_eq!(&buf[..3], b"efg");
        assert_eq!(source.pull(&mut buf), 0);
        assert_eq!(source.pull(&mut buf), 0);
        assert_eq!(source.offset(), 7);
    }

    #[test]
    fn pull_into_empty_buffer_does_not_advance() {
        let mut source = UploadSource::new(b"abc");
        assert_eq!(source.pull(&mut []), 0);
        assert_eq!(source.offset(), 0);
    }

    #[test]
    fn offset_plus_remaining_is_constant() {
        let data = vec![7u8; 100];
        let mut source = UploadSource::new(&data);
        let mut buf = [0u8; 13];
        while source.pull(&mut buf) > 0 {
            assert_eq!(source.offset() + source.remaining(), source.len());
        }
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn empty_source_is_exhausted_immediately() {
        let mut source = UploadSource::new(b"");
        assert!(source.is_empty());
        assert_eq!(source.pull(&mut [0u8; 8]), 0);
    }

    #[test]
    fn form_accepts_text_and_missing_file() {
        let mut fields = FormFields::new();
        fields.insert("greeting".to_string(), FormField::text("hi"));
        fields.insert(
            "upload".to_string(),
            FormField::file("/definitely/not/here.txt"),
        );
        assert!(build_form(&fields).is_ok());
    }

    #[test]
    fn empty_form_builds() {
        assert!(build_form(&FormFields::new()).is_ok());
    }
}
