use super::{ControlWindow, Header, Token, HEADER_LEN};
use thiserror::Error;

/// Largest output a single payload byte can expand to: a control byte plus
/// eight 3-byte back-references (25 bytes) produce at most 8 * 273 bytes.
const MAX_EXPANSION: usize = 88;

#[derive(Debug, Clone)]
pub struct Decompressor<'a> {
    src: &'a [u8],
    dst: Vec<u8>,

    header: Header,
    decoded_len: usize,

    /// index to read from
    read_index: usize,
    control: ControlWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    pub data: Vec<u8>,
    /// input bytes consumed by the stream, header included
    pub bytes_read: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    #[error("Data is not Yaz0 compressed")]
    InvalidMagic,
    #[error("Input ended at offset {offset:#x} before the stream was complete")]
    TruncatedInput { offset: usize },
    #[error("Back-reference of distance {distance} at output position {position} points before the start of the data")]
    InvalidBackReference { distance: usize, position: usize },
    #[error("Declared size of {declared} bytes exceeds the limit of {limit} bytes")]
    MaxSizeExceeded { declared: usize, limit: usize },
}

/// Decode a complete Yaz0 stream.
pub fn decode(src: &[u8]) -> Result<Vec<u8>, DecompressError> {
    Decompressor::new(src)?.decompress().map(|result| result.data)
}

impl<'a> Decompressor<'a> {
    pub fn new(src: &'a [u8]) -> Result<Self, DecompressError> {
        let header = Header::parse(src)?;
        let decoded_len = header.decoded_len as usize;

        Ok(Self {
            src,
            dst: Vec::new(),

            header,
            decoded_len,

            read_index: HEADER_LEN,
            control: ControlWindow::default(),
        })
    }

    /// Refuse streams that declare more than `limit` decoded bytes.
    pub fn with_limit(self, limit: usize) -> Result<Self, DecompressError> {
        if self.decoded_len > limit {
            return Err(DecompressError::MaxSizeExceeded {
                declared: self.decoded_len,
                limit,
            });
        }

        Ok(self)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn decompress(mut self) -> Result<Decompressed, DecompressError> {
        let payload_len = self.src.len() - HEADER_LEN;
        self.dst = Vec::with_capacity(
            self.decoded_len
                .min(payload_len.saturating_mul(MAX_EXPANSION)),
        );

        while self.dst.len() < self.decoded_len {
            if self.control.advance() {
                let control = self.read()?;
                self.control.load(control);
            }

            let token = Token::decode(self.control.is_literal(), &mut self)?;
            log::trace!("token: {:?}", token);

            match token {
                Token::Literal(value) => self.dst.push(value),
                Token::BackRef { distance, length } => self.copy_backref(distance, length)?,
            }
        }

        Ok(Decompressed {
            data: self.dst,
            bytes_read: self.read_index,
        })
    }

    pub(crate) fn read(&mut self) -> Result<u8, DecompressError> {
        let value = *self
            .src
            .get(self.read_index)
            .ok_or(DecompressError::TruncatedInput {
                offset: self.read_index,
            })?;
        self.read_index += 1;

        Ok(value)
    }

    /// Source and destination may overlap when the distance is shorter than
    /// the length, so this has to stay a forward byte-by-byte copy.
    fn copy_backref(&mut self, distance: u16, length: usize) -> Result<(), DecompressError> {
        let back = distance as usize + 1;
        if back > self.dst.len() {
            return Err(DecompressError::InvalidBackReference {
                distance: distance as usize,
                position: self.dst.len(),
            });
        }

        let length = length.min(self.decoded_len - self.dst.len());
        for _ in 0..length {
            self.dst.push(self.dst[self.dst.len() - back]);
        }

        Ok(())
    }
}
