mod decompress;
pub use decompress::{decode, DecompressError, Decompressed, Decompressor};

pub const MAGIC: [u8; 4] = *b"Yaz0";
pub const HEADER_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// size of the data once fully decompressed
    pub decoded_len: u32,
}

impl Header {
    /// Parse the 16 byte header at the start of a Yaz0 stream.
    ///
    /// Bytes 8..16 are reserved and only need to be present.
    pub fn parse(src: &[u8]) -> Result<Self, DecompressError> {
        let prefix = &src[..src.len().min(MAGIC.len())];
        if !MAGIC.starts_with(prefix) {
            return Err(DecompressError::InvalidMagic);
        }

        if src.len() < HEADER_LEN {
            return Err(DecompressError::TruncatedInput { offset: src.len() });
        }

        Ok(Self {
            decoded_len: u32::from_be_bytes([src[4], src[5], src[6], src[7]]),
        })
    }

    pub fn is_yaz0(src: &[u8]) -> bool {
        src.len() >= HEADER_LEN && src.starts_with(&MAGIC)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    /// copy `length` bytes starting `distance + 1` bytes behind the write cursor
    BackRef { distance: u16, length: usize },
}

impl Token {
    pub(crate) fn decode(
        literal: bool,
        decompressor: &mut Decompressor,
    ) -> Result<Self, DecompressError> {
        if literal {
            return Ok(Self::Literal(decompressor.read()?));
        }

        let b1 = decompressor.read()?;
        let b2 = decompressor.read()?;

        let distance = u16::from_be_bytes([b1 & 0x0f, b2]);
        let length = match b1 >> 4 {
            0 => decompressor.read()? as usize + 0x12,
            n => n as usize + 2,
        };

        Ok(Self::BackRef { distance, length })
    }
}

/// Tracks which bit of the current control byte classifies the next token.
/// Bits are consumed MSB first, eight tokens per control byte.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ControlWindow {
    control: u8,
    mask: u8,
}

impl ControlWindow {
    /// Move to the next bit. Returns true when the window is exhausted and a
    /// new control byte has to be loaded.
    pub(crate) fn advance(&mut self) -> bool {
        self.mask >>= 1;
        self.mask == 0
    }

    pub(crate) fn load(&mut self, control: u8) {
        self.control = control;
        self.mask = 0x80;
    }

    pub(crate) fn is_literal(&self) -> bool {
        (self.control & self.mask) != 0
    }
}
