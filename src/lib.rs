mod compression;
pub use compression::{
    decode, DecompressError, Decompressed, Decompressor, Header, Token, HEADER_LEN, MAGIC,
};

mod profile;
pub use profile::{Profile, ProfileError, ProfileSet};

mod asset;
pub use asset::{scan, AssetError, DecodedAsset};
