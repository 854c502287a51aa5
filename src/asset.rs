use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

use crate::{DecompressError, Decompressor, Profile};

#[derive(Debug, Clone)]
pub struct DecodedAsset {
    pub path: PathBuf,
    pub data: Vec<u8>,
    /// compressed bytes consumed, header included
    pub bytes_read: usize,
    pub crc: u32,
}

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read asset file")]
    Read(#[from] io::Error),
    #[error("Failed to decompress asset")]
    Decompress(#[from] DecompressError),
    #[error("Decoded asset is {actual} bytes, expected {expected}")]
    UnexpectedSize { expected: usize, actual: usize },
}

impl DecodedAsset {
    pub fn open<P: AsRef<Path>>(path: P, profile: Option<&Profile>) -> Result<Self, AssetError> {
        let src = fs::read(path.as_ref())?;
        Self::from_compressed(path.as_ref().to_path_buf(), &src, profile)
    }

    pub fn from_compressed(
        path: PathBuf,
        src: &[u8],
        profile: Option<&Profile>,
    ) -> Result<Self, AssetError> {
        let mut decompressor = Decompressor::new(src)?;
        if let Some(expected) = profile.and_then(|profile| profile.decoded_len) {
            decompressor = decompressor.with_limit(expected as usize)?;
        }

        let result = decompressor.decompress()?;

        if let Some(profile) = profile {
            if !profile.check_len(result.data.len()) {
                return Err(AssetError::UnexpectedSize {
                    expected: profile.decoded_len.unwrap_or_default() as usize,
                    actual: result.data.len(),
                });
            }
        }

        Ok(Self {
            path,
            crc: crc32fast::hash(&result.data),
            data: result.data,
            bytes_read: result.bytes_read,
        })
    }

    pub fn trailing_bytes(&self, compressed_len: usize) -> usize {
        compressed_len.saturating_sub(self.bytes_read)
    }
}

/// Collect every file below `dir` the profile matches, sorted by path.
/// Profiles are matched against the path relative to `dir`.
pub fn scan<P: AsRef<Path>>(dir: P, profile: &Profile) -> Vec<PathBuf> {
    let dir = dir.as_ref();
    let mut found = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| {
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            entry.file_type().is_file() && profile.matches(relative)
        })
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();

    found.sort();
    found
}
