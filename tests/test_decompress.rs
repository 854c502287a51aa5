use std::fs;
use yaz0::{DecompressError, Decompressor, Header, HEADER_LEN};

const DATA_DIR: &str = "tests/decompress_data";

#[test]
fn test_decompress() -> anyhow::Result<()> {
    let mut checked = 0;

    for entry in fs::read_dir(DATA_DIR)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("szs") {
            continue;
        }

        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let src = fs::read(&path)?;
        let expected = fs::read(path.with_extension("bin"))?;

        assert!(Header::is_yaz0(&src), "{} is missing the Yaz0 header", name);

        let result = Decompressor::new(&src)?.decompress()?;
        if expected != result.data {
            panic!("Decompressed data does not match for {}", name);
        } else {
            println!("Decompressed data matches for {}", name);
        }

        assert_eq!(result.bytes_read, src.len(), "{} left unread bytes", name);
        checked += 1;
    }

    assert_eq!(checked, 5);

    Ok(())
}

#[test]
fn test_truncated_fixture() -> anyhow::Result<()> {
    let src = fs::read(format!("{}/text.szs", DATA_DIR))?;

    for len in [HEADER_LEN + 1, src.len() / 2, src.len() - 1] {
        assert!(
            matches!(
                yaz0::decode(&src[..len]),
                Err(DecompressError::TruncatedInput { .. })
            ),
            "cutting the stream at {} should fail",
            len
        );
    }

    Ok(())
}

#[test]
fn test_decoded_length_header_controls_output() -> anyhow::Result<()> {
    let mut src = fs::read(format!("{}/long_run.szs", DATA_DIR))?;
    let expected = fs::read(format!("{}/long_run.bin", DATA_DIR))?;

    // stop inside the leading run of zeros
    src[4..8].copy_from_slice(&100u32.to_be_bytes());
    assert_eq!(yaz0::decode(&src)?, &expected[..100]);

    Ok(())
}
