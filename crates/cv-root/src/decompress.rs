//! Inflation of ROOT compression blocks.
//!
//! A compressed object is a sequence of blocks, each with a 9-byte header:
//! ```text
//! bytes 0-1  algorithm tag: "ZL" zlib, "L4" lz4, "ZS" zstd, "XZ" lzma
//! byte  2    method (unused here)
//! bytes 3-5  compressed size, 24-bit little-endian
//! bytes 6-8  uncompressed size, 24-bit little-endian
//! ```

use std::io::Read;

use crate::error::{Result, RootError};

const BLOCK_HEADER_LEN: usize = 9;
const LZ4_CHECKSUM_LEN: usize = 8;

/// Inflate `src` into exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut offset = 0;

    while out.len() < expected_len {
        let header = src.get(offset..offset + BLOCK_HEADER_LEN).ok_or_else(|| {
            RootError::Decompression(format!(
                "truncated block header at {offset} ({} of {expected_len} bytes inflated)",
                out.len()
            ))
        })?;
        let compressed_len = le24(&header[3..6]);
        let inflated_len = le24(&header[6..9]);
        offset += BLOCK_HEADER_LEN;

        let payload = src.get(offset..offset + compressed_len).ok_or_else(|| {
            RootError::Decompression(format!(
                "block claims {compressed_len} compressed bytes, {} available",
                src.len().saturating_sub(offset)
            ))
        })?;

        let block = match &header[..2] {
            b"ZL" => inflate_zlib(payload, inflated_len)?,
            b"L4" => inflate_lz4(payload, inflated_len)?,
            b"ZS" => inflate_zstd(payload, inflated_len)?,
            b"XZ" => inflate_xz(payload, inflated_len)?,
            tag => {
                return Err(RootError::Decompression(format!(
                    "unsupported compression tag {:?}",
                    String::from_utf8_lossy(tag)
                )));
            }
        };
        if block.len() != inflated_len {
            return Err(RootError::Decompression(format!(
                "block inflated to {} bytes, header says {inflated_len}",
                block.len()
            )));
        }
        out.extend_from_slice(&block);
        offset += compressed_len;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "inflated {} bytes, expected {expected_len}",
            out.len()
        )));
    }
    Ok(out)
}

fn inflate_zlib(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected);
    flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| RootError::Decompression(format!("zlib: {e}")))?;
    Ok(out)
}

fn inflate_lz4(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    // An xxhash64 checksum of the payload precedes the raw LZ4 block.
    let block = data.get(LZ4_CHECKSUM_LEN..).ok_or_else(|| {
        RootError::Decompression("lz4 block shorter than its checksum".into())
    })?;
    lz4_flex::decompress(block, expected).map_err(|e| RootError::Decompression(format!("lz4: {e}")))
}

fn inflate_zstd(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; expected];
    let mut decoder = ruzstd::decoding::FrameDecoder::new();
    let written = decoder
        .decode_all(data, &mut out)
        .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
    out.truncate(written);
    Ok(out)
}

fn inflate_xz(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut input = std::io::BufReader::new(data);
    let mut out = Vec::with_capacity(expected);
    lzma_rs::xz_decompress(&mut input, &mut out)
        .map_err(|e| RootError::Decompression(format!("xz: {e}")))?;
    Ok(out)
}

fn le24(b: &[u8]) -> usize {
    usize::from(b[0]) | usize::from(b[1]) << 8 | usize::from(b[2]) << 16
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn root_block(tag: &[u8; 2], compressed: &[u8], inflated_len: usize) -> Vec<u8> {
        let mut block = tag.to_vec();
        block.push(0);
        block.extend_from_slice(&(compressed.len() as u32).to_le_bytes()[..3]);
        block.extend_from_slice(&(inflated_len as u32).to_le_bytes()[..3]);
        block.extend_from_slice(compressed);
        block
    }

    #[test]
    fn le24_reads_little_endian() {
        assert_eq!(le24(&[0x01, 0x00, 0x00]), 1);
        assert_eq!(le24(&[0x00, 0x01, 0x00]), 256);
        assert_eq!(le24(&[0xff, 0xff, 0xff]), 0xFF_FFFF);
    }

    #[test]
    fn zlib_block() {
        let original = b"ene_l ene_l ene_l length length length".repeat(4);
        let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(&original).unwrap();
        let block = root_block(b"ZL", &enc.finish().unwrap(), original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn two_zlib_blocks_concatenate() {
        let parts: [&[u8]; 2] = [b"first half of the basket ", b"second half of the basket"];
        let mut src = Vec::new();
        for part in parts {
            let mut enc =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
            enc.write_all(part).unwrap();
            src.extend(root_block(b"ZL", &enc.finish().unwrap(), part.len()));
        }
        let total = parts.iter().map(|p| p.len()).sum();
        assert_eq!(decompress(&src, total).unwrap(), parts.concat());
    }

    #[test]
    fn lz4_block_skips_checksum() {
        let original = b"cathode anode cathode anode cathode anode".to_vec();
        let mut payload = vec![0u8; LZ4_CHECKSUM_LEN];
        payload.extend(lz4_flex::compress(&original));
        let block = root_block(b"L4", &payload, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn zstd_block() {
        let original = b"zstd payload zstd payload zstd payload".to_vec();
        let compressed = ruzstd::encoding::compress_to_vec(
            &original[..],
            ruzstd::encoding::CompressionLevel::Fastest,
        );
        let block = root_block(b"ZS", &compressed, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn xz_block() {
        let original = b"xz payload xz payload xz payload".to_vec();
        let mut compressed = Vec::new();
        lzma_rs::xz_compress(&mut std::io::BufReader::new(&original[..]), &mut compressed)
            .unwrap();
        let block = root_block(b"XZ", &compressed, original.len());
        assert_eq!(decompress(&block, original.len()).unwrap(), original);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let block = root_block(b"QQ", &[0u8; 4], 4);
        let err = decompress(&block, 4).unwrap_err();
        assert!(err.to_string().contains("unsupported compression tag"));
    }

    #[test]
    fn truncated_input_is_rejected() {
        let block = root_block(b"ZL", &[0u8; 16], 32);
        assert!(decompress(&block[..12], 32).is_err());
    }
}
