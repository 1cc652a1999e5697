use std::io::Read;

use flate2::bufread::{GzDecoder, ZlibDecoder};

use crate::{Cell, FlipFlags, TmxError};

/// How the text of a `<data>` element encodes the tile grid.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DataFormat {
    /// One `<tile gid=..>` child per cell.
    Xml,
    Csv,
    Base64(Compression),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Compression {
    None,
    Zlib,
    Gzip,
}

impl DataFormat {
    /// Chooses the format from the encoding/compression attributes. Values
    /// outside the vocabulary fall back the same way absent ones do: csv
    /// ignores compression, an unrecognized compression means plain base64,
    /// an unrecognized encoding means per-child gid attributes.
    pub fn detect(encoding: Option<&str>, compression: Option<&str>) -> Self {
        match encoding {
            Some("csv") => DataFormat::Csv,
            Some("base64") => match compression {
                Some("zlib") => DataFormat::Base64(Compression::Zlib),
                Some("gzip") => DataFormat::Base64(Compression::Gzip),
                _ => DataFormat::Base64(Compression::None),
            },
            _ => DataFormat::Xml,
        }
    }
}

const FLIP_MASK: u32 = FlipFlags::all().bits();

/// Splits a raw gid into the masked id and the flip flags held in bits
/// 31, 30 and 29.
pub fn decode_gid(raw: u32) -> (u32, FlipFlags) {
    (raw & !FLIP_MASK, FlipFlags::from_bits_truncate(raw))
}

fn sextet(c: u8) -> Result<u32, TmxError> {
    match c {
        b'A'..=b'Z' => Ok(u32::from(c - b'A')),
        b'a'..=b'z' => Ok(u32::from(c - b'a') + 26),
        b'0'..=b'9' => Ok(u32::from(c - b'0') + 52),
        b'+' => Ok(0x3e),
        b'/' => Ok(0x3f),
        _ => Err(TmxError::InvalidBase64Character { character: char::from(c) }),
    }
}

/// Decodes standard base64 after stripping whitespace. The cleaned length
/// must be a multiple of 4; one or two trailing '=' truncate the final byte
/// group to two or one bytes.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, TmxError> {
    let clean: Vec<u8> = input.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if clean.len() % 4 != 0 {
        return Err(TmxError::InvalidBase64Length { length: clean.len() });
    }

    let mut decoded = Vec::with_capacity(clean.len() / 4 * 3);
    let quads = clean.len() / 4;
    for (index, quad) in clean.chunks_exact(4).enumerate() {
        let padding = if index + 1 == quads {
            quad.iter().rev().take_while(|&&c| c == b'=').count()
        } else {
            0
        };
        if padding > 2 || quad[..4 - padding].contains(&b'=') {
            return Err(TmxError::InvalidBase64Character { character: '=' });
        }

        // The decoded 24-bit quantum
        let mut quantum = 0u32;
        for &c in &quad[..4 - padding] {
            quantum = quantum << 6 | sextet(c)?;
        }
        quantum <<= 6 * padding as u32;

        decoded.push((quantum >> 16) as u8);
        if padding < 2 {
            decoded.push((quantum >> 8) as u8);
        }
        if padding == 0 {
            decoded.push(quantum as u8);
        }
    }
    Ok(decoded)
}

const INFLATE_CHUNK: usize = 1024;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decompresses a zlib or gzip stream, detecting the framing from the
/// header. The whole input must belong to the stream.
pub fn inflate(input: &[u8]) -> Result<Vec<u8>, TmxError> {
    if input.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(input);
        let output = drain(&mut decoder)?;
        ensure_consumed(decoder.into_inner())?;
        Ok(output)
    } else {
        let mut decoder = ZlibDecoder::new(input);
        let output = drain(&mut decoder)?;
        ensure_consumed(decoder.into_inner())?;
        Ok(output)
    }
}

fn drain(decoder: &mut impl Read) -> Result<Vec<u8>, TmxError> {
    let mut output = Vec::new();
    let mut chunk = [0u8; INFLATE_CHUNK];
    loop {
        let read = decoder.read(&mut chunk).map_err(TmxError::CorruptStream)?;
        if read == 0 {
            break;
        }
        output.extend_from_slice(&chunk[..read]);
    }
    Ok(output)
}

fn ensure_consumed(remaining: &[u8]) -> Result<(), TmxError> {
    if remaining.is_empty() {
        Ok(())
    } else {
        Err(TmxError::TrailingData { remaining: remaining.len() })
    }
}

/// Turns the little-endian byte stream of a decoded payload into cells.
pub fn cells_from_bytes(bytes: &[u8]) -> Result<Vec<Cell>, TmxError> {
    if bytes.len() % 4 != 0 {
        return Err(TmxError::InvalidDataLength { length: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|quad| Cell::from_raw_gid(u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]])))
        .collect())
}

/// Parses a comma-separated gid list.
pub fn cells_from_csv(text: &str) -> Result<Vec<Cell>, TmxError> {
    text.split(',')
        .map(|token| {
            let token = token.trim();
            let raw: u32 = token
                .parse()
                .map_err(|_| TmxError::InvalidCsvToken { token: String::from(token) })?;
            Ok(Cell::from_raw_gid(raw))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use flate2::write::{GzEncoder, ZlibEncoder};

    use super::*;
    use crate::TmxError;

    #[test]
    fn base64_full_quantum() {
        assert_eq!(decode_base64("TWFu").unwrap(), b"Man");
    }

    #[test]
    fn base64_padding() {
        assert_eq!(decode_base64("TWE=").unwrap(), b"Ma");
        assert_eq!(decode_base64("TQ==").unwrap(), b"M");
    }

    #[test]
    fn base64_ignores_whitespace() {
        assert_eq!(decode_base64(" TW\nFu\t ").unwrap(), b"Man");
        assert_eq!(decode_base64("").unwrap(), b"");
    }

    #[test]
    fn base64_rejects_bad_length() {
        assert!(matches!(
            decode_base64("TWFuTQ"),
            Err(TmxError::InvalidBase64Length { length: 6 })
        ));
    }

    #[test]
    fn base64_rejects_bad_alphabet() {
        assert!(matches!(
            decode_base64("TW-u"),
            Err(TmxError::InvalidBase64Character { character: '-' })
        ));
        // '=' anywhere but the final one or two positions
        assert!(decode_base64("T=Fu").is_err());
        assert!(decode_base64("TW=u").is_err());
    }

    #[test]
    fn gid_flags_round_trip() {
        let flag_sets = [
            FlipFlags::empty(),
            FlipFlags::HORIZONTAL,
            FlipFlags::VERTICAL,
            FlipFlags::DIAGONAL,
            FlipFlags::HORIZONTAL | FlipFlags::VERTICAL,
            FlipFlags::HORIZONTAL | FlipFlags::DIAGONAL,
            FlipFlags::VERTICAL | FlipFlags::DIAGONAL,
            FlipFlags::all(),
        ];
        for flags in flag_sets {
            let raw = 1337 | flags.bits();
            let (gid, decoded) = decode_gid(raw);
            assert_eq!(gid, 1337);
            assert_eq!(decoded, flags);
            assert_eq!(gid | decoded.bits(), raw);
        }
    }

    #[test]
    fn inflate_zlib_round_trip() {
        let gids: Vec<u32> = (0..2000u32).map(|i| i | (i % 8) << 29).collect();
        let bytes: Vec<u8> = gids.iter().flat_map(|gid| gid.to_le_bytes()).collect();

        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&bytes).unwrap();
        let compressed = encoder.finish().unwrap();

        let cells = cells_from_bytes(&inflate(&compressed).unwrap()).unwrap();
        assert_eq!(cells.len(), gids.len());
        for (cell, &raw) in cells.iter().zip(&gids) {
            assert_eq!(cell.raw_gid(), raw);
            assert_eq!(cell.gid, raw & 0x1fff_ffff);
        }
    }

    #[test]
    fn inflate_gzip_round_trip() {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"gzip framed payload").unwrap();
        let compressed = encoder.finish().unwrap();
        assert_eq!(inflate(&compressed).unwrap(), b"gzip framed payload");
    }

    #[test]
    fn inflate_rejects_corrupt_stream() {
        assert!(matches!(
            inflate(&[0x78, 0x9c, 0xff, 0xff, 0xff, 0xff]),
            Err(TmxError::CorruptStream(_))
        ));
    }

    #[test]
    fn inflate_rejects_trailing_input() {
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"payload").unwrap();
        let mut compressed = encoder.finish().unwrap();
        compressed.extend_from_slice(b"junk");
        assert!(matches!(
            inflate(&compressed),
            Err(TmxError::TrailingData { remaining: 4 })
        ));
    }

    #[test]
    fn cells_follow_little_endian_layout() {
        let cells = cells_from_bytes(&[0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x80]).unwrap();
        assert_eq!(cells[0].gid, 1);
        assert!(cells[0].flags.is_empty());
        assert_eq!(cells[1].gid, 2);
        assert!(cells[1].flipped_horizontally());
    }

    #[test]
    fn cells_reject_ragged_byte_count() {
        assert!(matches!(
            cells_from_bytes(&[1, 0, 0]),
            Err(TmxError::InvalidDataLength { length: 3 })
        ));
    }

    #[test]
    fn csv_cells() {
        let cells = cells_from_csv("1, 2,\n0, 3").unwrap();
        let gids: Vec<u32> = cells.iter().map(|cell| cell.gid).collect();
        assert_eq!(gids, [1, 2, 0, 3]);
        assert!(cells[2].is_empty());
    }

    #[test]
    fn csv_applies_flip_flags() {
        let cells = cells_from_csv("2147483649").unwrap();
        assert_eq!(cells[0].gid, 1);
        assert!(cells[0].flipped_horizontally());
    }

    #[test]
    fn csv_rejects_junk_tokens() {
        assert!(matches!(
            cells_from_csv("1,x,3"),
            Err(TmxError::InvalidCsvToken { .. })
        ));
    }

    #[test]
    fn format_detection() {
        assert_eq!(DataFormat::detect(None, None), DataFormat::Xml);
        assert_eq!(DataFormat::detect(Some("csv"), Some("zlib")), DataFormat::Csv);
        assert_eq!(
            DataFormat::detect(Some("base64"), None),
            DataFormat::Base64(Compression::None)
        );
        assert_eq!(
            DataFormat::detect(Some("base64"), Some("zlib")),
            DataFormat::Base64(Compression::Zlib)
        );
        assert_eq!(
            DataFormat::detect(Some("base64"), Some("gzip")),
            DataFormat::Base64(Compression::Gzip)
        );
        assert_eq!(
            DataFormat::detect(Some("base64"), Some("lzma")),
            DataFormat::Base64(Compression::None)
        );
    }
}
