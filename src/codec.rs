//! Content codec: encoding detection, line-ending detection, and atomic
//! text writes.
//!
//! All in-memory matching and patch computation happens on LF-normalized
//! text; the codec converts back to the file's native line-ending style on
//! write so a CRLF file stays CRLF after an edit.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Text encoding of a file, as detected from its BOM.
///
/// Detection is best-effort: anything without a recognizable BOM is treated
/// as UTF-8. A UTF-8 BOM is tracked separately so it round-trips on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

/// Line-ending style of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Crlf,
}

/// Detect the encoding of a file by probing its BOM.
///
/// Read-only probe; unreadable or BOM-less files default to UTF-8.
pub fn detect_encoding(path: &Path) -> FileEncoding {
    match fs::read(path) {
        Ok(bytes) => sniff_encoding(&bytes),
        Err(_) => FileEncoding::Utf8,
    }
}

/// Detect the line-ending style of a file.
///
/// A CRLF pair anywhere in the file makes the whole file CRLF, else LF.
/// Mixed-ending files are not handled per line; the next write normalizes
/// them to a single style.
pub fn detect_line_endings(path: &Path) -> io::Result<LineEnding> {
    let bytes = fs::read(path)?;
    Ok(sniff_line_endings(&bytes))
}

/// BOM sniff over raw bytes.
pub fn sniff_encoding(bytes: &[u8]) -> FileEncoding {
    match Encoding::for_bom(bytes) {
        Some((enc, _)) if enc == UTF_16LE => FileEncoding::Utf16Le,
        Some((enc, _)) if enc == UTF_16BE => FileEncoding::Utf16Be,
        Some((enc, _)) if enc == UTF_8 => FileEncoding::Utf8Bom,
        _ => FileEncoding::Utf8,
    }
}

/// CRLF/LF sniff over raw bytes.
pub fn sniff_line_endings(bytes: &[u8]) -> LineEnding {
    if bytes.windows(2).any(|w| w == b"\r\n") {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    }
}

/// Decode raw file bytes with the given encoding, stripping any BOM.
pub fn decode(bytes: &[u8], encoding: FileEncoding) -> String {
    let enc = match encoding {
        FileEncoding::Utf8 | FileEncoding::Utf8Bom => UTF_8,
        FileEncoding::Utf16Le => UTF_16LE,
        FileEncoding::Utf16Be => UTF_16BE,
    };
    let (text, _, _) = enc.decode(bytes);
    text.into_owned()
}

/// Read and decode a file into LF-normalized text.
pub fn read_text(path: &Path, encoding: FileEncoding) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(normalize_line_endings(&decode(&bytes, encoding), LineEnding::Lf))
}

/// Normalize every line break in `content` to the requested style.
pub fn normalize_line_endings(content: &str, style: LineEnding) -> String {
    let lf = content.replace("\r\n", "\n");
    match style {
        LineEnding::Lf => lf,
        LineEnding::Crlf => lf.replace('\n', "\r\n"),
    }
}

/// Encode text for writing, re-adding the BOM the encoding calls for.
///
/// `encoding_rs` only decodes UTF-16, so UTF-16 output is produced from the
/// string's code units directly.
fn encode(content: &str, encoding: FileEncoding) -> Vec<u8> {
    match encoding {
        FileEncoding::Utf8 => content.as_bytes().to_vec(),
        FileEncoding::Utf8Bom => {
            let mut bytes = vec![0xEF, 0xBB, 0xBF];
            bytes.extend_from_slice(content.as_bytes());
            bytes
        }
        FileEncoding::Utf16Le => {
            let mut bytes = vec![0xFF, 0xFE];
            for unit in content.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            bytes
        }
        FileEncoding::Utf16Be => {
            let mut bytes = vec![0xFE, 0xFF];
            for unit in content.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            bytes
        }
    }
}

/// Write text content with the given encoding and line-ending style.
///
/// Line breaks are normalized to `style` before encoding, so patches
/// computed on LF-normalized text do not corrupt CRLF files.
pub fn write_text(
    path: &Path,
    content: &str,
    encoding: FileEncoding,
    style: LineEnding,
) -> io::Result<()> {
    let normalized = normalize_line_endings(content, style);
    atomic_write(path, &encode(&normalized, encoding))
}

/// Atomic file write: tempfile in the same directory + fsync + rename.
///
/// Either the full write succeeds or the original file is untouched.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory")
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_encoding_defaults_to_utf8() {
        assert_eq!(sniff_encoding(b"plain ascii"), FileEncoding::Utf8);
        assert_eq!(sniff_encoding(b""), FileEncoding::Utf8);
    }

    #[test]
    fn sniff_encoding_boms() {
        assert_eq!(sniff_encoding(b"\xEF\xBB\xBFhello"), FileEncoding::Utf8Bom);
        assert_eq!(sniff_encoding(b"\xFF\xFEh\x00"), FileEncoding::Utf16Le);
        assert_eq!(sniff_encoding(b"\xFE\xFF\x00h"), FileEncoding::Utf16Be);
    }

    #[test]
    fn sniff_line_endings_any_crlf_wins() {
        assert_eq!(sniff_line_endings(b"a\nb\n"), LineEnding::Lf);
        assert_eq!(sniff_line_endings(b"a\r\nb\n"), LineEnding::Crlf);
        // Mixed files are treated as CRLF wholesale.
        assert_eq!(sniff_line_endings(b"a\nb\r\nc\n"), LineEnding::Crlf);
    }

    #[test]
    fn path_detectors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, b"one\r\ntwo\r\n").unwrap();

        assert_eq!(detect_encoding(&path), FileEncoding::Utf8);
        assert_eq!(detect_line_endings(&path).unwrap(), LineEnding::Crlf);

        // Unreadable files fall back to UTF-8; line-ending probe propagates.
        let missing = dir.path().join("missing.txt");
        assert_eq!(detect_encoding(&missing), FileEncoding::Utf8);
        assert!(detect_line_endings(&missing).is_err());
    }

    #[test]
    fn normalize_round_trip() {
        assert_eq!(
            normalize_line_endings("a\r\nb\nc", LineEnding::Crlf),
            "a\r\nb\r\nc"
        );
        assert_eq!(
            normalize_line_endings("a\r\nb\r\nc", LineEnding::Lf),
            "a\nb\nc"
        );
    }

    #[test]
    fn decode_strips_bom() {
        assert_eq!(decode(b"\xEF\xBB\xBFhi", FileEncoding::Utf8Bom), "hi");
        assert_eq!(
            decode(b"\xFF\xFEh\x00i\x00", FileEncoding::Utf16Le),
            "hi"
        );
    }

    #[test]
    fn read_text_normalizes_to_lf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, b"one\r\ntwo\r\n").unwrap();

        let text = read_text(&path, FileEncoding::Utf8).unwrap();
        assert_eq!(text, "one\ntwo\n");
    }

    #[test]
    fn utf16_encode_round_trips() {
        let text = "héllo\nwörld";
        let bytes = encode(text, FileEncoding::Utf16Le);
        assert_eq!(sniff_encoding(&bytes), FileEncoding::Utf16Le);
        assert_eq!(decode(&bytes, FileEncoding::Utf16Le), text);
    }

    #[test]
    fn write_text_preserves_crlf_style() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.txt");
        write_text(&path, "a\nb\n", FileEncoding::Utf8, LineEnding::Crlf).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a\r\nb\r\n");
    }

    #[test]
    fn write_text_atomic_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "old").unwrap();
        write_text(&path, "new", FileEncoding::Utf8, LineEnding::Lf).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
