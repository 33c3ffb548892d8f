/*!
 * Text/binary classification of accepted files
 *
 * Classification is driven by the file extension. Content is only sniffed for
 * files without an extension, and only when sniffing is enabled.
 */

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use crate::config::ScanConfig;
use crate::types::Classification;

/// Bytes inspected when sniffing an extension-less file
const SNIFF_LEN: u64 = 8192;

/// A classified file with its size and, for text, its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub classification: Classification,
    pub size: u64,
    pub content: Option<String>,
}

impl Classified {
    fn new(classification: Classification, size: u64) -> Self {
        Self {
            classification,
            size,
            content: None,
        }
    }
}

/// Lower-case extension key of a file name, including the dot.
///
/// Dotfiles without a further extension (`.env`, `.gitignore`) use their
/// whole name as key. Returns `None` when the name has no extension.
pub fn extension_key(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();

    match name.rfind('.') {
        Some(0) => Some(name),
        Some(idx) if idx + 1 < name.len() => Some(name[idx..].to_string()),
        _ => None,
    }
}

/// Heuristic for text content: valid UTF-8 and few control bytes
pub fn looks_like_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return true;
    }
    if std::str::from_utf8(sample).is_err() {
        return false;
    }

    // Count binary characters (0x00-0x08, 0x0E-0x1F)
    let binary_count = sample
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    (binary_count as f32 / sample.len() as f32) < 0.1
}

/// Classify one file.
///
/// Never fails: access errors become `SkippedUnreadable`, and invalid UTF-8
/// in a text file is decoded with replacement characters.
pub fn classify(path: &Path, config: &ScanConfig) -> Classified {
    match try_classify(path, config) {
        Ok(classified) => classified,
        Err(e) => {
            log::warn!("Cannot read {}: {}", path.display(), e);
            Classified::new(Classification::SkippedUnreadable, 0)
        }
    }
}

fn try_classify(path: &Path, config: &ScanConfig) -> io::Result<Classified> {
    let metadata = fs::metadata(path)?;
    let size = metadata.len();

    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }

    if size > config.max_file_size {
        return Ok(Classified::new(Classification::SkippedTooLarge, size));
    }

    let is_text = match extension_key(path) {
        Some(key) => config.is_text_extension(&key),
        None if config.sniff_extensionless => sniff(path)?,
        None => false,
    };

    if !is_text {
        return Ok(Classified::new(Classification::Binary, size));
    }

    let bytes = fs::read(path)?;
    Ok(Classified {
        classification: Classification::Text,
        size,
        content: Some(String::from_utf8_lossy(&bytes).into_owned()),
    })
}

fn sniff(path: &Path) -> io::Result<bool> {
    let mut sample = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut sample)?;
    Ok(looks_like_text(&sample))
}
