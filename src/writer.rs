/*!
 * Map writer for codemapper
 *
 * The map is written to a temporary file next to the destination and moved
 * into place only once it is complete, so an interrupted or failed run
 * never leaves a truncated map at the output path.
 */

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;

use crate::error::{CodeMapError, Result};
use crate::types::ScanOutput;
use crate::utils::TOOL_DIR;

/// Writer for a finished map
pub struct MapWriter {
    output_file: PathBuf,
}

impl MapWriter {
    /// Create a new map writer
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }

    /// `codemapper/output/code_map.txt`, optionally with a timestamp suffix
    pub fn default_output_path(timestamp: Option<DateTime<Local>>) -> PathBuf {
        let name = match timestamp {
            Some(ts) => format!("code_map_{}.txt", ts.format("%m%d%y-%H%M")),
            None => "code_map.txt".to_string(),
        };
        PathBuf::from(TOOL_DIR).join("output").join(name)
    }

    /// Write the map atomically, creating parent folders as needed
    pub fn write(&self, output: &ScanOutput) -> Result<()> {
        let fail = |e: io::Error| CodeMapError::serialization(&self.output_file, e);

        let parent = match self.output_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(fail)?;

        let temp = NamedTempFile::new_in(&parent).map_err(fail)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            writer.write_all(output.text.as_bytes()).map_err(fail)?;
            writer.flush().map_err(fail)?;
        }
        temp.as_file().sync_all().map_err(fail)?;

        temp.persist(&self.output_file)
            .map_err(|e| CodeMapError::serialization(&self.output_file, e.error))?;

        log::info!("Map written: {}", self.output_file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::MapSerializer;
    use crate::types::FileRecord;
    use tempfile::tempdir;

    fn sample_output() -> ScanOutput {
        let mut serializer = MapSerializer::new(Local::now());
        serializer.push(&FileRecord::text("a.rs", "fn a() {}\n".to_string(), 10));
        serializer.finish()
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            MapWriter::default_output_path(None),
            PathBuf::from("codemapper/output/code_map.txt")
        );

        let name = MapWriter::default_output_path(Some(Local::now()));
        let file_name = name.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("code_map_"));
        assert_eq!(file_name.len(), "code_map_MMDDYY-HHMM.txt".len());
    }

    #[test]
    fn test_write_creates_parents_and_replaces() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("maps").join("nested").join("map.txt");
        let output = sample_output();

        let writer = MapWriter::new(&path);
        writer.write(&output)?;
        assert_eq!(fs::read_to_string(&path)?, output.text);

        fs::write(&path, "stale")?;
        writer.write(&output)?;
        assert_eq!(fs::read_to_string(&path)?, output.text);

        // no temp files left next to the map
        assert_eq!(fs::read_dir(path.parent().unwrap())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_unwritable_destination_keeps_old_file() -> io::Result<()> {
        let dir = tempdir()?;
        // the destination is a non-empty directory, so the final rename fails
        let path = dir.path().join("map.txt");
        fs::create_dir(&path)?;
        fs::write(path.join("keep"), "x")?;

        let err = MapWriter::new(&path).write(&sample_output()).unwrap_err();
        assert!(matches!(err, CodeMapError::Serialization { .. }));
        assert!(path.join("keep").exists());
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
