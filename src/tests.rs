/*!
 * Tests for codemapper functionality
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use indicatif::ProgressBar;
use tempfile::tempdir;

use crate::config::{Args, Config, ScanConfig, ScanConfigBuilder};
use crate::profile::ProfileStore;
use crate::scanner::Scanner;
use crate::types::ScanOutput;
use crate::writer::MapWriter;

// Helper function to write a file, creating parent folders
fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content)
}

// Helper function to create a small project tree
fn setup_test_directory() -> io::Result<tempfile::TempDir> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();

    write_file(&root.join("a.php"), b"<?php ok;")?;
    write_file(&root.join("logo.png"), &[0x89, b'P', b'N', b'G', 0, 0])?;
    write_file(&root.join("node_modules").join("pkg").join("index.js"), b"module.exports = 1;\n")?;
    write_file(&root.join("node_modules").join("pkg").join("logo.png"), &[0, 1, 2])?;

    Ok(temp_dir)
}

fn scan(config: ScanConfig) -> io::Result<ScanOutput> {
    let scanner = Scanner::new(config, Arc::new(ProgressBar::hidden()));
    let generated_at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    Ok(scanner.scan_at(generated_at)?)
}

#[test]
fn test_basic_map() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = scan(ScanConfigBuilder::new(temp_dir.path()).build())?;

    assert_eq!(
        output.text,
        "MAP: Generated 2024-01-02 03:04:05\n\
         --a.php\n\
         \n\
         <?php ok;\n\
         ----\n\
         --logo.png\n\
         --SUMMARY\n\
         Text:1 Binary:1 Skipped:0\n"
    );
    assert!(!output.text.contains("node_modules"));
    assert_eq!(output.summary.text, 1);
    assert_eq!(output.summary.binary, 1);
    assert_eq!(output.summary.skipped, 0);
    Ok(())
}

#[test]
fn test_oversized_file_is_skipped() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let big = "x".repeat(2 * 1024 * 1024);
    write_file(&temp_dir.path().join("dump.sql"), big.as_bytes())?;
    write_file(&temp_dir.path().join("small.sql"), b"select 1;\n")?;

    let config = ScanConfigBuilder::new(temp_dir.path())
        .max_file_size_mb(1)
        .build();
    let output = scan(config)?;

    assert!(!output.text.contains("dump.sql"));
    assert!(!output.text.contains("xxxx"));
    assert!(output.text.contains("--small.sql\n\nselect 1;\n----\n"));
    assert_eq!(output.summary.skipped, 1);
    assert_eq!(output.summary.too_large, 1);
    assert!(output.text.ends_with("Text:1 Binary:0 Skipped:1\n"));
    Ok(())
}

#[test]
fn test_excluded_file_counted_as_skipped() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(&temp_dir.path().join(".env"), b"SECRET=1\n")?;
    write_file(&temp_dir.path().join("index.php"), b"<?php\n")?;

    let config = ScanConfigBuilder::new(temp_dir.path())
        .excluded_files([".env"])
        .build();
    let output = scan(config)?;

    assert!(!output.text.contains(".env"));
    assert!(!output.text.contains("SECRET"));
    assert_eq!(output.summary.excluded, 1);
    assert!(output.text.ends_with("Text:1 Binary:0 Skipped:1\n"));
    Ok(())
}

#[test]
fn test_dotfile_with_text_key_is_embedded() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(&temp_dir.path().join(".env"), b"APP_ENV=local\n")?;

    let output = scan(ScanConfigBuilder::new(temp_dir.path()).build())?;
    assert!(output.text.contains("--.env\n\nAPP_ENV=local\n----\n"));
    Ok(())
}

#[test]
fn test_overlapping_roots_emit_once() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(&temp_dir.path().join("app").join("model.php"), b"<?php\n")?;

    let config = ScanConfigBuilder::new(temp_dir.path())
        .add_source_root(temp_dir.path().join("app"))
        .build();
    let output = scan(config)?;

    assert_eq!(output.text.matches("model.php").count(), 1);
    assert_eq!(output.summary.total(), 1);
    Ok(())
}

#[test]
fn test_skip_dirs_win_over_unrelated_includes() -> io::Result<()> {
    let temp_dir = tempdir()?;
    write_file(&temp_dir.path().join("src").join("app.js"), b"app();\n")?;
    write_file(
        &temp_dir.path().join("src").join("node_modules").join("dep.js"),
        b"dep();\n",
    )?;

    let config = ScanConfigBuilder::new(temp_dir.path())
        .included_folders(["src"])
        .included_files(["app.js", "dep.js"])
        .build();
    let output = scan(config)?;

    assert!(output.text.contains("--src/app.js"));
    assert!(!output.text.contains("dep.js"));
    Ok(())
}

#[test]
fn test_idempotent_apart_from_timestamp() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    write_file(&temp_dir.path().join("src").join("b.ts"), b"export {}\n")?;
    write_file(&temp_dir.path().join("src").join("a.ts"), b"export {}\n")?;

    let config = ScanConfigBuilder::new(temp_dir.path()).build();
    let first = Scanner::new(config.clone(), Arc::new(ProgressBar::hidden())).scan()?;
    let second = Scanner::new(config, Arc::new(ProgressBar::hidden())).scan()?;

    let body = |text: &str| text.split_once('\n').map(|(_, rest)| rest.to_string());
    assert_eq!(body(&first.text), body(&second.text));
    assert_eq!(first.summary.total(), second.summary.total());
    Ok(())
}

#[test]
fn test_parallel_matches_sequential() -> io::Result<()> {
    let temp_dir = tempdir()?;
    for i in 0..300 {
        let ext = if i % 3 == 0 { "bin" } else { "rs" };
        let path = temp_dir
            .path()
            .join(format!("dir{}", i % 7))
            .join(format!("file{:03}.{}", i, ext));
        write_file(&path, format!("// {}\n", i).as_bytes())?;
    }

    let sequential = scan(ScanConfigBuilder::new(temp_dir.path()).build())?;
    let parallel = scan(
        ScanConfigBuilder::new(temp_dir.path())
            .num_threads(4)
            .build(),
    )?;

    assert_eq!(sequential.text, parallel.text);
    assert_eq!(sequential.summary, parallel.summary);
    assert_eq!(sequential.summary.total(), 300);
    Ok(())
}

#[test]
fn test_count_matches_visited_files() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    write_file(&temp_dir.path().join("big.txt"), &vec![b'a'; 4096])?;
    write_file(&temp_dir.path().join("skip.md"), b"# skip\n")?;

    let config = ScanConfigBuilder::new(temp_dir.path())
        .max_file_size(1024)
        .excluded_files(["skip.md"])
        .build();
    let output = scan(config)?;

    // a.php, logo.png, big.txt, skip.md; node_modules is never visited
    assert_eq!(output.summary.total(), 4);
    assert_eq!(output.summary.text, 1);
    assert_eq!(output.summary.binary, 1);
    assert_eq!(output.summary.skipped, 2);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_broken_symlink_does_not_abort() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    std::os::unix::fs::symlink(
        temp_dir.path().join("missing.php"),
        temp_dir.path().join("broken.php"),
    )?;

    let output = scan(ScanConfigBuilder::new(temp_dir.path()).build())?;
    assert!(!output.text.contains("broken.php"));
    assert_eq!(output.summary.unreadable, 1);
    assert!(output.text.ends_with("Text:1 Binary:1 Skipped:1\n"));
    Ok(())
}

#[test]
fn test_missing_root_fails_before_scan() {
    let config = ScanConfigBuilder::new("/definitely/not/here/codemapper").build();
    let err = scan(config).unwrap_err();
    assert!(err.to_string().contains("Source folder not found"));
}

#[test]
fn test_written_map_matches_output() -> io::Result<()> {
    let temp_dir = setup_test_directory()?;
    let output = scan(ScanConfigBuilder::new(temp_dir.path()).build())?;

    let map_path = temp_dir.path().join("codemapper").join("output").join("code_map.txt");
    MapWriter::new(&map_path).write(&output)?;
    assert_eq!(fs::read_to_string(&map_path)?, output.text);

    // the tool's own output folder is never mapped
    let again = scan(ScanConfigBuilder::new(temp_dir.path()).build())?;
    assert!(!again.text.contains("code_map.txt"));
    assert_eq!(again.text, output.text);
    Ok(())
}

#[test]
fn test_output_in_root_only_hides_itself() -> io::Result<()> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("project");
    write_file(&root.join("notes.txt"), b"previous map\n")?;
    write_file(&root.join("docs").join("notes.txt"), b"keep me\n")?;

    let args = Args {
        src: vec![root.display().to_string()],
        output: Some(root.join("notes.txt").display().to_string()),
        ..Args::default()
    };
    let store = ProfileStore::new(temp_dir.path().join("profiles"));
    let config = Config::resolve(&args, &store)?;
    let output = scan(config.scan)?;

    assert!(output.text.contains("--docs/notes.txt\n\nkeep me\n----\n"));
    assert!(!output.text.contains("previous map"));
    assert!(output.text.ends_with("Text:1 Binary:0 Skipped:0\n"));
    Ok(())
}
