/*!
 * Tests for file system utilities
 */

use anyhow::Result;
use std::path::Path;
use subedit::file_utils::{FileManager, FileType};

use crate::common;

/// Test file existence checks
#[test]
fn test_fileExists_shouldOnlyAcceptFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.dfxp", "x")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.dfxp")));
    Ok(())
}

/// Test output path generation
#[test]
fn test_generateOutputPath_shouldInsertTag() {
    let path = FileManager::generate_output_path("/videos/talk.en.dfxp", "/out", "fr", "dfxp");
    assert_eq!(path, Path::new("/out/talk.en.fr.dfxp"));

    let path = FileManager::generate_output_path("talk.dfxp", "", "shifted", "dfxp");
    assert_eq!(path, Path::new("talk.shifted.dfxp"));
}

/// Test writing into a directory that does not exist yet
#[test]
fn test_writeToFile_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("deeper").join("out.dfxp");

    FileManager::write_to_file(&path, "content")?;
    assert_eq!(std::fs::read_to_string(&path)?, "content");
    Ok(())
}

/// Test file type detection by extension and content
#[test]
fn test_detectFileType_shouldRecognizeCaptionDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let by_extension = common::create_test_file(temp_dir.path(), "a.TTML", "anything")?;
    let by_content = common::create_test_dfxp(temp_dir.path(), "captions.txt")?;
    let with_prolog = common::create_test_file(
        temp_dir.path(),
        "prolog.bin",
        "<?xml version=\"1.0\"?>\n<tt xml:lang=\"en\"></tt>",
    )?;
    let other = common::create_test_file(temp_dir.path(), "notes.txt", "just text")?;

    assert_eq!(FileManager::detect_file_type(&by_extension)?, FileType::CaptionDocument);
    assert_eq!(FileManager::detect_file_type(&by_content)?, FileType::CaptionDocument);
    assert_eq!(FileManager::detect_file_type(&with_prolog)?, FileType::CaptionDocument);
    assert_eq!(FileManager::detect_file_type(&other)?, FileType::Unknown);
    assert!(FileManager::detect_file_type(temp_dir.path().join("missing.dfxp")).is_err());
    Ok(())
}

/// Test directory creation
#[test]
fn test_ensureDir_shouldCreateNestedDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    assert!(nested.is_dir());
    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir("")?;
    Ok(())
}
