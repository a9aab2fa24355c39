use arrangify::cli::{ArrangeArgs, arrange_with_config};
use arrangify::config::AppConfig;
use arrangify::file_category::Category;
use arrangify::file_organizer::{ArrangeError, ArrangeRequest, Arranger};
use arrangify::folder_registry::SENTINEL;
/// Integration tests for arrangify
///
/// These tests run complete arrangement passes against temporary source and
/// destination folders.
///
/// Test categories:
/// 1. Routing files into destination folders
/// 2. Files and entries that must be left alone
/// 3. Error scenarios
/// 4. The command-line front end with configuration
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// A temporary directory holding a `source` and a `destination` folder.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(temp_dir.path().join("source")).expect("Failed to create source");
        fs::create_dir(temp_dir.path().join("destination")).expect("Failed to create destination");
        TestFixture { temp_dir }
    }

    fn source(&self) -> PathBuf {
        self.temp_dir.path().join("source")
    }

    fn destination(&self) -> PathBuf {
        self.temp_dir.path().join("destination")
    }

    /// Create a file in the source folder whose content is its own name.
    fn create_file(&self, name: &str) {
        fs::write(self.source().join(name), name).expect("Failed to write file");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name);
        }
    }

    fn create_subdir(&self, name: &str) {
        fs::create_dir(self.source().join(name)).expect("Failed to create subdirectory");
    }

    fn request(&self) -> ArrangeRequest {
        ArrangeRequest::new(self.source(), self.destination())
    }

    fn assert_in_source(&self, name: &str) {
        let path = self.source().join(name);
        assert!(path.exists(), "Should still be in source: {}", path.display());
    }

    fn assert_not_in_source(&self, name: &str) {
        let path = self.source().join(name);
        assert!(!path.exists(), "Should have left source: {}", path.display());
    }

    fn assert_moved(&self, folder: &str, name: &str) {
        let path = self.destination().join(folder).join(name);
        assert!(path.is_file(), "File should exist: {}", path.display());
        assert_eq!(
            fs::read_to_string(&path).expect("Failed to read moved file"),
            name,
            "Content should survive the move"
        );
    }

    fn destination_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.destination())
            .expect("Failed to read destination")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter(|e| e.as_ref().unwrap().path().is_file())
        .count()
}

// ============================================================================
// Test Suite 1: Routing
// ============================================================================

#[test]
fn test_end_to_end_documents_and_images() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.pdf", "b.jpg", "c.unknownext"]);

    let request = fixture
        .request()
        .select(Category::Documents, "Docs")
        .select(Category::Images, "Pics");
    let report = Arranger::default().arrange(&request).expect("Arrange failed");

    fixture.assert_moved("Docs", "a.pdf");
    fixture.assert_moved("Pics", "b.jpg");
    fixture.assert_not_in_source("a.pdf");
    fixture.assert_not_in_source("b.jpg");
    fixture.assert_in_source("c.unknownext");

    assert_eq!(report.moved.len(), 2);
    assert_eq!(report.left_in_place, 1);
}

#[test]
fn test_destination_folder_is_created() {
    let fixture = TestFixture::new();
    fixture.create_file("a.pdf");
    assert!(!fixture.destination().join("Docs").exists());

    let request = fixture.request().select(Category::Documents, "Docs");
    let report = Arranger::default().arrange(&request).unwrap();

    assert!(fixture.destination().join("Docs").is_dir());
    assert_eq!(report.created_dirs, [fixture.destination().join("Docs")]);
}

#[test]
fn test_missing_destination_and_parents_are_created() {
    let fixture = TestFixture::new();
    fixture.create_file("song.mp3");
    let destination = fixture.temp_dir.path().join("new").join("nested");

    let request =
        ArrangeRequest::new(fixture.source(), &destination).select(Category::Audio, "Music");
    Arranger::default().arrange(&request).unwrap();

    assert!(destination.join("Music").join("song.mp3").is_file());
}

#[test]
fn test_existing_destination_folder_is_reused() {
    let fixture = TestFixture::new();
    fs::create_dir(fixture.destination().join("Docs")).unwrap();
    fs::write(fixture.destination().join("Docs").join("old.txt"), "old").unwrap();
    fixture.create_file("new.txt");

    let request = fixture.request().select(Category::Documents, "Docs");
    let report = Arranger::default().arrange(&request).unwrap();

    assert!(report.created_dirs.is_empty());
    assert_eq!(count_files(&fixture.destination().join("Docs")), 2);
}

#[test]
fn test_several_categories_share_one_folder() {
    let fixture = TestFixture::new();
    fixture.create_files(&["clip.mp4", "song.ogg", "pack.zip"]);

    let request = fixture
        .request()
        .select(Category::Videos, "Media")
        .select(Category::Audio, "Media");
    let report = Arranger::default().arrange(&request).unwrap();

    fixture.assert_moved("Media", "clip.mp4");
    fixture.assert_moved("Media", "song.ogg");
    fixture.assert_in_source("pack.zip");
    assert_eq!(report.folder_counts()["Media"], 2);
}

#[test]
fn test_every_category_routes() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.docx", "b.svg", "c.flac", "d.mkv", "e.7z", "f.py"]);

    let mut request = fixture.request();
    for category in Category::ALL {
        request = request.select(category, category.id());
    }
    let report = Arranger::default().arrange(&request).unwrap();

    assert_eq!(report.moved.len(), 6);
    fixture.assert_moved("documents", "a.docx");
    fixture.assert_moved("images", "b.svg");
    fixture.assert_moved("audio", "c.flac");
    fixture.assert_moved("videos", "d.mkv");
    fixture.assert_moved("archives", "e.7z");
    fixture.assert_moved("programs", "f.py");
    assert_eq!(count_files(&fixture.source()), 0);
}

#[test]
fn test_uppercase_extension_is_routed() {
    let fixture = TestFixture::new();
    fixture.create_file("SCAN.PDF");

    let request = fixture.request().select(Category::Documents, "Docs");
    Arranger::default().arrange(&request).unwrap();

    fixture.assert_moved("Docs", "SCAN.PDF");
}

#[test]
fn test_only_last_extension_counts() {
    let fixture = TestFixture::new();
    fixture.create_files(&["photo.jpg.txt", "notes.txt.jpg"]);

    let request = fixture.request().select(Category::Documents, "Docs");
    Arranger::default().arrange(&request).unwrap();

    fixture.assert_moved("Docs", "photo.jpg.txt");
    fixture.assert_in_source("notes.txt.jpg");
}

// ============================================================================
// Test Suite 2: Left alone
// ============================================================================

#[test]
fn test_all_sentinel_is_a_no_op() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.pdf", "b.jpg", "c.mp3"]);

    let mut request = fixture.request();
    for category in Category::ALL {
        request = request.select(category, SENTINEL);
    }
    let report = Arranger::default().arrange(&request).unwrap();

    assert!(report.moved.is_empty());
    assert!(report.created_dirs.is_empty());
    assert!(fixture.destination_entries().is_empty());
    assert_eq!(count_files(&fixture.source()), 3);
}

#[test]
fn test_sentinel_category_is_left_untouched() {
    let fixture = TestFixture::new();
    fixture.create_file("a.pdf");
    fs::create_dir(fixture.destination().join("none")).unwrap();

    let request = fixture.request().select(Category::Documents, SENTINEL);
    Arranger::default().arrange(&request).unwrap();

    fixture.assert_in_source("a.pdf");
    assert_eq!(count_files(&fixture.destination().join("none")), 0);
}

#[test]
fn test_unrouted_category_stays() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.pdf", "b.png"]);

    let request = fixture.request().select(Category::Images, "Pics");
    Arranger::default().arrange(&request).unwrap();

    fixture.assert_in_source("a.pdf");
    fixture.assert_moved("Pics", "b.png");
}

#[test]
fn test_files_without_extension_stay() {
    let fixture = TestFixture::new();
    fixture.create_files(&["README", "Makefile", "trailing."]);

    let mut request = fixture.request();
    for category in Category::ALL {
        request = request.select(category, "All");
    }
    let report = Arranger::default().arrange(&request).unwrap();

    assert!(report.moved.is_empty());
    assert_eq!(report.left_in_place, 3);
    assert!(fixture.destination_entries().is_empty());
}

#[test]
fn test_subdirectories_are_never_traversed_or_moved() {
    let fixture = TestFixture::new();
    fixture.create_subdir("holiday.jpg");
    fixture.create_subdir("nested");
    fs::write(fixture.source().join("nested").join("inner.pdf"), "inner").unwrap();
    fixture.create_file("top.pdf");

    let request = fixture
        .request()
        .select(Category::Documents, "Docs")
        .select(Category::Images, "Pics");
    let report = Arranger::default().arrange(&request).unwrap();

    assert!(fixture.source().join("holiday.jpg").is_dir());
    assert!(fixture.source().join("nested").join("inner.pdf").is_file());
    assert!(!fixture.destination().join("Pics").exists());
    fixture.assert_moved("Docs", "top.pdf");
    assert_eq!(report.skipped_entries, 2);
    assert_eq!(report.moved.len(), 1);
}

#[test]
fn test_empty_source_succeeds() {
    let fixture = TestFixture::new();
    let request = fixture.request().select(Category::Documents, "Docs");
    let report = Arranger::default().arrange(&request).unwrap();

    assert!(report.moved.is_empty());
    assert!(fixture.destination_entries().is_empty());
}

// ============================================================================
// Test Suite 3: Errors
// ============================================================================

#[test]
fn test_empty_source_path_is_invalid_input() {
    let fixture = TestFixture::new();
    let request = ArrangeRequest::new("", fixture.destination()).select(Category::Documents, "Docs");

    let result = Arranger::default().arrange(&request);
    assert!(matches!(result, Err(ArrangeError::InvalidInput { .. })));
}

#[test]
fn test_empty_destination_path_is_invalid_input() {
    let fixture = TestFixture::new();
    fixture.create_file("a.pdf");
    let request = ArrangeRequest::new(fixture.source(), "").select(Category::Documents, "Docs");

    let result = Arranger::default().arrange(&request);
    assert!(matches!(result, Err(ArrangeError::InvalidInput { .. })));
    fixture.assert_in_source("a.pdf");
}

#[test]
fn test_name_collision_fails_loudly_without_data_loss() {
    let fixture = TestFixture::new();
    fixture.create_file("a.pdf");
    fs::create_dir(fixture.destination().join("Docs")).unwrap();
    fs::write(fixture.destination().join("Docs").join("a.pdf"), "existing").unwrap();

    let request = fixture.request().select(Category::Documents, "Docs");
    let result = Arranger::default().arrange(&request);

    match result {
        Err(ArrangeError::DestinationExists { path }) => {
            assert_eq!(path, fixture.destination().join("Docs").join("a.pdf"));
        }
        other => panic!("expected DestinationExists, got {:?}", other),
    }
    fixture.assert_in_source("a.pdf");
    assert_eq!(
        fs::read_to_string(fixture.destination().join("Docs").join("a.pdf")).unwrap(),
        "existing"
    );
}

#[test]
fn test_destination_blocked_by_file_reports_creation_failure() {
    let fixture = TestFixture::new();
    fixture.create_file("a.pdf");
    fs::write(fixture.destination().join("Docs"), "not a folder").unwrap();

    let request = fixture.request().select(Category::Documents, "Docs");
    let result = Arranger::default().arrange(&request);

    assert!(matches!(
        result,
        Err(ArrangeError::DirectoryCreationFailed { .. })
    ));
    fixture.assert_in_source("a.pdf");
}

#[test]
fn test_error_messages_name_the_paths() {
    let fixture = TestFixture::new();
    let missing = fixture.temp_dir.path().join("missing");
    let request = ArrangeRequest::new(&missing, fixture.destination())
        .select(Category::Documents, "Docs");

    let err = Arranger::default().arrange(&request).unwrap_err();
    assert!(matches!(err, ArrangeError::SourceUnreadable { .. }));
    assert!(err.to_string().contains(&missing.display().to_string()));
}

// ============================================================================
// Test Suite 4: Command-line front end
// ============================================================================

#[test]
fn test_cli_arrange_with_flags() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.pdf", "b.jpg", "c.unknownext"]);

    let args = ArrangeArgs {
        source: Some(fixture.source()),
        destination: Some(fixture.destination()),
        folders: vec!["Docs".to_string(), "Pics".to_string()],
        documents: Some("Docs".to_string()),
        images: Some("Pics".to_string()),
        json: true,
        ..Default::default()
    };
    let report = arrange_with_config(&args, &AppConfig::default()).expect("CLI arrange failed");

    assert_eq!(report.moved.len(), 2);
    fixture.assert_moved("Docs", "a.pdf");
    fixture.assert_moved("Pics", "b.jpg");
    fixture.assert_in_source("c.unknownext");
}

#[test]
fn test_cli_uses_config_folders_selections_and_extensions() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.pdf", "b.webp", "c.part.pdf", "d.pdf.part"]);

    let config = AppConfig::from_toml(
        r#"
        folders = ["Docs", "Pics"]

        [selections]
        documents = "Docs"
        images = "Pics"

        [extensions]
        images = [".webp"]

        [filters]
        exclude_patterns = ["c.*"]
        "#,
    )
    .unwrap();

    let args = ArrangeArgs {
        source: Some(fixture.source()),
        destination: Some(fixture.destination()),
        json: true,
        ..Default::default()
    };
    let report = arrange_with_config(&args, &config).unwrap();

    fixture.assert_moved("Docs", "a.pdf");
    fixture.assert_moved("Pics", "b.webp");
    fixture.assert_in_source("c.part.pdf");
    fixture.assert_in_source("d.pdf.part");
    assert_eq!(report.moved.len(), 2);
}

#[test]
fn test_cli_rejects_unregistered_folder() {
    let fixture = TestFixture::new();
    fixture.create_file("a.pdf");

    let args = ArrangeArgs {
        source: Some(fixture.source()),
        destination: Some(fixture.destination()),
        documents: Some("Docs".to_string()),
        json: true,
        ..Default::default()
    };
    let result = arrange_with_config(&args, &AppConfig::default());

    assert!(result.is_err());
    fixture.assert_in_source("a.pdf");
}

#[test]
fn test_cli_duplicate_folder_does_not_abort() {
    let fixture = TestFixture::new();
    fixture.create_file("a.pdf");

    let args = ArrangeArgs {
        source: Some(fixture.source()),
        destination: Some(fixture.destination()),
        folders: vec!["Docs".to_string(), "Docs".to_string()],
        documents: Some("Docs".to_string()),
        json: true,
        ..Default::default()
    };
    arrange_with_config(&args, &AppConfig::default()).unwrap();

    fixture.assert_moved("Docs", "a.pdf");
}

#[test]
fn test_cli_missing_source_flag_is_reported() {
    let fixture = TestFixture::new();
    let args = ArrangeArgs {
        destination: Some(fixture.destination()),
        json: true,
        ..Default::default()
    };
    let err = arrange_with_config(&args, &AppConfig::default()).unwrap_err();
    assert!(err.contains("must not be empty"));
}
