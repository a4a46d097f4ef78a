use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::tempdir;

use sift_core::analysis::{build_hash_groups, resolve_records};
use sift_core::manifest::read_manifest;
use sift_core::{
    move_duplicates, AppConfig, Error, ItemEvent, Phase, Reporter, ScanEngine, SilentReporter,
    Summary,
};

/// Layout:
///   root/
///     a/1.txt   ("X")
///     b/1.txt   ("X")  <- duplicate of a/1.txt
///     c/2.txt   ("Y")
fn create_scenario_tree(root: &Path) {
    for dir in ["a", "b", "c"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(root.join("a/1.txt"), "X").unwrap();
    fs::write(root.join("b/1.txt"), "X").unwrap();
    fs::write(root.join("c/2.txt"), "Y").unwrap();
}

/// Layout:
///   root/
///     folder_a/unique_a.txt, folder_a/shared.txt
///     folder_b/unique_b.txt, folder_b/shared.txt     <- dup of folder_a/shared.txt
///     folder_c/large_dup_1.bin .. large_dup_3.bin    (10KB of 0xAA each)
///     empty.txt                                      (0 bytes)
fn create_test_tree(root: &Path) {
    let folder_a = root.join("folder_a");
    let folder_b = root.join("folder_b");
    let folder_c = root.join("folder_c");
    fs::create_dir_all(&folder_a).unwrap();
    fs::create_dir_all(&folder_b).unwrap();
    fs::create_dir_all(&folder_c).unwrap();

    fs::write(folder_a.join("unique_a.txt"), "unique content a").unwrap();
    fs::write(folder_b.join("unique_b.txt"), "unique content b").unwrap();
    fs::write(folder_a.join("shared.txt"), "shared content xyz").unwrap();
    fs::write(folder_b.join("shared.txt"), "shared content xyz").unwrap();

    let large_content = vec![0xAAu8; 10 * 1024];
    for i in 1..=3 {
        fs::write(folder_c.join(format!("large_dup_{}.bin", i)), &large_content).unwrap();
    }
    fs::write(root.join("empty.txt"), "").unwrap();
}

fn engine(workers: usize) -> ScanEngine {
    ScanEngine::new(AppConfig::default().with_workers(workers))
}

#[derive(Default)]
struct RecordingReporter {
    started: Mutex<Vec<(Phase, usize)>>,
    progress: Mutex<Vec<(usize, usize)>>,
    events: Mutex<Vec<(PathBuf, String)>>,
    summaries: Mutex<usize>,
}

impl RecordingReporter {
    fn events_of(&self, kind: &str) -> Vec<PathBuf> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, k)| k == kind)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn on_start(&self, phase: Phase, total: usize) {
        self.started.lock().unwrap().push((phase, total));
    }

    fn on_progress(&self, completed: usize, total: usize) {
        self.progress.lock().unwrap().push((completed, total));
    }

    fn on_item(&self, path: &Path, event: &ItemEvent<'_>) {
        let kind = match event {
            ItemEvent::Hashed => "hashed",
            ItemEvent::HashFailed(_) => "hash_failed",
            ItemEvent::Skipped(_) => "skipped",
            ItemEvent::Kept => "kept",
            ItemEvent::Moved { .. } => "moved",
            ItemEvent::CopiedFallback { .. } => "copied",
            ItemEvent::PartialCopy { .. } => "partial",
            ItemEvent::Missing(_) => "missing",
            ItemEvent::MoveFailed(_) => "move_failed",
        };
        self.events
            .lock()
            .unwrap()
            .push((path.to_path_buf(), kind.to_string()));
    }

    fn on_summary(&self, _summary: &Summary) {
        *self.summaries.lock().unwrap() += 1;
    }
}

#[test]
fn test_create_file_list_records_every_file() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_root");
    create_test_tree(&root);
    let manifest = tmp.path().join("files.csv");

    let reporter = RecordingReporter::default();
    let result = engine(3)
        .create_file_list(&root, &manifest, &reporter)
        .unwrap();

    assert_eq!(result.total, 8);
    assert_eq!(result.recorded, 8);
    assert_eq!(result.failed, 0);
    assert_eq!(result.recorded + result.failed, result.total);

    let records = read_manifest(&manifest).unwrap();
    assert_eq!(records.len(), 8);
    let canonical_root = fs::canonicalize(&root).unwrap();
    for record in &records {
        assert!(record.path.starts_with(&canonical_root));
        assert_eq!(record.size, fs::metadata(&record.path).unwrap().len());
    }

    // Progress counts go 1..=total exactly once each.
    let progress = reporter.progress.lock().unwrap().clone();
    let expected: Vec<(usize, usize)> = (1..=8).map(|i| (i, 8)).collect();
    assert_eq!(progress, expected);
    assert_eq!(
        reporter.started.lock().unwrap().clone(),
        vec![(Phase::Fingerprint, 8)]
    );
    assert_eq!(reporter.events_of("hashed").len(), 8);
    assert_eq!(*reporter.summaries.lock().unwrap(), 1);
}

#[test]
fn test_identical_content_shares_fingerprint_and_size() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_root");
    create_test_tree(&root);
    let manifest = tmp.path().join("files.csv");

    engine(4)
        .create_file_list(&root, &manifest, &SilentReporter)
        .unwrap();
    let records = read_manifest(&manifest).unwrap();

    let groups = build_hash_groups(&records);
    let mut sizes: Vec<usize> = groups.iter().map(|g| g.paths.len()).collect();
    sizes.sort_unstable();
    // empty, unique_a, unique_b singletons; shared pair; large triple
    assert_eq!(sizes, vec![1, 1, 1, 2, 3]);

    for group in &groups {
        let first = records.iter().find(|r| r.path == group.keeper()).unwrap();
        for path in group.duplicates() {
            let other = records.iter().find(|r| &r.path == path).unwrap();
            assert_eq!(first.size, other.size);
            assert_eq!(fs::read(&first.path).unwrap(), fs::read(&other.path).unwrap());
        }
    }
}

#[test]
fn test_empty_tree_writes_header_only() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("empty_root");
    fs::create_dir_all(root.join("nested/deeper")).unwrap();
    let manifest = tmp.path().join("files.csv");

    let result = engine(2)
        .create_file_list(&root, &manifest, &SilentReporter)
        .unwrap();
    assert_eq!(result.total, 0);
    assert_eq!(
        fs::read_to_string(&manifest).unwrap(),
        "full_path,size,creation_time,modification_time,fingerprint\n"
    );
    assert!(read_manifest(&manifest).unwrap().is_empty());
}

#[test]
fn test_missing_root_fails_before_writing() {
    let tmp = tempdir().unwrap();
    let manifest = tmp.path().join("files.csv");

    let result =
        engine(2).create_file_list(&tmp.path().join("nope"), &manifest, &SilentReporter);
    assert!(matches!(result, Err(Error::Scan { .. })));
    assert!(!manifest.exists());
}

/// Deletes one file once the scan has been listed, before any hashing.
struct VanishingReporter {
    victim: PathBuf,
    inner: RecordingReporter,
}

impl Reporter for VanishingReporter {
    fn on_start(&self, phase: Phase, total: usize) {
        fs::remove_file(&self.victim).unwrap();
        self.inner.on_start(phase, total);
    }

    fn on_item(&self, path: &Path, event: &ItemEvent<'_>) {
        self.inner.on_item(path, event);
    }
}

#[test]
fn test_file_vanishing_before_hash_is_reported_not_recorded() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_root");
    create_test_tree(&root);
    let manifest = tmp.path().join("files.csv");

    let reporter = VanishingReporter {
        victim: root.join("folder_a/unique_a.txt"),
        inner: RecordingReporter::default(),
    };
    let result = engine(4)
        .create_file_list(&root, &manifest, &reporter)
        .unwrap();

    assert_eq!(result.total, 8);
    assert_eq!(result.recorded, 7);
    assert_eq!(result.failed, 1);

    let records = read_manifest(&manifest).unwrap();
    assert_eq!(records.len(), 7);
    assert!(!records.iter().any(|r| r.path.ends_with("unique_a.txt")));
    let failed = reporter.inner.events_of("hash_failed");
    assert_eq!(failed.len(), 1);
    assert!(failed[0].ends_with("unique_a.txt"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_names_survive_manifest_round_trip() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = tempdir().unwrap();
    let root = tmp.path().join("root");
    fs::create_dir_all(&root).unwrap();
    let ff = root.join(OsStr::from_bytes(b"\xff.txt"));
    let fe = root.join(OsStr::from_bytes(b"\xfe.txt"));
    fs::write(&ff, "X").unwrap();
    fs::write(&fe, "X").unwrap();
    fs::write(root.join("a.txt"), "Y").unwrap();
    fs::write(root.join("b.txt"), "Y").unwrap();
    let manifest = tmp.path().join("files.csv");
    let dupes = tmp.path().join("dupes");

    let collected = engine(2)
        .create_file_list(&root, &manifest, &SilentReporter)
        .unwrap();
    assert_eq!(collected.recorded, 4);

    let records = read_manifest(&manifest).unwrap();
    let canonical_root = fs::canonicalize(&root).unwrap();
    let mut names: Vec<Vec<u8>> = records
        .iter()
        .map(|r| {
            assert_eq!(r.path.parent(), Some(canonical_root.as_path()));
            r.path.file_name().unwrap().as_bytes().to_vec()
        })
        .collect();
    names.sort();
    let expected: Vec<Vec<u8>> = vec![
        b"a.txt".to_vec(),
        b"b.txt".to_vec(),
        b"\xfe.txt".to_vec(),
        b"\xff.txt".to_vec(),
    ];
    assert_eq!(names, expected);

    let result = move_duplicates(&manifest, &dupes, &SilentReporter).unwrap();
    assert_eq!(result.kept, 2);
    assert_eq!(result.moved, 2);
    assert_eq!(result.missing, 0);
    assert_eq!(result.failed, 0);
    assert_eq!(ff.exists() as u8 + fe.exists() as u8, 1);
    assert_eq!(fs::read_dir(&dupes).unwrap().count(), 2);
}

#[test]
fn test_scenario_move_duplicates_keeps_first_in_manifest() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("root");
    create_scenario_tree(&root);
    let manifest = tmp.path().join("files.csv");
    let dupes = tmp.path().join("dupes");

    engine(2)
        .create_file_list(&root, &manifest, &SilentReporter)
        .unwrap();
    let records = read_manifest(&manifest).unwrap();
    assert_eq!(records.len(), 3);

    let first_one = records
        .iter()
        .find(|r| r.path.ends_with("1.txt"))
        .map(|r| r.path.clone())
        .unwrap();
    let second_one = records
        .iter()
        .filter(|r| r.path.ends_with("1.txt"))
        .nth(1)
        .map(|r| r.path.clone())
        .unwrap();

    let reporter = RecordingReporter::default();
    let result = move_duplicates(&manifest, &dupes, &reporter).unwrap();

    assert_eq!(result.records, 3);
    assert_eq!(result.groups, 2);
    assert_eq!(result.duplicate_groups, 1);
    assert_eq!(result.kept, 1);
    assert_eq!(result.moved, 1);
    assert_eq!(result.missing, 0);
    assert_eq!(result.failed, 0);

    assert!(first_one.exists(), "keeper must stay in place");
    assert!(!second_one.exists(), "duplicate must be moved");
    assert_eq!(fs::read_to_string(dupes.join("1.txt")).unwrap(), "X");
    assert!(root.join("c/2.txt").exists());
    assert_eq!(fs::read_dir(&dupes).unwrap().count(), 1);

    assert_eq!(reporter.events_of("kept"), vec![first_one]);
    assert_eq!(reporter.events_of("moved"), vec![second_one]);
}

#[test]
fn test_group_of_k_leaves_one_moves_k_minus_one() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_root");
    create_test_tree(&root);
    let manifest = tmp.path().join("files.csv");
    let dupes = tmp.path().join("dupes");

    engine(4)
        .create_file_list(&root, &manifest, &SilentReporter)
        .unwrap();
    let result = move_duplicates(&manifest, &dupes, &SilentReporter).unwrap();

    // shared pair moves 1, large triple moves 2
    assert_eq!(result.duplicate_groups, 2);
    assert_eq!(result.kept, 2);
    assert_eq!(result.moved, 3);

    let remaining_large = fs::read_dir(root.join("folder_c")).unwrap().count();
    assert_eq!(remaining_large, 1);

    // Two files named shared.txt never collide: at most one shared.txt moved.
    let mut moved: Vec<String> = fs::read_dir(&dupes)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    moved.sort();
    assert_eq!(moved.len(), 3);
    assert!(moved.contains(&"shared.txt".to_string()));
}

#[test]
fn test_same_manifest_selects_same_keepers() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("scan_root");
    create_test_tree(&root);
    let manifest = tmp.path().join("files.csv");

    engine(4)
        .create_file_list(&root, &manifest, &SilentReporter)
        .unwrap();

    let first = build_hash_groups(&read_manifest(&manifest).unwrap());
    let second = build_hash_groups(&read_manifest(&manifest).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_colliding_duplicate_names_get_suffixes() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("root");
    for dir in ["a", "b", "c"] {
        fs::create_dir_all(root.join(dir)).unwrap();
        fs::write(root.join(dir).join("same.txt"), "identical").unwrap();
    }
    let dupes = tmp.path().join("dupes");
    fs::create_dir_all(&dupes).unwrap();
    fs::write(dupes.join("same.txt"), "already here").unwrap();
    let manifest = tmp.path().join("files.csv");

    engine(2)
        .create_file_list(&root, &manifest, &SilentReporter)
        .unwrap();
    let result = move_duplicates(&manifest, &dupes, &SilentReporter).unwrap();
    assert_eq!(result.moved, 2);

    assert_eq!(fs::read_to_string(dupes.join("same.txt")).unwrap(), "already here");
    assert_eq!(fs::read_to_string(dupes.join("same_1.txt")).unwrap(), "identical");
    assert_eq!(fs::read_to_string(dupes.join("same_2.txt")).unwrap(), "identical");
}

#[test]
fn test_missing_duplicate_is_counted_and_skipped() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("root");
    create_scenario_tree(&root);
    let manifest = tmp.path().join("files.csv");
    let dupes = tmp.path().join("dupes");

    engine(2)
        .create_file_list(&root, &manifest, &SilentReporter)
        .unwrap();
    let records = read_manifest(&manifest).unwrap();
    let duplicate = records
        .iter()
        .filter(|r| r.path.ends_with("1.txt"))
        .nth(1)
        .unwrap()
        .path
        .clone();
    fs::remove_file(&duplicate).unwrap();

    let reporter = RecordingReporter::default();
    let result = resolve_records(&records, &dupes, &reporter).unwrap();
    assert_eq!(result.moved, 0);
    assert_eq!(result.missing, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(reporter.events_of("missing"), vec![duplicate]);
    assert_eq!(fs::read_dir(&dupes).unwrap().count(), 0);
}

#[test]
fn test_malformed_manifest_moves_nothing() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("root");
    create_scenario_tree(&root);
    let manifest = tmp.path().join("files.csv");
    let a = root.join("a/1.txt");
    let b = root.join("b/1.txt");
    fs::write(
        &manifest,
        format!(
            "full_path,size,creation_time,modification_time,fingerprint\n\
             {},1,t,t,aa\n\
             {},1,t,t,aa\n\
             {},oops,t,t,bb\n",
            a.display(),
            b.display(),
            root.join("c/2.txt").display()
        ),
    )
    .unwrap();

    let dupes = tmp.path().join("dupes");
    let result = move_duplicates(&manifest, &dupes, &SilentReporter);
    assert!(matches!(result, Err(Error::Manifest { .. })));
    assert!(a.exists());
    assert!(b.exists());
}
