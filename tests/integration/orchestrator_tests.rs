use ao2vis::cache::{DiskCache, FolderSignature, MemoryCache};
use ao2vis::scanner::{enumerate_folders, FolderDescriptor, ProjectionBuilder, ProjectionConfig};
use ao2vis::signal::ShutdownHandler;
use ao2vis::visualizer::{CacheOrchestrator, CacheSource, Delivery};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn make_char(base: &Path, name: &str) -> PathBuf {
    let dir = base.join("characters").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("char.ini"),
        "[Emotions]\nnumber=2\n1=happy#-#happy#0#\n2=sad#-#sad#0#\n",
    )
    .unwrap();
    fs::write(dir.join("char_icon.png"), b"icon").unwrap();
    fs::write(dir.join("(a)happy.png"), b"happy").unwrap();
    fs::create_dir_all(dir.join("emotions")).unwrap();
    fs::write(dir.join("emotions/button2_off.png"), b"button").unwrap();
    dir
}

struct Library {
    base: TempDir,
    cache: TempDir,
}

impl Library {
    fn new(names: &[&str]) -> Self {
        let base = tempdir().unwrap();
        for name in names {
            make_char(base.path(), name);
        }
        Self {
            base,
            cache: tempdir().unwrap(),
        }
    }

    fn folders(&self) -> Vec<FolderDescriptor> {
        enumerate_folders(&[self.base.path().to_path_buf()], &BTreeMap::new())
    }

    fn disk(&self) -> DiskCache {
        DiskCache::at(self.cache.path().join("visualizer.json"))
    }

    /// Orchestrator as a fresh process would create it: empty memory, same disk file.
    fn orchestrator(&self) -> CacheOrchestrator {
        CacheOrchestrator::new(
            Arc::new(MemoryCache::new()),
            Some(self.disk()),
            ProjectionBuilder::new(ProjectionConfig::default().with_io_threads(2)),
        )
    }
}

#[test]
fn test_end_to_end_rename_triggers_one_rebuild() {
    let library = Library::new(&["Alpha", "Bravo", "Charlie"]);
    let orchestrator = library.orchestrator();

    let first = orchestrator.get_or_build(&library.folders(), false);
    assert_eq!(first.source, CacheSource::Rebuilt);
    assert_eq!(first.records.len(), 3);
    assert_eq!(orchestrator.builder().projected_count(), 3);
    assert_eq!(orchestrator.builder().build_count(), 1);
    assert!(library.disk().path().exists());

    let second = orchestrator.get_or_build(&library.folders(), false);
    assert_eq!(orchestrator.builder().projected_count(), 3);
    assert_eq!(orchestrator.builder().build_count(), 1);
    assert_eq!(second.records, first.records);

    let characters = library.base.path().join("characters");
    fs::rename(characters.join("Bravo"), characters.join("Bravo_v2")).unwrap();

    let third = orchestrator.get_or_build(&library.folders(), false);
    assert_eq!(third.source, CacheSource::Rebuilt);
    assert_eq!(orchestrator.builder().projected_count(), 6);
    assert_eq!(orchestrator.builder().build_count(), 2);

    let renamed = third
        .records
        .iter()
        .find(|record| record.name == "Bravo_v2")
        .unwrap();
    assert!(renamed.directory.ends_with("characters/Bravo_v2"));
    assert!(third.records.iter().all(|record| record.name != "Bravo"));
}

#[test]
fn test_second_process_served_from_disk() {
    let library = Library::new(&["Alpha", "Bravo"]);
    let built = library.orchestrator().get_or_build(&library.folders(), false);

    let fresh = library.orchestrator();
    let loaded = fresh.get_or_build(&library.folders(), false);

    assert_eq!(loaded.source, CacheSource::Disk);
    assert_eq!(fresh.builder().projected_count(), 0);
    assert_eq!(loaded.records, built.records);

    let again = fresh.get_or_build(&library.folders(), false);
    assert_eq!(again.source, CacheSource::Memory);
}

#[test]
fn test_invalidate_scenario() {
    let library = Library::new(&["Alpha"]);
    let orchestrator = library.orchestrator();
    let folders = library.folders();
    orchestrator.get_or_build(&folders, false);

    orchestrator.invalidate();

    assert!(!library.disk().path().exists());
    assert!(library
        .disk()
        .try_load(&FolderSignature::compute(&folders))
        .is_none());
    assert!(orchestrator.memory().current().is_none());

    let rebuilt = orchestrator.get_or_build(&folders, false);
    assert_eq!(rebuilt.source, CacheSource::Rebuilt);
}

#[test]
fn test_forced_rebuild_is_idempotent() {
    let library = Library::new(&["Alpha", "Bravo"]);
    let orchestrator = library.orchestrator();
    let folders = library.folders();

    let first = orchestrator.get_or_build(&folders, true);
    let second = orchestrator.get_or_build(&folders, true);

    assert_eq!(first.source, CacheSource::Rebuilt);
    assert_eq!(second.source, CacheSource::Rebuilt);
    assert_eq!(first.records, second.records);
    assert_eq!(orchestrator.builder().projected_count(), 4);
}

#[test]
fn test_corrupt_disk_cache_falls_back_to_rebuild() {
    let library = Library::new(&["Alpha"]);
    fs::write(library.disk().path(), b"{ not json").unwrap();

    let orchestrator = library.orchestrator();
    let outcome = orchestrator.get_or_build(&library.folders(), false);

    assert_eq!(outcome.source, CacheSource::Rebuilt);
    assert_eq!(outcome.records.len(), 1);
    assert!(library
        .disk()
        .try_load(&outcome.signature)
        .is_some());
}

#[test]
fn test_background_request_delivers() {
    let library = Library::new(&["Alpha", "Bravo"]);
    let orchestrator = Arc::new(library.orchestrator());
    let liveness = ShutdownHandler::new();

    let pending = orchestrator
        .spawn_get_or_build(library.folders(), false)
        .unwrap();
    let mut received = None;
    let delivery = pending
        .deliver(&liveness, |outcome| received = Some(outcome))
        .unwrap();

    assert_eq!(delivery, Delivery::Applied);
    assert_eq!(received.unwrap().records.len(), 2);
}

#[test]
fn test_background_result_dropped_when_consumer_gone() {
    let library = Library::new(&["Alpha"]);
    let orchestrator = Arc::new(library.orchestrator());
    let liveness = ShutdownHandler::new();

    let pending = orchestrator
        .spawn_get_or_build(library.folders(), false)
        .unwrap();
    liveness.request_shutdown();

    let mut applied = false;
    let delivery = pending.deliver(&liveness, |_| applied = true).unwrap();

    assert_eq!(delivery, Delivery::ConsumerGone);
    assert!(!applied);
    // The rebuild still ran to completion and was cached.
    assert!(library
        .disk()
        .try_load(&FolderSignature::compute(&library.folders()))
        .is_some());
}

#[test]
fn test_forced_request_supersedes_earlier_lookup() {
    let library = Library::new(&["Alpha", "Bravo"]);
    let orchestrator = Arc::new(library.orchestrator());
    let liveness = ShutdownHandler::new();

    let stale = orchestrator
        .spawn_get_or_build(library.folders(), false)
        .unwrap();
    let forced = orchestrator
        .spawn_get_or_build(library.folders(), true)
        .unwrap();
    assert!(stale.is_superseded());
    assert!(!forced.is_superseded());

    let forced_ticket = forced.ticket();
    assert_eq!(
        stale.deliver(&liveness, |_| panic!("stale result applied")).unwrap(),
        Delivery::Superseded
    );

    let mut received = None;
    assert_eq!(
        forced
            .deliver(&liveness, |outcome| received = Some(outcome))
            .unwrap(),
        Delivery::Applied
    );
    let outcome = received.unwrap();
    assert_eq!(outcome.source, CacheSource::Rebuilt);
    assert_eq!(outcome.ticket, forced_ticket);
}

#[test]
fn test_memory_only_mode() {
    let library = Library::new(&["Alpha"]);
    let orchestrator = CacheOrchestrator::new(
        Arc::new(MemoryCache::new()),
        None,
        ProjectionBuilder::default(),
    );
    let folders = library.folders();

    assert_eq!(
        orchestrator.get_or_build(&folders, false).source,
        CacheSource::Rebuilt
    );
    assert_eq!(
        orchestrator.get_or_build(&folders, false).source,
        CacheSource::Memory
    );
    orchestrator.invalidate();
    assert_eq!(
        orchestrator.get_or_build(&folders, false).source,
        CacheSource::Rebuilt
    );
}

#[test]
fn test_preview_override_patches_without_rebuild() {
    let library = Library::new(&["Alpha", "Bravo"]);
    let orchestrator = library.orchestrator();
    orchestrator.get_or_build(&library.folders(), false);
    assert_eq!(orchestrator.builder().projected_count(), 2);

    let mut overrides = BTreeMap::new();
    overrides.insert("Bravo".to_string(), 2);
    let folders = enumerate_folders(&[library.base.path().to_path_buf()], &overrides);

    let patched = orchestrator.patch_preview(&folders, "Bravo").unwrap();
    assert!(patched.preview_path.ends_with("emotions/button2_off.png"));

    let outcome = orchestrator.get_or_build(&folders, false);
    assert_eq!(outcome.source, CacheSource::Memory);
    assert_eq!(orchestrator.builder().projected_count(), 2);

    let fresh = library.orchestrator();
    let from_disk = fresh.get_or_build(&folders, false);
    assert_eq!(from_disk.source, CacheSource::Disk);
    assert_eq!(from_disk.records[1].preview_path, patched.preview_path);
}

#[test]
fn test_reverify_patches_integrity() {
    let library = Library::new(&["Alpha"]);
    let orchestrator = library.orchestrator();
    let folders = library.folders();
    let before = orchestrator.get_or_build(&folders, false);
    assert!(!before.records[0].integrity_failed);

    fs::write(
        folders[0].directory.join("integrity_report.json"),
        r#"{"has_failures": true, "failures": ["missing sfx", "bad emote 3"]}"#,
    )
    .unwrap();

    let patched = orchestrator.patch_integrity(&folders, "Alpha").unwrap();
    assert!(patched.integrity_failed);
    assert_eq!(patched.integrity_failure_count, 2);
    assert_eq!(patched.integrity_summary, "missing sfx; bad emote 3");

    let cached = orchestrator.get_or_build(&folders, false);
    assert_eq!(cached.source, CacheSource::Memory);
    assert!(cached.records[0].integrity_failed);
}
