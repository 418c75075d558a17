use ao2vis::progress::ProgressCallback;
use ao2vis::scanner::{
    enumerate_folders, FolderDescriptor, ProjectionBuilder, ProjectionConfig, ReadmePolicy,
};
use chrono::{DateTime, Utc};
use filetime::FileTime;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::tempdir;

fn make_char(base: &Path, name: &str, ini: &str) -> PathBuf {
    let dir = base.join("characters").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("char.ini"), ini).unwrap();
    fs::write(dir.join("char_icon.png"), b"icon").unwrap();
    dir
}

#[test]
fn test_config_deleted_before_build_still_yields_record() {
    let base = tempdir().unwrap();
    let dir = make_char(base.path(), "Gumshoe", "[Emotions]\nnumber=4\n");
    let folders = enumerate_folders(&[base.path().to_path_buf()], &BTreeMap::new());
    assert_eq!(folders.len(), 1);

    fs::remove_file(dir.join("char.ini")).unwrap();
    let dir_mtime = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    filetime::set_file_mtime(&dir, FileTime::from_system_time(dir_mtime)).unwrap();

    let records = ProjectionBuilder::default().build(&folders, None);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name, "Gumshoe");
    assert_eq!(record.emote_count, 0);
    assert_eq!(record.last_modified, DateTime::<Utc>::from(dir_mtime));
    assert_eq!(record.preview_path, folders[0].icon_path);
}

#[test]
fn test_missing_folder_gets_default_record() {
    let base = tempdir().unwrap();
    let folders = vec![FolderDescriptor::new("Ghost", base.path().join("nowhere"))];

    let records = ProjectionBuilder::default().build(&folders, None);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].emote_count, 0);
    assert_eq!(records[0].size_bytes, 0);
    assert_eq!(records[0].last_modified, DateTime::<Utc>::UNIX_EPOCH);
    assert!(records[0].readme_path.is_none());
}

#[test]
fn test_last_modified_follows_char_ini() {
    let base = tempdir().unwrap();
    let dir = make_char(base.path(), "Franziska", "[Emotions]\nnumber=1\n1=whip#-#whip#0#\n");
    let ini_mtime = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    filetime::set_file_mtime(dir.join("char.ini"), FileTime::from_system_time(ini_mtime))
        .unwrap();

    let folders = enumerate_folders(&[base.path().to_path_buf()], &BTreeMap::new());
    let record = ProjectionBuilder::default().project(&folders[0]);

    assert_eq!(record.last_modified, DateTime::<Utc>::from(ini_mtime));
    assert_eq!(record.emote_count, 1);
    assert!(record.config_path.ends_with("char.ini"));
}

#[test]
fn test_full_record() {
    let base = tempdir().unwrap();
    let dir = make_char(
        base.path(),
        "Phoenix",
        "[Emotions]\nnumber=2\n1=normal#-#normal#0#\n2=point#-#point#0#\n",
    );
    fs::write(dir.join("(b)normal.webp"), vec![0u8; 100]).unwrap();
    fs::write(dir.join("point.gif"), vec![0u8; 50]).unwrap();
    fs::write(dir.join("README.md"), "# Phoenix\nThanks for downloading.\n").unwrap();
    fs::write(
        dir.join("integrity_report.json"),
        r#"{"has_failures": true, "failures": ["missing sfx"]}"#,
    )
    .unwrap();

    let mut overrides = BTreeMap::new();
    overrides.insert("Phoenix".to_string(), 2);
    let folders = enumerate_folders(&[base.path().to_path_buf()], &overrides);
    let record = ProjectionBuilder::default().project(&folders[0]);

    assert_eq!(record.emote_count, 2);
    assert_eq!(record.preview_path, dir.join("point.gif"));
    assert_eq!(record.readme_path, Some(dir.join("README.md")));
    assert!(record.integrity_failed);
    assert_eq!(record.integrity_summary, "missing sfx");
    assert!(record.size_bytes >= 150);
}

#[test]
fn test_huge_emote_id_still_projects() {
    let base = tempdir().unwrap();
    let dir = make_char(
        base.path(),
        "Larry",
        "[Emotions]\n1=A#-#a#0#1\n4000000000=B#-#b#0#1\n",
    );
    fs::write(dir.join("(a)a.png"), b"png").unwrap();

    let folders = enumerate_folders(&[base.path().to_path_buf()], &BTreeMap::new());
    let builder = ProjectionBuilder::default();
    let records = builder.build(&folders, None);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Larry");
    assert_eq!(records[0].emote_count, 2);
    assert_eq!(records[0].preview_path, dir.join("(a)a.png"));
    assert_eq!(builder.build_count(), 1);
}

#[test]
fn test_config_like_readme_skipped() {
    let base = tempdir().unwrap();
    let dir = make_char(base.path(), "Maya", "[Emotions]\nnumber=0\n");
    fs::write(dir.join("readme.txt"), "[Options]\nname=Maya\nside=def\n").unwrap();
    fs::write(dir.join("notes.txt"), "Channeling is hard.\nSo is law.\n").unwrap();

    let folders = enumerate_folders(&[base.path().to_path_buf()], &BTreeMap::new());
    let builder = ProjectionBuilder::new(
        ProjectionConfig::default().with_readme_policy(ReadmePolicy::default()),
    );
    let record = builder.project(&folders[0]);

    assert_eq!(record.readme_path, Some(dir.join("notes.txt")));
}

#[derive(Default)]
struct Counter {
    positions: Mutex<Vec<usize>>,
}

impl ProgressCallback for Counter {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}
    fn on_progress(&self, current: usize, _item: &str) {
        self.positions.lock().unwrap().push(current);
    }
    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_parallel_build_preserves_order() {
    let base = tempdir().unwrap();
    let names: Vec<String> = (0..30).map(|i| format!("Witness{i:02}")).collect();
    for name in &names {
        make_char(base.path(), name, "[Emotions]\nnumber=1\n");
    }

    let folders = enumerate_folders(&[base.path().to_path_buf()], &BTreeMap::new());
    let builder = ProjectionBuilder::new(
        ProjectionConfig::default()
            .with_io_threads(4)
            .with_progress_interval(10),
    );
    let counter = Counter::default();
    let records = builder.build(&folders, Some(&counter));

    let built: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(built, names.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(builder.projected_count(), 30);

    let reported = counter.positions.lock().unwrap().clone();
    assert_eq!(reported.len(), 3);
    assert_eq!(reported.iter().max(), Some(&30));
}
