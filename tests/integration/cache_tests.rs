use ao2vis::cache::{DiskCache, EnvironmentId, FolderSignature, MemoryCache};
use ao2vis::scanner::{enumerate_folders, ProjectionBuilder, ProjectionConfig};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn make_char(base: &Path, name: &str, emotes: u32) -> PathBuf {
    let dir = base.join("characters").join(name);
    fs::create_dir_all(&dir).unwrap();
    let mut ini = format!("[Options]\nshowname={name}\n\n[Emotions]\nnumber={emotes}\n");
    for id in 1..=emotes {
        ini.push_str(&format!("{id}=emote{id}#-#normal{id}#0#\n"));
    }
    fs::write(dir.join("char.ini"), ini).unwrap();
    fs::write(dir.join("char_icon.png"), b"icon").unwrap();
    dir
}

#[test]
fn test_disk_round_trip_with_projected_records() {
    let base = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    make_char(base.path(), "Phoenix", 3);
    make_char(base.path(), "Maya", 1);
    fs::write(
        base.path().join("characters/Maya/readme.txt"),
        "Made by someone.\nEnjoy.\n",
    )
    .unwrap();

    let folders = enumerate_folders(&[base.path().to_path_buf()], &BTreeMap::new());
    let records = ProjectionBuilder::new(ProjectionConfig::default()).build(&folders, None);
    let signature = FolderSignature::compute(&folders);

    let env = EnvironmentId::derive(None, &[base.path().to_path_buf()]);
    let disk = DiskCache::new(cache_dir.path(), &env);
    assert!(disk.save(&signature, &records));

    let entry = disk.try_load(&signature).unwrap();
    assert_eq!(entry.records, records);
    assert_eq!(entry.records[0].name, "Maya");
    assert!(entry.records[0].readme_path.is_some());
    assert_eq!(entry.records[1].emote_count, 3);
}

#[test]
fn test_disk_rejects_other_signature() {
    let base = tempdir().unwrap();
    let cache_dir = tempdir().unwrap();
    make_char(base.path(), "Phoenix", 1);

    let folders = enumerate_folders(&[base.path().to_path_buf()], &BTreeMap::new());
    let records = ProjectionBuilder::default().build(&folders, None);
    let disk = DiskCache::at(cache_dir.path().join("visualizer.json"));
    disk.save(&FolderSignature::compute(&folders), &records);

    make_char(base.path(), "Edgeworth", 1);
    let grown = enumerate_folders(&[base.path().to_path_buf()], &BTreeMap::new());
    assert!(disk.try_load(&FolderSignature::compute(&grown)).is_none());
}

#[test]
fn test_invalidate_removes_file_and_rejects_all() {
    let cache_dir = tempdir().unwrap();
    let disk = DiskCache::at(cache_dir.path().join("visualizer.json"));
    let signature = FolderSignature::compute(&[]);
    disk.save(&signature, &[]);
    assert!(disk.path().exists());

    disk.invalidate();
    assert!(!disk.path().exists());
    assert!(disk.try_load(&signature).is_none());

    disk.invalidate();
}

#[test]
fn test_truncated_file_is_a_miss() {
    let cache_dir = tempdir().unwrap();
    let disk = DiskCache::at(cache_dir.path().join("visualizer.json"));
    let signature = FolderSignature::compute(&[]);
    disk.save(&signature, &[]);

    let content = fs::read(disk.path()).unwrap();
    fs::write(disk.path(), &content[..content.len() / 2]).unwrap();

    assert!(disk.try_load(&signature).is_none());
    assert!(disk.load(&signature).is_err());
}

#[test]
fn test_environments_use_separate_files() {
    let cache_dir = tempdir().unwrap();
    let first = EnvironmentId::derive(Some(Path::new("/a/config.toml")), &[PathBuf::from("/base")]);
    let second = EnvironmentId::derive(Some(Path::new("/b/config.toml")), &[PathBuf::from("/base")]);

    let disk_a = DiskCache::new(cache_dir.path(), &first);
    let disk_b = DiskCache::new(cache_dir.path(), &second);
    assert_ne!(disk_a.path(), disk_b.path());

    let signature = FolderSignature::compute(&[]);
    disk_a.save(&signature, &[]);
    assert!(disk_b.try_load(&signature).is_none());
}

#[test]
fn test_memory_cache_shared_between_handles() {
    let memory = Arc::new(MemoryCache::new());
    let signature = FolderSignature::compute(&[]);
    let other = Arc::clone(&memory);

    memory.set(signature, Arc::new(Vec::new()));
    assert!(other.get(&signature).is_some());

    other.clear();
    assert!(memory.get(&signature).is_none());
}
