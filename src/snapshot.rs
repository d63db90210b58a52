use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A whole-collection JSON document on disk.
///
/// Every write rewrites the full list: serialize to `<name>.json.tmp`, fsync,
/// then rename over the live file. A reader sees either the old document or
/// the new one, never a partial write.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Load the document. `Ok(None)` if the file does not exist yet;
    /// unparseable content is `InvalidData`.
    pub fn load<T: DeserializeOwned>(&self) -> io::Result<Option<Vec<T>>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let items = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(items))
    }

    /// Atomically replace the document with `items`.
    pub fn write<T: Serialize>(&self, items: &[T]) -> io::Result<()> {
        let started = std::time::Instant::now();
        let tmp_path = self.tmp_path();
        let result = Self::write_file(&tmp_path, items).and_then(|()| fs::rename(&tmp_path, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        metrics::histogram!(crate::observability::SNAPSHOT_WRITE_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        result
    }

    fn write_file<T: Serialize>(path: &Path, items: &[T]) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, items)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        label: String,
    }

    fn items(n: u32) -> Vec<Item> {
        (0..n).map(|id| Item { id, label: format!("item-{id}") }).collect()
    }

    #[test]
    fn write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let snap = Snapshot::new(dir.path().join("items.json"));

        snap.write(&items(3)).unwrap();
        let loaded: Vec<Item> = snap.load().unwrap().unwrap();
        assert_eq!(loaded, items(3));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let snap = Snapshot::new(dir.path().join("absent.json"));
        let loaded: Option<Vec<Item>> = snap.load().unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        fs::write(&path, b"[{\"id\": 1, \"lab").unwrap();

        let err = Snapshot::new(&path).load::<Item>().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn write_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let snap = Snapshot::new(dir.path().join("items.json"));

        snap.write(&items(10)).unwrap();
        snap.write(&items(2)).unwrap();

        let loaded: Vec<Item> = snap.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(!snap.tmp_path().exists());
    }

    #[test]
    fn write_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let snap = Snapshot::new(dir.path().join("items.json"));
        snap.write(&items(1)).unwrap();

        let text = fs::read_to_string(snap.path()).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": 0,"));
    }

    #[test]
    fn write_into_missing_dir_fails_and_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let snap = Snapshot::new(dir.path().join("gone").join("items.json"));
        assert!(snap.write(&items(1)).is_err());
        assert!(!snap.path().exists());
    }
}
