//! Durable post store: a JSON snapshot plus an append-only write-ahead log.
//!
//! Layout inside the configured directory:
//!
//! - `posts.snapshot.json` - the full map as of the last compaction
//! - `posts.wal` - one JSON record per line for every mutation since then
//!
//! Every mutation is appended to the WAL and synced before the in-memory map
//! changes. Opening the store loads the snapshot and replays the WAL on top.
//! A final WAL line that does not parse is a torn write and is dropped; an
//! unparseable line anywhere else means the log is corrupt.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use scribe_core::domain::Post;
use scribe_core::error::RepoError;
use scribe_core::ports::PostStore;

const SNAPSHOT_FILE: &str = "posts.snapshot.json";
const SNAPSHOT_TMP_FILE: &str = "posts.snapshot.json.tmp";
const WAL_FILE: &str = "posts.wal";

/// File store configuration.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Directory holding the snapshot and WAL.
    pub dir: PathBuf,
    /// WAL records after which the store compacts itself (0 = never).
    pub compact_threshold: usize,
}

impl FileStoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            compact_threshold: 1024,
        }
    }

    pub fn with_compact_threshold(mut self, compact_threshold: usize) -> Self {
        self.compact_threshold = compact_threshold;
        self
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    fn wal_path(&self) -> PathBuf {
        self.dir.join(WAL_FILE)
    }
}

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum WalWrite<'a> {
    Put { post: &'a Post },
    Remove { id: &'a str },
}

#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum WalRecord {
    Put { post: Post },
    Remove { id: String },
}

impl WalRecord {
    fn apply(self, posts: &mut BTreeMap<String, Post>) {
        match self {
            WalRecord::Put { post } => {
                posts.insert(post.id.clone(), post);
            }
            WalRecord::Remove { id } => {
                posts.remove(&id);
            }
        }
    }
}

/// Outcome of replaying the WAL at open.
#[derive(Debug, Default)]
struct Replay {
    records: usize,
    /// Length of the well-formed prefix of the file.
    valid_len: u64,
    /// The last record parsed but was not newline-terminated.
    missing_newline: bool,
}

struct Inner {
    posts: BTreeMap<String, Post>,
    wal: File,
    wal_len: u64,
    wal_records: usize,
}

/// Post store that survives restarts.
pub struct FilePostStore {
    config: FileStoreConfig,
    inner: RwLock<Inner>,
}

impl FilePostStore {
    /// Open (or create) the store in `config.dir`, recovering from the WAL.
    pub async fn open(config: FileStoreConfig) -> Result<Self, RepoError> {
        fs::create_dir_all(&config.dir).await?;

        let mut posts = load_snapshot(&config.snapshot_path()).await?;
        let wal_path = config.wal_path();
        let replay = replay_wal(&wal_path, &mut posts).await?;

        let mut wal = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&wal_path)
            .await?;

        let mut wal_len = wal.metadata().await?.len();
        if wal_len > replay.valid_len {
            tracing::warn!(
                path = %wal_path.display(),
                dropped_bytes = wal_len - replay.valid_len,
                "Dropping torn record at end of WAL"
            );
            wal.set_len(replay.valid_len).await?;
            wal_len = replay.valid_len;
        }
        if replay.missing_newline {
            wal.write_all(b"\n").await?;
            wal.sync_data().await?;
            wal_len += 1;
        }

        tracing::info!(
            dir = %config.dir.display(),
            posts = posts.len(),
            replayed = replay.records,
            "File post store opened"
        );

        Ok(Self {
            config,
            inner: RwLock::new(Inner {
                posts,
                wal,
                wal_len,
                wal_records: replay.records,
            }),
        })
    }

    /// Write the current map as the new snapshot and truncate the WAL.
    pub async fn compact(&self) -> Result<(), RepoError> {
        let mut inner = self.inner.write().await;
        self.compact_locked(&mut inner).await
    }

    async fn compact_locked(&self, inner: &mut Inner) -> Result<(), RepoError> {
        let tmp_path = self.config.dir.join(SNAPSHOT_TMP_FILE);
        let data = serde_json::to_vec(&inner.posts)?;

        let mut tmp = File::create(&tmp_path).await?;
        tmp.write_all(&data).await?;
        tmp.sync_all().await?;
        drop(tmp);
        fs::rename(&tmp_path, self.config.snapshot_path()).await?;
        // The rename must be on disk before the WAL it replaces is emptied.
        File::open(&self.config.dir).await?.sync_all().await?;

        inner.wal.set_len(0).await?;
        inner.wal.sync_all().await?;
        inner.wal_len = 0;
        inner.wal_records = 0;

        tracing::info!(posts = inner.posts.len(), "Post store compacted");
        Ok(())
    }

    /// Append one record and sync it. On failure the WAL is cut back to its
    /// previous length so a partial line never precedes later records.
    async fn append(inner: &mut Inner, record: &WalWrite<'_>) -> Result<(), RepoError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let written = async {
            inner.wal.write_all(&line).await?;
            inner.wal.flush().await?;
            inner.wal.sync_data().await
        }
        .await;

        if let Err(err) = written {
            tracing::error!(error = %err, "WAL append failed");
            if let Err(truncate_err) = inner.wal.set_len(inner.wal_len).await {
                tracing::error!(error = %truncate_err, "Could not roll back partial WAL record");
            }
            return Err(err.into());
        }

        inner.wal_len += line.len() as u64;
        inner.wal_records += 1;
        Ok(())
    }

    /// Compact once the WAL reaches the threshold. Runs after a mutation is
    /// already durable, so a failure is logged and retried on the next write.
    async fn maybe_compact(&self, inner: &mut Inner) {
        let threshold = self.config.compact_threshold;
        if threshold == 0 || inner.wal_records < threshold {
            return;
        }
        if let Err(err) = self.compact_locked(inner).await {
            tracing::warn!(
                error = %err,
                wal_records = inner.wal_records,
                "Compaction failed, will retry on next write"
            );
        }
    }
}

#[async_trait]
impl PostStore for FilePostStore {
    async fn insert(&self, post: Post) -> Result<Option<Post>, RepoError> {
        let mut inner = self.inner.write().await;

        Self::append(&mut inner, &WalWrite::Put { post: &post }).await?;
        let previous = inner.posts.insert(post.id.clone(), post);

        self.maybe_compact(&mut inner).await;
        Ok(previous)
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.get(id).cloned())
    }

    async fn remove(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(id) {
            return Ok(None);
        }

        Self::append(&mut inner, &WalWrite::Remove { id }).await?;
        let removed = inner.posts.remove(id);

        self.maybe_compact(&mut inner).await;
        Ok(removed)
    }

    async fn values(&self) -> Result<Vec<Post>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.values().cloned().collect())
    }
}

async fn load_snapshot(path: &Path) -> Result<BTreeMap<String, Post>, RepoError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| RepoError::Corrupt(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

async fn replay_wal(path: &Path, posts: &mut BTreeMap<String, Post>) -> Result<Replay, RepoError> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Replay::default()),
        Err(e) => return Err(e.into()),
    };

    let mut replay = Replay::default();
    let mut lines = data.split_inclusive(|b| *b == b'\n').enumerate().peekable();

    while let Some((index, line)) = lines.next() {
        let terminated = line.ends_with(b"\n");
        let body = line.strip_suffix(b"\n").unwrap_or(line);

        if body.iter().all(u8::is_ascii_whitespace) {
            if terminated {
                replay.valid_len += line.len() as u64;
            }
            continue;
        }

        match serde_json::from_slice::<WalRecord>(body) {
            Ok(record) => {
                record.apply(posts);
                replay.records += 1;
                replay.valid_len += line.len() as u64;
                replay.missing_newline = !terminated;
            }
            Err(_) if lines.peek().is_none() => break,
            Err(e) => {
                return Err(RepoError::Corrupt(format!(
                    "{}: line {}: {e}",
                    path.display(),
                    index + 1
                )));
            }
        }
    }

    Ok(replay)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::{Map, json};
    use tempfile::TempDir;

    use super::*;

    fn post(id: &str, title: &str) -> Post {
        let mut extra = Map::new();
        extra.insert("tags".to_string(), json!(["a", "b"]));
        Post {
            id: id.to_string(),
            title: title.to_string(),
            content: "content".to_string(),
            created_at: Utc::now(),
            updated_at: None,
            extra,
        }
    }

    async fn open(dir: &TempDir) -> FilePostStore {
        FilePostStore::open(FileStoreConfig::new(dir.path()).with_compact_threshold(0))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();

        let store = open(&dir).await;
        store.insert(post("a", "first")).await.unwrap();
        store.insert(post("b", "second")).await.unwrap();
        store.insert(post("a", "first again")).await.unwrap();
        store.remove("b").await.unwrap();
        drop(store);

        let reopened = open(&dir).await;
        let posts = reopened.values().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "first again");
        assert_eq!(posts[0].extra.get("tags"), Some(&json!(["a", "b"])));
    }

    #[tokio::test]
    async fn test_remove_missing_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir).await;

        assert!(store.remove("ghost").await.unwrap().is_none());
        let wal = std::fs::read(dir.path().join(WAL_FILE)).unwrap();
        assert!(wal.is_empty());
    }

    #[tokio::test]
    async fn test_compact_then_reopen() {
        let dir = TempDir::new().unwrap();

        let store = open(&dir).await;
        store.insert(post("a", "one")).await.unwrap();
        store.insert(post("b", "two")).await.unwrap();
        store.compact().await.unwrap();
        store.insert(post("c", "three")).await.unwrap();
        drop(store);

        let wal = std::fs::read_to_string(dir.path().join(WAL_FILE)).unwrap();
        assert_eq!(wal.lines().count(), 1);

        let reopened = open(&dir).await;
        let ids: Vec<String> = reopened
            .values()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_auto_compacts_at_threshold() {
        let dir = TempDir::new().unwrap();
        let config = FileStoreConfig::new(dir.path()).with_compact_threshold(3);

        let store = FilePostStore::open(config.clone()).await.unwrap();
        for id in ["a", "b", "c"] {
            store.insert(post(id, id)).await.unwrap();
        }

        let wal = std::fs::metadata(dir.path().join(WAL_FILE)).unwrap();
        assert_eq!(wal.len(), 0);
        assert!(dir.path().join(SNAPSHOT_FILE).exists());
        drop(store);

        let reopened = FilePostStore::open(config).await.unwrap();
        assert_eq!(reopened.values().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_compaction_keeps_write_and_retries() {
        let dir = TempDir::new().unwrap();
        let config = FileStoreConfig::new(dir.path()).with_compact_threshold(1);
        let store = FilePostStore::open(config.clone()).await.unwrap();

        // A directory in the way of the temp snapshot makes compaction fail.
        let blocker = dir.path().join(SNAPSHOT_TMP_FILE);
        std::fs::create_dir(&blocker).unwrap();

        assert!(store.insert(post("a", "one")).await.unwrap().is_none());
        assert!(store.get("a").await.unwrap().is_some());
        assert!(!dir.path().join(SNAPSHOT_FILE).exists());

        let removed = store.remove("a").await.unwrap();
        assert_eq!(removed.map(|p| p.id), Some("a".to_string()));

        std::fs::remove_dir(&blocker).unwrap();
        store.insert(post("b", "two")).await.unwrap();

        let wal = std::fs::metadata(dir.path().join(WAL_FILE)).unwrap();
        assert_eq!(wal.len(), 0);
        drop(store);

        let reopened = FilePostStore::open(config).await.unwrap();
        let ids: Vec<String> = reopened
            .values()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["b"]);
    }

    #[tokio::test]
    async fn test_torn_tail_is_dropped() {
        let dir = TempDir::new().unwrap();

        let store = open(&dir).await;
        store.insert(post("a", "kept")).await.unwrap();
        drop(store);

        let wal_path = dir.path().join(WAL_FILE);
        let mut wal = std::fs::read(&wal_path).unwrap();
        wal.extend_from_slice(br#"{"op":"put","post":{"id":"b","ti"#);
        std::fs::write(&wal_path, &wal).unwrap();

        let store = open(&dir).await;
        assert!(store.get("b").await.unwrap().is_none());
        store.insert(post("c", "after")).await.unwrap();
        drop(store);

        let reopened = open(&dir).await;
        let ids: Vec<String> = reopened
            .values()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[tokio::test]
    async fn test_unterminated_final_record_is_kept() {
        let dir = TempDir::new().unwrap();

        let store = open(&dir).await;
        store.insert(post("a", "kept")).await.unwrap();
        drop(store);

        let wal_path = dir.path().join(WAL_FILE);
        let wal = std::fs::read(&wal_path).unwrap();
        std::fs::write(&wal_path, &wal[..wal.len() - 1]).unwrap();

        let store = open(&dir).await;
        store.insert(post("b", "next")).await.unwrap();
        drop(store);

        let reopened = open(&dir).await;
        assert_eq!(reopened.values().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_middle_line_fails_open() {
        let dir = TempDir::new().unwrap();

        let store = open(&dir).await;
        store.insert(post("a", "one")).await.unwrap();
        drop(store);

        let wal_path = dir.path().join(WAL_FILE);
        let mut wal = b"not json\n".to_vec();
        wal.extend(std::fs::read(&wal_path).unwrap());
        std::fs::write(&wal_path, &wal).unwrap();

        let result = FilePostStore::open(FileStoreConfig::new(dir.path())).await;
        assert!(matches!(result, Err(RepoError::Corrupt(_))));
    }
}
