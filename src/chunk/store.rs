use std::path::{Path, PathBuf};

use dashmap::DashMap;
use tokio::fs;

use crate::chunk::{Chunk, ChunkStatus};
use crate::config::constants::CHUNK_NUMBER_WIDTH;
use crate::error::{PipelineError, Result};

/// Disk-backed, concurrency-safe table of chunks for one run, keyed by
/// chunk number. Source text lives under `chunks_txt/`, synthesized audio
/// under `chunks_audio/`, both named `chunk_NNN.{txt,mp3}` zero-padded to
/// `CHUNK_NUMBER_WIDTH`.
///
/// `claim`/`complete_success`/`complete_fail`/`reset` are the only ways a
/// worker may mutate chunk state; there is no direct map access from outside
/// this module.
pub struct ChunkStore {
    text_dir: PathBuf,
    audio_dir: PathBuf,
    chunks: DashMap<u32, Chunk>,
}

impl ChunkStore {
    /// Write each piece of `contents` (in order, numbered `1..=N`) to disk
    /// under `text_dir`/`audio_dir` and build the in-memory table.
    pub async fn create(text_dir: PathBuf, audio_dir: PathBuf, contents: &[String]) -> Result<Self> {
        fs::create_dir_all(&text_dir).await?;
        fs::create_dir_all(&audio_dir).await?;

        let chunks = DashMap::new();
        for (idx, content) in contents.iter().enumerate() {
            let number = (idx + 1) as u32;
            let text_file = text_dir.join(chunk_file_name(number, "txt"));
            let audio_file = audio_dir.join(chunk_file_name(number, "mp3"));

            write_atomic(&text_file, content.as_bytes()).await?;

            chunks.insert(number, Chunk::new(number, content.clone(), text_file, audio_file));
        }

        Ok(Self {
            text_dir,
            audio_dir,
            chunks,
        })
    }

    pub fn text_dir(&self) -> &Path {
        &self.text_dir
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, number: u32) -> Option<Chunk> {
        self.chunks.get(&number).map(|entry| entry.clone())
    }

    pub fn all(&self) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = self.chunks.iter().map(|entry| entry.clone()).collect();
        chunks.sort_by_key(|c| c.number);
        chunks
    }

    /// Atomically move one `Queue` chunk to `Pending`, returning it. Returns
    /// `None` if no chunk is currently eligible to be claimed.
    pub fn claim_next(&self) -> Option<Chunk> {
        let mut claimed = None;
        for mut entry in self.chunks.iter_mut() {
            if entry.status == ChunkStatus::Queue {
                entry.status = ChunkStatus::Pending;
                claimed = Some(entry.clone());
                break;
            }
        }
        claimed
    }

    /// Record a successful synthesis: persist `audio_bytes` to disk and mark
    /// the chunk `Success`.
    pub async fn complete_success(&self, number: u32, audio_bytes: &[u8]) -> Result<()> {
        let audio_file = {
            let entry = self
                .chunks
                .get(&number)
                .ok_or_else(|| PipelineError::InvalidConfig(format!("unknown chunk {number}")))?;
            entry.audio_file.clone()
        };

        write_atomic(&audio_file, audio_bytes).await?;

        if let Some(mut entry) = self.chunks.get_mut(&number) {
            entry.status = ChunkStatus::Success;
        }
        Ok(())
    }

    /// Record an attempt against a chunk still owned (`Pending`) by the
    /// worker retrying it, without changing its status -- the chunk stays
    /// invisible to `claim_next` until the worker reaches a final outcome.
    pub fn record_attempt(&self, number: u32) {
        if let Some(mut entry) = self.chunks.get_mut(&number) {
            entry.attempts += 1;
        }
    }

    /// Exhaust retries: mark the chunk terminally `Fail`ed.
    pub fn complete_fail(&self, number: u32) {
        if let Some(mut entry) = self.chunks.get_mut(&number) {
            entry.status = ChunkStatus::Fail;
        }
    }

    /// Put a chunk back on the queue, making it claimable again. Used to
    /// requeue chunks a run gives up on early (e.g. on cancellation) rather
    /// than marking them failed.
    pub fn reset(&self, number: u32) {
        if let Some(mut entry) = self.chunks.get_mut(&number) {
            entry.status = ChunkStatus::Queue;
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.chunks
            .iter()
            .all(|entry| entry.status == ChunkStatus::Success)
    }

    pub fn failed_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .chunks
            .iter()
            .filter(|entry| entry.status == ChunkStatus::Fail)
            .map(|entry| entry.number)
            .collect();
        numbers.sort_unstable();
        numbers
    }
}

fn chunk_file_name(number: u32, extension: &str) -> String {
    format!("chunk_{number:0width$}.{extension}", width = CHUNK_NUMBER_WIDTH)
}

/// Write `data` to `path` via a sibling temp file plus rename, so a reader
/// never observes a partially written chunk file.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("")
    ));
    fs::write(&tmp_path, data).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_writes_numbered_files() {
        let dir = tempdir().unwrap();
        let text_dir = dir.path().join("chunks_txt");
        let audio_dir = dir.path().join("chunks_audio");

        let store = ChunkStore::create(
            text_dir.clone(),
            audio_dir,
            &["first".to_string(), "second".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(store.len(), 2);
        assert!(text_dir.join("chunk_001.txt").exists());
        assert!(text_dir.join("chunk_002.txt").exists());

        let content = tokio::fs::read_to_string(text_dir.join("chunk_001.txt"))
            .await
            .unwrap();
        assert_eq!(content, "first");
    }

    #[tokio::test]
    async fn test_claim_next_moves_queue_to_pending() {
        let dir = tempdir().unwrap();
        let store = ChunkStore::create(
            dir.path().join("txt"),
            dir.path().join("audio"),
            &["only".to_string()],
        )
        .await
        .unwrap();

        let claimed = store.claim_next().expect("should claim one chunk");
        assert_eq!(claimed.status, ChunkStatus::Pending);
        assert!(store.claim_next().is_none());
    }

    #[tokio::test]
    async fn test_complete_success_writes_audio_and_marks_success() {
        let dir = tempdir().unwrap();
        let store = ChunkStore::create(
            dir.path().join("txt"),
            dir.path().join("audio"),
            &["only".to_string()],
        )
        .await
        .unwrap();

        store.claim_next().unwrap();
        store.complete_success(1, b"mp3-bytes").await.unwrap();

        let chunk = store.get(1).unwrap();
        assert_eq!(chunk.status, ChunkStatus::Success);
        assert!(chunk.audio_file.exists());
        assert!(store.all_succeeded());
    }

    #[tokio::test]
    async fn test_complete_fail_marks_terminal_fail() {
        let dir = tempdir().unwrap();
        let store = ChunkStore::create(
            dir.path().join("txt"),
            dir.path().join("audio"),
            &["only".to_string()],
        )
        .await
        .unwrap();

        store.claim_next().unwrap();
        store.record_attempt(1);
        store.complete_fail(1);

        let chunk = store.get(1).unwrap();
        assert_eq!(chunk.status, ChunkStatus::Fail);
        assert_eq!(chunk.attempts, 1);
        assert_eq!(store.failed_numbers(), vec![1]);
    }

    #[tokio::test]
    async fn test_record_attempt_keeps_chunk_pending() {
        let dir = tempdir().unwrap();
        let store = ChunkStore::create(
            dir.path().join("txt"),
            dir.path().join("audio"),
            &["only".to_string()],
        )
        .await
        .unwrap();

        store.claim_next().unwrap();
        store.record_attempt(1);

        let chunk = store.get(1).unwrap();
        assert_eq!(chunk.status, ChunkStatus::Pending);
        assert_eq!(chunk.attempts, 1);
        assert!(store.claim_next().is_none());
    }

    #[tokio::test]
    async fn test_reset_does_not_count_attempt() {
        let dir = tempdir().unwrap();
        let store = ChunkStore::create(
            dir.path().join("txt"),
            dir.path().join("audio"),
            &["only".to_string()],
        )
        .await
        .unwrap();

        store.claim_next().unwrap();
        store.reset(1);

        let chunk = store.get(1).unwrap();
        assert_eq!(chunk.status, ChunkStatus::Queue);
        assert_eq!(chunk.attempts, 0);
    }
}
