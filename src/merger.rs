use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::chunk::store::ChunkStore;
use crate::chunk::ChunkStatus;
use crate::config::constants::MERGE_SIZE_DELTA_WARN_FRACTION;
use crate::error::{PipelineError, Result};

/// Validates a `ChunkStore` is complete (every chunk `Success`, numbers
/// exactly `1..=N`, every audio file present and non-empty) and, if so,
/// concatenates the audio files in ascending order into one output file.
///
/// Concatenation is byte-exact: no re-encoding, no container rewriting. A
/// merged-size-vs-sum-of-inputs delta over
/// `MERGE_SIZE_DELTA_WARN_FRACTION` is logged as a warning only -- it never
/// fails the merge.
pub struct Merger;

impl Merger {
    /// Checks every precondition `merge` relies on, including that each
    /// chunk's audio file exists, is readable, and is non-empty -- run
    /// entirely before `merge` opens the output file, so a failure here
    /// never truncates or partially writes the destination.
    pub async fn validate(store: &ChunkStore) -> Result<()> {
        let chunks = store.all();
        if chunks.is_empty() {
            return Err(PipelineError::PreconditionFailed(
                "chunk store is empty".to_string(),
            ));
        }

        let expected: u32 = chunks.len() as u32;
        let numbers: Vec<u32> = chunks.iter().map(|c| c.number).collect();
        let mut sorted = numbers.clone();
        sorted.sort_unstable();
        let contiguous = sorted
            .iter()
            .enumerate()
            .all(|(idx, &n)| n == (idx as u32) + 1);
        if !contiguous || sorted.len() as u32 != expected {
            return Err(PipelineError::NonContiguousChunks {
                expected,
                found: sorted,
            });
        }

        for chunk in &chunks {
            if chunk.status != ChunkStatus::Success {
                return Err(PipelineError::PreconditionFailed(format!(
                    "chunk {} is not Success (status: {:?})",
                    chunk.number, chunk.status
                )));
            }

            let metadata = fs::metadata(&chunk.audio_file)
                .await
                .map_err(|_| PipelineError::MissingAudio { chunk: chunk.number })?;
            if metadata.len() == 0 {
                return Err(PipelineError::MissingAudio {
                    chunk: chunk.number,
                });
            }
        }

        Ok(())
    }

    /// Run `validate`, then concatenate every chunk's audio file (ascending
    /// by number) into `output_path`.
    pub async fn merge(store: &ChunkStore, output_path: &std::path::Path) -> Result<()> {
        Self::validate(store).await?;

        let chunks = store.all();
        let mut total_input_size: u64 = 0;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut output = fs::File::create(output_path).await?;
        for chunk in &chunks {
            let metadata = fs::metadata(&chunk.audio_file).await.map_err(|_| {
                PipelineError::MissingAudio {
                    chunk: chunk.number,
                }
            })?;
            total_input_size += metadata.len();

            let bytes = fs::read(&chunk.audio_file).await?;
            output.write_all(&bytes).await?;
        }
        output.flush().await?;

        let merged_size = fs::metadata(output_path).await?.len();
        let delta = if total_input_size > 0 {
            (merged_size as f64 - total_input_size as f64).abs() / total_input_size as f64
        } else {
            0.0
        };
        if delta > MERGE_SIZE_DELTA_WARN_FRACTION {
            tracing::warn!(
                merged_size,
                total_input_size,
                delta = delta,
                "merged output size differs from sum of inputs by more than {}%",
                (MERGE_SIZE_DELTA_WARN_FRACTION * 100.0) as u32
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn store_with_chunks(contents: &[&str]) -> ChunkStore {
        let dir = tempdir().unwrap();
        ChunkStore::create(
            dir.path().join("txt"),
            dir.path().join("audio"),
            &contents.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_validate_fails_when_incomplete() {
        let store = store_with_chunks(&["a", "b"]).await;
        store.claim_next().unwrap();
        store.complete_success(1, b"x").await.unwrap();
        // chunk 2 stays Queue.
        assert!(Merger::validate(&store).await.is_err());
    }

    #[tokio::test]
    async fn test_validate_succeeds_when_all_success() {
        let store = store_with_chunks(&["a", "b"]).await;
        while let Some(chunk) = store.claim_next() {
            store.complete_success(chunk.number, b"audio").await.unwrap();
        }
        assert!(Merger::validate(&store).await.is_ok());
    }

    #[tokio::test]
    async fn test_validate_fails_on_empty_audio_file_before_any_write() {
        let store = store_with_chunks(&["a"]).await;
        let chunk = store.claim_next().unwrap();
        store.complete_success(chunk.number, b"").await.unwrap();

        let result = Merger::validate(&store).await;
        assert!(matches!(result, Err(PipelineError::MissingAudio { .. })));
    }

    #[tokio::test]
    async fn test_merge_concatenates_in_order() {
        let store = store_with_chunks(&["a", "b", "c"]).await;
        while let Some(chunk) = store.claim_next() {
            let bytes = vec![chunk.number as u8; 4];
            store.complete_success(chunk.number, &bytes).await.unwrap();
        }

        let dir = tempdir().unwrap();
        let output_path = dir.path().join("merged.mp3");
        Merger::merge(&store, &output_path).await.unwrap();

        let merged = tokio::fs::read(&output_path).await.unwrap();
        assert_eq!(merged, vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
    }

    #[tokio::test]
    async fn test_merge_fails_on_empty_audio_file() {
        let store = store_with_chunks(&["a"]).await;
        let chunk = store.claim_next().unwrap();
        store.complete_success(chunk.number, b"").await.unwrap();

        let dir = tempdir().unwrap();
        let output_path = dir.path().join("merged.mp3");
        let result = Merger::merge(&store, &output_path).await;
        assert!(matches!(result, Err(PipelineError::MissingAudio { .. })));
    }
}
