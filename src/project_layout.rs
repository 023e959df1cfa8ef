use std::path::{Path, PathBuf};

use crate::config::constants::{CHUNKS_AUDIO_DIR, CHUNKS_TEXT_DIR, PROJECT_DIR_SUFFIX};

/// Derives the on-disk layout for one run: a project directory holding
/// `chunks_txt`/`chunks_audio`, plus the merged output file's path.
///
/// Output path precedence follows three tiers, resolved in order:
/// 1. An explicit project audio directory, if bound — filename from the
///    source stem.
/// 2. The directory of the source text file — filename from its stem.
/// 3. A process-wide output directory — filename `merged_<timestamp>.mp3`.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub chunks_text_dir: PathBuf,
    pub chunks_audio_dir: PathBuf,
    pub default_output_path: PathBuf,
}

impl ProjectLayout {
    /// Derive a layout from the source text file's path: the project
    /// directory sits alongside it, and (absent an explicit audio
    /// directory) the merged output is named from the source stem and
    /// placed in the source file's own directory, per tier 2 of the
    /// output path precedence.
    pub fn from_source_path(source_path: &Path) -> Self {
        let parent = source_path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = stem_or_default(source_path);
        let project_dir = parent.join(format!("{stem}{PROJECT_DIR_SUFFIX}"));
        let mut layout = Self::from_project_dir(project_dir);
        layout.default_output_path = parent.join(format!("{stem}.mp3"));
        layout
    }

    /// Derive a layout rooted at an explicit project directory, with an
    /// explicit project audio directory bound for the merged output
    /// (tier 1 of the output path precedence).
    pub fn from_project_dir_with_audio_binding(project_dir: PathBuf, source_path: &Path) -> Self {
        let mut layout = Self::from_project_dir(project_dir);
        let stem = stem_or_default(source_path);
        layout.default_output_path = layout.chunks_audio_dir.join(format!("{stem}.mp3"));
        layout
    }

    /// Derive a layout rooted at an explicit project directory, with the
    /// merged output placed directly in `project_dir` under a generic
    /// name. Used when no source path is available to derive a stem from.
    pub fn from_project_dir(project_dir: PathBuf) -> Self {
        let chunks_text_dir = project_dir.join(CHUNKS_TEXT_DIR);
        let chunks_audio_dir = project_dir.join(CHUNKS_AUDIO_DIR);
        let default_output_path = project_dir.join("merged.mp3");
        Self {
            project_dir,
            chunks_text_dir,
            chunks_audio_dir,
            default_output_path,
        }
    }

    /// Tier 3 of the output path precedence: no explicit project directory
    /// and no source path, so the merged output falls back to a
    /// process-wide directory named with the current UTC timestamp.
    pub fn process_wide_fallback(timestamp: &str) -> Self {
        let project_dir = std::env::temp_dir().join(format!("tts_batch_{timestamp}"));
        let mut layout = Self::from_project_dir(project_dir);
        layout.default_output_path = layout
            .project_dir
            .join(format!("merged_{timestamp}.mp3"));
        layout
    }
}

fn stem_or_default(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("project")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source_path_derives_sibling_project_dir() {
        let layout = ProjectLayout::from_source_path(Path::new("/home/user/speech.txt"));
        assert_eq!(layout.project_dir, Path::new("/home/user/speech_tts"));
        assert_eq!(
            layout.chunks_text_dir,
            Path::new("/home/user/speech_tts/chunks_txt")
        );
        assert_eq!(
            layout.chunks_audio_dir,
            Path::new("/home/user/speech_tts/chunks_audio")
        );
    }

    #[test]
    fn test_from_source_path_names_output_from_stem_in_source_dir() {
        let layout = ProjectLayout::from_source_path(Path::new("/home/user/speech.txt"));
        assert_eq!(layout.default_output_path, Path::new("/home/user/speech.mp3"));
    }

    #[test]
    fn test_from_source_path_with_no_parent_uses_cwd_relative() {
        let layout = ProjectLayout::from_source_path(Path::new("speech.txt"));
        assert_eq!(layout.project_dir, Path::new("speech_tts"));
        assert_eq!(layout.default_output_path, Path::new("speech.mp3"));
    }

    #[test]
    fn test_explicit_audio_binding_takes_precedence() {
        let layout = ProjectLayout::from_project_dir_with_audio_binding(
            PathBuf::from("/projects/book"),
            Path::new("/home/user/speech.txt"),
        );
        assert_eq!(
            layout.default_output_path,
            Path::new("/projects/book/chunks_audio/speech.mp3")
        );
    }

    #[test]
    fn test_process_wide_fallback_names_output_with_timestamp() {
        let layout = ProjectLayout::process_wide_fallback("20260101T000000Z");
        assert!(layout
            .default_output_path
            .to_string_lossy()
            .contains("merged_20260101T000000Z.mp3"));
    }
}
