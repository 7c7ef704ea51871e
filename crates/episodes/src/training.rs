//! Training data as JSON lines: one `{"prompt", "completion"}` object per
//! line, UTF-8.
//!
//! Default location: `./training-data.jsonl`

use crate::episode::{Episode, TrainingPair};
use crate::error::{EpisodeError, Result};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A JSONL file of training pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingDataFile {
    path: PathBuf,
}

impl TrainingDataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default path: `./training-data.jsonl`
    pub fn default_path() -> PathBuf {
        PathBuf::from("./training-data.jsonl")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every pair in the file. A missing file reads as empty; blank
    /// and corrupted lines are skipped.
    pub fn load(&self) -> Result<Vec<TrainingPair>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EpisodeError::io(&self.path, e)),
        };

        Ok(content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match serde_json::from_str::<TrainingPair>(line) {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!(line = n + 1, error = %e, "Skipping corrupted training pair");
                    None
                }
            })
            .collect())
    }

    /// Append one pair, leaving existing lines untouched.
    pub fn append(&self, pair: &TrainingPair) -> Result<()> {
        self.ensure_parent()?;

        let needs_newline = self.ends_unterminated()?;

        let mut line = String::new();
        if needs_newline {
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(pair)?);
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EpisodeError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| EpisodeError::io(&self.path, e))?;

        debug!(path = %self.path.display(), "Appended training pair");
        Ok(())
    }

    /// Replace the file contents with `pairs`.
    pub fn write_all(&self, pairs: &[TrainingPair]) -> Result<()> {
        self.ensure_parent()?;

        let mut content = String::new();
        for pair in pairs {
            content.push_str(&serde_json::to_string(pair)?);
            content.push('\n');
        }

        std::fs::write(&self.path, &content).map_err(|e| EpisodeError::io(&self.path, e))?;
        info!(path = %self.path.display(), count = pairs.len(), "Training data saved");
        Ok(())
    }

    /// Whether the file exists and its last byte is not a newline.
    fn ends_unterminated(&self) -> Result<bool> {
        let mut file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(EpisodeError::io(&self.path, e)),
        };
        let len = file
            .metadata()
            .map_err(|e| EpisodeError::io(&self.path, e))?
            .len();
        if len == 0 {
            return Ok(false);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .map_err(|e| EpisodeError::io(&self.path, e))?;
        Ok(last[0] != b'\n')
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EpisodeError::io(parent, e))?;
        }
        Ok(())
    }
}

impl Default for TrainingDataFile {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

/// Write one training pair per episode to `path`, replacing its contents.
pub fn export_episodes(episodes: &[Episode], path: impl AsRef<Path>) -> Result<()> {
    let pairs: Vec<TrainingPair> = episodes.iter().map(Episode::training_pair).collect();
    TrainingDataFile::new(path.as_ref()).write_all(&pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::EpisodicSummary;

    fn pair(n: usize) -> TrainingPair {
        TrainingPair {
            prompt: format!("observation {n}"),
            completion: format!("thoughts {n}\n\nresult {n}"),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = TrainingDataFile::new(dir.path().join("none.jsonl"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn append_preserves_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let file = TrainingDataFile::new(dir.path().join("pairs.jsonl"));

        file.append(&pair(1)).unwrap();
        file.append(&pair(2)).unwrap();

        assert_eq!(file.load().unwrap(), vec![pair(1), pair(2)]);
        let raw = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
    }

    #[test]
    fn append_after_unterminated_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.jsonl");
        std::fs::write(&path, serde_json::to_string(&pair(1)).unwrap()).unwrap();

        let file = TrainingDataFile::new(&path);
        file.append(&pair(2)).unwrap();
        assert_eq!(file.load().unwrap(), vec![pair(1), pair(2)]);
    }

    #[test]
    fn append_to_empty_file_adds_no_blank_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.jsonl");
        std::fs::write(&path, "").unwrap();

        let file = TrainingDataFile::new(&path);
        file.append(&pair(1)).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\"prompt\""));
        assert_eq!(raw.lines().count(), 1);
    }

    #[test]
    fn unreadable_target_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = TrainingDataFile::new(dir.path());

        let err = file.append(&pair(1)).unwrap_err();
        assert!(matches!(err, EpisodeError::Io { ref path, .. } if path == dir.path()));
    }

    #[test]
    fn write_all_overwrites_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = TrainingDataFile::new(dir.path().join("nested/deeper/pairs.jsonl"));

        file.write_all(&[pair(1), pair(2), pair(3)]).unwrap();
        file.write_all(&[pair(9)]).unwrap();
        assert_eq!(file.load().unwrap(), vec![pair(9)]);
    }

    #[test]
    fn load_skips_blank_and_corrupted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.jsonl");
        let good = serde_json::to_string(&pair(1)).unwrap();
        std::fs::write(&path, format!("\n{good}\n   \n{{not json\n")).unwrap();

        let pairs = TrainingDataFile::new(&path).load().unwrap();
        assert_eq!(pairs, vec![pair(1)]);
    }

    #[test]
    fn lines_are_prompt_completion_objects() {
        let dir = tempfile::tempdir().unwrap();
        let file = TrainingDataFile::new(dir.path().join("pairs.jsonl"));
        file.append(&pair(1)).unwrap();

        let raw = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(
            raw,
            "{\"prompt\":\"observation 1\",\"completion\":\"thoughts 1\\n\\nresult 1\"}\n"
        );
    }

    #[test]
    fn export_writes_one_pair_per_episode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.jsonl");
        let episodes: Vec<Episode> = (0..3)
            .map(|n| {
                Episode::from_summary(EpisodicSummary {
                    observation: format!("observation {n}"),
                    thoughts: format!("thoughts {n}"),
                    result: format!("result {n}"),
                })
            })
            .collect();

        export_episodes(&episodes, &path).unwrap();
        let pairs = TrainingDataFile::new(&path).load().unwrap();
        assert_eq!(pairs, vec![pair(0), pair(1), pair(2)]);
    }
}
