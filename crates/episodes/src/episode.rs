//! Episodic memory: what happened, how the agent reasoned, and how it went.
//!
//! Summarizing a run is delegated to an [`EpisodeSummarizer`], usually a
//! language model. Everything else here is plain data.

use crate::error::Result;
use crate::training::TrainingDataFile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contextloom_config::TrainingConfig;
use contextloom_core::{ActionCall, ActionResult, LogEntry, Thought, WorkingMemory};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

// ── Data Structures ───────────────────────────────────────────────────────

/// The three-field record produced by a summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodicSummary {
    /// The context and setup: what happened.
    pub observation: String,
    /// First-person reasoning that led to the actions.
    pub thoughts: String,
    /// Outcome and retrospective.
    pub result: String,
}

/// A stored episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub observation: String,
    pub thoughts: String,
    pub result: String,
}

/// One line of fine-tuning data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    pub prompt: String,
    pub completion: String,
}

/// The material a summarizer condenses into an episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRequest {
    pub thoughts: Vec<Thought>,
    pub actions: Vec<ActionCall>,
    pub results: Vec<ActionResult>,
}

/// Options for [`create_episode`].
#[derive(Debug, Clone, Default)]
pub struct CreateEpisodeOptions {
    /// Append a training pair for the new episode.
    pub export_training_data: bool,
    /// Destination file; `./training-data.jsonl` when unset.
    pub training_data_path: Option<PathBuf>,
}

impl From<&TrainingConfig> for CreateEpisodeOptions {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            export_training_data: config.export,
            training_data_path: Some(config.path.clone()),
        }
    }
}

// ── Summarizer ────────────────────────────────────────────────────────────

/// Turns an agent's thoughts, actions and results into an episodic summary.
#[async_trait]
pub trait EpisodeSummarizer: Send + Sync {
    async fn summarize(&self, request: &EpisodeRequest) -> Result<EpisodicSummary>;
}

// ── Implementation ────────────────────────────────────────────────────────

impl TrainingPair {
    /// Prompt is the observation; completion is the thoughts and result
    /// separated by a blank line.
    pub fn from_summary(summary: &EpisodicSummary) -> Self {
        Self {
            prompt: summary.observation.clone(),
            completion: format!("{}\n\n{}", summary.thoughts, summary.result),
        }
    }
}

impl Episode {
    /// A fresh episode with a new ID, stamped now.
    pub fn from_summary(summary: EpisodicSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            observation: summary.observation,
            thoughts: summary.thoughts,
            result: summary.result,
        }
    }

    pub fn training_pair(&self) -> TrainingPair {
        TrainingPair {
            prompt: self.observation.clone(),
            completion: format!("{}\n\n{}", self.thoughts, self.result),
        }
    }
}

impl EpisodeRequest {
    pub fn new(
        thoughts: Vec<Thought>,
        actions: Vec<ActionCall>,
        results: Vec<ActionResult>,
    ) -> Self {
        Self {
            thoughts,
            actions,
            results,
        }
    }

    /// Collect thoughts, calls and results from a working-memory buffer in
    /// chronological order.
    pub fn from_memory(memory: &WorkingMemory) -> Self {
        let mut request = Self::default();
        for record in memory.logs() {
            match &record.entry {
                LogEntry::Thought(thought) => request.thoughts.push(thought.clone()),
                LogEntry::ActionCall(call) => request.actions.push(call.clone()),
                LogEntry::ActionResult(result) => request.results.push(result.clone()),
                LogEntry::Input(_) | LogEntry::Output(_) => {}
            }
        }
        request
    }

    pub fn is_empty(&self) -> bool {
        self.thoughts.is_empty() && self.actions.is_empty() && self.results.is_empty()
    }

    /// Instruction text for a model-backed summarizer, embedding each list
    /// as JSON.
    pub fn prompt(&self) -> Result<String> {
        let thoughts = serde_json::to_string(&self.thoughts)?;
        let actions = serde_json::to_string(&self.actions)?;
        let results = serde_json::to_string(&self.results)?;

        Ok(format!(
            r#"You are creating an episodic memory for an AI agent to help it recall and learn from past experiences.

Analyze the agent's thoughts, actions, and the results of those actions, and produce a structured memory for future reference and learning.

## Context
<thoughts>
{thoughts}
</thoughts>

## Actions Taken
<actions>
{actions}
</actions>

## Results & Outcomes
<results>
{results}
</results>

## Instructions
Create an episodic memory with these components:

1. OBSERVATION: the situation, what the agent was trying to accomplish, and the initial conditions or constraints.

2. THOUGHTS: the agent's reasoning that led to its actions, the strategies it considered, and the key insights it reached. Use first person ("I realized...", "I considered...").

3. RESULT: what was accomplished, what worked and what didn't, and what would be done differently next time. Use first person ("I succeeded in...", "Next time I would...").

Keep the memory detailed enough to be useful for future recall but concise enough to be processed quickly."#
        ))
    }
}

/// Summarize a run into a new [`Episode`].
///
/// With `export_training_data` set, the episode's training pair is appended
/// to the configured file before returning.
pub async fn create_episode(
    summarizer: &dyn EpisodeSummarizer,
    request: &EpisodeRequest,
    options: &CreateEpisodeOptions,
) -> Result<Episode> {
    debug!(
        thoughts = request.thoughts.len(),
        actions = request.actions.len(),
        results = request.results.len(),
        "Summarizing episode"
    );
    let summary = summarizer.summarize(request).await?;

    if options.export_training_data {
        let path = options
            .training_data_path
            .clone()
            .unwrap_or_else(TrainingDataFile::default_path);
        TrainingDataFile::new(path).append(&TrainingPair::from_summary(&summary))?;
    }

    let episode = Episode::from_summary(summary);
    info!(id = %episode.id, "Episode created");
    Ok(episode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EpisodeError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the requests it sees and returns a fixed summary.
    struct RecordingSummarizer {
        seen: Mutex<Vec<EpisodeRequest>>,
    }

    impl RecordingSummarizer {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EpisodeSummarizer for RecordingSummarizer {
        async fn summarize(&self, request: &EpisodeRequest) -> Result<EpisodicSummary> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(summary())
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl EpisodeSummarizer for FailingSummarizer {
        async fn summarize(&self, _request: &EpisodeRequest) -> Result<EpisodicSummary> {
            Err(EpisodeError::summarizer("model unavailable"))
        }
    }

    fn summary() -> EpisodicSummary {
        EpisodicSummary {
            observation: "User asked for the weather in Oslo".into(),
            thoughts: "I looked up the forecast".into(),
            result: "I answered correctly".into(),
        }
    }

    fn request() -> EpisodeRequest {
        EpisodeRequest::new(
            vec![Thought {
                content: "check forecast".into(),
            }],
            vec![ActionCall {
                id: "c1".into(),
                name: "forecast".into(),
                data: json!({"city": "Oslo"}),
            }],
            vec![ActionResult {
                name: "forecast".into(),
                call_id: "c1".into(),
                data: json!({"rain": true}),
                formatted: None,
            }],
        )
    }

    #[test]
    fn training_pair_joins_thoughts_and_result() {
        let pair = TrainingPair::from_summary(&summary());
        assert_eq!(pair.prompt, "User asked for the weather in Oslo");
        assert_eq!(pair.completion, "I looked up the forecast\n\nI answered correctly");
        assert_eq!(Episode::from_summary(summary()).training_pair(), pair);
    }

    #[test]
    fn prompt_embeds_lists_as_json() {
        let prompt = request().prompt().unwrap();
        assert!(prompt.contains("<thoughts>\n[{\"content\":\"check forecast\"}]\n</thoughts>"));
        assert!(prompt.contains(r#"{"id":"c1","name":"forecast","data":{"city":"Oslo"}}"#));
        assert!(prompt.contains(r#""callId":"c1""#));
    }

    #[test]
    fn request_from_memory_skips_io() {
        use chrono::TimeZone;
        use contextloom_core::LogRecord;

        let mut wm = WorkingMemory::new();
        let at = |s| Utc.timestamp_opt(s, 0).unwrap();
        wm.push(LogRecord::new(LogEntry::input("chat", "hi"), at(1)));
        wm.push(LogRecord::new(LogEntry::thought("second"), at(3)));
        wm.push(LogRecord::new(LogEntry::thought("first"), at(2)));
        wm.push(LogRecord::new(LogEntry::output("chat", "hello"), at(4)));

        let request = EpisodeRequest::from_memory(&wm);
        let contents: Vec<&str> = request.thoughts.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert!(request.actions.is_empty());
        assert!(!request.is_empty());
    }

    #[tokio::test]
    async fn create_episode_without_export() {
        let summarizer = RecordingSummarizer::new();
        let episode = create_episode(&summarizer, &request(), &CreateEpisodeOptions::default())
            .await
            .unwrap();

        assert_eq!(episode.observation, "User asked for the weather in Oslo");
        assert_eq!(summarizer.seen.lock().unwrap().as_slice(), &[request()]);
    }

    #[tokio::test]
    async fn create_episode_appends_training_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/pairs.jsonl");
        let options = CreateEpisodeOptions {
            export_training_data: true,
            training_data_path: Some(path.clone()),
        };

        let summarizer = RecordingSummarizer::new();
        create_episode(&summarizer, &request(), &options).await.unwrap();
        create_episode(&summarizer, &request(), &options).await.unwrap();

        let pairs = TrainingDataFile::new(&path).load().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], TrainingPair::from_summary(&summary()));
    }

    #[tokio::test]
    async fn training_config_drives_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configured.jsonl");
        let summarizer = RecordingSummarizer::new();

        let disabled = TrainingConfig {
            export: false,
            path: path.clone(),
        };
        create_episode(&summarizer, &request(), &CreateEpisodeOptions::from(&disabled))
            .await
            .unwrap();
        assert!(!path.exists());

        let enabled = TrainingConfig {
            export: true,
            path: path.clone(),
        };
        let options = CreateEpisodeOptions::from(&enabled);
        assert!(options.export_training_data);
        assert_eq!(options.training_data_path.as_deref(), Some(path.as_path()));

        create_episode(&summarizer, &request(), &options).await.unwrap();
        let pairs = TrainingDataFile::new(&path).load().unwrap();
        assert_eq!(pairs, vec![TrainingPair::from_summary(&summary())]);
    }

    #[tokio::test]
    async fn summarizer_failure_propagates_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.jsonl");
        let options = CreateEpisodeOptions {
            export_training_data: true,
            training_data_path: Some(path.clone()),
        };

        let err = create_episode(&FailingSummarizer, &request(), &options).await.unwrap_err();
        assert!(matches!(err, EpisodeError::Summarizer(_)));
        assert!(!path.exists());
    }

    #[test]
    fn episode_serializes_with_uuid_and_timestamp() {
        let episode = Episode::from_summary(summary());
        let value = serde_json::to_value(&episode).unwrap();
        assert_eq!(value["id"], json!(episode.id.to_string()));
        let back: Episode = serde_json::from_value(value).unwrap();
        assert_eq!(back, episode);
    }
}
