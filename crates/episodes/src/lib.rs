//! Episodic memory and training-data export for ContextLoom.
//!
//! After a run, the agent's thoughts, actions and results are condensed
//! into an [`Episode`] by an [`EpisodeSummarizer`]. Episodes double as
//! fine-tuning material: each one yields a prompt/completion
//! [`TrainingPair`] stored as JSON lines.

pub mod episode;
pub mod error;
pub mod training;

pub use episode::{
    CreateEpisodeOptions, Episode, EpisodeRequest, EpisodeSummarizer, EpisodicSummary,
    TrainingPair, create_episode,
};
pub use error::{EpisodeError, Result};
pub use training::{TrainingDataFile, export_episodes};
