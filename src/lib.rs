//! Svar - Question Answering over Video Transcripts
//!
//! A retrieval-augmented answer pipeline for transcribed video collections.
//!
//! The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
//!
//! # Overview
//!
//! Svar allows you to:
//! - Ask questions over indexed video transcripts, scoped to a collection
//! - Choose between lexical (keyword) and vector (semantic) retrieval
//! - Get AI-generated answers with source links, self-scored for relevance
//! - Track token usage and estimated API cost per question
//! - Persist conversations and collect thumbs-up/down feedback
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt template management
//! - `embedding` - Query embedding generation
//! - `index` - Search index abstraction (Elasticsearch-shaped, in-memory)
//! - `search` - Search gateway dispatching lexical/vector retrieval
//! - `rag` - Answer pipeline: prompts, completion, evaluation, cost
//! - `store` - Conversation and feedback persistence
//!
//! # Example
//!
//! ```rust,no_run
//! use svar::config::Settings;
//! use svar::rag::AnswerPipeline;
//! use svar::search::SearchMode;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = AnswerPipeline::from_settings(&settings)?;
//!
//!     let result = pipeline
//!         .answer(
//!             "What is a spectrogram?",
//!             "Audio Signal Processing for ML",
//!             SearchMode::Vector,
//!         )
//!         .await?;
//!     println!("{}", result.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod openai;
pub mod rag;
pub mod search;
pub mod store;

pub use error::{Result, SvarError};
