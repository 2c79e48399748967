//! Prompts sent to models and the answers they return.
//!
//! - [`template`] - Build prompt templates for a location and instantiate them for a task
//! - [`parsing`] - Recover coordinates from prompts and ratings from completions
//! - [`finetune`] - Pair prompts with rank-derived labels for fine-tuning
//! - [`predictions`] - Collect located ratings from model completions
//!
//! Templates are stored with a `<TASK>` placeholder so one prompt set can be
//! reused for every rating topic.
//!
//! # Usage
//!
//! ```rust,ignore
//! use geobias::location::{describe_nearby, Location, MAX_NEARBY_PLACES};
//! use geobias::prompts::{build_prompt, extract_rating, instantiate};
//!
//! let here = Location::new(35.6762, 139.6503);
//! let nearby = describe_nearby(here, places, MAX_NEARBY_PLACES);
//! let template = build_prompt(here, Some("Shinjuku, Tokyo, Japan"), &nearby);
//!
//! let prompt = instantiate(&template, "Population Density");
//! let rating = extract_rating("My answer is 9.1.");
//! ```

pub mod finetune;
pub mod parsing;
pub mod predictions;
pub mod template;

pub use finetune::{
    answer_text, build_finetune_records, rank_label, ChatMessage, FineTuneRecord, MAX_RATING,
};
pub use parsing::{extract_coordinates, extract_rating};
pub use predictions::{collect_predictions, CollectedPredictions};
pub use template::{build_prompt, format_address, instantiate, PROMPT_PREFIX, TASK_PLACEHOLDER};
