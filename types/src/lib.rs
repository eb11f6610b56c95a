//! Core domain types for chatpress.
//!
//! This crate contains pure domain types with no IO, no pattern matching and
//! minimal dependencies. The extractor, router, judge and repair loop in
//! `chatpress-core` all speak in these types.

mod anchor;
mod genre;
mod message;
mod text;
mod verdict;

pub use anchor::{Anchor, AnchorKind};
pub use genre::{Genre, RoutingDecision, Section, UnknownGenreError};
pub use message::{EmptyTranscriptError, Message, Role, Transcript};
pub use text::{truncate_to_fit, truncate_with_ellipsis, word_count};
pub use verdict::{Counts, Coverage, Criterion, HardFail, JudgeVerdict, Subscores};
