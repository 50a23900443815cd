//! # saga-pipelines
//!
//! The three generation jobs and the pieces they share.
//!
//! - [`synthesizer::ChatSynthesizer`]: monthly chat logs chained by rolling summaries
//! - [`consolidate::consolidate`]: monthly files into one ordered log
//! - [`tracer::DecisionTracer`]: one causal trace per decision marker, resumable per id
//! - [`journey::JourneySummarizer`]: one episode per calendar week
//! - [`status::StatusReport`]: what exists on disk
//!
//! Every job is sequential and takes its settings and generation client
//! explicitly.

#![deny(unsafe_code)]

pub mod consolidate;
pub mod journey;
pub mod layout;
pub mod length;
pub mod marker;
pub mod prompts;
pub mod status;
pub mod synthesizer;
pub mod tracer;
pub mod weeks;

pub use consolidate::{ConsolidationReport, consolidate};
pub use journey::{JourneyReport, JourneySummarizer};
pub use layout::DataLayout;
pub use marker::{DecisionMarker, MarkerError, parse_marker};
pub use status::StatusReport;
pub use synthesizer::{ChatSynthesizer, SynthesisReport};
pub use tracer::{DecisionTracer, TraceReport};
pub use weeks::partition_by_week;
