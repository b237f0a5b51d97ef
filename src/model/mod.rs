//! Data model shared by the envelope and alignment views
//!
//! Everything here is produced once and read-only afterwards.

mod audio;
mod beats;
mod timeline;

pub use audio::{Envelope, EnvelopePoint, SampleStream};
pub use beats::BeatSet;
pub use timeline::{Gap, Segment, Timeline};
