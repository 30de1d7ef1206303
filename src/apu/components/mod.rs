//! Common APU components used by multiple channels

pub mod divider;
pub mod envelope;
pub mod frame_counter;
pub mod gates;
pub mod sweep;

pub use divider::Divider;
pub use envelope::Envelope;
pub use frame_counter::{FrameCounter, FrameEvents, FrameMode};
pub use gates::{LengthCounter, LinearCounter};
pub use sweep::Sweep;
