// ABOUTME: Shared types for the splitgrid layout engine.
// ABOUTME: Defines orientation, panel parameters, layout options and event channels.

pub mod emitter;
pub mod options;
pub mod orientation;
pub mod params;

pub use emitter::{Emitter, Subscription};
pub use options::{LayoutOptions, OptionsError};
pub use orientation::Orientation;
pub use params::Parameters;
