//! Persistence layer: the flat binary vector file format.

pub mod codec;

pub use codec::{load, save};
