//! Streamers for the ROOT classes this crate understands.

mod ttree;

pub use ttree::read_ttree;
