pub mod addition;
pub mod collection;
pub mod config;
pub mod deletion;
pub mod entry;
pub mod gateway;
pub mod model;
pub mod notify;
pub mod rater;

pub use rater::ArtRater;
