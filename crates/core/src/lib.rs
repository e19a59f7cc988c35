#![forbid(unsafe_code)]

pub mod matching;
pub mod model;
pub mod normalize;
pub mod selection;
pub mod stats;
pub mod time;

pub use time::Clock;
