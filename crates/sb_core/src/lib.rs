pub mod input;
pub mod rng;
pub mod time;
pub mod timer;
