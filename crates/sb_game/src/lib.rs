pub mod alien;
pub mod config;
pub mod events;
pub mod physics;
pub mod player;
pub mod replay;
pub mod session;
pub mod spawn;
pub mod tier;
pub mod timers;
pub mod transport;
