pub mod combat;
pub mod event;
pub mod level;
pub mod physics;
pub mod schedule;
pub mod step;
pub mod world;
