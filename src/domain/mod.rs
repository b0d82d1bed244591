pub mod entity;
pub mod geometry;
pub mod ground;
pub mod patrol;
pub mod rules;
pub mod scoring;
pub mod tile;
