/// Enemy patrol and combat core for Lenny's Toast Run.
///
/// `domain` holds the pure rules (patrol decisions, contact classification,
/// scoring). `sim` drives them one tick at a time against a level.

pub mod config;
pub mod domain;
pub mod logging;
pub mod sim;
