/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub patrol: PatrolConfig,
    pub combat: CombatConfig,
    pub physics: PhysicsConfig,
    pub debug: DebugFlags,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct PatrolConfig {
    pub default_speed: f32,
    /// Ground-probe bound width when the spawn gives none.
    pub default_range: f32,
    /// Fixed-range width used when level data is missing or broken.
    pub fallback_range: f32,
    pub reverse_cooldown_ms: u64,
    /// Slow-motion factor, `0..=1`.
    pub time_scale: f32,
}

#[derive(Clone, Debug)]
pub struct CombatConfig {
    pub max_health: u32,
    pub invincibility_ms: u64,
    /// Upward speed given to the player by a stomp.
    pub stomp_bounce_speed: f32,
    /// 0 = wait for the host to report the animation end.
    pub stomp_animation_ms: u64,
    pub corpse_puff_speed: f32,
    pub corpse_linger_ms: u64,
    pub death_duration_ms: u64,
    pub respawn_fade_ms: u64,
}

#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub tick_rate_ms: u64,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub player_speed: f32,
    pub jump_speed: f32,
    pub max_jumps: u32,
    pub tile_size: f32,
    pub player_size: (f32, f32),
    pub enemy_size: (f32, f32),
}

/// Session-wide debug switches, carried on the world instead of a global.
#[derive(Clone, Copy, Debug)]
pub struct DebugFlags {
    pub enabled: bool,
    /// Log per-enemy state every tick when `enabled`.
    pub show_state: bool,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    patrol: TomlPatrol,
    #[serde(default)]
    combat: TomlCombat,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    debug: TomlDebug,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPatrol {
    #[serde(default = "default_enemy_speed")]
    default_speed: f32,
    #[serde(default = "default_range")]
    default_range: f32,
    #[serde(default = "default_fallback_range")]
    fallback_range: f32,
    #[serde(default = "default_reverse_cooldown")]
    reverse_cooldown_ms: u64,
    #[serde(default = "default_time_scale")]
    time_scale: f32,
}

#[derive(Deserialize, Debug)]
struct TomlCombat {
    #[serde(default = "default_max_health")]
    max_health: u32,
    #[serde(default = "default_invincibility")]
    invincibility_ms: u64,
    #[serde(default = "default_stomp_bounce")]
    stomp_bounce_speed: f32,
    #[serde(default = "default_stomp_animation")]
    stomp_animation_ms: u64,
    #[serde(default = "default_corpse_puff")]
    corpse_puff_speed: f32,
    #[serde(default = "default_corpse_linger")]
    corpse_linger_ms: u64,
    #[serde(default = "default_death_duration")]
    death_duration_ms: u64,
    #[serde(default = "default_respawn_fade")]
    respawn_fade_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_max_fall")]
    max_fall_speed: f32,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_jump_speed")]
    jump_speed: f32,
    #[serde(default = "default_max_jumps")]
    max_jumps: u32,
    #[serde(default = "default_tile_size")]
    tile_size: f32,
    #[serde(default = "default_player_size")]
    player_size: [f32; 2],
    #[serde(default = "default_enemy_size")]
    enemy_size: [f32; 2],
}

#[derive(Deserialize, Debug)]
struct TomlDebug {
    #[serde(default)]
    enabled: bool,
    #[serde(default = "default_true")]
    show_state: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

// ── Defaults ──

fn default_enemy_speed() -> f32 { 60.0 }
fn default_range() -> f32 { 200.0 }
fn default_fallback_range() -> f32 { 160.0 }
fn default_reverse_cooldown() -> u64 { 200 }
fn default_time_scale() -> f32 { 1.0 }

fn default_max_health() -> u32 { 3 }
fn default_invincibility() -> u64 { 1000 }
fn default_stomp_bounce() -> f32 { 300.0 }
fn default_stomp_animation() -> u64 { 200 }
fn default_corpse_puff() -> f32 { 200.0 }
fn default_corpse_linger() -> u64 { 1000 }
fn default_death_duration() -> u64 { 4000 }
fn default_respawn_fade() -> u64 { 500 }

fn default_tick_rate() -> u64 { 16 }
fn default_gravity() -> f32 { 1000.0 }
fn default_max_fall() -> f32 { 900.0 }
fn default_player_speed() -> f32 { 160.0 }
fn default_jump_speed() -> f32 { 450.0 }
fn default_max_jumps() -> u32 { 2 }
fn default_tile_size() -> f32 { 16.0 }
fn default_player_size() -> [f32; 2] { [38.4, 36.0] } // 48x45 sprite at 0.8 scale
fn default_enemy_size() -> [f32; 2] { [24.0, 16.0] }

fn default_true() -> bool { true }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlPatrol {
    fn default() -> Self {
        TomlPatrol {
            default_speed: default_enemy_speed(),
            default_range: default_range(),
            fallback_range: default_fallback_range(),
            reverse_cooldown_ms: default_reverse_cooldown(),
            time_scale: default_time_scale(),
        }
    }
}

impl Default for TomlCombat {
    fn default() -> Self {
        TomlCombat {
            max_health: default_max_health(),
            invincibility_ms: default_invincibility(),
            stomp_bounce_speed: default_stomp_bounce(),
            stomp_animation_ms: default_stomp_animation(),
            corpse_puff_speed: default_corpse_puff(),
            corpse_linger_ms: default_corpse_linger(),
            death_duration_ms: default_death_duration(),
            respawn_fade_ms: default_respawn_fade(),
        }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            tick_rate_ms: default_tick_rate(),
            gravity: default_gravity(),
            max_fall_speed: default_max_fall(),
            player_speed: default_player_speed(),
            jump_speed: default_jump_speed(),
            max_jumps: default_max_jumps(),
            tile_size: default_tile_size(),
            player_size: default_player_size(),
            enemy_size: default_enemy_size(),
        }
    }
}

impl Default for TomlDebug {
    fn default() -> Self {
        TomlDebug { enabled: false, show_state: default_true() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            patrol: PatrolConfig::default(),
            combat: CombatConfig::default(),
            physics: PhysicsConfig::default(),
            debug: DebugFlags::default(),
            levels_dir: PathBuf::from(default_levels_dir()),
        }
    }
}

impl Default for PatrolConfig {
    fn default() -> Self { TomlPatrol::default().into() }
}

impl Default for CombatConfig {
    fn default() -> Self { TomlCombat::default().into() }
}

impl Default for PhysicsConfig {
    fn default() -> Self { TomlPhysics::default().into() }
}

impl Default for DebugFlags {
    fn default() -> Self { TomlDebug::default().into() }
}

// ── Schema → plain structs ──

impl From<TomlPatrol> for PatrolConfig {
    fn from(t: TomlPatrol) -> Self {
        PatrolConfig {
            default_speed: t.default_speed,
            default_range: t.default_range,
            fallback_range: t.fallback_range,
            reverse_cooldown_ms: t.reverse_cooldown_ms,
            time_scale: if t.time_scale.is_finite() { t.time_scale.clamp(0.0, 1.0) } else { 1.0 },
        }
    }
}

impl From<TomlCombat> for CombatConfig {
    fn from(t: TomlCombat) -> Self {
        CombatConfig {
            max_health: t.max_health.max(1),
            invincibility_ms: t.invincibility_ms,
            stomp_bounce_speed: t.stomp_bounce_speed,
            stomp_animation_ms: t.stomp_animation_ms,
            corpse_puff_speed: t.corpse_puff_speed,
            corpse_linger_ms: t.corpse_linger_ms,
            death_duration_ms: t.death_duration_ms,
            respawn_fade_ms: t.respawn_fade_ms,
        }
    }
}

impl From<TomlPhysics> for PhysicsConfig {
    fn from(t: TomlPhysics) -> Self {
        PhysicsConfig {
            tick_rate_ms: t.tick_rate_ms.max(1),
            gravity: t.gravity,
            max_fall_speed: t.max_fall_speed,
            player_speed: t.player_speed,
            jump_speed: t.jump_speed,
            max_jumps: t.max_jumps,
            tile_size: if t.tile_size > 0.0 { t.tile_size } else { default_tile_size() },
            player_size: (t.player_size[0], t.player_size[1]),
            enemy_size: (t.enemy_size[0], t.enemy_size[1]),
        }
    }
}

impl From<TomlDebug> for DebugFlags {
    fn from(t: TomlDebug) -> Self {
        DebugFlags { enabled: t.enabled, show_state: t.show_state }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::fold(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly. Paths resolve against the CWD.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::fold(toml_cfg, &[PathBuf::from(".")]))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    fn fold(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            patrol: toml_cfg.patrol.into(),
            combat: toml_cfg.combat.into(),
            physics: toml_cfg.physics.into(),
            debug: toml_cfg.debug.into(),
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        let parsed = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Io { path: path.clone(), source })
            .and_then(|text| toml::from_str::<TomlConfig>(&text).map_err(ConfigError::from));
        match parsed {
            Ok(cfg) => return cfg,
            Err(e @ ConfigError::Parse(_)) => {
                warn!("{e}; using default settings");
                return TomlConfig::default();
            }
            Err(e) => warn!("{e}"),
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.patrol.default_speed, 60.0);
        assert_eq!(cfg.patrol.reverse_cooldown_ms, 200);
        assert_eq!(cfg.combat.max_health, 3);
        assert_eq!(cfg.combat.invincibility_ms, 1000);
        assert_eq!(cfg.combat.death_duration_ms, 4000);
        assert_eq!(cfg.physics.max_jumps, 2);
        assert!(!cfg.debug.enabled);
        assert!(cfg.levels_dir.ends_with("levels"));
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[patrol]\ndefault_speed = 90.0\n\n[debug]\nenabled = true\n",
        ).unwrap();
        assert_eq!(cfg.patrol.default_speed, 90.0);
        assert_eq!(cfg.patrol.default_range, 200.0);
        assert!(cfg.debug.enabled);
        assert!(cfg.debug.show_state);
    }

    #[test]
    fn time_scale_is_clamped() {
        let cfg = GameConfig::from_toml_str("[patrol]\ntime_scale = 4.0\n").unwrap();
        assert_eq!(cfg.patrol.time_scale, 1.0);
        let cfg = GameConfig::from_toml_str("[patrol]\ntime_scale = -1.0\n").unwrap();
        assert_eq!(cfg.patrol.time_scale, 0.0);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = GameConfig::from_toml_str("[combat\nmax_health = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GameConfig::from_file(Path::new("/definitely/not/here/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
