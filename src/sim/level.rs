/// Level loader.
///
/// ## Sources (priority order):
///   1. A file named on the command line
///   2. `levels/` directory (individual `.txt` files, sorted by name)
///   3. Built-in embedded levels
///
/// ## Single-level format (`.txt`):
///   Line 1: `# Level Name`
///   Optional directives, one per line:
///     `@path NAME x1,y1 x2,y2 ...`   waypoints in tile units (y is ignored)
///     `@enemy COL,ROW key=value ...` keys: `speed`, `range`, `width`, `path`, `kind`
///     `@toast COL,ROW value=N`
///   Lines: map rows
///
/// ## Tile legend:
///   '#' = Ground (solid)         '=' = Platform (solid)
///   'P' = Player spawn           'E' = Enemy spawn (defaults)
///   '$' = Toast (value 1)        'G' = Goal zone
///   ' ' / '.' = Empty
///
/// Entities stand on the bottom edge of the cell they are placed in.
/// Bad directive values are logged and dropped; the level still loads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::entity::{Player, SpawnData, Toast};
use crate::domain::geometry::{Body, Rect, Vec2};
use crate::domain::ground::TileGround;
use crate::domain::patrol;
use crate::domain::tile::Tile;
use crate::sim::world::{Phase, WorldState};

/// Player spawn when a level has no `P`, in px.
const DEFAULT_SPAWN: (f32, f32) = (64.0, 64.0);

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level '{0}' has no map rows")]
    Empty(String),
    #[error("no levels found")]
    NoLevels,
}

/// Enemy placement, tile units.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyDef {
    pub col: usize,
    pub row: usize,
    pub kind: String,
    pub speed: Option<f32>,
    pub range: Option<f32>,
    pub width: Option<f32>,
    pub path: Option<String>,
}

impl EnemyDef {
    fn at(col: usize, row: usize) -> Self {
        EnemyDef { col, row, kind: String::from("sockroach"), speed: None, range: None, width: None, path: None }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToastDef {
    pub col: usize,
    pub row: usize,
    pub value: u32,
}

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug, Default)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
    /// Named waypoint lists, tile units.
    pub paths: BTreeMap<String, Vec<Vec2>>,
    pub enemies: Vec<EnemyDef>,
    pub toasts: Vec<ToastDef>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Build the world for a level. Resets stats, timer, and every pending task.
pub fn load_level(world: &mut WorldState, def: &LevelDef) {
    let ts = world.physics.tile_size;
    world.scheduler.teardown();
    world.invincibility = None;
    world.level_name = def.name.clone();

    let height = def.rows.len();
    let width = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let mut tiles = vec![vec![Tile::Empty; width]; height];
    let mut spawn = None;
    let mut enemies: Vec<EnemyDef> = vec![];
    let mut toasts: Vec<ToastDef> = vec![];
    let mut goal: Option<Rect> = None;

    for (y, row) in def.rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            match ch {
                '#' | '=' => tiles[y][x] = Tile::from_char(ch),
                'P' => spawn = Some(cell_feet(x, y, ts)),
                'E' => enemies.push(EnemyDef::at(x, y)),
                '$' => toasts.push(ToastDef { col: x, row: y, value: 1 }),
                'G' => {
                    let cell = Rect::new(x as f32 * ts, y as f32 * ts, ts, ts);
                    goal = Some(goal.map_or(cell, |g| union(g, cell)));
                }
                _ => {}
            }
        }
    }
    enemies.extend(def.enemies.iter().cloned());
    toasts.extend(def.toasts.iter().cloned());

    world.ground = TileGround::new(tiles, ts);
    world.bounds = Rect::new(0.0, 0.0, world.ground.width_px(), world.ground.height_px());
    world.goal = goal;
    if goal.is_none() {
        warn!("level '{}' has no goal zone", def.name);
    }

    let (sx, sy) = spawn.unwrap_or_else(|| {
        warn!("level '{}' has no player spawn; using default", def.name);
        DEFAULT_SPAWN
    });
    let (pw, ph) = world.physics.player_size;
    world.player = Player::new(Body::new(sx, sy, pw, ph), world.combat.max_health);

    let has_ground = world.ground.has_any_solid();
    let (ew, eh) = world.physics.enemy_size;
    world.enemies = enemies
        .iter()
        .enumerate()
        .map(|(id, e)| {
            let spawn = spawn_data(e, ts);
            let path: Option<Vec<Vec2>> = e.path.as_ref()
                .and_then(|name| def.paths.get(name))
                .map(|pts| pts.iter().map(|p| tile_to_px(*p, ts)).collect());
            patrol::spawn_enemy(id, &spawn, path.as_deref(), has_ground, Vec2::new(ew, eh), &world.patrol)
        })
        .collect();

    world.toasts = toasts
        .iter()
        .map(|t| Toast::new(Rect::new(t.col as f32 * ts, t.row as f32 * ts, ts, ts), t.value))
        .collect();

    world.stats = Default::default();
    world.timer.reset();
    world.result = None;
    world.phase = Phase::Playing;
    world.now_ms = 0;
    world.tick = 0;
    world.level = def.clone();

    info!(
        "loaded level '{}' ({}x{} tiles, {} enemies, {} toasts)",
        def.name, width, height, world.enemies.len(), world.toasts.len(),
    );
}

/// Levels in priority order: `levels/` directory, else embedded.
pub fn available_levels(config: &GameConfig) -> Vec<LevelDef> {
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let mut levels = load_from_directory(dir);
        levels.sort_by(|a, b| a.0.cmp(&b.0));
        if !levels.is_empty() {
            return levels.into_iter().map(|(_, def)| def).collect();
        }
    }
    embedded_levels()
}

pub fn load_level_file(path: &Path) -> Result<LevelDef, LevelError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
    parse_level(&content)
}

// ══════════════════════════════════════════════════════════════
// Single-level parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level(content: &str) -> Result<LevelDef, LevelError> {
    let mut def = LevelDef::default();

    for line in content.lines() {
        if line.starts_with('#') && def.name.is_empty() && is_name_line(line) {
            def.name = line[1..].trim().to_string();
        } else if let Some(rest) = line.strip_prefix("@path ") {
            parse_path(rest, &mut def);
        } else if let Some(rest) = line.strip_prefix("@enemy ") {
            if let Some(e) = parse_enemy(rest) {
                def.enemies.push(e);
            }
        } else if let Some(rest) = line.strip_prefix("@toast ") {
            if let Some(t) = parse_toast(rest) {
                def.toasts.push(t);
            }
        } else if line.starts_with('@') {
            warn!("unknown level directive: {line}");
        } else {
            def.rows.push(line.to_string());
        }
    }

    while def.rows.last().map_or(false, |r| r.trim().is_empty()) {
        def.rows.pop();
    }

    if def.name.is_empty() {
        def.name = "Unnamed Level".to_string();
    }

    if def.rows.is_empty() {
        return Err(LevelError::Empty(def.name));
    }

    let max_width = def.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut def.rows {
        let len = row.chars().count();
        if len < max_width {
            row.extend(std::iter::repeat(' ').take(max_width - len));
        }
    }

    Ok(def)
}

/// Distinguish `# Level Name` from `##########` (level data).
/// A name line starts with `#` and contains at least one letter.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_alphabetic())
}

fn parse_cell(token: &str) -> Option<(usize, usize)> {
    let (c, r) = token.split_once(',')?;
    Some((c.trim().parse().ok()?, r.trim().parse().ok()?))
}

fn parse_point(token: &str) -> Option<Vec2> {
    let (x, y) = token.split_once(',')?;
    Some(Vec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Numeric option value; garbage becomes "unset" so the spawn default applies.
fn parse_number(key: &str, value: &str) -> Option<f32> {
    match value.parse::<f32>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring {key}={value}: not a number");
            None
        }
    }
}

fn parse_path(rest: &str, def: &mut LevelDef) {
    let mut parts = rest.split_whitespace();
    let Some(name) = parts.next() else {
        warn!("@path without a name");
        return;
    };
    let points: Vec<Vec2> = parts
        .filter_map(|p| {
            let point = parse_point(p);
            if point.is_none() {
                warn!("path '{name}': bad waypoint '{p}'");
            }
            point
        })
        .collect();
    def.paths.insert(name.to_string(), points);
}

fn parse_enemy(rest: &str) -> Option<EnemyDef> {
    let mut parts = rest.split_whitespace();
    let cell = parts.next().and_then(parse_cell);
    let Some((col, row)) = cell else {
        warn!("@enemy needs COL,ROW: {rest}");
        return None;
    };
    let mut e = EnemyDef::at(col, row);
    for kv in parts {
        let Some((key, value)) = kv.split_once('=') else {
            warn!("@enemy option without '=': {kv}");
            continue;
        };
        match key {
            "speed" => e.speed = parse_number(key, value),
            "range" => e.range = parse_number(key, value),
            "width" => e.width = parse_number(key, value),
            "path" => e.path = Some(value.to_string()),
            "kind" => e.kind = value.to_string(),
            _ => warn!("@enemy: unknown option '{key}'"),
        }
    }
    Some(e)
}

fn parse_toast(rest: &str) -> Option<ToastDef> {
    let mut parts = rest.split_whitespace();
    let Some((col, row)) = parts.next().and_then(parse_cell) else {
        warn!("@toast needs COL,ROW: {rest}");
        return None;
    };
    let mut value = 1;
    for kv in parts {
        match kv.split_once('=') {
            Some(("value", v)) => match v.parse::<u32>() {
                Ok(n) => value = n,
                Err(_) => warn!("@toast: bad value '{v}', using 1"),
            },
            _ => warn!("@toast: unknown option '{kv}'"),
        }
    }
    Some(ToastDef { col, row, value })
}

// ══════════════════════════════════════════════════════════════
// Tile → world conversion
// ══════════════════════════════════════════════════════════════

/// Centre-x and bottom edge of a cell.
fn cell_feet(col: usize, row: usize, ts: f32) -> (f32, f32) {
    (col as f32 * ts + ts / 2.0, (row + 1) as f32 * ts)
}

fn tile_to_px(p: Vec2, ts: f32) -> Vec2 {
    Vec2::new(p.x * ts + ts / 2.0, (p.y + 1.0) * ts)
}

fn spawn_data(e: &EnemyDef, ts: f32) -> SpawnData {
    let (x, y) = cell_feet(e.col, e.row, ts);
    SpawnData {
        kind: e.kind.clone(),
        x,
        y,
        speed: e.speed,
        patrol_width: e.width,
        range: e.range,
        path_name: e.path.clone(),
    }
}

fn union(a: Rect, b: Rect) -> Rect {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    let right = (a.x + a.w).max(b.x + b.w);
    let bottom = (a.y + a.h).max(b.y + b.h);
    Rect::new(x, y, right - x, bottom - y)
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("could not list {}: {e}", dir.display());
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            match load_level_file(&path) {
                Ok(def) => {
                    let filename = path.file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string();
                    results.push((filename, def));
                }
                Err(e) => warn!("skipping level: {e}"),
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

const LEVEL_1: &str = "\
# Level 1 - Countertop
@path shelf 22,3 26,3 30,3
@enemy 24,3 path=shelf speed=50
@enemy 33,9 width=64
@toast 5,8 value=5



                      $   $   $
                     ===========

           $  $
         ======                  $  $

 P          E                      E  G
################   #####################
################   #####################
";

const LEVEL_2: &str = "\
# Level 2 - Under the Sink
@path pipes 5,2 11,2
@enemy 8,2 path=pipes speed=70
@enemy 26,9 range=128 speed=80
@enemy 20,5 kind=sockroach


      $ $ $                    $ $
     =======                  =====

              $  $  $  $
            ==============

  $                                 $  G
 P    E
########   ####################   ######
########   ####################   ######
";

pub fn embedded_levels() -> Vec<LevelDef> {
    [LEVEL_1, LEVEL_2]
        .iter()
        .filter_map(|src| parse_level(src).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PatrolMode;

    #[test]
    fn embedded_levels_parse() {
        let levels = embedded_levels();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].name, "Level 1 - Countertop");
        assert_eq!(levels[0].paths["shelf"].len(), 3);
        assert_eq!(levels[0].enemies.len(), 2);
    }

    #[test]
    fn name_line_vs_ground_row() {
        let def = parse_level("# Tiny\n####\n").unwrap();
        assert_eq!(def.name, "Tiny");
        assert_eq!(def.rows, vec!["####".to_string()]);
    }

    #[test]
    fn rows_are_padded_to_widest() {
        let def = parse_level("# Pad\n#\n###\n").unwrap();
        assert_eq!(def.rows[0], "#  ");
    }

    #[test]
    fn empty_level_is_an_error() {
        assert!(matches!(parse_level("# Nothing\n\n"), Err(LevelError::Empty(_))));
    }

    #[test]
    fn enemy_options_parse_and_garbage_is_dropped() {
        let def = parse_level("# L\n@enemy 3,4 speed=abc range=120 path=loop kind=beetle\n####\n").unwrap();
        let e = &def.enemies[0];
        assert_eq!((e.col, e.row), (3, 4));
        assert_eq!(e.speed, None);
        assert_eq!(e.range, Some(120.0));
        assert_eq!(e.path.as_deref(), Some("loop"));
        assert_eq!(e.kind, "beetle");
    }

    #[test]
    fn malformed_directives_are_skipped() {
        let def = parse_level("# L\n@enemy nowhere\n@toast 1,1 value=x\n@bogus\n####\n").unwrap();
        assert!(def.enemies.is_empty());
        assert_eq!(def.toasts, vec![ToastDef { col: 1, row: 1, value: 1 }]);
    }

    #[test]
    fn load_places_entities_on_cell_bottoms() {
        let def = parse_level("# L\n P  E $ G\n#########\n").unwrap();
        let mut world = WorldState::new(&GameConfig::default());
        load_level(&mut world, &def);

        assert_eq!(world.player.body.position, Vec2::new(24.0, 16.0));
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.enemies[0].body.position, Vec2::new(72.0, 16.0));
        assert!(matches!(world.enemies[0].mode, PatrolMode::GroundProbe { .. }));
        assert_eq!(world.toasts.len(), 1);
        assert_eq!(world.goal, Some(Rect::new(128.0, 0.0, 16.0, 16.0)));
        assert_eq!(world.bounds, Rect::new(0.0, 0.0, 144.0, 32.0));
    }

    #[test]
    fn path_waypoints_convert_to_pixel_centres() {
        let src = "# L\n@path p 1,0 4,0\n@enemy 2,0 path=p\n      \n######\n";
        let mut world = WorldState::new(&GameConfig::default());
        load_level(&mut world, &parse_level(src).unwrap());
        match &world.enemies[0].mode {
            PatrolMode::FixedPath { waypoints, .. } => assert_eq!(waypoints, &vec![24.0, 72.0]),
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn missing_spawn_uses_default() {
        let mut world = WorldState::new(&GameConfig::default());
        load_level(&mut world, &parse_level("# L\n    \n####\n").unwrap());
        assert_eq!(world.player.body.position, Vec2::new(64.0, 64.0));
    }
}
