//! Level definitions and brick-type table
//!
//! Levels are immutable static data; `build_bricks` lays one out into a
//! [`GameState`].

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Boss, BrickKind, GameState, PowerUpKind};
use crate::consts::*;
use crate::error::ConfigError;

/// Payload-free brick tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickType {
    Normal,
    Strong,
    Metal,
    Explosive,
    Trigger,
    Moving,
    Boss,
}

/// Per-type durability, score and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickStats {
    pub hits: u32,
    pub points: u64,
    pub color: u32,
}

pub fn brick_stats(brick_type: BrickType) -> BrickStats {
    let (hits, points, color) = match brick_type {
        BrickType::Normal => (1, 100, 0xff7700),
        BrickType::Strong => (2, 200, 0x00aa44),
        BrickType::Metal => (3, 300, 0xaaaaaa),
        BrickType::Explosive => (1, 150, 0xff3333),
        BrickType::Trigger => (1, 250, 0xffff00),
        BrickType::Moving => (1, 150, 0x33aaff),
        BrickType::Boss => (1, 1000, 0x880088),
    };
    BrickStats {
        hits,
        points,
        color,
    }
}

/// How a level arranges its brick grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Every cell filled with a random type from the level's list
    Grid,
    /// Outer ring uses the toughest listed type, interior the first
    Fortress,
    /// Random types, roughly one cell in five left empty
    Random,
}

/// Horizontal oscillation applied to the front row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingPattern {
    pub amplitude: f32,
    pub period_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelFeatures {
    /// Explosive brick blast radius in brick widths
    pub explosion_radius: f32,
    pub moving: Option<MovingPattern>,
}

const DEFAULT_FEATURES: LevelFeatures = LevelFeatures {
    explosion_radius: 2.0,
    moving: None,
};

/// One entry of the level table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelDef {
    pub number: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub rows: u32,
    pub cols: u32,
    pub layers: u32,
    pub brick_types: &'static [BrickType],
    pub layout: Layout,
    pub paddle_speed: f32,
    pub ball_speed: f32,
    pub background_color: u32,
    pub powerup_chance: f32,
    pub powerups: &'static [PowerUpKind],
    pub features: LevelFeatures,
    /// Single boss brick instead of a grid
    pub boss: bool,
}

const EARLY_POWERUPS: &[PowerUpKind] = &[
    PowerUpKind::PaddleSizeUp,
    PowerUpKind::PaddleDoubleSize,
    PowerUpKind::MultiBall,
    PowerUpKind::ExplosiveBall,
    PowerUpKind::Barrier,
];

const POWERUPS: &[PowerUpKind] = &[
    PowerUpKind::PaddleDoubleSize,
    PowerUpKind::MultiBall,
    PowerUpKind::ExplosiveBall,
    PowerUpKind::Barrier,
];

pub const LEVELS: [LevelDef; 6] = [
    LevelDef {
        number: 1,
        name: "Clássico",
        description: "O tradicional jogo de Brick Breaker",
        rows: 3,
        cols: 8,
        layers: 1,
        brick_types: &[BrickType::Normal],
        layout: Layout::Grid,
        paddle_speed: 0.3,
        ball_speed: 0.5,
        background_color: 0x000022,
        powerup_chance: 0.25,
        powerups: EARLY_POWERUPS,
        features: DEFAULT_FEATURES,
        boss: false,
    },
    LevelDef {
        number: 2,
        name: "Fortaleza",
        description: "Uma fortaleza de tijolos resistentes",
        rows: 4,
        cols: 10,
        layers: 1,
        brick_types: &[BrickType::Normal, BrickType::Strong],
        layout: Layout::Fortress,
        paddle_speed: 0.35,
        ball_speed: 0.55,
        background_color: 0x002222,
        powerup_chance: 0.25,
        powerups: EARLY_POWERUPS,
        features: DEFAULT_FEATURES,
        boss: false,
    },
    LevelDef {
        number: 3,
        name: "Arco-Íris",
        description: "Tijolos de várias cores e tipos",
        rows: 5,
        cols: 10,
        layers: 1,
        brick_types: &[BrickType::Normal, BrickType::Strong, BrickType::Explosive],
        layout: Layout::Grid,
        paddle_speed: 0.4,
        ball_speed: 0.6,
        background_color: 0x221144,
        powerup_chance: 0.25,
        powerups: POWERUPS,
        features: DEFAULT_FEATURES,
        boss: false,
    },
    LevelDef {
        number: 4,
        name: "Metálico",
        description: "Tijolos metálicos de alta resistência",
        rows: 3,
        cols: 6,
        layers: 1,
        brick_types: &[BrickType::Metal, BrickType::Strong],
        layout: Layout::Grid,
        paddle_speed: 0.4,
        ball_speed: 0.7,
        background_color: 0x333333,
        powerup_chance: 0.25,
        powerups: POWERUPS,
        features: LevelFeatures {
            explosion_radius: 2.0,
            moving: Some(MovingPattern {
                amplitude: 2.0,
                period_ms: 4000.0,
            }),
        },
        boss: false,
    },
    LevelDef {
        number: 5,
        name: "Explosivo",
        description: "Cuidado com os tijolos explosivos!",
        rows: 4,
        cols: 8,
        layers: 1,
        brick_types: &[BrickType::Normal, BrickType::Explosive, BrickType::Trigger],
        layout: Layout::Random,
        paddle_speed: 0.45,
        ball_speed: 0.65,
        background_color: 0x331111,
        powerup_chance: 0.25,
        powerups: POWERUPS,
        features: DEFAULT_FEATURES,
        boss: false,
    },
    LevelDef {
        number: 6,
        name: "Chefão",
        description: "Derrote o chefe e desvie dos ataques!",
        rows: 0,
        cols: 0,
        layers: 0,
        brick_types: &[BrickType::Boss],
        layout: Layout::Grid,
        paddle_speed: 0.45,
        ball_speed: 0.6,
        background_color: 0x110011,
        powerup_chance: 0.25,
        powerups: POWERUPS,
        features: DEFAULT_FEATURES,
        boss: true,
    },
];

/// Boss box half size
pub const BOSS_HALF_EXTENTS: Vec3 = Vec3::new(8.0, 4.0, 4.0);

pub fn level_count() -> u32 {
    LEVELS.len() as u32
}

/// Look up a level by 1-based number
pub fn level(n: u32) -> Result<&'static LevelDef, ConfigError> {
    n.checked_sub(1)
        .and_then(|i| LEVELS.get(i as usize))
        .ok_or(ConfigError::UnknownLevel(n))
}

/// Position of the boss brick
pub fn boss_position() -> Vec3 {
    Vec3::new(0.0, GAME_HEIGHT / 3.0, 0.0)
}

/// Lay out the bricks of `def` into `state`
///
/// Grid is centered in X/Z, first layer at one third of the height, further
/// layers stacked downward. From level 4 on every cell with
/// `(layer + row + col) % 7 == 0` is left empty.
pub(crate) fn build_bricks(state: &mut GameState, def: &LevelDef) {
    let half = Vec3::new(BRICK_WIDTH, BRICK_HEIGHT, BRICK_DEPTH) / 2.0;

    if def.boss {
        let boss = Boss::new(state.now_ms);
        state.push_brick(
            boss_position(),
            BOSS_HALF_EXTENTS,
            BrickKind::Boss(Box::new(boss)),
        );
        return;
    }

    let total_width = def.cols as f32 * (BRICK_WIDTH + BRICK_SPACING_X) - BRICK_SPACING_X;
    let total_depth = def.rows as f32 * (BRICK_DEPTH + BRICK_SPACING_Z) - BRICK_SPACING_Z;
    let start_x = -total_width / 2.0 + half.x;
    let start_y = GAME_HEIGHT / 3.0;
    let start_z = -total_depth / 2.0 + half.z;

    for layer in 0..def.layers {
        let y = start_y - layer as f32 * (BRICK_HEIGHT + BRICK_SPACING_Y);
        for row in 0..def.rows {
            let z = start_z + row as f32 * (BRICK_DEPTH + BRICK_SPACING_Z);
            for col in 0..def.cols {
                if def.number > 3 && (layer + row + col) % 7 == 0 {
                    continue;
                }
                if def.layout == Layout::Random && state.rng.random::<f32>() < 0.2 {
                    continue;
                }

                let x = start_x + col as f32 * (BRICK_WIDTH + BRICK_SPACING_X);
                let brick_type = pick_type(state, def, row, col);
                let kind = match (def.features.moving, row) {
                    (Some(pattern), 0) => BrickKind::Moving {
                        anchor_x: x,
                        amplitude: pattern.amplitude,
                        period_ms: pattern.period_ms,
                    },
                    _ => kind_for(brick_type, def),
                };
                state.push_brick(Vec3::new(x, y, z), half, kind);
            }
        }
    }
}

fn pick_type(state: &mut GameState, def: &LevelDef, row: u32, col: u32) -> BrickType {
    let types = def.brick_types;
    match def.layout {
        Layout::Fortress => {
            let edge = row == 0 || col == 0 || row + 1 == def.rows || col + 1 == def.cols;
            if edge {
                types.iter().copied().max_by_key(|t| brick_stats(*t).hits)
            } else {
                types.first().copied()
            }
            .unwrap_or(BrickType::Normal)
        }
        Layout::Grid | Layout::Random => {
            if types.is_empty() {
                return BrickType::Normal;
            }
            types[state.rng.random_range(0..types.len())]
        }
    }
}

fn kind_for(brick_type: BrickType, def: &LevelDef) -> BrickKind {
    match brick_type {
        BrickType::Normal | BrickType::Moving | BrickType::Boss => BrickKind::Normal,
        BrickType::Strong => BrickKind::Strong,
        BrickType::Metal => BrickKind::Metal,
        BrickType::Explosive => BrickKind::Explosive {
            radius: def.features.explosion_radius * BRICK_WIDTH,
        },
        BrickType::Trigger => BrickKind::Trigger,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn state_on(level: u32) -> GameState {
        let settings = Settings {
            starting_level: level,
            ..Settings::default()
        };
        GameState::new(settings, 7).unwrap()
    }

    #[test]
    fn test_level_lookup() {
        assert_eq!(level(1).unwrap().name, "Clássico");
        assert!(level(6).unwrap().boss);
        assert!(matches!(level(0), Err(ConfigError::UnknownLevel(0))));
        assert!(matches!(level(7), Err(ConfigError::UnknownLevel(7))));
        assert_eq!(level_count(), 6);
    }

    #[test]
    fn test_level_numbers_match_index() {
        for (i, def) in LEVELS.iter().enumerate() {
            assert_eq!(def.number as usize, i + 1);
            assert!(def.ball_speed > 0.0);
            assert!(!def.powerups.is_empty());
        }
    }

    #[test]
    fn test_classic_grid() {
        let state = state_on(1);
        assert_eq!(state.bricks.len(), 24);
        assert!(state
            .bricks
            .iter()
            .all(|b| b.kind.brick_type() == BrickType::Normal && b.hits_remaining == 1));
        // Centered in X
        let min_x = state.bricks.iter().map(|b| b.pos.x).fold(f32::MAX, f32::min);
        let max_x = state.bricks.iter().map(|b| b.pos.x).fold(f32::MIN, f32::max);
        assert!((min_x + max_x).abs() < 1e-4);
    }

    #[test]
    fn test_fortress_ring_is_strong() {
        let state = state_on(2);
        assert_eq!(state.bricks.len(), 40);
        let strong = state
            .bricks
            .iter()
            .filter(|b| b.kind.brick_type() == BrickType::Strong)
            .count();
        // 4x10 ring
        assert_eq!(strong, 2 * 10 + 2 * 2);
    }

    #[test]
    fn test_late_levels_skip_cells() {
        let state = state_on(4);
        // 3x6 with (row + col) % 7 == 0 skipped: (0,0) and (2,5)
        assert_eq!(state.bricks.len(), 16);
        assert!(state
            .bricks
            .iter()
            .any(|b| matches!(b.kind, BrickKind::Moving { .. })));
    }

    #[test]
    fn test_explosive_radius_in_world_units() {
        let def = level(3).unwrap();
        match kind_for(BrickType::Explosive, def) {
            BrickKind::Explosive { radius } => assert_eq!(radius, 8.0),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_boss_level() {
        let state = state_on(6);
        assert_eq!(state.bricks.len(), 1);
        let boss = state.boss().unwrap();
        assert_eq!(boss.health, Boss::HEALTH);
        assert!(state.barrier.as_ref().is_some_and(|b| b.is_permanent()));
        assert_eq!(state.bricks[0].points, 1000);
    }
}
