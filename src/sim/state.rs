//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in [`GameState`]; collaborators
//! read it after each tick.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::geometry::Aabb;
use super::levels::{self, BrickType, LevelDef};
use crate::consts::*;
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::{floor_y, play_half_extents};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball parked above the paddle, waiting for confirm
    WaitingForStart,
    /// Active gameplay (boss fight included)
    Playing,
    /// Simulation frozen, state preserved
    Paused,
    /// All bricks cleared, waiting for confirm to load the next level
    LevelComplete,
    /// Run ended, waiting for confirm to retry
    GameOver,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec3,
    pub vel: Vec3,
    pub radius: f32,
    pub active: bool,
    /// Destroying a brick blasts its neighbours
    pub explosive: bool,
    /// Sim time at which `explosive` clears
    pub explosive_until: Option<f64>,
    /// Spawned by multi-ball; never ends the game
    pub is_extra: bool,
    /// Sim time of creation (extra balls expire from this)
    pub created_at: f64,
    /// Cosmetic flame trail lit by paddle streaks
    pub fire_aura: bool,
}

impl Ball {
    pub fn new(id: u32, pos: Vec3, vel: Vec3) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: BALL_RADIUS,
            active: true,
            explosive: false,
            explosive_until: None,
            is_extra: false,
            created_at: 0.0,
            fire_aura: false,
        }
    }

    pub fn new_extra(id: u32, pos: Vec3, vel: Vec3, now_ms: f64) -> Self {
        Self {
            is_extra: true,
            created_at: now_ms,
            ..Self::new(id, pos, vel)
        }
    }

    /// Keep direction, force magnitude to `speed`
    #[inline]
    pub fn renormalize(&mut self, speed: f32) {
        let dir = self.vel.normalize_or_zero();
        self.vel = if dir == Vec3::ZERO {
            Vec3::Y * speed
        } else {
            dir * speed
        };
    }
}

/// Where a fresh ball sits: just above the paddle's rest position
pub fn ball_spawn_position() -> Vec3 {
    Vec3::new(0.0, floor_y() + PADDLE_HEIGHT + BALL_RADIUS * 2.0, 0.0)
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Center; y stays at the floor offset
    pub pos: Vec3,
    pub half_width: f32,
    pub half_depth: f32,
    pub half_height: f32,
    /// Max movement per tick
    pub speed: f32,
    /// Width scale from size power-ups (1.0 = normal)
    pub size_multiplier: f32,
    /// Sim time at which the size effect reverts
    pub size_effect_expiry: Option<f64>,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, floor_y() + PADDLE_HEIGHT, 0.0),
            half_width: PADDLE_WIDTH / 2.0,
            half_depth: PADDLE_DEPTH / 2.0,
            half_height: PADDLE_HEIGHT / 2.0,
            speed: 0.3,
            size_multiplier: 1.0,
            size_effect_expiry: None,
        }
    }
}

impl Paddle {
    /// Half width including any active size effect
    #[inline]
    pub fn effective_half_width(&self) -> f32 {
        self.half_width * self.size_multiplier
    }

    /// Paddle as a collision box
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.pos,
            Vec3::new(self.effective_half_width(), self.half_height, self.half_depth),
        )
    }

    /// Move back to the rest position
    pub fn recenter(&mut self) {
        self.pos.x = 0.0;
        self.pos.z = 0.0;
    }

    /// Step by a direction in the XZ plane (components in -1..=1)
    pub fn step(&mut self, dir: Vec2) {
        self.pos.x += dir.x * self.speed;
        self.pos.z += dir.y * self.speed;
        self.clamp_to_arena();
    }

    /// Move toward a target XZ position, at most `speed` per tick
    pub fn move_toward(&mut self, target: Vec2) {
        let current = Vec2::new(self.pos.x, self.pos.z);
        let delta = (target - current).clamp_length_max(self.speed);
        self.pos.x += delta.x;
        self.pos.z += delta.y;
        self.clamp_to_arena();
    }

    /// Keep the whole paddle inside the side and front/back walls
    pub fn clamp_to_arena(&mut self) {
        let half = play_half_extents();
        let max_x = (half.x - self.effective_half_width()).max(0.0);
        let max_z = (half.z - self.half_depth).max(0.0);
        self.pos.x = self.pos.x.clamp(-max_x, max_x);
        self.pos.z = self.pos.z.clamp(-max_z, max_z);
    }
}

/// Boss attack kinds, alternated every attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Three-way projectile spread aimed at the paddle
    Volley,
    /// Telegraphed strikes at random floor spots
    HazardStrike,
}

impl AttackKind {
    pub fn other(self) -> Self {
        match self {
            AttackKind::Volley => AttackKind::HazardStrike,
            AttackKind::HazardStrike => AttackKind::Volley,
        }
    }
}

/// A boss projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec3,
    pub vel: Vec3,
    pub radius: f32,
}

impl Projectile {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, Vec3::splat(self.radius))
    }
}

/// A telegraphed floor strike
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub x: f32,
    pub z: f32,
    /// Sim time at which the strike lands
    pub resolve_at: f64,
    /// Set once the strike has landed (lingers for the renderer)
    pub struck_at: Option<f64>,
}

/// Boss-only state carried by a boss brick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    /// Hits left; independent of the brick's hit counter
    pub health: i32,
    pub last_attack_at: f64,
    pub attack_interval_ms: f64,
    pub next_attack: AttackKind,
    pub projectiles: Vec<Projectile>,
    pub hazards: Vec<Hazard>,
    /// Sim time until which the boss flashes after a hit
    pub flash_until: f64,
}

impl Boss {
    pub const HEALTH: i32 = 5;
    pub const ATTACK_INTERVAL_MS: f64 = 2000.0;

    pub fn new(now_ms: f64) -> Self {
        Self {
            health: Self::HEALTH,
            last_attack_at: now_ms,
            attack_interval_ms: Self::ATTACK_INTERVAL_MS,
            next_attack: AttackKind::HazardStrike,
            projectiles: Vec::new(),
            hazards: Vec::new(),
            flash_until: 0.0,
        }
    }

    pub fn is_flashing(&self, now_ms: f64) -> bool {
        now_ms < self.flash_until
    }
}

/// Brick variants with their kind-specific data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BrickKind {
    Normal,
    Strong,
    Metal,
    /// Destroys neighbours within `radius` when destroyed
    Explosive { radius: f32 },
    /// Drops a multi-ball or explosive-ball power-up when destroyed
    Trigger,
    /// Oscillates along X around `anchor_x`
    Moving {
        anchor_x: f32,
        amplitude: f32,
        period_ms: f32,
    },
    Boss(Box<Boss>),
}

impl BrickKind {
    /// Payload-free tag
    pub fn brick_type(&self) -> BrickType {
        match self {
            BrickKind::Normal => BrickType::Normal,
            BrickKind::Strong => BrickType::Strong,
            BrickKind::Metal => BrickType::Metal,
            BrickKind::Explosive { .. } => BrickType::Explosive,
            BrickKind::Trigger => BrickType::Trigger,
            BrickKind::Moving { .. } => BrickType::Moving,
            BrickKind::Boss(_) => BrickType::Boss,
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, BrickKind::Boss(_))
    }
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub pos: Vec3,
    pub half_extents: Vec3,
    pub kind: BrickKind,
    /// Never increases; 0 once destroyed
    pub hits_remaining: u32,
    pub max_hits: u32,
    pub points: u64,
    /// Goes false exactly once
    pub active: bool,
}

impl Brick {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.half_extents)
    }

    /// Took a hit but still standing (rendered translucent)
    pub fn is_damaged(&self) -> bool {
        self.active && self.hits_remaining < self.max_hits
    }

    pub fn boss(&self) -> Option<&Boss> {
        match &self.kind {
            BrickKind::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    pub fn boss_mut(&mut self) -> Option<&mut Boss> {
        match &mut self.kind {
            BrickKind::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    /// Advance a moving brick along its oscillation
    pub fn animate(&mut self, now_ms: f64) {
        if let BrickKind::Moving {
            anchor_x,
            amplitude,
            period_ms,
        } = self.kind
        {
            let phase = (now_ms / period_ms as f64).fract() as f32;
            self.pos.x = anchor_x + amplitude * (phase * std::f32::consts::TAU).sin();
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    PaddleSizeUp,
    PaddleDoubleSize,
    MultiBall,
    ExplosiveBall,
    Barrier,
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec3,
    pub vel: Vec3,
    pub active: bool,
}

impl PowerUp {
    /// Capsule half size (about a third of a brick)
    pub const HALF_EXTENTS: Vec3 = Vec3::new(0.8, 0.6, 0.8);
    /// Fall speed per tick
    pub const FALL_SPEED: f32 = 0.05;

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, Self::HALF_EXTENTS)
    }
}

/// Floor safety net
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrier {
    pub created_at: f64,
    /// `None` for the permanent boss-level barrier
    pub expires_at: Option<f64>,
    /// In the warning phase before removal
    pub blinking: bool,
}

impl Barrier {
    pub fn permanent(now_ms: f64) -> Self {
        Self {
            created_at: now_ms,
            expires_at: None,
            blinking: false,
        }
    }

    pub const DURATION_MS: f64 = 15000.0;
    /// Warning phase length before a timed barrier disappears
    pub const BLINK_MS: f64 = 2000.0;
    pub const BLINK_TOGGLE_MS: f64 = 200.0;

    pub fn timed(now_ms: f64) -> Self {
        Self {
            created_at: now_ms,
            expires_at: Some(now_ms + Self::DURATION_MS),
            blinking: false,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.expires_at.is_none()
    }

    /// Opacity for the renderer (toggles every 200 ms while blinking)
    pub fn opacity(&self, now_ms: f64) -> f32 {
        let Some(expires_at) = self.expires_at else {
            return 0.7;
        };
        let blink_elapsed = (now_ms - (expires_at - Self::BLINK_MS)).max(0.0);
        if self.blinking && (blink_elapsed / Self::BLINK_TOGGLE_MS) as u64 % 2 == 1 {
            0.2
        } else {
            0.7
        }
    }
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
    pub settings: Settings,
    /// Current level (1-based)
    pub level: u32,
    pub score: u64,
    pub phase: GamePhase,
    /// Pausable simulation clock (ms)
    pub now_ms: f64,
    pub paddle: Paddle,
    /// Primary ball first, then extra balls
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub powerups: Vec<PowerUp>,
    pub barrier: Option<Barrier>,
    /// Drop chance per destroyed brick (from the level)
    pub powerup_chance: f32,
    /// Counted paddle hits since the last ball reset
    pub hit_streak: u32,
    pub last_streak_hit_at: Option<f64>,
    /// Pending "next level" announcement
    pub level_info_at: Option<f64>,
    /// Events emitted since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session on the configured starting level
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: settings.starting_level,
            settings,
            score: 0,
            phase: GamePhase::WaitingForStart,
            now_ms: 0.0,
            paddle: Paddle::default(),
            balls: Vec::new(),
            bricks: Vec::new(),
            powerups: Vec::new(),
            barrier: None,
            powerup_chance: 0.0,
            hit_streak: 0,
            last_streak_hit_at: None,
            level_info_at: None,
            events: Vec::new(),
            next_id: 1,
        };

        state.load_level(state.level)?;
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Definition of the current level
    pub fn level_def(&self) -> &'static LevelDef {
        // `level` is only ever set from validated numbers
        levels::level(self.level).unwrap_or(&levels::LEVELS[0])
    }

    pub fn ball_speed(&self) -> f32 {
        self.level_def().ball_speed
    }

    pub fn primary_ball(&self) -> Option<&Ball> {
        self.balls.iter().find(|b| !b.is_extra)
    }

    pub fn primary_ball_mut(&mut self) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| !b.is_extra)
    }

    pub fn active_bricks(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.iter().filter(|b| b.active)
    }

    /// Authoritative count used for level-complete detection
    pub fn active_brick_count(&self) -> usize {
        self.active_bricks().count()
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.active_bricks().find_map(Brick::boss)
    }

    /// Playing with a live boss
    pub fn in_boss_fight(&self) -> bool {
        self.phase == GamePhase::Playing && self.boss().is_some()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand accumulated events to the collaborators
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Uniform random in [lo, hi)
    pub fn random_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.rng.random::<f32>() * (hi - lo)
    }

    /// Rebuild bricks and per-level tuning for `level`
    ///
    /// Aborts (leaving the current level untouched) on an unknown level.
    pub fn load_level(&mut self, level: u32) -> Result<(), ConfigError> {
        let def = levels::level(level).inspect_err(|e| {
            log::error!("Level load aborted: {}", e);
        })?;

        self.level = level;
        self.clear_transient();
        self.level_info_at = None;
        self.bricks.clear();
        self.paddle.speed = def.paddle_speed;
        self.powerup_chance = def.powerup_chance;
        self.paddle.recenter();

        levels::build_bricks(self, def);

        if def.boss {
            self.barrier = Some(Barrier::permanent(self.now_ms));
        }

        self.reset_ball();
        log::info!(
            "Level {} ({}) loaded with {} bricks",
            level,
            def.name,
            self.bricks.len()
        );
        Ok(())
    }

    /// Park the primary ball above the paddle with a fresh launch velocity
    ///
    /// Drops extra balls and resets the paddle streak; score is untouched.
    pub fn reset_ball(&mut self) {
        let speed = self.ball_speed();
        let vel = Vec3::new(
            self.random_range(-0.1, 0.1),
            0.15,
            self.random_range(-0.05, 0.05),
        )
        .normalize()
            * speed;

        self.balls.retain(|b| !b.is_extra);
        let id = match self.balls.first() {
            Some(ball) => ball.id,
            None => self.next_entity_id(),
        };
        self.balls.clear();
        self.balls.push(Ball::new(id, ball_spawn_position(), vel));

        self.hit_streak = 0;
        self.last_streak_hit_at = None;
    }

    /// Zero the primary ball at the spawn point (game over)
    pub fn park_ball(&mut self) {
        self.balls.retain(|b| !b.is_extra);
        if let Some(ball) = self.primary_ball_mut() {
            ball.pos = ball_spawn_position();
            ball.vel = Vec3::ZERO;
            ball.fire_aura = false;
        }
        self.hit_streak = 0;
        self.last_streak_hit_at = None;
    }

    /// Drop every in-flight timed effect and transient entity
    pub fn clear_transient(&mut self) {
        self.balls.retain(|b| !b.is_extra);
        for ball in &mut self.balls {
            ball.explosive = false;
            ball.explosive_until = None;
            ball.fire_aura = false;
        }
        self.powerups.clear();
        self.barrier = None;
        self.paddle.size_multiplier = 1.0;
        self.paddle.size_effect_expiry = None;
        for brick in &mut self.bricks {
            if let Some(boss) = brick.boss_mut() {
                boss.projectiles.clear();
                boss.hazards.clear();
            }
        }
    }

    /// Push a brick built from the level tables
    pub fn push_brick(&mut self, pos: Vec3, half_extents: Vec3, kind: BrickKind) {
        let stats = levels::brick_stats(kind.brick_type());
        let id = self.next_entity_id();
        self.bricks.push(Brick {
            id,
            pos,
            half_extents,
            kind,
            hits_remaining: stats.hits,
            max_hits: stats.hits,
            points: stats.points,
            active: true,
        });
    }
}
