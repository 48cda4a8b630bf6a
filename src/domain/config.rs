use serde::{Deserialize, Serialize};

/// Engine-wide tuning, loaded from JSON by the embedding page.
///
/// Every field has a default, so `{}` is a valid config and a page can
/// override only what it cares about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Persisted user toggle. When false nothing is allocated and the
    /// scheduler never starts.
    pub enabled: bool,
    /// RNG seed; `full_reset` reseeds with it so resets are reproducible.
    pub seed: u32,
    /// Broad-phase cells per axis over the 0..100 space
    pub grid_cells: u32,
    /// How long a host stays "hovered" after the pointer leaves
    pub hover_linger_ms: f64,
    pub physics: PhysicsParams,
    pub collision: CollisionParams,
    pub cursor: CursorParams,
    pub placement: PlacementParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicsParams {
    /// Per-tick "air resistance" multiplier
    pub friction: f32,
    /// Second per-tick multiplier, tuned for settling
    pub damping: f32,
    /// Max random velocity added per axis per tick
    pub jitter: f32,
    /// Restitution on boundary bounces
    pub bounce: f32,
    pub max_speed: f32,
    /// Velocity multiplier while a particle returns to rest
    pub return_decay: f32,
    /// Speed below which a returning particle is considered at rest
    pub rest_epsilon: f32,
    pub margin: f32,
    /// Margin used for particles at or above `large_size_threshold`
    pub large_margin: f32,
    pub large_size_threshold: f32,
    /// Speed of the kick particles get when their host becomes engaged
    pub activation_speed: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollisionParams {
    pub enabled: bool,
    pub restitution: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CursorParams {
    pub enabled: bool,
    pub radius: f32,
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementParams {
    /// Extra clearance added to the largest particle size to get the
    /// Poisson-disk minimum distance
    pub spacing: f32,
    pub max_attempts: u32,
    /// Random tries for the very first sample
    pub seed_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: 12345,
            grid_cells: 10,
            hover_linger_ms: 150.0,
            physics: PhysicsParams::default(),
            collision: CollisionParams::default(),
            cursor: CursorParams::default(),
            placement: PlacementParams::default(),
        }
    }
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            friction: 0.98,
            damping: 0.99,
            jitter: 0.02,
            bounce: 0.5,
            max_speed: 2.0,
            return_decay: 0.85,
            rest_epsilon: 0.01,
            margin: 5.0,
            large_margin: 7.0,
            large_size_threshold: 6.0,
            activation_speed: 1.0,
        }
    }
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self { enabled: true, restitution: 0.4 }
    }
}

impl Default for CursorParams {
    fn default() -> Self {
        Self { enabled: true, radius: 30.0, strength: 0.5 }
    }
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self { spacing: 1.5, max_attempts: 30, seed_attempts: 64 }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: EngineConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn validate(&self) -> Result<(), String> {
        let p = &self.physics;
        unit_interval("physics.friction", p.friction, false)?;
        unit_interval("physics.damping", p.damping, false)?;
        unit_interval("physics.bounce", p.bounce, true)?;
        unit_interval("physics.returnDecay", p.return_decay, true)?;
        non_negative("physics.jitter", p.jitter)?;
        positive("physics.maxSpeed", p.max_speed)?;
        non_negative("physics.restEpsilon", p.rest_epsilon)?;
        non_negative("physics.margin", p.margin)?;
        non_negative("physics.largeMargin", p.large_margin)?;
        non_negative("physics.largeSizeThreshold", p.large_size_threshold)?;
        non_negative("physics.activationSpeed", p.activation_speed)?;

        unit_interval("collision.restitution", self.collision.restitution, true)?;

        non_negative("cursor.radius", self.cursor.radius)?;
        non_negative("cursor.strength", self.cursor.strength)?;

        non_negative("placement.spacing", self.placement.spacing)?;
        if self.placement.max_attempts == 0 {
            return Err("placement.maxAttempts must be at least 1".to_string());
        }
        if self.placement.seed_attempts == 0 {
            return Err("placement.seedAttempts must be at least 1".to_string());
        }

        if self.grid_cells == 0 || self.grid_cells > 100 {
            return Err(format!("gridCells must be in 1..=100, got {}", self.grid_cells));
        }
        if !self.hover_linger_ms.is_finite() || self.hover_linger_ms < 0.0 {
            return Err(format!("hoverLingerMs must be >= 0, got {}", self.hover_linger_ms));
        }
        Ok(())
    }
}

/// `(0, 1]`, or `[0, 1]` when `allow_zero`
fn unit_interval(name: &str, value: f32, allow_zero: bool) -> Result<(), String> {
    let low_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if value.is_finite() && low_ok && value <= 1.0 {
        Ok(())
    } else {
        Err(format!("{} must be within {}0, 1], got {}", name, if allow_zero { "[" } else { "(" }, value))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{} must be a finite value >= 0, got {}", name, value))
    }
}

fn positive(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{} must be a finite value > 0, got {}", name, value))
    }
}
