use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};

/// Every tunable of the force simulation.
///
/// Field names follow the JSON config file. Missing fields fall back to the
/// defaults below, so a config file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Alpha the simulation starts with.
    pub alpha: f32,
    /// Below this alpha (with a resting target) the loop idles.
    pub alpha_min: f32,
    /// Fraction of the distance to `alpha_target` covered each tick.
    pub alpha_decay: f32,
    /// Resting value alpha decays toward.
    pub alpha_target: f32,
    /// Fraction of velocity removed each tick.
    pub velocity_decay: f32,
    pub many_body: ManyBodyConfig,
    pub link: LinkConfig,
    pub center: CenterConfig,
    pub anchor: AnchorConfig,
    pub interaction: InteractionConfig,
    /// Alpha a layout switch re-heats to.
    pub mode_switch_alpha: f32,
    /// Seed for the jitter generator used on coincident particles.
    pub seed: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManyBodyConfig {
    /// Negative values repel.
    pub strength: f32,
    /// Barnes-Hut accuracy: cells with `size / distance < theta` are merged.
    pub theta: f32,
    pub distance_min: f32,
    pub distance_max: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Rest length of every route spring.
    pub distance: f32,
    pub iterations: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CenterConfig {
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnchorConfig {
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionConfig {
    pub drag_alpha_target: f32,
    pub release_alpha_target: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            many_body: ManyBodyConfig::default(),
            link: LinkConfig::default(),
            center: CenterConfig::default(),
            anchor: AnchorConfig::default(),
            interaction: InteractionConfig::default(),
            mode_switch_alpha: 1.0,
            seed: 0x5eed_f11e,
        }
    }
}

impl Default for ManyBodyConfig {
    fn default() -> Self {
        Self {
            strength: -30.0,
            theta: 0.9,
            distance_min: 1.0,
            distance_max: None,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            distance: 30.0,
            iterations: 1,
        }
    }
}

impl Default for CenterConfig {
    fn default() -> Self {
        Self { strength: 0.1 }
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self { strength: 0.1 }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_alpha_target: 0.3,
            release_alpha_target: 0.0,
        }
    }
}

fn check(condition: bool, message: impl FnOnce() -> String) -> SimulationResult<()> {
    if condition {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfig(message()))
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimulationResult<()> {
        check(self.alpha.is_finite() && self.alpha >= 0.0, || {
            format!("alpha must be a non-negative number, got {}", self.alpha)
        })?;
        check(self.alpha_min.is_finite() && self.alpha_min >= 0.0, || {
            format!("alpha_min must be a non-negative number, got {}", self.alpha_min)
        })?;
        check(self.alpha_decay > 0.0 && self.alpha_decay <= 1.0, || {
            format!("alpha_decay must be in (0, 1], got {}", self.alpha_decay)
        })?;
        check(self.alpha_target.is_finite() && self.alpha_target >= 0.0, || {
            format!("alpha_target must be a non-negative number, got {}", self.alpha_target)
        })?;
        check(self.velocity_decay >= 0.0 && self.velocity_decay < 1.0, || {
            format!("velocity_decay must be in [0, 1), got {}", self.velocity_decay)
        })?;
        check(self.many_body.strength.is_finite(), || {
            "many_body.strength must be finite".to_owned()
        })?;
        check(self.many_body.theta >= 0.0 && self.many_body.theta.is_finite(), || {
            format!("many_body.theta must be non-negative, got {}", self.many_body.theta)
        })?;
        check(
            self.many_body.distance_min > 0.0 && self.many_body.distance_min.is_finite(),
            || {
                format!(
                    "many_body.distance_min must be positive, got {}",
                    self.many_body.distance_min
                )
            },
        )?;
        if let Some(distance_max) = self.many_body.distance_max {
            check(distance_max > self.many_body.distance_min, || {
                format!("many_body.distance_max must exceed distance_min, got {distance_max}")
            })?;
        }
        check(self.link.distance >= 0.0 && self.link.distance.is_finite(), || {
            format!("link.distance must be non-negative, got {}", self.link.distance)
        })?;
        check(self.link.iterations >= 1, || {
            "link.iterations must be at least 1".to_owned()
        })?;
        check((0.0..=1.0).contains(&self.center.strength), || {
            format!("center.strength must be in [0, 1], got {}", self.center.strength)
        })?;
        check(self.anchor.strength >= 0.0 && self.anchor.strength.is_finite(), || {
            format!("anchor.strength must be non-negative, got {}", self.anchor.strength)
        })?;
        check(
            self.interaction.drag_alpha_target.is_finite()
                && self.interaction.drag_alpha_target >= 0.0
                && self.interaction.release_alpha_target.is_finite()
                && self.interaction.release_alpha_target >= 0.0,
            || "interaction alpha targets must be non-negative numbers".to_owned(),
        )?;
        check(
            self.mode_switch_alpha.is_finite() && self.mode_switch_alpha >= 0.0,
            || format!("mode_switch_alpha must be non-negative, got {}", self.mode_switch_alpha),
        )
    }
}

pub fn parse_config(raw: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig =
        serde_json::from_str(raw).context("invalid simulation config JSON")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<SimulationConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("failed to load config from {}", path.display()))
}
