use serde::{Deserialize, Serialize};
use tracing::info;

use super::Simulation;
use super::forces::{ActiveForces, ForceKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Free force-directed layout.
    #[default]
    Network,
    /// Airports pulled toward their projected geographic position.
    Map,
}

impl LayoutMode {
    pub fn forces(self) -> ActiveForces {
        match self {
            Self::Network => [ForceKind::ManyBody, ForceKind::Link, ForceKind::Center]
                .into_iter()
                .collect(),
            Self::Map => ActiveForces::only(ForceKind::Anchor),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Network => Self::Map,
            Self::Map => Self::Network,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Map => "map",
        }
    }
}

impl Simulation {
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Swaps the active force set and re-heats so the change animates.
    ///
    /// Only alpha is raised, to `mode_switch_alpha`; `alpha_target` stays at
    /// its resting value so the new layout settles once it has moved.
    pub fn set_mode(&mut self, mode: LayoutMode) {
        self.mode = mode;
        self.active = mode.forces();
        self.restart(self.config.mode_switch_alpha);
        info!(mode = mode.label(), alpha = self.alpha, "layout mode switched");
    }

    pub fn toggle_mode(&mut self) -> LayoutMode {
        let next = self.mode.toggled();
        self.set_mode(next);
        next
    }
}
