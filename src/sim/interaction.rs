use eframe::egui::Vec2;
use tracing::{trace, warn};

use super::Simulation;
use crate::error::{SimulationError, SimulationResult};

impl Simulation {
    fn check_index(&self, index: usize) -> SimulationResult<()> {
        if index < self.store.len() {
            Ok(())
        } else {
            Err(SimulationError::ParticleOutOfRange {
                index,
                len: self.store.len(),
            })
        }
    }

    /// Pins the particle where it stands and re-heats when no other drag is
    /// already holding the simulation warm.
    ///
    /// Starting a drag on an already pinned particle keeps its pin and does
    /// not count as another drag.
    pub fn drag_start(&mut self, index: usize) -> SimulationResult<()> {
        self.check_index(index)?;

        let Some(particle) = self.store.get_mut(index) else {
            return Ok(());
        };
        if particle.pin.is_some() {
            trace!(index, "drag start on pinned particle");
            return Ok(());
        }
        particle.pin = Some(particle.position);

        if self.active_drags == 0 {
            self.alpha_target = self.config.interaction.drag_alpha_target;
            self.restart(self.alpha_target);
        }
        self.active_drags += 1;
        trace!(index, active_drags = self.active_drags, "drag started");
        Ok(())
    }

    /// Moves the pin to the pointer. Non-finite pointer positions are ignored.
    pub fn drag_move(&mut self, index: usize, point: Vec2) -> SimulationResult<()> {
        self.check_index(index)?;

        if !point.is_finite() {
            warn!(index, "ignoring non-finite drag position");
            return Ok(());
        }
        if let Some(particle) = self.store.get_mut(index) {
            particle.pin = Some(point);
        }
        Ok(())
    }

    /// Releases the pin; the last drag to end lets the simulation cool again.
    /// Ending a drag on an unpinned particle does nothing.
    pub fn drag_end(&mut self, index: usize) -> SimulationResult<()> {
        self.check_index(index)?;

        let released = self
            .store
            .get_mut(index)
            .and_then(|particle| particle.pin.take())
            .is_some();
        if !released {
            return Ok(());
        }

        self.active_drags = self.active_drags.saturating_sub(1);
        if self.active_drags == 0 {
            self.alpha_target = self.config.interaction.release_alpha_target;
        }
        trace!(index, active_drags = self.active_drags, "drag ended");
        Ok(())
    }
}
