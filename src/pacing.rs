//! Cooperative stepping and cancellation.
//!
//! A generation pass is a small state machine: each call to
//! [`GenerationPass::step`] performs exactly one unit of work (one room, one
//! corridor, one automaton step, one chunk of terrain rows) and returns. The
//! driver checks the [`CancelToken`] before every unit, so a cancelled run
//! leaves exactly the units that finished before the token was raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{GenerationError, PlacementWarning};
use crate::geometry::Rect;
use crate::rng::LevelRng;
use crate::surface::Surface;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Summary of what a pass produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationReport {
    pub units_completed: usize,
    /// Rooms in placement order (empty for caves and terrain)
    pub rooms: Vec<Rect>,
    pub corridors: usize,
    pub warnings: Vec<PlacementWarning>,
}

/// A unit that has just been applied to the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitReport {
    /// 1-based unit index within the pass
    pub index: usize,
    pub label: &'static str,
}

pub trait GenerationPass {
    fn name(&self) -> &'static str;

    /// No units remain.
    fn is_finished(&self) -> bool;

    /// Perform one unit of work and return its label. A finished pass does nothing.
    fn step(&mut self, surface: &mut dyn Surface, rng: &mut dyn LevelRng) -> &'static str;

    fn report(&self) -> GenerationReport;
}

/// Run a pass to completion, checking `cancel` before every unit.
pub fn drive<S: Surface>(
    pass: &mut dyn GenerationPass,
    surface: &mut S,
    rng: &mut dyn LevelRng,
    cancel: &CancelToken,
) -> Result<GenerationReport, GenerationError> {
    drive_with(pass, surface, rng, cancel, |_, _| {})
}

/// Like [`drive`], calling `on_unit` after every applied unit. This is the
/// hook an external scheduler uses to pace or visualise generation.
pub fn drive_with<S, F>(
    pass: &mut dyn GenerationPass,
    surface: &mut S,
    rng: &mut dyn LevelRng,
    cancel: &CancelToken,
    mut on_unit: F,
) -> Result<GenerationReport, GenerationError>
where
    S: Surface,
    F: FnMut(UnitReport, &S),
{
    let mut units_completed = 0;
    log::info!("{}: generating inside {:?}", pass.name(), surface.bounds());

    while !pass.is_finished() {
        if cancel.is_cancelled() {
            log::info!("{}: cancelled after {} units", pass.name(), units_completed);
            return Err(GenerationError::Cancelled { units_completed });
        }

        let label = pass.step(surface, rng);
        units_completed += 1;
        log::debug!("{}: unit {} ({})", pass.name(), units_completed, label);
        on_unit(UnitReport { index: units_completed, label }, surface);
    }

    let mut report = pass.report();
    report.units_completed = units_completed;
    log::info!(
        "{}: finished in {} units ({} rooms, {} corridors, {} warnings)",
        pass.name(),
        units_completed,
        report.rooms.len(),
        report.corridors,
        report.warnings.len()
    );
    Ok(report)
}
