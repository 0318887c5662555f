//! Scene runner: drives a cloth through a scene and reports telemetry.
//!
//! Each tick advances the mesh by `dt`. When the implicit solve fails with
//! a recoverable error, the tick is retried from its starting state as
//! `2^k` substeps of `dt / 2^k`, for `k = 1..=max_halvings`.

use std::time::Instant;

use drape_solver::{ClothMesh, StepReport};
use drape_telemetry::{EventBus, EventKind, SimulationEvent};
use drape_types::{DrapeError, DrapeResult};
use serde::{Deserialize, Serialize};

use crate::scenarios::SceneConfig;

/// Aggregate results of a scene run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scene: String,
    /// Ticks completed.
    pub steps: u32,
    /// Simulated time (seconds).
    pub sim_time: f64,
    /// Ticks that needed substepping.
    pub recoveries: u32,
    /// Most contacts seen in any tick.
    pub max_contacts: usize,
    /// Deepest overlap seen in any tick.
    pub max_penetration: f64,
    pub kinetic_energy: f64,
    pub elastic_energy: f64,
    /// Times `on_frame` was called.
    pub frames: u32,
    /// Wall-clock time of the whole run (seconds).
    pub wall_time: f64,
}

/// Owns a cloth mesh and advances it tick by tick.
pub struct SceneRunner {
    scene: SceneConfig,
    mesh: ClothMesh,
    tick: u32,
    sim_time: f64,
    recoveries: u32,
    max_contacts: usize,
    max_penetration: f64,
}

impl SceneRunner {
    /// Validates the scene and builds its cloth.
    pub fn new(scene: &SceneConfig) -> DrapeResult<Self> {
        scene.validate()?;
        let mesh = ClothMesh::new(&scene.cloth)?;
        tracing::debug!(
            scene = %scene.name,
            particles = mesh.particles().len(),
            springs = mesh.springs().len(),
            probes = scene.probes.len(),
            "scene ready"
        );
        Ok(Self {
            scene: scene.clone(),
            mesh,
            tick: 0,
            sim_time: 0.0,
            recoveries: 0,
            max_contacts: 0,
            max_penetration: 0.0,
        })
    }

    /// Runs `scene` to completion.
    ///
    /// `on_frame(tick, mesh)` is called after every `export_every`-th tick,
    /// starting with tick 0. Events are flushed to the bus's sinks once per
    /// tick. Stops at the first tick that cannot be completed.
    pub fn run<F>(scene: &SceneConfig, bus: &mut EventBus, mut on_frame: F) -> DrapeResult<RunSummary>
    where
        F: FnMut(u32, &ClothMesh),
    {
        let start = Instant::now();
        let mut runner = Self::new(scene)?;
        let mut frames = 0;

        while runner.tick < scene.steps {
            let tick = runner.tick;
            let result = runner.advance(bus);
            bus.flush();
            result?;

            if tick % scene.export_every == 0 {
                on_frame(tick, &runner.mesh);
                frames += 1;
            }
        }

        let mut summary = runner.summary();
        summary.frames = frames;
        summary.wall_time = start.elapsed().as_secs_f64();
        tracing::debug!(
            scene = %summary.scene,
            steps = summary.steps,
            recoveries = summary.recoveries,
            wall_time = summary.wall_time,
            "scene finished"
        );
        Ok(summary)
    }

    /// Advances one tick, substepping on recoverable failures.
    ///
    /// On error the mesh is left at the start of the tick.
    pub fn advance(&mut self, bus: &EventBus) -> DrapeResult<StepReport> {
        let tick = self.tick;
        let dt = self.scene.dt;
        let gravity = self.scene.gravity_vector();
        let probes = self.scene.probes_at(self.sim_time);

        let report = match self.mesh.step(dt, gravity, &probes) {
            Ok(report) => report,
            Err(err) if err.is_recoverable() && self.scene.max_halvings > 0 => {
                tracing::warn!(tick, error = %err, "step failed, retrying with substeps");
                match self.recover(err) {
                    Ok((report, substeps)) => {
                        self.recoveries += 1;
                        bus.emit(SimulationEvent::new(tick, EventKind::Recovered { substeps }));
                        report
                    }
                    Err(err) => return Err(self.fail(bus, err)),
                }
            }
            Err(err) => return Err(self.fail(bus, err)),
        };

        self.sim_time += dt;
        self.tick += 1;
        self.max_contacts = self.max_contacts.max(report.contact_count);
        self.max_penetration = self.max_penetration.max(report.max_penetration);

        bus.emit(SimulationEvent::new(
            tick,
            EventKind::Contacts {
                count: report.contact_count as u32,
                max_penetration: report.max_penetration,
            },
        ));
        bus.emit(SimulationEvent::new(
            tick,
            EventKind::Energy {
                kinetic: self.mesh.kinetic_energy(),
                elastic: self.mesh.elastic_energy(),
            },
        ));
        bus.emit(SimulationEvent::new(
            tick,
            EventKind::TimestepEnd {
                sim_time: self.sim_time,
                wall_time: report.wall_time,
            },
        ));
        Ok(report)
    }

    /// Retries the current tick with progressively smaller substeps.
    ///
    /// Every attempt starts from a copy of the pre-tick mesh; the mesh is
    /// replaced only when all substeps of an attempt succeed.
    fn recover(&mut self, first: DrapeError) -> DrapeResult<(StepReport, u32)> {
        let mut last = first;
        for k in 1..=self.scene.max_halvings {
            let substeps = 1u32 << k;
            let mut trial = self.mesh.clone();
            match self.substep(&mut trial, substeps) {
                Ok(report) => {
                    self.mesh = trial;
                    return Ok((report, substeps));
                }
                Err(err) if err.is_recoverable() => {
                    tracing::debug!(tick = self.tick, substeps, error = %err, "substep attempt failed");
                    last = err;
                }
                Err(err) => return Err(err),
            }
        }
        Err(last)
    }

    /// Runs `substeps` steps of `dt / substeps` on `mesh`, with probes
    /// placed at the start of each substep. Reports the worst contact
    /// and matrix size seen and the summed wall time.
    fn substep(&self, mesh: &mut ClothMesh, substeps: u32) -> DrapeResult<StepReport> {
        let h = self.scene.dt / f64::from(substeps);
        let gravity = self.scene.gravity_vector();
        let mut combined: Option<StepReport> = None;

        for j in 0..substeps {
            let probes = self.scene.probes_at(self.sim_time + f64::from(j) * h);
            let report = mesh.step(h, gravity, &probes)?;
            combined = Some(match combined {
                None => report,
                Some(acc) => StepReport {
                    free_dofs: acc.free_dofs,
                    contact_count: acc.contact_count.max(report.contact_count),
                    max_penetration: acc.max_penetration.max(report.max_penetration),
                    nonzeros: acc.nonzeros.max(report.nonzeros),
                    wall_time: acc.wall_time + report.wall_time,
                },
            });
        }

        combined.ok_or_else(|| DrapeError::InvalidInput("substep count must be >= 1".into()))
    }

    fn fail(&self, bus: &EventBus, err: DrapeError) -> DrapeError {
        tracing::warn!(tick = self.tick, error = %err, "step failed");
        bus.emit(SimulationEvent::new(
            self.tick,
            EventKind::StepFailed {
                reason: err.to_string(),
            },
        ));
        err
    }

    /// Snapshot of the run so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            scene: self.scene.name.clone(),
            steps: self.tick,
            sim_time: self.sim_time,
            recoveries: self.recoveries,
            max_contacts: self.max_contacts,
            max_penetration: self.max_penetration,
            kinetic_energy: self.mesh.kinetic_energy(),
            elastic_energy: self.mesh.elastic_energy(),
            frames: 0,
            wall_time: 0.0,
        }
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    pub fn mesh(&self) -> &ClothMesh {
        &self.mesh
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }
}
