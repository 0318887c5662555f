//! CLI command implementations.

use drape_scene::{JsonFrameExporter, RunSummary, SceneConfig, ScenePreset, SceneRunner};
use drape_telemetry::{EventBus, EventKind, VecSink};

/// Run a simulation from a scene file.
pub fn simulate(config_path: &str, output_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Drape Simulation");
    println!("────────────────");
    println!("Config: {config_path}");
    println!();

    let scene = SceneConfig::load(config_path)
        .map_err(|e| format!("Failed to load {config_path}: {e}"))?;
    run_scene(&scene, output_path)
}

/// Run a built-in scene.
pub fn preset(
    name: &str,
    steps: Option<u32>,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Drape Preset");
    println!("════════════");
    println!();

    let Some(preset) = ScenePreset::from_name(name) else {
        let available: Vec<&str> = ScenePreset::all().iter().map(|p| p.name()).collect();
        eprintln!("Unknown preset: {name}");
        eprintln!("Available: {}", available.join(", "));
        return Err("Unknown preset".into());
    };

    let mut scene = preset.build();
    if let Some(steps) = steps {
        scene.steps = steps;
    }
    run_scene(&scene, output_path)
}

fn run_scene(scene: &SceneConfig, output_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Running: {} ({}×{} particles, {} probes, {} steps @ {:.4}s)",
        scene.name,
        scene.cloth.rows,
        scene.cloth.cols,
        scene.probes.len(),
        scene.steps,
        scene.dt,
    );

    let events = VecSink::new();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(events.clone()));

    let mut exporter = output_path.map(JsonFrameExporter::new);
    let result = SceneRunner::run(scene, &mut bus, |tick, mesh| {
        if let Some(exporter) = exporter.as_mut() {
            exporter.submit_frame(tick, mesh);
        }
    });
    bus.finalize();
    print_incidents(&events);
    let summary = result.map_err(|e| format!("Simulation failed: {e}"))?;

    print_summary(&summary);

    if let (Some(exporter), Some(path)) = (exporter.as_mut(), output_path) {
        exporter.finalize()?;
        println!("Frames written to: {path} ({} frames)", exporter.frame_count());
    }
    Ok(())
}

/// Recoveries and failures, one line each.
fn print_incidents(events: &VecSink) {
    for event in events.events() {
        match event.kind {
            EventKind::Recovered { substeps } => {
                println!("  tick {:>5}: recovered with {substeps} substeps", event.timestep);
            }
            EventKind::StepFailed { reason } => {
                println!("  tick {:>5}: failed: {reason}", event.timestep);
            }
            _ => {}
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("  Steps:         {}", summary.steps);
    println!("  Sim time:      {:.3}s", summary.sim_time);
    println!("  Wall time:     {:.3}s", summary.wall_time);
    println!("  Recoveries:    {}", summary.recoveries);
    println!("  Max contacts:  {}", summary.max_contacts);
    println!("  Max overlap:   {:.4}m", summary.max_penetration);
    println!("  Final KE:      {:.6e}", summary.kinetic_energy);
    println!("  Final elastic: {:.6e}", summary.elastic_energy);
}

/// Validate a scene file.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Drape Validator");
    println!("───────────────");
    println!();

    println!("Validating scene: {path}");
    let scene = SceneConfig::load(path)?;
    println!(
        "✅ Scene '{}' is valid: {}×{} grid, {} probes, {} steps.",
        scene.name,
        scene.cloth.rows,
        scene.cloth.cols,
        scene.probes.len(),
        scene.steps,
    );
    Ok(())
}
