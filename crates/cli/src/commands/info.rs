//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::SimulationConfig;
use serde::Serialize;
use tracing::info;
use trigger_sync::{baseline_for, classify, CameraRole, TopicBinding};

use crate::cli::InfoArgs;

/// Rig info for JSON output
#[derive(Serialize)]
struct RigInfo {
    rig: RigSection,
    cameras: Vec<CameraInfo>,
    simulation: SimulationSection,
    trigger_rate_hz: f64,
    publisher: PublisherSection,
}

#[derive(Serialize)]
struct RigSection {
    name: String,
    camera_name: String,
    frame_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hack_baseline: Option<f64>,
}

#[derive(Serialize)]
struct CameraInfo {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<CameraRole>,
    baseline: f64,
    width: u32,
    height: u32,
    encoding: &'static str,
    image_topic: String,
    camera_info_topic: String,
    frame_id: String,
}

#[derive(Serialize)]
struct SimulationSection {
    step_sec: f64,
    render_rate_hz: f64,
}

#[derive(Serialize)]
struct PublisherSection {
    kind: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let rig_info = build_rig_info(&config);
    if args.json {
        let json =
            serde_json::to_string_pretty(&rig_info).context("Failed to serialize rig info")?;
        println!("{}", json);
    } else {
        print_rig_info(&rig_info);
    }

    Ok(())
}

/// Resolve roles, baselines and topics the same way the rig does at load
fn build_rig_info(config: &SimulationConfig) -> RigInfo {
    let params = &config.rig;
    let cameras = config
        .cameras
        .iter()
        .map(|camera| {
            let role = classify(&camera.name);
            let binding = TopicBinding::resolve(params, role);
            CameraInfo {
                name: camera.name.clone(),
                role,
                baseline: baseline_for(role, params.hack_baseline),
                width: camera.width,
                height: camera.height,
                encoding: camera.format.encoding(),
                image_topic: binding.image_topic,
                camera_info_topic: binding.camera_info_topic,
                frame_id: binding.frame_id,
            }
        })
        .collect();

    RigInfo {
        rig: RigSection {
            name: params.name.clone(),
            camera_name: params.camera_name.clone(),
            frame_name: params.frame_name.clone(),
            hack_baseline: params.hack_baseline,
        },
        cameras,
        simulation: SimulationSection {
            step_sec: config.simulation.step_sec,
            render_rate_hz: config.simulation.render_rate_hz,
        },
        trigger_rate_hz: config.trigger.rate_hz,
        publisher: PublisherSection {
            kind: format!("{:?}", config.publisher.kind).to_lowercase(),
            queue_capacity: config.publisher.queue_capacity,
        },
    }
}

fn print_rig_info(info: &RigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Rig Sync Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🔧 Rig");
    println!("   ├─ Name: {}", info.rig.name);
    println!("   ├─ Namespace: {}", info.rig.camera_name);
    println!("   ├─ Frame: {}", info.rig.frame_name);
    match info.rig.hack_baseline {
        Some(baseline) => println!("   └─ Baseline: {} m", baseline),
        None => println!("   └─ Baseline: (unset, 0.0)"),
    }

    println!("\n📷 Cameras ({})", info.cameras.len());
    for (i, camera) in info.cameras.iter().enumerate() {
        let is_last = i == info.cameras.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };
        let role = camera
            .role
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unclassified".to_string());

        println!(
            "   {} {} ({}x{} {}, {})",
            prefix, camera.name, camera.width, camera.height, camera.encoding, role
        );
        println!("   {}  ├─ image: {}", child_prefix, camera.image_topic);
        println!("   {}  ├─ info: {}", child_prefix, camera.camera_info_topic);
        println!("   {}  ├─ frame_id: {}", child_prefix, camera.frame_id);
        println!("   {}  └─ baseline: {}", child_prefix, camera.baseline);
    }

    println!("\n⚙️  Cadence");
    println!("   ├─ Sim step: {} s", info.simulation.step_sec);
    println!("   ├─ Render rate: {} Hz", info.simulation.render_rate_hz);
    println!("   └─ Trigger rate: {} Hz", info.trigger_rate_hz);

    println!("\n📤 Publisher");
    println!("   ├─ Kind: {}", info.publisher.kind);
    println!("   └─ Queue capacity: {}", info.publisher.queue_capacity);

    println!();
}
