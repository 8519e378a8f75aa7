//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    rig: String,
    camera_count: usize,
    reference: Vec<String>,
    secondary: Vec<String>,
    unclassified: Vec<String>,
    trigger_rate_hz: f64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_with_warnings(&args.config) {
        Ok(loaded) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: (!loaded.warnings.is_empty()).then_some(loaded.warnings),
            summary: Some(summarize(&loaded.config)),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(config: &contracts::SimulationConfig) -> ConfigSummary {
    let mut summary = ConfigSummary {
        rig: config.rig.name.clone(),
        camera_count: config.cameras.len(),
        reference: Vec::new(),
        secondary: Vec::new(),
        unclassified: Vec::new(),
        trigger_rate_hz: config.trigger.rate_hz,
    };

    for camera in &config.cameras {
        let bucket = match trigger_sync::classify(&camera.name) {
            Some(trigger_sync::CameraRole::Reference) => &mut summary.reference,
            Some(trigger_sync::CameraRole::Secondary) => &mut summary.secondary,
            None => &mut summary.unclassified,
        };
        bucket.push(camera.name.clone());
    }
    summary
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Rig: {}", summary.rig);
            println!("  Cameras: {}", summary.camera_count);
            println!("  Reference: {}", join_or_dash(&summary.reference));
            println!("  Secondary: {}", join_or_dash(&summary.secondary));
            println!("  Unclassified: {}", join_or_dash(&summary.unclassified));
            println!("  Trigger rate: {} Hz", summary.trigger_rate_hz);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

fn join_or_dash(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_config_summary() {
        let file = write_config(
            r#"
[rig]
name = "stereo_camera"

[[cameras]]
name = "stereo_left_sensor"
width = 4
height = 2

[[cameras]]
name = "stereo_right_sensor"
width = 4
height = 2

[[cameras]]
name = "overview"
width = 4
height = 2
"#,
        );
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };

        let result = validate_config(&args);
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.camera_count, 3);
        assert_eq!(summary.reference, vec!["stereo_left_sensor"]);
        assert_eq!(summary.secondary, vec!["stereo_right_sensor"]);
        assert_eq!(summary.unclassified, vec!["overview"]);
    }

    #[test]
    fn test_invalid_config() {
        let file = write_config("[rig]\n");
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("at least one camera"));
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/rig.toml".into(),
            json: false,
        };
        assert!(run_validate(&args).is_err());
    }
}
