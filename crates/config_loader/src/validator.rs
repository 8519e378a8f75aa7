//! 配置校验模块
//!
//! 校验规则：
//! - 至少一个相机，相机名称非空且唯一
//! - width / height > 0，单帧字节数不超过 MAX_FRAME_BYTES
//! - step_sec > 0, render_rate_hz > 0, trigger.rate_hz > 0，且换算出的周期可表示为 Duration
//! - hack_baseline 为有限值
//! - channel 发布方式的 queue_capacity > 0
//!
//! 没有任何相机匹配角色关键字时仅给出警告。

use std::collections::HashSet;

use contracts::{ContractError, PublisherKind, SimulationConfig, MAX_FRAME_BYTES, ROLE_KEYWORDS};

/// 校验 SimulationConfig 配置
///
/// 返回第一个遇到的错误，或非致命警告列表。
pub fn validate(config: &SimulationConfig) -> Result<Vec<String>, ContractError> {
    validate_cameras(config)?;
    validate_rig(config)?;
    validate_rates(config)?;
    validate_publisher(config)?;
    Ok(collect_warnings(config))
}

/// 校验相机列表
fn validate_cameras(config: &SimulationConfig) -> Result<(), ContractError> {
    if config.cameras.is_empty() {
        return Err(ContractError::config_validation(
            "cameras",
            "at least one camera is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, camera) in config.cameras.iter().enumerate() {
        if camera.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("cameras[{}].name", idx),
                "camera name cannot be empty",
            ));
        }
        if !seen.insert(camera.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("cameras[name={}]", camera.name),
                "duplicate camera name",
            ));
        }
        if camera.width == 0 || camera.height == 0 {
            return Err(ContractError::config_validation(
                format!("cameras[{}]", camera.name),
                format!(
                    "width and height must be > 0, got {}x{}",
                    camera.width, camera.height
                ),
            ));
        }
        if camera.geometry().frame_len().is_none() {
            return Err(ContractError::config_validation(
                format!("cameras[{}]", camera.name),
                format!(
                    "frame of {}x{} at {} bytes per pixel exceeds {} bytes",
                    camera.width,
                    camera.height,
                    camera.format.depth(),
                    MAX_FRAME_BYTES
                ),
            ));
        }
    }
    Ok(())
}

/// 校验 rig 参数
fn validate_rig(config: &SimulationConfig) -> Result<(), ContractError> {
    if let Some(baseline) = config.rig.hack_baseline {
        if !baseline.is_finite() {
            return Err(ContractError::config_validation(
                "rig.hack_baseline",
                format!("hack_baseline must be finite, got {}", baseline),
            ));
        }
    }
    Ok(())
}

/// 校验各类频率与步长
fn validate_rates(config: &SimulationConfig) -> Result<(), ContractError> {
    let checks = [
        ("simulation.step_sec", config.simulation.step_sec),
        ("simulation.render_rate_hz", config.simulation.render_rate_hz),
        ("trigger.rate_hz", config.trigger.rate_hz),
    ];
    for (field, value) in checks {
        // NaN fails this comparison too
        if !(value > 0.0 && value.is_finite()) {
            return Err(ContractError::config_validation(
                field,
                format!("must be > 0, got {}", value),
            ));
        }
    }

    // 正值也可能换算出无法表示或为零的周期
    let periods = [
        (
            "simulation.step_sec",
            config.simulation.step_sec,
            config.simulation.step_interval(),
        ),
        (
            "simulation.render_rate_hz",
            config.simulation.render_rate_hz,
            config.simulation.render_period(),
        ),
        (
            "trigger.rate_hz",
            config.trigger.rate_hz,
            config.trigger.period(),
        ),
    ];
    for (field, value, period) in periods {
        if period.is_none() {
            return Err(ContractError::config_validation(
                field,
                format!("period out of range for {}", value),
            ));
        }
    }
    Ok(())
}

/// 校验发布配置
fn validate_publisher(config: &SimulationConfig) -> Result<(), ContractError> {
    if config.publisher.kind == PublisherKind::Channel && config.publisher.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "publisher.queue_capacity",
            "queue_capacity must be > 0 for channel publishers",
        ));
    }
    Ok(())
}

fn collect_warnings(config: &SimulationConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    let any_role = config.cameras.iter().any(|camera| {
        ROLE_KEYWORDS
            .iter()
            .any(|(keyword, _)| camera.name.contains(keyword))
    });
    if !any_role {
        warnings.push(
            "no camera name contains a role keyword; all cameras publish without stereo roles"
                .to_string(),
        );
    }

    for camera in config.cameras.iter().filter(|c| !c.format.is_known()) {
        warnings.push(format!(
            "camera '{}' has unsupported format '{}', images will be tagged bgr8",
            camera.name, camera.format
        ));
    }

    warnings
}
