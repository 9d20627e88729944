use crate::utils::error::{RoiError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RoiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RoiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RoiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 將數值夾在 `[min, max]` 之間；NaN 視為 0。
///
/// 即時編輯時的越界輸入不視為錯誤，只在 debug 等級記錄調整。
pub fn clamp_range(field_name: &str, value: f64, min: f64, max: f64) -> f64 {
    let clamped = if value.is_nan() {
        0.0_f64.clamp(min, max)
    } else {
        value.clamp(min, max)
    };

    if clamped != value {
        tracing::debug!(
            "Clamped '{}' from {} to {} (allowed {}..={})",
            field_name,
            value,
            clamped,
            min,
            max
        );
    }
    clamped
}

pub fn clamp_pct(field_name: &str, value: f64) -> f64 {
    clamp_range(field_name, value, 0.0, 100.0)
}

pub fn clamp_non_negative(field_name: &str, value: f64) -> f64 {
    clamp_range(field_name, value, 0.0, f64::INFINITY)
}

/// 計數欄位：非負並四捨五入為整數
pub fn clamp_count(field_name: &str, value: f64) -> u32 {
    let clamped = clamp_range(field_name, value, 0.0, u32::MAX as f64);
    clamped.round() as u32
}
