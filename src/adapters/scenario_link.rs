//! 情境分享連結：JSON → base64 → 百分比編碼，放在 URL 片段 `#s=` 之後。
//!
//! 載入時以目前的設定與目錄預設值為底，覆蓋連結中存在的欄位。

use crate::domain::catalog;
use crate::domain::model::{CoefficientSet, ScenarioConfiguration};
use crate::domain::scenario::Scenario;
use crate::utils::error::{Result, RoiError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use url::{form_urlencoded, Url};

pub const FRAGMENT_KEY: &str = "s";

/// 舊版分享連結的全域欄位名稱 → 目前名稱
const LEGACY_INPUT_KEYS: &[(&str, &str)] = &[
    ("dvCount", "daVinciCount"),
    ("dvCapacity", "daVinciCapacity"),
];

/// 舊版分享連結的模組係數名稱 → 目前名稱
const LEGACY_VALUE_KEYS: &[(&str, &str)] = &[
    ("lcsMonthlyOverride", "examVolumeOverride"),
    ("annualMrOverride", "examVolumeOverride"),
    ("ctsPerYear", "examVolumeOverride"),
    ("actionablePct", "detectionPct"),
    ("captureThynk", "captureWithPlatformPct"),
    ("captureBaseline", "captureBaselinePct"),
    ("conversionToProcedure", "conversionPct"),
    ("ionShareOfProcedures", "ionSharePct"),
    ("roboticShareOfProcedures", "daVinciSharePct"),
];

#[derive(Debug, Serialize)]
struct SavedModule {
    id: String,
    enabled: bool,
    values: CoefficientSet,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    inputs: &'a ScenarioConfiguration,
    modules: Vec<SavedModule>,
}

pub fn encode(scenario: &Scenario) -> Result<String> {
    let payload = Payload {
        inputs: &scenario.config,
        modules: scenario
            .modules
            .iter()
            .map(|m| SavedModule {
                id: m.id().to_string(),
                enabled: m.enabled,
                values: m.coefficients,
            })
            .collect(),
    };

    let json = serde_json::to_vec(&payload)?;
    let encoded = STANDARD.encode(json);
    Ok(form_urlencoded::byte_serialize(encoded.as_bytes()).collect())
}

/// 將 `patch` 中的欄位淺層覆蓋到 `base`
fn overlay(base: &mut Value, patch: Value) {
    if let (Value::Object(target), Value::Object(fields)) = (base, patch) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
}

/// 把舊版欄位改成目前名稱；兩者並存時以目前名稱為準
fn rename_legacy_keys(patch: &mut Value, renames: &[(&str, &str)]) {
    let Value::Object(fields) = patch else {
        return;
    };
    for (legacy, current) in renames {
        if let Some(value) = fields.remove(*legacy) {
            fields.entry(current.to_string()).or_insert(value);
        }
    }
}

/// 舊版的 CT 佔比是 0..1 的比例，轉成百分比
fn convert_legacy_share(patch: &mut Value) {
    let Value::Object(fields) = patch else {
        return;
    };
    if let Some(share) = fields.remove("shareOfCts").as_ref().and_then(Value::as_f64) {
        if let Some(pct) = serde_json::Number::from_f64(share * 100.0) {
            fields
                .entry("examSharePct".to_string())
                .or_insert(Value::Number(pct));
        }
    }
}

fn decode_error(reason: impl Into<String>) -> RoiError {
    RoiError::ScenarioDecodeError {
        reason: reason.into(),
    }
}

fn percent_decode(token: &str) -> String {
    form_urlencoded::parse(format!("{}={}", FRAGMENT_KEY, token.trim()).as_bytes())
        .find(|(key, _)| key == FRAGMENT_KEY)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// 解碼情境字串並套用到 `current` 上，回傳新的情境
pub fn decode(token: &str, current: &Scenario) -> Result<Scenario> {
    let base64_text = percent_decode(token);
    if base64_text.is_empty() {
        return Err(decode_error("scenario string is empty"));
    }

    let bytes = STANDARD
        .decode(base64_text.as_bytes())
        .map_err(|e| decode_error(format!("invalid base64: {}", e)))?;
    let payload: Value = serde_json::from_slice(&bytes)
        .map_err(|e| decode_error(format!("invalid JSON: {}", e)))?;
    let Value::Object(mut payload) = payload else {
        return Err(decode_error("payload is not a JSON object"));
    };

    let mut next = current.clone();

    if let Some(mut inputs) = payload.remove("inputs") {
        rename_legacy_keys(&mut inputs, LEGACY_INPUT_KEYS);
        let mut merged = serde_json::to_value(&current.config)?;
        overlay(&mut merged, inputs);
        next.config = serde_json::from_value::<ScenarioConfiguration>(merged)
            .map_err(|e| decode_error(format!("invalid inputs: {}", e)))?
            .sanitized();
    }

    if let Some(modules) = payload.remove("modules") {
        let Value::Array(modules) = modules else {
            return Err(decode_error("modules is not a list"));
        };

        for saved in modules {
            let Some(id) = saved.get("id").and_then(Value::as_str).map(str::to_string) else {
                continue;
            };
            let Some(definition) = catalog::find(&id) else {
                tracing::debug!("Ignoring unknown module '{}' in scenario", id);
                continue;
            };
            let Some(state) = next.modules.iter_mut().find(|m| m.id() == definition.id) else {
                continue;
            };

            if let Some(enabled) = saved.get("enabled").and_then(Value::as_bool) {
                state.enabled = enabled;
            }

            let mut values = serde_json::to_value(definition.defaults)?;
            if let Some(saved_values) = saved.get("values") {
                let mut saved_values = saved_values.clone();
                rename_legacy_keys(&mut saved_values, LEGACY_VALUE_KEYS);
                convert_legacy_share(&mut saved_values);
                overlay(&mut values, saved_values);
            }
            state.coefficients = serde_json::from_value::<CoefficientSet>(values)
                .map_err(|e| decode_error(format!("invalid values for '{}': {}", id, e)))?
                .sanitized();
        }
    }

    Ok(next)
}

/// 解碼失敗時保留目前情境並回傳警告，不會中斷
pub fn load_or_keep(token: &str, current: &Scenario) -> (Scenario, Option<RoiError>) {
    match decode(token, current) {
        Ok(scenario) => (scenario, None),
        Err(e) => {
            tracing::warn!("⚠️ Failed to load scenario: {}", e);
            (current.clone(), Some(e))
        }
    }
}

/// 將情境寫入 URL 片段 `#s=...`
pub fn to_url(base: &str, scenario: &Scenario) -> Result<String> {
    let mut url = Url::parse(base).map_err(|e| RoiError::InvalidConfigValueError {
        field: "save_url".to_string(),
        value: base.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;
    let token = encode(scenario)?;
    url.set_fragment(Some(&format!("{}={}", FRAGMENT_KEY, token)));
    Ok(url.to_string())
}

/// 從 URL 片段取出情境字串；沒有 `#s=` 時回傳 `None`
pub fn token_from_url(location: &str) -> Option<String> {
    let (_, fragment) = location.split_once('#')?;
    fragment
        .split('&')
        .find_map(|part| part.strip_prefix(&format!("{}=", FRAGMENT_KEY)))
        .map(str::to_string)
}

/// 從分享連結載入；連結沒有情境時原樣保留，不視為錯誤
pub fn load_from_url(location: &str, current: &Scenario) -> (Scenario, Option<RoiError>) {
    match token_from_url(location) {
        Some(token) => load_or_keep(&token, current),
        None => (current.clone(), None),
    }
}
