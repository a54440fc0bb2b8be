//! Bridge WASM <-> JavaScript trung lập framework cho dashboard phân tích lâm sàng.

use std::sync::Arc;

use clinic_core::{DashboardConfig, DashboardController, DashboardEvent, DashboardState};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsDashboardConfig {
    #[serde(default)]
    default_window_days: Option<u32>,
    #[serde(default)]
    wait_time_padding: Option<f64>,
    #[serde(default)]
    care_score_padding: Option<f64>,
    #[serde(default)]
    wait_time_tick_step: Option<f64>,
    #[serde(default)]
    care_score_tick_step: Option<f64>,
    #[serde(default)]
    missing_admit_source: Option<String>,
}

impl From<JsDashboardConfig> for DashboardConfig {
    fn from(cfg: JsDashboardConfig) -> Self {
        let mut base = DashboardConfig::default();
        if let Some(days) = cfg.default_window_days {
            base.default_window_days = days;
        }
        if let Some(padding) = cfg.wait_time_padding {
            base.wait_time_padding = padding;
        }
        if let Some(padding) = cfg.care_score_padding {
            base.care_score_padding = padding;
        }
        if let Some(step) = cfg.wait_time_tick_step {
            base.wait_time_tick_step = step;
        }
        if let Some(step) = cfg.care_score_tick_step {
            base.care_score_tick_step = step;
        }
        if let Some(label) = cfg.missing_admit_source {
            base.missing_admit_source = label;
        }
        base
    }
}

/// Phiên dashboard: giữ bộ dữ liệu đã nạp cùng trạng thái lọc và vùng chọn.
#[wasm_bindgen]
pub struct DashboardSession {
    controller: DashboardController,
}

#[wasm_bindgen]
impl DashboardSession {
    /// Tạo phiên từ nội dung CSV chưa nén.
    #[wasm_bindgen(constructor)]
    pub fn new(csv_text: &str, config: Option<JsValue>) -> Result<DashboardSession, JsValue> {
        init_panic_hook();
        let config = parse_config(config)?;
        let dataset = clinic_data::load_str(csv_text, &config)
            .map_err(|err| JsValue::from_str(&format!("Không đọc được dữ liệu: {err}")))?;
        Ok(Self::with_dataset(dataset, config))
    }

    /// Tạo phiên từ byte của file `.csv` hoặc `.csv.gz`.
    #[wasm_bindgen(js_name = fromBytes)]
    pub fn from_bytes(bytes: &[u8], config: Option<JsValue>) -> Result<DashboardSession, JsValue> {
        init_panic_hook();
        let config = parse_config(config)?;
        let dataset = clinic_data::load_bytes(bytes, &config)
            .map_err(|err| JsValue::from_str(&format!("Không đọc được dữ liệu: {err}")))?;
        Ok(Self::with_dataset(dataset, config))
    }

    /// Danh sách lựa chọn cho các ô chọn trên giao diện.
    pub fn options(&self) -> Result<JsValue, JsValue> {
        serialize(&self.controller.dataset().options(), "options")
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        serialize(self.controller.state(), "state")
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        serialize(self.controller.view(), "view")
    }

    /// Áp một sự kiện (`{ type: "click_heatmap_cell", weekday, hour }`...) và trả về view mới.
    pub fn apply(&mut self, event: JsValue) -> Result<JsValue, JsValue> {
        let event: DashboardEvent = from_value(event)
            .map_err(|err| JsValue::from_str(&format!("Sự kiện không hợp lệ: {err}")))?;
        self.controller.apply(event);
        self.view()
    }

    /// Khôi phục trạng thái đã lưu phía JavaScript.
    #[wasm_bindgen(js_name = restoreState)]
    pub fn restore_state(&mut self, state: JsValue) -> Result<JsValue, JsValue> {
        let state: DashboardState = from_value(state)
            .map_err(|err| JsValue::from_str(&format!("Trạng thái không hợp lệ: {err}")))?;
        self.controller = DashboardController::with_state(
            Arc::clone(self.controller.dataset()),
            self.controller.config().clone(),
            state,
        );
        self.view()
    }
}

impl DashboardSession {
    fn with_dataset(dataset: clinic_core::Dataset, config: DashboardConfig) -> Self {
        Self {
            controller: DashboardController::new(Arc::new(dataset), config),
        }
    }

    pub fn controller(&self) -> &DashboardController {
        &self.controller
    }
}

/// Đọc cấu hình từ chuỗi JSON, dùng khi phía JavaScript lưu cấu hình dạng văn bản.
#[wasm_bindgen(js_name = validateConfig)]
pub fn validate_config(config_json: &str) -> Result<JsValue, JsValue> {
    let cfg: JsDashboardConfig = serde_json::from_str(config_json)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
    let config = DashboardConfig::from(cfg);
    config
        .validate()
        .map_err(|err| JsValue::from_str(&format_dashboard_error(err)))?;
    serialize(&config, "config")
}

fn parse_config(config: Option<JsValue>) -> Result<DashboardConfig, JsValue> {
    let cfg = match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsDashboardConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            DashboardConfig::from(cfg)
        }
        _ => DashboardConfig::default(),
    };
    cfg.validate()
        .map_err(|err| JsValue::from_str(&format_dashboard_error(err)))?;
    Ok(cfg)
}

fn serialize<T: serde::Serialize>(value: &T, what: &str) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|err| JsValue::from_str(&format!("Không serialize {what}: {err}")))
}

fn format_dashboard_error(err: clinic_core::DashboardError) -> String {
    format!("Dashboard error: {err}")
}

fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}
