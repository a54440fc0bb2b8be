#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-clinic-ui]";

/// CSS mặc định của dashboard; màu sắc khai báo qua biến để dễ ghi đè.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --clinic-font-family: 'Open Sans', system-ui, -apple-system, 'Segoe UI', sans-serif;
  --clinic-bg: #f5f7fa;
  --clinic-card-bg: #ffffff;
  --clinic-card-border: rgba(148, 163, 184, 0.28);
  --clinic-radius: 8px;
  --clinic-text: #2a3f5f;
  --clinic-muted: #52606d;
  --clinic-accent: #2c82ff;
  --clinic-accent-soft: #caf3ff;
  --clinic-highlight: #ff6347;
}

.clinic-root {
  display: flex;
  gap: 24px;
  padding: 24px;
  font-family: var(--clinic-font-family);
  color: var(--clinic-text);
  background: var(--clinic-bg);
  box-sizing: border-box;
}

.clinic-root *,
.clinic-root *::before,
.clinic-root *::after {
  box-sizing: inherit;
}

.control-column {
  flex: 0 0 320px;
  display: flex;
  flex-direction: column;
  gap: 16px;
}

.chart-column {
  flex: 1 1 auto;
  min-width: 0;
  display: flex;
  flex-direction: column;
  gap: 16px;
}

.dashboard-card {
  background: var(--clinic-card-bg);
  border: 1px solid var(--clinic-card-border);
  border-radius: var(--clinic-radius);
  padding: 16px 20px;
}

.card-header {
  padding-bottom: 8px;
  margin-bottom: 12px;
  border-bottom: 1px solid var(--clinic-card-border);
}

#description-card h5 {
  margin: 0;
  color: var(--clinic-accent);
  text-transform: uppercase;
  letter-spacing: 0.06em;
}

#description-card h3 {
  margin: 8px 0 12px;
}

#intro {
  color: var(--clinic-muted);
  line-height: 1.5;
}

.control-label {
  margin: 16px 0 6px;
  font-weight: 600;
}

#clinic-select,
.date-range input {
  width: 100%;
  padding: 6px 8px;
  border: 1px solid var(--clinic-card-border);
  border-radius: 4px;
  font: inherit;
}

.date-range {
  display: flex;
  align-items: center;
  gap: 8px;
}

.date-separator {
  color: var(--clinic-muted);
}

.admit-options {
  display: flex;
  flex-wrap: wrap;
  gap: 6px;
}

.admit-option {
  display: inline-flex;
  align-items: center;
  gap: 4px;
  padding: 4px 8px;
  border-radius: 999px;
  background: var(--clinic-bg);
  cursor: pointer;
}

.admit-option.is-active {
  background: var(--clinic-accent-soft);
}

.heatmap {
  width: 100%;
  border-collapse: collapse;
  table-layout: fixed;
  font-size: 11px;
}

.heatmap th {
  font-weight: 400;
  color: var(--clinic-muted);
  white-space: nowrap;
}

.heatmap-day {
  text-align: right;
  padding-right: 6px;
  width: 80px;
}

.heatmap-cell {
  height: 28px;
  text-align: center;
  border: 1px solid #ffffff;
  cursor: pointer;
}

.heatmap-cell.is-selected {
  outline: 2px solid var(--clinic-highlight);
  outline-offset: -2px;
}

#reset-btn-outer {
  display: flex;
  justify-content: flex-end;
  margin-top: 12px;
}

#reset-btn {
  padding: 6px 14px;
  border: 1px solid var(--clinic-accent);
  border-radius: 4px;
  background: transparent;
  color: var(--clinic-accent);
  cursor: pointer;
}

.department-table {
  display: flex;
  flex-direction: column;
}

.table-row {
  display: grid;
  grid-template-columns: 160px 1fr 1fr;
  align-items: center;
  gap: 12px;
  min-height: 32px;
  border-bottom: 1px solid var(--clinic-card-border);
}

.table-row.is-hidden {
  display: none;
}

.axis-row .axis-label {
  visibility: hidden;
}

.scatter {
  width: 100%;
  height: 28px;
  overflow: visible;
}

.scatter-point {
  cursor: pointer;
}

.axis-line {
  stroke: var(--clinic-muted);
  stroke-width: 0.4;
}

.axis-tick text {
  font-size: 5px;
  fill: var(--clinic-muted);
}
"#;

/// Chèn thẻ `<style>` mặc định vào `<head>` nếu chưa có.
pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-clinic-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.dyn_into::<Node>()?)?;

    Ok(())
}
