//! Giao diện dashboard phân tích lâm sàng cho môi trường WebAssembly.

#[cfg(target_arch = "wasm32")]
mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::sync::Arc;

    use crate::styles;
    use chrono::NaiveDate;
    use clinic_core::{
        AxisDescriptor, DashboardConfig, DashboardController, DashboardEvent, DashboardOptions,
        DashboardState, Dataset, DepartmentRow, DepartmentTable, DepartmentViewModel,
        HeatmapViewModel, HourBucket, ScatterDescriptor, Weekday,
    };
    use serde_wasm_bindgen::from_value;
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, HtmlInputElement, HtmlSelectElement, Window};
    use yew::prelude::*;
    use yew::TargetCast;

    #[derive(Properties, Clone)]
    pub struct DashboardProps {
        pub dataset: Arc<Dataset>,
        #[prop_or_default]
        pub config: DashboardConfig,
    }

    impl PartialEq for DashboardProps {
        fn eq(&self, other: &Self) -> bool {
            Arc::ptr_eq(&self.dataset, &other.dataset) && self.config == other.config
        }
    }

    #[function_component(DashboardApp)]
    fn dashboard_app(props: &DashboardProps) -> Html {
        use_effect_with((), |_| {
            if let Some(window) = web_sys::window() {
                if let Some(document) = window.document() {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
            }
            || ()
        });

        let controller = {
            let dataset = props.dataset.clone();
            let config = props.config.clone();
            use_mut_ref(move || DashboardController::new(dataset, config))
        };
        let force_update = use_force_update();

        let dispatch = {
            let controller = controller.clone();
            Callback::from(move |event: DashboardEvent| {
                controller.borrow_mut().apply(event);
                force_update.force_update();
            })
        };

        let (state, heatmap, table) = {
            let controller = controller.borrow();
            let view = controller.view();
            (
                controller.state().clone(),
                view.heatmap.clone(),
                view.table.clone(),
            )
        };
        let options = props.dataset.options();

        html! {
            <div id="app-container" class="clinic-root">
                <aside id="left-column" class="control-column">
                    { render_description_card() }
                    { render_control_card(&options, &state, &dispatch) }
                </aside>
                <section id="right-column" class="chart-column">
                    <section id="patient_volume_card" class="dashboard-card">
                        <header class="card-header">
                            <b>{"Patient Volume"}</b>
                        </header>
                        { render_heatmap(&heatmap, &dispatch) }
                        <div id="reset-btn-outer">
                            <button
                                id="reset-btn"
                                type="button"
                                onclick={dispatch.reform(|_: MouseEvent| DashboardEvent::Reset)}
                            >
                                {"Show All"}
                            </button>
                        </div>
                    </section>
                    <section id="wait_time_card" class="dashboard-card">
                        <header class="card-header">
                            <b>{"Patient Wait Time and Satisfactory Scores"}</b>
                        </header>
                        { render_department_table(&table, &dispatch) }
                    </section>
                </section>
            </div>
        }
    }

    fn render_description_card() -> Html {
        html! {
            <section id="description-card" class="dashboard-card">
                <h5>{"Clinical Analytics"}</h5>
                <h3>{"Welcome to the Clinical Analytics Dashboard"}</h3>
                <p id="intro">
                    {"Explore clinic patient volume by time of day, waiting time, and care score. \
                      Click on the heatmap to visualize patient experience at different time points."}
                </p>
            </section>
        }
    }

    fn render_control_card(
        options: &DashboardOptions,
        state: &DashboardState,
        dispatch: &Callback<DashboardEvent>,
    ) -> Html {
        let criteria = &state.criteria;
        let start = criteria.start.date();
        let end = criteria.end.date();
        let min_date = options.min_date.map(|date| date.to_string());
        let max_date = options.max_date.map(|date| date.to_string());

        let on_clinic = dispatch.reform(|event: Event| {
            let select: HtmlSelectElement = event.target_unchecked_into();
            DashboardEvent::SelectClinic {
                clinic: select.value(),
            }
        });

        let on_start = {
            let dispatch = dispatch.clone();
            Callback::from(move |event: Event| {
                if let Some(start) = input_date(&event) {
                    dispatch.emit(DashboardEvent::SetDateRange { start, end });
                }
            })
        };

        let on_end = {
            let dispatch = dispatch.clone();
            Callback::from(move |event: Event| {
                if let Some(end) = input_date(&event) {
                    dispatch.emit(DashboardEvent::SetDateRange { start, end });
                }
            })
        };

        html! {
            <section id="control-card" class="dashboard-card">
                <p class="control-label">{"Select Clinic"}</p>
                <select id="clinic-select" onchange={on_clinic}>
                    {
                        for options.clinics.iter().map(|clinic| html! {
                            <option value={clinic.clone()} selected={*clinic == criteria.clinic}>
                                { clinic.clone() }
                            </option>
                        })
                    }
                </select>
                <p class="control-label">{"Select Check-In Time"}</p>
                <div id="date-picker-select" class="date-range">
                    <input
                        type="date"
                        value={start.to_string()}
                        min={min_date.clone()}
                        max={max_date.clone()}
                        onchange={on_start}
                        aria-label="Check-in start date"
                    />
                    <span class="date-separator">{"→"}</span>
                    <input
                        type="date"
                        value={end.to_string()}
                        min={min_date}
                        max={max_date}
                        onchange={on_end}
                        aria-label="Check-in end date"
                    />
                </div>
                <p class="control-label">{"Select Admit Source"}</p>
                <div id="admit-select" class="admit-options" role="group">
                    {
                        for options.admit_sources.iter().map(|source| {
                            render_admit_option(source, state, dispatch)
                        })
                    }
                </div>
            </section>
        }
    }

    fn render_admit_option(
        source: &str,
        state: &DashboardState,
        dispatch: &Callback<DashboardEvent>,
    ) -> Html {
        let selected = state.criteria.admit_sources.clone();
        let checked = selected.contains(source);
        let onchange = {
            let source = source.to_string();
            dispatch.reform(move |_: Event| {
                let mut next = selected.clone();
                if !next.remove(&source) {
                    next.insert(source.clone());
                }
                DashboardEvent::SetAdmitSources {
                    admit_sources: next.into_iter().collect(),
                }
            })
        };

        html! {
            <label class={classes!("admit-option", checked.then_some("is-active"))}>
                <input type="checkbox" checked={checked} onchange={onchange} />
                { source.to_string() }
            </label>
        }
    }

    fn input_date(event: &Event) -> Option<NaiveDate> {
        let input: HtmlInputElement = event.target_unchecked_into();
        NaiveDate::parse_from_str(&input.value(), "%Y-%m-%d").ok()
    }

    fn render_heatmap(heatmap: &HeatmapViewModel, dispatch: &Callback<DashboardEvent>) -> Html {
        html! {
            <table id="patient_volume_hm" class="heatmap">
                <thead>
                    <tr>
                        <th></th>
                        { for heatmap.x_labels.iter().map(|label| html! { <th>{ label.clone() }</th> }) }
                    </tr>
                </thead>
                <tbody>
                    {
                        for Weekday::ALL.into_iter().map(|weekday| html! {
                            <tr>
                                <th class="heatmap-day">{ weekday.label() }</th>
                                {
                                    for HourBucket::all().map(|hour| {
                                        render_heatmap_cell(heatmap, weekday, hour, dispatch)
                                    })
                                }
                            </tr>
                        })
                    }
                </tbody>
            </table>
        }
    }

    fn render_heatmap_cell(
        heatmap: &HeatmapViewModel,
        weekday: Weekday,
        hour: HourBucket,
        dispatch: &Callback<DashboardEvent>,
    ) -> Html {
        let Some(annotation) = heatmap.annotation(weekday, hour) else {
            return Html::default();
        };
        let style = format!(
            "background-color: {}",
            heatmap.cell_color(weekday, hour)
        );
        let onclick =
            dispatch.reform(move |_: MouseEvent| DashboardEvent::ClickHeatmapCell { weekday, hour });

        html! {
            <td
                class={classes!("heatmap-cell", annotation.emphasized.then_some("is-selected"))}
                style={style}
                title={annotation.hover.clone()}
                onclick={onclick}
            >
                { annotation.text.clone() }
            </td>
        }
    }

    fn render_department_table(
        table: &DepartmentTable,
        dispatch: &Callback<DashboardEvent>,
    ) -> Html {
        html! {
            <div id="wait_time_table" class="department-table">
                <div id="header" class="table-row table-header">
                    <div class="row-department"><b>{ table.header.department.clone() }</b></div>
                    <div class="row-chart"><b>{ table.header.wait_time.clone() }</b></div>
                    <div class="row-chart"><b>{ table.header.care_score.clone() }</b></div>
                </div>
                { for table.rows.iter().map(|row| render_department_row(row, dispatch)) }
            </div>
        }
    }

    fn render_department_row(
        row: &DepartmentViewModel,
        dispatch: &Callback<DashboardEvent>,
    ) -> Html {
        match &row.row {
            DepartmentRow::Populated {
                wait_time,
                care_score,
            } => html! {
                <div class="table-row" data-department={row.department.clone()}>
                    <div class="row-department"><b>{ row.department.clone() }</b></div>
                    <div class="row-chart">{ render_scatter(wait_time, &row.department, dispatch) }</div>
                    <div class="row-chart">{ render_scatter(care_score, &row.department, dispatch) }</div>
                </div>
            },
            DepartmentRow::AxisReference {
                wait_time,
                care_score,
            } => html! {
                <div class="table-row axis-row" data-department={row.department.clone()}>
                    <div class="row-department"><b class="axis-label">{"graph_ax"}</b></div>
                    <div class="row-chart">{ render_axis(wait_time) }</div>
                    <div class="row-chart">{ render_axis(care_score) }</div>
                </div>
            },
            DepartmentRow::Hidden => html! {
                <div class="table-row is-hidden" data-department={row.department.clone()} />
            },
        }
    }

    fn render_scatter(
        scatter: &ScatterDescriptor,
        department: &str,
        dispatch: &Callback<DashboardEvent>,
    ) -> Html {
        let range = scatter.axis.range;

        html! {
            <svg class="scatter" viewBox="0 0 100 20" preserveAspectRatio="none">
                {
                    for scatter.points.iter().enumerate().map(|(index, point)| {
                        let cx = range.map(|range| range.normalize(point.x)).unwrap_or(0.5) * 100.0;
                        let department = department.to_string();
                        let onclick = dispatch.reform(move |_: MouseEvent| {
                            DashboardEvent::ClickScatterPoint {
                                department: department.clone(),
                                point_index: index,
                            }
                        });

                        html! {
                            <circle
                                class="scatter-point"
                                cx={format!("{cx:.2}")}
                                cy="10"
                                r="3"
                                fill={point.style.color()}
                                fill-opacity={point.style.opacity().to_string()}
                                stroke="#ffffff"
                                onclick={onclick}
                            >
                                <title>{ point.tooltip.clone() }</title>
                            </circle>
                        }
                    })
                }
            </svg>
        }
    }

    fn render_axis(axis: &AxisDescriptor) -> Html {
        let Some(range) = axis.range else {
            return html! { <svg class="scatter axis" viewBox="0 0 100 20" /> };
        };

        html! {
            <svg class="scatter axis" viewBox="0 0 100 20" preserveAspectRatio="none">
                <line x1="0" y1="2" x2="100" y2="2" class="axis-line" />
                {
                    for axis.ticks().into_iter().map(|tick| {
                        let x = format!("{:.2}", range.normalize(tick) * 100.0);
                        html! {
                            <g class="axis-tick">
                                <line x1={x.clone()} y1="2" x2={x.clone()} y2="5" class="axis-line" />
                                <text x={x} y="15" text-anchor="middle">{ format_tick(tick) }</text>
                            </g>
                        }
                    })
                }
            </svg>
        }
    }

    fn format_tick(tick: f64) -> String {
        if tick.fract() == 0.0 {
            format!("{tick:.0}")
        } else {
            format!("{tick}")
        }
    }

    #[wasm_bindgen]
    pub fn mount_dashboard(
        selector: &str,
        csv_text: &str,
        config: Option<JsValue>,
    ) -> Result<(), JsValue> {
        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        let config: DashboardConfig = match config {
            Some(value) if !value.is_undefined() && !value.is_null() => from_value(value)?,
            _ => DashboardConfig::default(),
        };
        config
            .validate()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let dataset = clinic_data::load_str(csv_text, &config)
            .map_err(|err| JsValue::from_str(&format!("Không đọc được dữ liệu: {err}")))?;

        yew::Renderer::<DashboardApp>::with_root_and_props(
            target,
            DashboardProps {
                dataset: Arc::new(dataset),
                config,
            },
        )
        .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_dashboard;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_dashboard(
    _: &str,
    _: &str,
    _: Option<wasm_bindgen::JsValue>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "clinic-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
