use axum::{extract::State, response::Html};
use tera::{Context, Tera};
use log::error;

use crate::api::handlers::{ApiError, ApiState};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const OPTION_CALCULATOR_TEMPLATE: &str = "option_calculator.html";

/// Page templates are compiled into the binary; `.html` names keep tera's
/// autoescaping on.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (INDEX_TEMPLATE, include_str!("../../templates/index.html")),
        (OPTION_CALCULATOR_TEMPLATE, include_str!("../../templates/option_calculator.html")),
    ])?;
    Ok(tera)
}

fn render(tera: &Tera, name: &str, context: &Context) -> Result<Html<String>, ApiError> {
    tera.render(name, context)
        .map(Html)
        .map_err(|e| {
            error!("Failed to render {}: {:?}", name, e);
            ApiError::Render
        })
}

// GET / - Landing page
pub async fn home(State(state): State<ApiState>) -> Result<Html<String>, ApiError> {
    render(&state.templates, INDEX_TEMPLATE, &Context::new())
}

// GET /option-calculator - Calculator page with the known tickers
pub async fn option_calculator(State(state): State<ApiState>) -> Result<Html<String>, ApiError> {
    let mut context = Context::new();
    context.insert("tickers", &state.registry.sorted_symbols());
    render(&state.templates, OPTION_CALCULATOR_TEMPLATE, &context)
}
