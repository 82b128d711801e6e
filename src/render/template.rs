//! Tera template for the scaffolding hand-over act.

use tera::{Context, Tera};

use super::RenderError;
use crate::order::models::OrderDocument;

/// The `.html` suffix turns on Tera's auto-escaping.
const TEMPLATE_NAME: &str = "order_act.html";
const TEMPLATE_SOURCE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/static/order_act.html"
));

/// Compiled order template, shared by all requests.
pub struct OrderTemplate {
    tera: Tera,
}

impl OrderTemplate {
    pub fn load() -> Result<Self, RenderError> {
        Self::from_source(TEMPLATE_SOURCE)
    }

    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self { tera })
    }

    pub fn render(&self, document: &OrderDocument) -> Result<String, RenderError> {
        let context = Context::from_serialize(document)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}
