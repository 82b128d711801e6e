use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use thiserror::Error;

use super::builder::{self, BuildError};
use super::models::{GeneratePdfQuery, GeneratePdfRequest, OrderDocument, OrderId, PartyLookup};
use crate::db::{AppState, StoreError, StoreSession};
use crate::render::{PageConfig, RenderError};
use crate::ErrorResponse;

#[derive(Debug, Error)]
pub enum GeneratePdfError {
    #[error("Order ID is required")]
    MissingOrderId,
    #[error("Invalid order ID: {0}")]
    InvalidOrderId(String),
    #[error("No order data found for ID: {0}")]
    NotFound(OrderId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<GeneratePdfError> for HttpResponse {
    fn from(error: GeneratePdfError) -> Self {
        match error {
            GeneratePdfError::MissingOrderId | GeneratePdfError::InvalidOrderId(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::new(&error.to_string()))
            }
            GeneratePdfError::NotFound(_) => {
                HttpResponse::NotFound().json(ErrorResponse::new(&error.to_string()))
            }
            _ => HttpResponse::InternalServerError().json(ErrorResponse::new(&format!(
                "Error generating PDF: {}",
                error
            ))),
        }
    }
}

/// Order id from a JSON body value (number or string).
pub fn order_id_from_json(value: Option<&Value>) -> Result<OrderId, GeneratePdfError> {
    match value {
        None | Some(Value::Null) => Err(GeneratePdfError::MissingOrderId),
        Some(Value::String(raw)) => order_id_from_str(Some(raw)),
        Some(Value::Number(number)) => number
            .as_i64()
            .map(OrderId)
            .ok_or_else(|| GeneratePdfError::InvalidOrderId(number.to_string())),
        Some(other) => Err(GeneratePdfError::InvalidOrderId(other.to_string())),
    }
}

/// Order id from a query or path parameter.
pub fn order_id_from_str(raw: Option<&str>) -> Result<OrderId, GeneratePdfError> {
    let raw = raw
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(GeneratePdfError::MissingOrderId)?;
    OrderId::parse(raw).ok_or_else(|| GeneratePdfError::InvalidOrderId(raw.to_string()))
}

/// Look up a party without ever failing the request.
async fn lookup_party(
    session: &mut dyn StoreSession,
    user_id: Option<i64>,
    role: &str,
) -> PartyLookup {
    let Some(user_id) = user_id else {
        return PartyLookup::Absent;
    };

    match session.party(user_id).await {
        Ok(Some(party)) => PartyLookup::Found(party),
        Ok(None) => {
            log::warn!("No {} record for user {}", role, user_id);
            PartyLookup::Absent
        }
        Err(e) => {
            log::warn!("Could not fetch {} {}: {}", role, user_id, e);
            PartyLookup::Failed
        }
    }
}

/// Read everything the document needs through one session.
pub async fn load_document(
    session: &mut dyn StoreSession,
    order_id: OrderId,
    issued_on: NaiveDate,
) -> Result<OrderDocument, GeneratePdfError> {
    let items = session.line_items(order_id).await?;
    let Some(first) = items.first() else {
        return Err(GeneratePdfError::NotFound(order_id));
    };

    let meta = match session.order_meta(order_id).await {
        Ok(meta) => meta,
        Err(e) => {
            log::warn!("Could not fetch metadata for order {}: {}", order_id, e);
            None
        }
    };

    let customer = lookup_party(session, first.customer_id, "customer").await;
    let vendor = lookup_party(session, first.vendor_id, "vendor").await;

    let document = builder::build(
        &items,
        meta.as_ref(),
        vendor.party(),
        customer.party(),
        issued_on,
    )?;
    Ok(document)
}

/// Produce the PDF for one order.
///
/// The store session lives only inside the loading block, so it is released
/// exactly once on every path before rendering starts.
pub async fn generate_order_pdf(
    state: &AppState,
    order_id: OrderId,
) -> Result<Vec<u8>, GeneratePdfError> {
    let document = {
        let mut session = state.store.open().await?;
        load_document(session.as_mut(), order_id, Local::now().date_naive()).await?
    };

    log::debug!(
        "Order {} assembled with {} line items",
        order_id,
        document.items.len()
    );

    let html = state.template.render(&document)?;
    let pdf = state
        .pdf_engine
        .html_to_pdf(&html, &PageConfig::default())
        .await?;
    Ok(pdf)
}

fn pdf_response(order_id: OrderId, pdf: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=order_{}.pdf", order_id),
        ))
        .body(pdf)
}

async fn respond(
    state: &AppState,
    order_id: Result<OrderId, GeneratePdfError>,
) -> HttpResponse {
    let order_id = match order_id {
        Ok(id) => id,
        Err(e) => {
            log::info!("Rejected PDF request: {}", e);
            return e.into();
        }
    };

    log::info!("Generating PDF for order {}", order_id);

    match generate_order_pdf(state, order_id).await {
        Ok(pdf) => {
            log::info!("PDF for order {} ready ({} bytes)", order_id, pdf.len());
            pdf_response(order_id, pdf)
        }
        Err(e @ GeneratePdfError::NotFound(_)) => {
            log::info!("{}", e);
            e.into()
        }
        Err(e) => {
            log::error!("Error generating PDF for order {}: {}", order_id, e);
            e.into()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/generate-pdf",
    tag = "Order PDF",
    request_body = GeneratePdfRequest,
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Missing or invalid order ID", body = ErrorResponse),
        (status = 404, description = "No line items for the order", body = ErrorResponse),
        (status = 500, description = "Lookup or rendering failed", body = ErrorResponse)
    )
)]
pub async fn generate_pdf_post(
    state: web::Data<AppState>,
    body: Option<web::Json<GeneratePdfRequest>>,
) -> HttpResponse {
    let order_id = match body {
        Some(body) => order_id_from_json(body.order_id.as_ref()),
        None => Err(GeneratePdfError::MissingOrderId),
    };
    respond(&state, order_id).await
}

#[utoipa::path(
    get,
    path = "/api/generate-pdf",
    tag = "Order PDF",
    params(
        ("orderId" = Option<String>, Query, description = "Order ID")
    ),
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Missing or invalid order ID", body = ErrorResponse),
        (status = 404, description = "No line items for the order", body = ErrorResponse),
        (status = 500, description = "Lookup or rendering failed", body = ErrorResponse)
    )
)]
pub async fn generate_pdf_query(
    state: web::Data<AppState>,
    query: web::Query<GeneratePdfQuery>,
) -> HttpResponse {
    respond(&state, order_id_from_str(query.order_id.as_deref())).await
}

#[utoipa::path(
    get,
    path = "/api/generate-pdf/{orderId}",
    tag = "Order PDF",
    params(
        ("orderId" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid order ID", body = ErrorResponse),
        (status = 404, description = "No line items for the order", body = ErrorResponse),
        (status = 500, description = "Lookup or rendering failed", body = ErrorResponse)
    )
)]
pub async fn generate_pdf_path(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let raw = path.into_inner();
    respond(&state, order_id_from_str(Some(&raw))).await
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorResponse::new("Method not allowed"))
}

/// Query strings that do not deserialize get the same JSON body as any other
/// rejected id.
fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let rejected = GeneratePdfError::InvalidOrderId(req.query_string().to_string());
    log::info!("Rejected PDF request: {}", rejected);
    InternalError::from_response(err, rejected.into()).into()
}

/// Register the PDF routes. Mounted under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["/generate-pdf", "/generate-pdf/"])
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .route(web::post().to(generate_pdf_post))
            .route(web::get().to(generate_pdf_query))
            .default_service(web::route().to(method_not_allowed)),
    )
    .service(
        web::resource("/generate-pdf/{order_id}")
            .route(web::get().to(generate_pdf_path))
            .default_service(web::route().to(method_not_allowed)),
    );
}
