//! Turns raw order rows into the render-ready [`OrderDocument`].

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use super::models::{LineItem, LineItemRow, OrderDocument, OrderMeta, Party};

pub const PLACEHOLDER_NAME: &str = "N/A";

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("order has no line items")]
    NoLineItems,
    #[error("amount overflow on line {0}")]
    Overflow(usize),
}

/// Assemble the document for one order.
///
/// `items` must be non-empty and in store order. Each row total is rounded to
/// two places and the grand total is the sum of those rounded totals.
pub fn build(
    items: &[LineItem],
    meta: Option<&OrderMeta>,
    vendor: Option<&Party>,
    customer: Option<&Party>,
    issued_on: NaiveDate,
) -> Result<OrderDocument, BuildError> {
    let first = items.first().ok_or(BuildError::NoLineItems)?;
    let order_id = first.order_id.to_string();

    let mut rows = Vec::with_capacity(items.len());
    let mut grand_total = Decimal::ZERO;

    for (index, item) in items.iter().enumerate() {
        let number = index + 1;
        let line_total = item
            .price
            .checked_mul(item.product_qty)
            .map(round_money)
            .ok_or(BuildError::Overflow(number))?;
        grand_total = grand_total
            .checked_add(line_total)
            .ok_or(BuildError::Overflow(number))?;

        rows.push(LineItemRow {
            number,
            product_id: item.product_id.to_string(),
            product_qty: item.product_qty.normalize().to_string(),
            price: format_money(item.price),
            total: format_money(line_total),
        });
    }

    let contract_number = meta
        .and_then(|m| m.contract_number.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .unwrap_or_else(|| order_id.clone());

    Ok(OrderDocument {
        order_id,
        contract_number,
        date: format_issue_date(issued_on),
        vendor_name: display_name(vendor),
        customer_name: display_name(customer),
        items: rows,
        total_amount: format_money(grand_total),
    })
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with exactly two fractional digits.
pub fn format_money(value: Decimal) -> String {
    let mut rounded = round_money(value);
    rounded.rescale(2);
    rounded.to_string()
}

/// `DD.MM.YYYY`, as printed on the act.
pub fn format_issue_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn display_name(party: Option<&Party>) -> String {
    party
        .and_then(|p| p.display_name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string())
}
