//! Tables for menus, carts and orders.

use std::io;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{CartTotals, LineItem},
    foods::Food,
    orders::{Order, Progress},
};

const BAR_WIDTH: usize = 10;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output could not be written.
    #[error("failed to write output")]
    Io(#[from] io::Error),
}

/// Write the menu as a table.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_menu(
    mut out: impl io::Write,
    foods: &[Food],
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Category", "Price", "Rating"]);

    for food in foods {
        builder.push_record([
            food.id.to_string(),
            food.name.clone(),
            food.category.clone(),
            food.price.to_money(currency).to_string(),
            food.rating
                .map_or_else(String::new, |rating| rating.value().to_string()),
        ]);
    }

    write_table(&mut out, builder, 3..5)
}

/// Write line items with a totals summary.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_lines(
    mut out: impl io::Write,
    lines: &[LineItem],
    totals: CartTotals,
) -> Result<(), RenderError> {
    let currency = totals.currency();
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Unit Price", "Total"]);

    for line in lines {
        builder.push_record([
            line.name().to_string(),
            line.quantity().to_string(),
            line.unit_price().to_money(currency).to_string(),
            line.line_total().to_money(currency).to_string(),
        ]);
    }

    write_table(&mut out, builder, 1..4)?;

    writeln!(
        out,
        "Items: {}  Total: {}",
        totals.count(),
        totals.amount_money()
    )?;

    Ok(())
}

/// Write one row per order with its progress.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_orders<'a>(
    mut out: impl io::Write,
    orders: impl IntoIterator<Item = &'a Order>,
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["Order", "Placed", "Items", "Total", "Status", "Progress"]);

    for order in orders {
        builder.push_record([
            order.id().to_string(),
            order.created_at().strftime("%Y-%m-%d %H:%M").to_string(),
            order.totals().count().to_string(),
            order.totals().amount_money().to_string(),
            order.status().to_string(),
            progress_bar(order.status().progress()),
        ]);
    }

    write_table(&mut out, builder, 2..4)
}

/// Write a single order: its lines, status and delivery address.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn write_order(mut out: impl io::Write, order: &Order) -> Result<(), RenderError> {
    writeln!(out, "Order {}", order.id())?;
    writeln!(
        out,
        "Status: {}  {}",
        order.status(),
        progress_bar(order.status().progress())
    )?;

    if let Some(address) = order.delivery_address() {
        writeln!(
            out,
            "Deliver to: {}, {}, {} ({})",
            address.full_name, address.street, address.city, address.phone
        )?;
    }

    write_lines(out, order.items(), order.totals())
}

/// Text progress indicator, e.g. `██████░░░░ 67%`.
#[must_use]
pub fn progress_bar(progress: Progress) -> String {
    let Some(points) = progress.percent_points() else {
        return "cancelled".to_string();
    };

    let filled = (points / Decimal::TEN)
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(BAR_WIDTH);

    format!(
        "{}{} {points}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: std::ops::Range<usize>,
) -> Result<(), RenderError> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}
