use std::fmt::Write as _;

use client_core::ViewState;
use shared::domain::Order;

const HEADERS: [&str; 4] = ["ID", "Product Name", "Quantity", "Status"];

pub fn orders_table(orders: &[Order]) -> String {
    let rows: Vec<[String; 4]> = orders
        .iter()
        .map(|order| {
            [
                order.id.to_string(),
                order.product_name.clone(),
                order.quantity.to_string(),
                order.status.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    push_row(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str("(no orders)\n");
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{}", line.trim_end());
}

/// Full desk view: mode switch, form, list and the last error if any.
pub fn desk_view(state: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] mode: {}",
        state.toggle_label(),
        state.protocol().as_str().to_uppercase()
    );
    let form = state.form();
    let _ = writeln!(
        out,
        "form: product={:?} quantity={} status={:?}{}",
        form.product_name,
        form.quantity,
        form.status,
        state
            .editing_id()
            .map(|id| format!(" (editing {id})"))
            .unwrap_or_default()
    );
    let _ = writeln!(out, "[{}]", state.submit_label());
    out.push_str(&orders_table(state.orders()));
    if let Some(error) = state.last_error() {
        let _ = writeln!(out, "last error: {error}");
    }
    out
}
