//! Display helpers for token amounts

use crate::{DMT_SYMBOL, LAMPORTS_PER_SOL};
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a DMT amount with thousands separators and at most three
/// fraction digits, e.g. `1,234.5 DMT`
pub fn format_dmt(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(f) => format!("{}{}.{} {}", sign, grouped, f, DMT_SYMBOL),
        None => format!("{}{} {}", sign, grouped, DMT_SYMBOL),
    }
}

/// Format lamports as SOL with four fraction digits, e.g. `1.5000 SOL`
pub fn format_sol(lamports: u64) -> String {
    let sol = Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL);
    let rounded = sol.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.4} SOL", rounded)
}
