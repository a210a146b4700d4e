//! Demo strike-selection policy for replays.

use spread::error::SelectionError;
use spread::option::OptionKind;
use spread::selector::{self, StrikeSelector};

/// Strangle ladder on the nearest expiry at least `min_days` out.
///
/// Even legs are puts stepping down from the strike at or below the price,
/// odd legs are calls stepping up from the strike at or above it:
/// leg 0 = put at or below, leg 1 = call at or above, leg 2 = next put down...
pub fn strangle_ladder(min_days: i64) -> impl StrikeSelector {
    selector::from_fn(move |chains, date, price, legs| {
        let (expiry, chain) = chains.front_expiry(date, min_days)?;
        chain.check_in_range(price)?;

        let entries = chain.entries();
        let below = entries
            .iter()
            .rposition(|e| e.strike <= price)
            .ok_or_else(|| SelectionError::no_strike(format!("no strike at or below {price}")))?;
        let above = entries
            .iter()
            .position(|e| e.strike >= price)
            .ok_or_else(|| SelectionError::no_strike(format!("no strike at or above {price}")))?;

        for leg in 0..legs.leg_count() {
            let step = leg / 2;
            let (slot, kind) = if leg % 2 == 0 {
                (below.checked_sub(step), OptionKind::Put)
            } else {
                (Some(above + step), OptionKind::Call)
            };

            let entry = slot.and_then(|ix| entries.get(ix)).ok_or_else(|| {
                SelectionError::no_strike(format!("leg {leg} runs off the {expiry} chain"))
            })?;
            let symbol = entry.symbol(kind).ok_or_else(|| {
                SelectionError::no_strike(format!("no {kind} listed at strike {}", entry.strike))
            })?;

            legs.update_leg(entry.strike, expiry, symbol);
        }
        Ok(())
    })
}
