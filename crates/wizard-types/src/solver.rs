//! Mock solver quote types.
//!
//! Quotes are regenerated every time the auction step runs. Prices are the
//! display strings the quotes arrive with (`"<number> ETH"`); numeric
//! comparison parses the leading decimal and ignores the unit suffix.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single solver quote in the simulated auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverQuote {
	/// Stable id within the mock book.
	pub id: u8,
	/// Solver display name.
	pub name: String,
	/// Quoted output, e.g. `"0.0512 ETH"`.
	pub price: String,
	/// Quoted fill time, e.g. `"2.1s"`.
	pub time: String,
	/// Illustrative star rating out of 5. Not persisted across auctions.
	pub rating: u8,
}

impl SolverQuote {
	/// Parses the numeric part of the price string.
	///
	/// Returns `None` for malformed prices; callers sorting a book treat
	/// those as the lowest possible quote.
	pub fn price_value(&self) -> Option<Decimal> {
		self.price
			.split_whitespace()
			.next()
			.and_then(|n| n.parse::<Decimal>().ok())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn quote(price: &str) -> SolverQuote {
		SolverQuote {
			id: 1,
			name: "UniswapX".to_string(),
			price: price.to_string(),
			time: "2.1s".to_string(),
			rating: 5,
		}
	}

	#[test]
	fn parses_price_ignoring_unit_suffix() {
		assert_eq!(
			quote("0.0512 ETH").price_value(),
			Some("0.0512".parse().unwrap())
		);
		assert_eq!(quote("1 ETH").price_value(), Some(Decimal::ONE));
	}

	#[test]
	fn malformed_price_yields_none() {
		assert_eq!(quote("ETH").price_value(), None);
		assert_eq!(quote("").price_value(), None);
	}
}
