//! The simulated solver auction.
//!
//! Every auction run produces the same fixed four-quote book; only the
//! ordering work (descending by parsed numeric price) and best-quote
//! selection carry behavior. Prices keep their display form, so the sort
//! parses the leading decimal and pushes malformed quotes to the bottom.

use rust_decimal::Decimal;
use wizard_types::SolverQuote;

/// The fixed mock quote book, in arrival order.
pub fn mock_book() -> Vec<SolverQuote> {
	vec![
		SolverQuote {
			id: 1,
			name: "UniswapX".to_string(),
			price: "0.0512 ETH".to_string(),
			time: "2.1s".to_string(),
			rating: 5,
		},
		SolverQuote {
			id: 2,
			name: "CoW Swap".to_string(),
			price: "0.0508 ETH".to_string(),
			time: "1.8s".to_string(),
			rating: 4,
		},
		SolverQuote {
			id: 3,
			name: "1inch Fusion".to_string(),
			price: "0.0515 ETH".to_string(),
			time: "2.3s".to_string(),
			rating: 4,
		},
		SolverQuote {
			id: 4,
			name: "Matcha".to_string(),
			price: "0.0509 ETH".to_string(),
			time: "1.9s".to_string(),
			rating: 4,
		},
	]
}

/// Runs one auction: sorts the book descending by numeric price and
/// returns it together with the winning quote.
pub fn run_auction() -> (Vec<SolverQuote>, SolverQuote) {
	let mut book = mock_book();
	book.sort_by(|a, b| {
		let a_price = a.price_value().unwrap_or(Decimal::MIN);
		let b_price = b.price_value().unwrap_or(Decimal::MIN);
		b_price.cmp(&a_price)
	});

	let best = book[0].clone();
	(book, best)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn auction_sorts_descending_and_picks_the_head() {
		let (book, best) = run_auction();

		assert_eq!(book.len(), 4);
		assert_eq!(best.name, "1inch Fusion");
		assert_eq!(best.price, "0.0515 ETH");
		assert_eq!(book[0], best);

		for pair in book.windows(2) {
			assert!(pair[0].price_value().unwrap() >= pair[1].price_value().unwrap());
		}
	}

	#[test]
	fn best_quote_dominates_every_other() {
		let (book, best) = run_auction();
		let best_price = best.price_value().unwrap();
		assert!(book
			.iter()
			.all(|q| best_price >= q.price_value().unwrap()));
	}
}
