//! Intent draft types for the swap wizard.
//!
//! This module defines the user-editable draft of a swap request and the
//! display-only request shape shown in the API preview panel. The draft is
//! deliberately loose: amount fields accept any string, and only the
//! token/chain exclusion rule is enforced at selection time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-editable draft of a swap request.
///
/// The draft is edited in the SetGoal step and frozen for the rest of the
/// run. Amounts are free-form decimal strings; no numeric validation is
/// applied to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDraft {
	/// Symbol of the token being sold.
	pub token_in: String,
	/// Symbol of the token being bought. Never equal to `token_in`.
	pub token_out: String,
	/// Chain the input funds live on.
	pub chain_in: String,
	/// Chain the output is delivered to. Never equal to `chain_in`.
	pub chain_out: String,
	/// Amount of `token_in` to sell, as entered by the user.
	pub amount_in: String,
	/// Minimum acceptable amount of `token_out`, as entered by the user.
	pub min_amount_out: String,
	/// Selected expiry option. Drives simulated delay ranges only.
	pub expiry: String,
}

/// Editable fields of an [`IntentDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentField {
	TokenIn,
	TokenOut,
	ChainIn,
	ChainOut,
	AmountIn,
	MinAmountOut,
	Expiry,
}

impl fmt::Display for IntentField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			IntentField::TokenIn => "token_in",
			IntentField::TokenOut => "token_out",
			IntentField::ChainIn => "chain_in",
			IntentField::ChainOut => "chain_out",
			IntentField::AmountIn => "amount_in",
			IntentField::MinAmountOut => "min_amount_out",
			IntentField::Expiry => "expiry",
		};
		write!(f, "{}", name)
	}
}

impl FromStr for IntentField {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"token_in" => Ok(IntentField::TokenIn),
			"token_out" => Ok(IntentField::TokenOut),
			"chain_in" => Ok(IntentField::ChainIn),
			"chain_out" => Ok(IntentField::ChainOut),
			"amount_in" => Ok(IntentField::AmountIn),
			"min_amount_out" => Ok(IntentField::MinAmountOut),
			"expiry" => Ok(IntentField::Expiry),
			other => Err(format!("unknown intent field: {}", other)),
		}
	}
}

impl IntentDraft {
	/// Returns the current value of the given field.
	pub fn get(&self, field: IntentField) -> &str {
		match field {
			IntentField::TokenIn => &self.token_in,
			IntentField::TokenOut => &self.token_out,
			IntentField::ChainIn => &self.chain_in,
			IntentField::ChainOut => &self.chain_out,
			IntentField::AmountIn => &self.amount_in,
			IntentField::MinAmountOut => &self.min_amount_out,
			IntentField::Expiry => &self.expiry,
		}
	}

	/// Writes `value` into the given field without any validation.
	///
	/// Validation (option membership, exclusion rule) is the transition
	/// function's responsibility; this is the raw setter it uses.
	pub fn set(&mut self, field: IntentField, value: String) {
		match field {
			IntentField::TokenIn => self.token_in = value,
			IntentField::TokenOut => self.token_out = value,
			IntentField::ChainIn => self.chain_in = value,
			IntentField::ChainOut => self.chain_out = value,
			IntentField::AmountIn => self.amount_in = value,
			IntentField::MinAmountOut => self.min_amount_out = value,
			IntentField::Expiry => self.expiry = value,
		}
	}

	/// Human-readable "from" leg, e.g. `100 USDC on Ethereum`.
	pub fn from_leg(&self) -> String {
		format!("{} {} on {}", self.amount_in, self.token_in, self.chain_in)
	}

	/// Human-readable "to" leg, e.g. `0.05 ETH on Arbitrum`.
	pub fn to_leg(&self) -> String {
		format!(
			"{} {} on {}",
			self.min_amount_out, self.token_out, self.chain_out
		)
	}

	/// Whether this draft crosses chains.
	pub fn is_cross_chain(&self) -> bool {
		self.chain_in != self.chain_out
	}
}

/// The request body a real client would submit for this intent.
///
/// Rendered in the API preview panel; never actually sent anywhere.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
	pub token_in: String,
	pub token_out: String,
	pub chain_in: String,
	pub chain_out: String,
	pub amount_in: String,
	pub min_amount_out: String,
	pub expiry: String,
}

impl From<&IntentDraft> for IntentRequest {
	fn from(draft: &IntentDraft) -> Self {
		Self {
			token_in: draft.token_in.clone(),
			token_out: draft.token_out.clone(),
			chain_in: draft.chain_in.clone(),
			chain_out: draft.chain_out.clone(),
			amount_in: draft.amount_in.clone(),
			min_amount_out: draft.min_amount_out.clone(),
			expiry: draft.expiry.clone(),
		}
	}
}

impl IntentRequest {
	/// Renders the full illustrative request, method line included.
	pub fn render(&self) -> String {
		let body = serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string());
		format!("POST /v1/intents\n{}", body)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn draft() -> IntentDraft {
		IntentDraft {
			token_in: "USDC".to_string(),
			token_out: "ETH".to_string(),
			chain_in: "Ethereum".to_string(),
			chain_out: "Arbitrum".to_string(),
			amount_in: "100".to_string(),
			min_amount_out: "0.05".to_string(),
			expiry: "30 seconds".to_string(),
		}
	}

	#[test]
	fn request_preview_uses_camel_case_keys() {
		let rendered = IntentRequest::from(&draft()).render();
		assert!(rendered.starts_with("POST /v1/intents\n"));
		assert!(rendered.contains("\"tokenIn\": \"USDC\""));
		assert!(rendered.contains("\"minAmountOut\": \"0.05\""));
		assert!(!rendered.contains("token_in"));
	}

	#[test]
	fn field_round_trip() {
		let mut d = draft();
		d.set(IntentField::AmountIn, "not-a-number".to_string());
		assert_eq!(d.get(IntentField::AmountIn), "not-a-number");
		assert_eq!("expiry".parse::<IntentField>().unwrap(), IntentField::Expiry);
		assert!("bogus".parse::<IntentField>().is_err());
	}

	#[test]
	fn legs_are_human_readable() {
		let d = draft();
		assert_eq!(d.from_leg(), "100 USDC on Ethereum");
		assert_eq!(d.to_leg(), "0.05 ETH on Arbitrum");
		assert!(d.is_cross_chain());
	}
}
