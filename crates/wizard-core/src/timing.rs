//! Delay and outcome draws.
//!
//! All randomness of the simulation lives here: uniform delay draws from
//! the profile's tiers and the settlement coin flip. The state machine
//! never touches an RNG; the engine draws here and feeds the results in
//! as events.

use rand::Rng;
use std::time::Duration;
use wizard_config::SimulationProfile;
use wizard_types::SettlementOutcome;

/// Probability that a settlement resolves successfully.
///
/// Fixed regardless of any input; deliberately a code constant rather
/// than configuration.
pub const SETTLEMENT_SUCCESS_RATE: f64 = 0.9;

/// Draws the simulated signature delay.
pub fn draw_sign<R: Rng>(profile: &SimulationProfile, rng: &mut R) -> Duration {
	Duration::from_millis(rng.gen_range(profile.sign.min_ms..=profile.sign.max_ms))
}

/// Draws the solver-competition delay for the given expiry option.
///
/// An expiry missing from the profile (possible only via a foreign
/// snapshot) falls back to the shortest tier.
pub fn draw_auction<R: Rng>(profile: &SimulationProfile, expiry: &str, rng: &mut R) -> Duration {
	let range = profile
		.tier(expiry)
		.map(|t| t.auction)
		.unwrap_or(profile.tiers[0].auction);
	Duration::from_millis(rng.gen_range(range.min_ms..=range.max_ms))
}

/// Draws the settlement delay for the given expiry option.
pub fn draw_settlement<R: Rng>(profile: &SimulationProfile, expiry: &str, rng: &mut R) -> Duration {
	let range = profile
		.tier(expiry)
		.map(|t| t.settlement)
		.unwrap_or(profile.tiers[0].settlement);
	Duration::from_millis(rng.gen_range(range.min_ms..=range.max_ms))
}

/// Flips the settlement coin.
pub fn draw_outcome<R: Rng>(rng: &mut R) -> SettlementOutcome {
	if rng.gen::<f64>() < SETTLEMENT_SUCCESS_RATE {
		SettlementOutcome::Success
	} else {
		SettlementOutcome::Timeout
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	fn rng() -> StdRng {
		StdRng::seed_from_u64(7)
	}

	#[test]
	fn draws_stay_within_tier_bounds() {
		let profile = SimulationProfile::rapid();
		let mut rng = rng();

		for tier in &profile.tiers {
			for _ in 0..200 {
				let auction = draw_auction(&profile, &tier.expiry, &mut rng);
				assert!(tier.auction.contains(auction.as_millis() as u64));

				let settlement = draw_settlement(&profile, &tier.expiry, &mut rng);
				assert!(tier.settlement.contains(settlement.as_millis() as u64));
			}
		}
	}

	#[test]
	fn sign_delay_stays_within_bounds() {
		let profile = SimulationProfile::rapid();
		let mut rng = rng();
		for _ in 0..200 {
			let delay = draw_sign(&profile, &mut rng);
			assert!(profile.sign.contains(delay.as_millis() as u64));
		}
	}

	#[test]
	fn longer_expiry_never_shrinks_the_range() {
		for profile in [SimulationProfile::rapid(), SimulationProfile::classic()] {
			for pair in profile.tiers.windows(2) {
				assert!(pair[1].auction.min_ms >= pair[0].auction.min_ms);
				assert!(pair[1].auction.max_ms >= pair[0].auction.max_ms);
				assert!(pair[1].settlement.min_ms >= pair[0].settlement.min_ms);
				assert!(pair[1].settlement.max_ms >= pair[0].settlement.max_ms);
			}
		}
	}

	#[test]
	fn unknown_expiry_falls_back_to_the_shortest_tier() {
		let profile = SimulationProfile::rapid();
		let mut rng = rng();
		for _ in 0..100 {
			let delay = draw_auction(&profile, "two fortnights", &mut rng);
			assert!(profile.tiers[0].auction.contains(delay.as_millis() as u64));
		}
	}

	#[test]
	fn outcome_rate_is_roughly_nine_in_ten() {
		let mut rng = rng();
		let successes = (0..2000)
			.filter(|_| draw_outcome(&mut rng) == SettlementOutcome::Success)
			.count();

		// Seeded, so this is deterministic; the band just documents the
		// expected distribution.
		assert!((1700..=1950).contains(&successes));
	}
}
