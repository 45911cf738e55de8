/// Caps how many items a single call is allowed to process.
///
/// The link handler spends one unit per line-mode byte and gives control back
/// to the main loop once the budget is exhausted, so a burst of input can't
/// starve command dispatch or the heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
	remaining: usize,
}

impl Budget {
	pub const fn new(limit: usize) -> Self {
		Self { remaining: limit }
	}

	/// Takes one unit, returns `false` once nothing is left.
	pub fn spend(&mut self) -> bool {
		if self.remaining == 0 {
			return false;
		}
		self.remaining -= 1;
		true
	}

	pub fn is_exhausted(&self) -> bool {
		self.remaining == 0
	}

	pub fn remaining(&self) -> usize {
		self.remaining
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn spends_exactly_the_limit() {
		let mut budget = Budget::new(3);
		assert!(budget.spend());
		assert!(budget.spend());
		assert!(!budget.is_exhausted());
		assert!(budget.spend());
		assert!(budget.is_exhausted());
		assert!(!budget.spend());
		assert_eq!(budget.remaining(), 0);
	}

	#[test]
	fn zero_budget_never_spends() {
		let mut budget = Budget::new(0);
		assert!(!budget.spend());
	}
}
