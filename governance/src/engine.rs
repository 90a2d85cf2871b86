//! The vote engine: recomputes a voter's stake, places their record in the
//! right tier bucket and keeps the poll aggregates exact by delta updates.
//!
//! Both the single-vote path and the bulk resync path go through
//! [`VoteEngine::apply_vote`]; they differ only in how a tier-0 outcome for a
//! non-empty choice is treated (error vs. silent demotion), which is decided
//! by the caller.

use stakepoll_store::LedgerStore;
use stakepoll_types::{Address, Choice, Poll, StakeOracle, TierId, VoteRecord, INACTIVE_TIER};

use crate::staging::{is_active, StagedLedger};
use crate::PollError;

pub struct VoteEngine;

impl VoteEngine {
    /// First threshold (in the given order) that `stake` meets, as a 1-based
    /// tier id; 0 if it meets none.
    pub fn tier_for(thresholds: &[u64], stake: u64) -> TierId {
        thresholds
            .iter()
            .position(|&threshold| stake >= threshold)
            .map_or(INACTIVE_TIER, |i| i as TierId + 1)
    }

    /// Lowest threshold of a poll, i.e. the stake needed to hold any tier.
    pub fn minimum_stake(thresholds: &[u64]) -> u64 {
        thresholds.iter().copied().min().unwrap_or(0)
    }

    /// Move `voter` from `(old_tier, old_record)` to the state implied by
    /// `requested`, staging bucket/index writes in `ledger` and updating the
    /// aggregates of `poll` in place. Returns the voter's new tier id.
    ///
    /// `old_record` must be the record held in bucket `old_tier` (ignored
    /// when `old_tier` is 0).
    pub fn apply_vote<S: LedgerStore>(
        ledger: &mut StagedLedger<'_, S>,
        poll: &mut Poll,
        voter: &Address,
        old_tier: TierId,
        old_record: Option<&VoteRecord>,
        requested: Option<Choice>,
        oracle: &dyn StakeOracle,
    ) -> Result<TierId, PollError> {
        let (old_total, old_yes) = match old_record {
            Some(record) if is_active(old_tier) => record.weights(),
            None if is_active(old_tier) => {
                return Err(PollError::Corrupted(format!(
                    "voter {voter} indexed at tier {old_tier} of poll {} has no record",
                    poll.id
                )))
            }
            _ => (0, 0),
        };

        let (new_tier, new_total, new_yes) = match requested {
            None => {
                Self::deactivate(ledger, poll, voter, old_tier);
                (INACTIVE_TIER, 0, 0)
            }
            Some(choice) => {
                let stake = oracle.balance_of(voter);
                let tier = Self::tier_for(&poll.params.tiers, stake);
                if !is_active(tier) {
                    Self::deactivate(ledger, poll, voter, old_tier);
                    (INACTIVE_TIER, 0, 0)
                } else {
                    let record = VoteRecord {
                        voter: voter.clone(),
                        choice,
                        stake,
                    };
                    let (total, yes) = record.weights();
                    if tier != old_tier {
                        if is_active(old_tier) {
                            ledger.bucket(poll.id, old_tier).remove(voter);
                        }
                        ledger.index(poll.id).set(voter, tier);
                        tracing::debug!(
                            poll_id = poll.id,
                            voter = %voter,
                            from = old_tier,
                            to = tier,
                            stake,
                            "voter changed tier"
                        );
                    }
                    ledger.bucket(poll.id, tier).put(record);
                    (tier, total, yes)
                }
            }
        };

        poll.total_weight = apply_delta(poll.total_weight, old_total, new_total, "total")?;
        poll.yes_weight = apply_delta(poll.yes_weight, old_yes, new_yes, "yes")?;
        Ok(new_tier)
    }

    fn deactivate<S: LedgerStore>(
        ledger: &mut StagedLedger<'_, S>,
        poll: &Poll,
        voter: &Address,
        old_tier: TierId,
    ) {
        if is_active(old_tier) {
            ledger.bucket(poll.id, old_tier).remove(voter);
            ledger.index(poll.id).set(voter, INACTIVE_TIER);
        }
    }
}

fn apply_delta(current: u128, old: u128, new: u128, what: &str) -> Result<u128, PollError> {
    current
        .checked_sub(old)
        .map(|rest| rest + new)
        .ok_or_else(|| {
            PollError::Corrupted(format!(
                "{what} weight {current} is smaller than a recorded contribution of {old}"
            ))
        })
}
