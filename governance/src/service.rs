//! Entry points of the poll ledger.
//!
//! Every mutating call follows the same shape: read and compute against a
//! [`StagedLedger`], check every precondition, commit once, then emit the
//! event. Any error before the commit drops the ledger and nothing is
//! written; events are only emitted after a successful commit.

use std::sync::Arc;

use serde::Serialize;
use stakepoll_store::LedgerStore;
use stakepoll_types::{
    Address, AuthorityCheck, CallContext, Choice, Clock, Direction, EventSink, Poll, PollEvent,
    PollId, PollParams, StakeOracle, TierId, Timestamp, VoteRecord, INACTIVE_TIER,
};

use crate::config::PollConfig;
use crate::engine::VoteEngine;
use crate::registry::PollRegistry;
use crate::staging::{is_active, StagedLedger};
use crate::PollError;

/// The external collaborators a [`PollService`] calls into.
#[derive(Clone)]
pub struct Collaborators {
    pub oracle: Arc<dyn StakeOracle>,
    pub authority: Arc<dyn AuthorityCheck>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn EventSink>,
}

/// Outcome of one `update_votes` batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResyncReport {
    pub tier_id: TierId,
    /// Records read from the bucket.
    pub processed: u32,
    /// Records rewritten in the same tier.
    pub refreshed: u32,
    /// Records moved to another tier.
    pub moved: u32,
    /// Records removed for insufficient stake.
    pub deactivated: u32,
    /// Last voter scanned when the batch was full; pass it back as
    /// `start_after` to continue the tier.
    pub next_cursor: Option<Address>,
}

impl ResyncReport {
    pub fn is_complete(&self) -> bool {
        self.next_cursor.is_none()
    }
}

pub struct PollService<S> {
    store: S,
    collaborators: Collaborators,
    config: PollConfig,
}

impl<S: LedgerStore> PollService<S> {
    pub fn new(store: S, collaborators: Collaborators, config: PollConfig) -> Result<Self, PollError> {
        config.validate()?;
        Ok(Self {
            store,
            collaborators,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    // ── Mutating operations ─────────────────────────────────────────────

    /// Validate, authorise and store a new poll. Returns its id.
    pub fn create_poll(&self, params: PollParams) -> Result<PollId, PollError> {
        let poll = self
            .stage_create(params)
            .inspect_err(|e| tracing::warn!(error = %e, "create_poll rejected"))?;

        tracing::info!(
            poll_id = poll.id,
            creator = %poll.params.creator,
            tiers = poll.params.tiers.len(),
            start = %poll.params.start_time,
            end = %poll.params.end_time,
            "poll created"
        );
        let event = PollEvent::PollCreated {
            poll_id: poll.id,
            creator: poll.params.creator.clone(),
            title: poll.params.title.clone(),
            start_time: poll.params.start_time,
            end_time: poll.params.end_time,
            tiers: poll.params.tiers.clone(),
        };
        self.collaborators
            .events
            .emit(&event, &[poll.params.creator.clone()]);
        Ok(poll.id)
    }

    fn stage_create(&self, params: PollParams) -> Result<Poll, PollError> {
        let now = self.collaborators.clock.now();
        PollRegistry::<S>::validate(&params, now)?;
        let context = CallContext::CreatePoll(&params);
        if !self
            .collaborators
            .authority
            .has_authority(&params.creator, &context)
        {
            return Err(PollError::Authorization(params.creator.to_string()));
        }

        let supply = self.collaborators.oracle.total_supply();
        let mut ledger = StagedLedger::new(&self.store);
        let poll = PollRegistry::create(&mut ledger, params, supply, now)?;
        ledger.commit()?;
        Ok(poll)
    }

    /// Cast, change or withdraw (`None`) a vote.
    pub fn vote(
        &self,
        poll_id: PollId,
        voter: &Address,
        choice: Option<Choice>,
    ) -> Result<(), PollError> {
        let tier = self.stage_vote(poll_id, voter, choice).inspect_err(|e| {
            tracing::warn!(poll_id, voter = %voter, error = %e, "vote rejected")
        })?;

        tracing::info!(
            poll_id,
            voter = %voter,
            choice = ?choice,
            tier,
            "vote recorded"
        );
        let event = PollEvent::Vote {
            poll_id,
            voter: voter.clone(),
            choice,
        };
        self.collaborators.events.emit(&event, &[voter.clone()]);
        Ok(())
    }

    fn stage_vote(
        &self,
        poll_id: PollId,
        voter: &Address,
        choice: Option<Choice>,
    ) -> Result<TierId, PollError> {
        let now = self.collaborators.clock.now();
        let mut ledger = StagedLedger::new(&self.store);
        let mut poll = load_poll(&ledger, poll_id)?;
        check_window(&poll, now)?;

        let context = CallContext::Vote { poll_id, choice };
        if !self.collaborators.authority.has_authority(voter, &context) {
            return Err(PollError::Authorization(voter.to_string()));
        }

        let old_tier = ledger.index(poll_id).get(voter)?;
        let old_record = if is_active(old_tier) {
            ledger.bucket(poll_id, old_tier).get(voter)?
        } else {
            None
        };
        if old_record.as_ref().map(|r| r.choice) == choice {
            return Err(PollError::RedundantVote(voter.to_string()));
        }

        let new_tier = VoteEngine::apply_vote(
            &mut ledger,
            &mut poll,
            voter,
            old_tier,
            old_record.as_ref(),
            choice,
            self.collaborators.oracle.as_ref(),
        )?;
        if new_tier == INACTIVE_TIER && choice.is_some() {
            return Err(PollError::InsufficientStake {
                voter: voter.to_string(),
                minimum: VoteEngine::minimum_stake(&poll.params.tiers),
            });
        }

        ledger.put_poll(poll);
        ledger.commit()?;
        Ok(new_tier)
    }

    /// Refresh up to `max_resync_batch` records of one tier against current
    /// stake, strictly after `start_after` (from the start of the bucket when
    /// `None`). Voters who no longer meet any threshold are demoted to tier 0
    /// without failing the batch.
    pub fn update_votes(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        start_after: Option<&Address>,
    ) -> Result<ResyncReport, PollError> {
        let (report, poll) = self
            .stage_resync(poll_id, tier_id, start_after)
            .inspect_err(|e| tracing::warn!(poll_id, tier_id, error = %e, "update_votes rejected"))?;

        tracing::info!(
            poll_id,
            tier_id,
            processed = report.processed,
            refreshed = report.refreshed,
            moved = report.moved,
            deactivated = report.deactivated,
            complete = report.is_complete(),
            "tier resynced"
        );
        let event = PollEvent::VotesUpdated {
            poll_id,
            tier_id,
            processed: report.processed,
            moved: report.moved,
            deactivated: report.deactivated,
            yes_weight: poll.yes_weight,
            total_weight: poll.total_weight,
            next_cursor: report.next_cursor.clone(),
        };
        self.collaborators.events.emit(&event, &[]);
        Ok(report)
    }

    fn stage_resync(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        start_after: Option<&Address>,
    ) -> Result<(ResyncReport, Poll), PollError> {
        let now = self.collaborators.clock.now();
        let mut ledger = StagedLedger::new(&self.store);
        let mut poll = load_poll(&ledger, poll_id)?;
        check_window(&poll, now)?;
        check_tier(&poll, tier_id)?;

        let cap = self.config.max_resync_batch;
        let batch = ledger
            .bucket(poll_id, tier_id)
            .range(start_after, cap, Direction::Ascending)?;

        let oracle = self.collaborators.oracle.as_ref();
        let mut report = ResyncReport {
            tier_id,
            ..ResyncReport::default()
        };
        for record in &batch {
            let new_tier = VoteEngine::apply_vote(
                &mut ledger,
                &mut poll,
                &record.voter,
                tier_id,
                Some(record),
                Some(record.choice),
                oracle,
            )?;
            report.processed += 1;
            match new_tier {
                INACTIVE_TIER => report.deactivated += 1,
                t if t == tier_id => report.refreshed += 1,
                _ => report.moved += 1,
            }
        }
        if batch.len() == cap {
            report.next_cursor = batch.last().map(|r| r.voter.clone());
        }

        poll.last_update = now;
        poll.total_supply = oracle.total_supply();
        ledger.put_poll(poll.clone());
        ledger.commit()?;
        Ok((report, poll))
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn get_poll(&self, poll_id: PollId) -> Result<Poll, PollError> {
        PollRegistry::new(&self.store).get(poll_id)
    }

    /// Polls in id order, strictly after `start_after`. A `limit` of 0 uses
    /// the configured default page size.
    pub fn get_polls(
        &self,
        start_after: Option<PollId>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<Poll>, PollError> {
        PollRegistry::new(&self.store)
            .list(start_after, self.config.page_limit(limit), direction)
            .collect()
    }

    /// Records of one tier bucket in voter byte order.
    pub fn get_votes(
        &self,
        poll_id: PollId,
        tier_id: TierId,
        start_after: Option<&Address>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<VoteRecord>, PollError> {
        let mut ledger = StagedLedger::new(&self.store);
        let poll = load_poll(&ledger, poll_id)?;
        check_tier(&poll, tier_id)?;
        ledger
            .bucket(poll_id, tier_id)
            .range(start_after, self.config.page_limit(limit), direction)
    }

    /// The voter's current tier; `NotFound` when they have no active vote.
    pub fn get_tier_id(&self, poll_id: PollId, voter: &Address) -> Result<TierId, PollError> {
        let mut ledger = StagedLedger::new(&self.store);
        load_poll(&ledger, poll_id)?;
        match ledger.index(poll_id).get(voter)? {
            INACTIVE_TIER => Err(PollError::NotFound(format!(
                "vote of {voter} in poll {poll_id}"
            ))),
            tier => Ok(tier),
        }
    }

    /// The voter's current record, located through the tier index.
    pub fn get_vote(&self, poll_id: PollId, voter: &Address) -> Result<VoteRecord, PollError> {
        let tier = self.get_tier_id(poll_id, voter)?;
        let mut ledger = StagedLedger::new(&self.store);
        ledger.bucket(poll_id, tier).get(voter)?.ok_or_else(|| {
            PollError::Corrupted(format!(
                "voter {voter} indexed at tier {tier} of poll {poll_id} has no record"
            ))
        })
    }
}

fn load_poll<S: LedgerStore>(ledger: &StagedLedger<'_, S>, poll_id: PollId) -> Result<Poll, PollError> {
    ledger
        .poll(poll_id)?
        .ok_or_else(|| PollError::NotFound(format!("poll {poll_id}")))
}

fn check_window(poll: &Poll, now: Timestamp) -> Result<(), PollError> {
    if poll.is_open(now) {
        Ok(())
    } else {
        Err(PollError::TimeWindow {
            poll_id: poll.id,
            now,
            start: poll.params.start_time,
            end: poll.params.end_time,
        })
    }
}

fn check_tier(poll: &Poll, tier_id: TierId) -> Result<(), PollError> {
    if poll.is_valid_tier(tier_id) {
        Ok(())
    } else {
        Err(PollError::InvalidTier {
            tier_id,
            tier_count: poll.tier_count(),
        })
    }
}
