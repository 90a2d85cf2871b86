use proptest::prelude::*;

use stakepoll_types::{Address, Choice, Poll, PollParams, Timestamp, VoteRecord};

fn poll(total_supply: u64) -> Poll {
    let params = PollParams {
        title: "prop".into(),
        summary: String::new(),
        url: String::new(),
        creator: Address::new(vec![1]),
        start_time: Timestamp::new(0),
        end_time: Timestamp::new(10),
        tiers: vec![0],
    };
    Poll::new(0, params, total_supply, Timestamp::EPOCH)
}

proptest! {
    /// Address ordering is exactly byte-slice ordering.
    #[test]
    fn address_order_matches_bytes(
        a in prop::collection::vec(any::<u8>(), 1..24),
        b in prop::collection::vec(any::<u8>(), 1..24),
    ) {
        let (aa, ab) = (Address::new(a.clone()), Address::new(b.clone()));
        prop_assert_eq!(aa.cmp(&ab), a.as_slice().cmp(b.as_slice()));
    }

    /// Display output parses back to the same address.
    #[test]
    fn address_hex_parses_back(bytes in prop::collection::vec(any::<u8>(), 1..32)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Approval never exceeds 100% while yes <= total.
    #[test]
    fn approval_is_bounded(total in 0u128..u128::from(u64::MAX), yes_share in 0u32..=10_000) {
        let mut p = poll(1);
        p.total_weight = total;
        p.yes_weight = total * u128::from(yes_share) / 10_000;
        prop_assert!(p.approval_bps() <= 10_000);
    }

    /// Participation is capped at 100% even when cached stake exceeds supply.
    #[test]
    fn participation_is_capped(supply in 1u64..u64::MAX, total in 0u128..u128::from(u64::MAX) * 4) {
        let mut p = poll(supply);
        p.total_weight = total;
        prop_assert!(p.participation_bps() <= 10_000);
    }

    /// A record's yes weight is either zero or its whole stake.
    #[test]
    fn record_weights(stake in any::<u64>(), yes in any::<bool>()) {
        let choice = if yes { Choice::Yes } else { Choice::No };
        let record = VoteRecord { voter: Address::new(vec![9]), choice, stake };
        let (total, y) = record.weights();
        prop_assert_eq!(total, u128::from(stake));
        prop_assert_eq!(y, if yes { total } else { 0 });
    }

    /// Records survive bincode encoding as stored by the LMDB backend.
    #[test]
    fn record_bincode(stake in any::<u64>(), voter in prop::collection::vec(any::<u8>(), 1..32)) {
        let record = VoteRecord { voter: Address::new(voter), choice: Choice::No, stake };
        let encoded = bincode::serialize(&record).unwrap();
        let decoded: VoteRecord = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, record);
    }
}
