//! Escrow invariants under arbitrary operation sequences

#![allow(clippy::unwrap_used)]

use idreg_core::Address;
use idreg_recovery::{RecoveryBook, RecoveryError, ESCROW_PERIOD};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    SetRecovery(u8, u8),
    Request(u8, u8, u8),
    Complete(u8, u8),
    Cancel(u8),
    Wait(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..3, 0u8..4).prop_map(|(k, r)| Op::SetRecovery(k, r)),
        (0u8..3, 0u8..4, 0u8..4).prop_map(|(k, c, d)| Op::Request(k, c, d)),
        (0u8..3, 0u8..4).prop_map(|(k, c)| Op::Complete(k, c)),
        (0u8..3).prop_map(Op::Cancel),
        (0u64..2 * ESCROW_PERIOD).prop_map(Op::Wait),
    ]
}

proptest! {
    #[test]
    fn request_implies_recovery_and_destination(ops in proptest::collection::vec(op(), 1..60)) {
        let mut book: RecoveryBook<u8> = RecoveryBook::default();
        let mut now = 1_000u64;
        for op in ops {
            match op {
                Op::SetRecovery(k, r) => {
                    book.set_recovery(k, Address::repeat_byte(r));
                }
                Op::Request(k, c, d) => {
                    let _ = book.request(k, &Address::repeat_byte(c), Address::repeat_byte(d), now);
                }
                Op::Complete(k, c) => {
                    if book.ready(&k, &Address::repeat_byte(c), now).is_ok() {
                        book.clear(&k);
                    }
                }
                Op::Cancel(k) => {
                    let had = book.request_of(&k).is_some();
                    let result = book.cancel(&k);
                    prop_assert_eq!(result.is_ok(), had);
                    if !had {
                        prop_assert_eq!(result.unwrap_err(), RecoveryError::NoRecovery);
                    }
                }
                Op::Wait(s) => now += s,
            }
            for (key, request) in book.pending() {
                prop_assert!(book.recovery_of(key).is_some());
                prop_assert!(!request.destination.is_zero());
            }
        }
    }
}
