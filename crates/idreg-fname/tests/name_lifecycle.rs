//! Name leases from commit to auction

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use idreg_core::{AccessControl, Address, Fid, Ledger, Role};
use idreg_fname::{
    generate_commit, Fname, NameConfig, NameError, NameEvent, NameRegistry, NameStatus,
    ReclaimAction, TokenId,
};
use idreg_testkit::{address, init_tracing, Payment, RecordingBank, TestChain, DAY, ETHER};
use proptest::prelude::*;
use std::sync::Arc;

/// 2024-03-01T00:00:00Z
const START: u64 = 1_709_251_200;
/// 2025-01-01T00:00:00Z
const JAN_1_2025: u64 = 1_735_689_600;
const SECRET: [u8; 32] = [0x5e; 32];

fn admin() -> Address {
    address(0xad)
}

fn moderator() -> Address {
    address(0x3d)
}

fn treasurer() -> Address {
    address(0x7e)
}

fn vault() -> Address {
    address(0x0f)
}

struct Fixture {
    chain: TestChain,
    bank: Arc<RecordingBank>,
    names: Ledger<NameRegistry>,
}

fn fixture() -> Fixture {
    init_tracing();
    let chain = TestChain::starting_at(START);
    let bank = RecordingBank::new();
    let access = AccessControl::with_owner(admin())
        .granting(Role::Admin, admin())
        .granting(Role::Moderator, moderator())
        .granting(Role::Treasurer, treasurer());
    let mut names = NameRegistry::new(&NameConfig::default(), access, bank.clone(), vault()).unwrap();
    names.disable_trusted_only(&chain.call(admin())).unwrap();
    Fixture {
        chain,
        bank,
        names: Ledger::new(names),
    }
}

fn register(f: &Fixture, name: &str, owner: Address) -> TokenId {
    let commit = generate_commit(name, &owner, &SECRET, &Address::ZERO).unwrap();
    f.names
        .transact(|n| n.make_commit(&f.chain.call(owner), commit))
        .unwrap();
    f.chain.advance(60);
    f.names
        .transact(|n| n.register(&f.chain.pay(owner, ETHER), name, owner, &SECRET, Address::ZERO))
        .unwrap()
}

#[test]
fn reveal_needs_the_full_delay() {
    let f = fixture();
    let alice = address(1);
    let commit = generate_commit("alice", &alice, &SECRET, &Address::ZERO).unwrap();
    let t0 = f.chain.now();
    f.names
        .transact(|n| n.make_commit(&f.chain.call(alice), commit))
        .unwrap();

    f.chain.warp_to(t0 + 59);
    assert_matches!(
        f.names
            .transact(|n| n.register(&f.chain.pay(alice, ETHER), "alice", alice, &SECRET, Address::ZERO)),
        Err(NameError::InvalidCommit)
    );
    assert_eq!(f.names.read(|n| n.commit_of(&commit)), Some(t0));

    f.chain.warp_to(t0 + 60);
    let token = f
        .names
        .transact(|n| n.register(&f.chain.pay(alice, ETHER), "alice", alice, &SECRET, Address::ZERO))
        .unwrap();
    assert_eq!(token, Fname::parse("alice").unwrap().token_id());
    assert_eq!(f.names.read(|n| n.commit_of(&commit)), None);
    assert_eq!(
        f.names.read(|n| n.record_of(token)).unwrap().expiry,
        JAN_1_2025
    );
}

#[test]
fn first_year_is_prorated_and_overpayment_refunded() {
    let f = fixture();
    let alice = address(1);
    let commit = generate_commit("alice", &alice, &SECRET, &Address::ZERO).unwrap();
    f.names
        .transact(|n| n.make_commit(&f.chain.call(alice), commit))
        .unwrap();
    f.chain.advance(60);
    let price = f
        .names
        .read(|n| n.registration_price(f.chain.now()))
        .unwrap();
    assert!(price < NameConfig::default().fee);

    assert_matches!(
        f.names.transact(|n| n.register(
            &f.chain.pay(alice, price - 1),
            "alice",
            alice,
            &SECRET,
            Address::ZERO
        )),
        Err(NameError::InsufficientFunds { required, .. }) if required == price
    );
    f.names
        .transact(|n| n.register(&f.chain.pay(alice, ETHER), "alice", alice, &SECRET, Address::ZERO))
        .unwrap();
    assert_eq!(
        f.bank.payments(),
        vec![Payment {
            to: alice,
            amount: ETHER - price
        }]
    );
    assert_eq!(f.names.read(NameRegistry::balance), price);

    f.names
        .transact(|n| n.withdraw(&f.chain.call(treasurer()), price))
        .unwrap();
    assert_eq!(f.bank.paid_to(vault()), price);
    assert_matches!(
        f.names.transact(|n| n.withdraw(&f.chain.call(treasurer()), 1)),
        Err(NameError::InsufficientBalance { .. })
    );
}

#[test]
fn grace_period_ends_in_an_auction() {
    let f = fixture();
    let alice = address(1);
    let bob = address(2);
    let token = register(&f, "alice", alice);

    f.chain.warp_to(JAN_1_2025 + 30 * DAY + 1);
    let fee = f.names.read(NameRegistry::fee);
    assert_matches!(
        f.names.transact(|n| n.renew(&f.chain.pay(alice, fee), token)),
        Err(NameError::NotRenewable)
    );

    let now = f.chain.now();
    let prorated = f.names.read(|n| n.registration_price(now)).unwrap();
    let expected = 1_000 * ETHER + prorated;
    assert_eq!(f.names.read(|n| n.bid_price(token, now)).unwrap(), expected);
    assert_matches!(
        f.names
            .transact(|n| n.bid(&f.chain.pay(bob, expected - 1), bob, token, Address::ZERO)),
        Err(NameError::InsufficientFunds { .. })
    );

    let paid = f
        .names
        .transact(|n| n.bid(&f.chain.pay(bob, expected + 5), bob, token, address(0xee)))
        .unwrap();
    assert_eq!(paid, expected);
    assert_eq!(f.bank.paid_to(bob), 5);
    assert_eq!(f.names.read(|n| n.owner_of(token, now)).unwrap(), bob);
    assert_eq!(f.names.read(|n| n.recovery_of(token)), Some(address(0xee)));
    assert_eq!(f.names.read(|n| n.status(token, now)), NameStatus::Registered);
}

#[test]
fn bidding_waits_for_the_grace_period() {
    let f = fixture();
    let token = register(&f, "alice", address(1));
    f.chain.warp_to(JAN_1_2025 + 30 * DAY - 1);
    assert_matches!(
        f.names
            .transact(|n| n.bid(&f.chain.pay(address(2), 2_000 * ETHER), address(2), token, Address::ZERO)),
        Err(NameError::NotBiddable)
    );
    let unminted = Fname::parse("ghost").unwrap().token_id();
    assert_matches!(
        f.names
            .transact(|n| n.bid(&f.chain.pay(address(2), ETHER), address(2), unminted, Address::ZERO)),
        Err(NameError::Registrable)
    );
}

#[test]
fn ownership_is_suspended_during_grace() {
    let f = fixture();
    let alice = address(1);
    let token = register(&f, "alice", alice);
    f.chain.warp_to(JAN_1_2025 + DAY);

    assert_matches!(
        f.names
            .transact(|n| n.transfer_from(&f.chain.call(alice), alice, address(2), token)),
        Err(NameError::Expired { expiry }) if expiry == JAN_1_2025
    );
    let fee = f.names.read(NameRegistry::fee);
    f.names
        .transact(|n| n.renew(&f.chain.pay(alice, fee), token))
        .unwrap();
    f.names
        .transact(|n| n.transfer_from(&f.chain.call(alice), alice, address(2), token))
        .unwrap();
}

#[test]
fn escrowed_name_recovery() {
    let f = fixture();
    let alice = address(1);
    let recovery = address(0xee);
    let destination = address(3);
    let token = register(&f, "alice", alice);
    f.names
        .transact(|n| n.change_recovery_address(&f.chain.call(alice), token, recovery))
        .unwrap();

    assert_matches!(
        f.names.transact(|n| n.cancel_recovery(&f.chain.call(alice), token)),
        Err(NameError::NoRecovery)
    );
    let t0 = f.chain.mine().timestamp;
    f.names
        .transact(|n| n.request_recovery(&f.chain.call(recovery), token, destination))
        .unwrap();

    f.chain.warp_to(t0 + 3 * DAY - 1);
    assert_matches!(
        f.names.transact(|n| n.complete_recovery(&f.chain.call(recovery), token)),
        Err(NameError::Escrow { .. })
    );
    f.chain.warp_to(t0 + 3 * DAY);
    f.names
        .transact(|n| n.complete_recovery(&f.chain.call(recovery), token))
        .unwrap();
    assert_eq!(
        f.names.read(|n| n.owner_of(token, t0 + 3 * DAY)).unwrap(),
        destination
    );
    assert_eq!(f.names.read(|n| n.recovery_of(token)), None);
}

#[test]
fn recovery_cannot_complete_after_expiry() {
    let f = fixture();
    let alice = address(1);
    let recovery = address(0xee);
    let token = register(&f, "alice", alice);
    f.names
        .transact(|n| n.change_recovery_address(&f.chain.call(alice), token, recovery))
        .unwrap();
    let t0 = f.chain.warp_to(JAN_1_2025 - DAY).timestamp;
    f.names
        .transact(|n| n.request_recovery(&f.chain.call(recovery), token, address(3)))
        .unwrap();
    f.chain.warp_to(t0 + 3 * DAY);
    assert_matches!(
        f.names.transact(|n| n.complete_recovery(&f.chain.call(recovery), token)),
        Err(NameError::Expired { .. })
    );
}

#[test]
fn moderator_reclaim_renews_lapsed_names() {
    let f = fixture();
    let alice = address(1);
    let token = register(&f, "alice", alice);
    f.chain.warp_to(JAN_1_2025 + DAY);
    let action = ReclaimAction {
        token,
        destination: address(4),
    };
    assert_matches!(
        f.names.transact(|n| n.reclaim(&f.chain.call(alice), &[action])),
        Err(NameError::Access(_))
    );
    f.names
        .transact(|n| n.reclaim(&f.chain.call(moderator()), &[action]))
        .unwrap();
    let now = f.chain.now();
    assert_eq!(f.names.read(|n| n.owner_of(token, now)).unwrap(), address(4));
    assert_matches!(
        f.names.read(|n| n.journal().last().cloned()),
        Some(NameEvent::Renew { expiry: 1_767_225_600, .. })
    );
}

#[test]
fn failed_step_in_a_batch_reclaim_rolls_back() {
    let f = fixture();
    let token = register(&f, "alice", address(1));
    let ghost = Fname::parse("ghost").unwrap().token_id();
    let actions = [
        ReclaimAction {
            token,
            destination: address(4),
        },
        ReclaimAction {
            token: ghost,
            destination: address(4),
        },
    ];
    let events = f.names.read(|n| n.journal().len());
    assert_matches!(
        f.names.transact(|n| n.reclaim(&f.chain.call(moderator()), &actions)),
        Err(NameError::Registrable)
    );
    let now = f.chain.now();
    assert_eq!(f.names.read(|n| n.owner_of(token, now)).unwrap(), address(1));
    assert_eq!(f.names.read(|n| n.journal().len()), events);
}

#[test]
fn trusted_register_journals_invite() {
    init_tracing();
    let chain = TestChain::starting_at(START);
    let trusted = address(0x77);
    let access = AccessControl::with_owner(admin()).granting(Role::Trusted, trusted);
    let mut names =
        NameRegistry::new(&NameConfig::default(), access, RecordingBank::new(), vault()).unwrap();
    assert_matches!(
        names.trusted_register(&chain.call(address(1)), address(1), "alice", Address::ZERO, Fid(1), Fid(2)),
        Err(NameError::Access(_))
    );
    names
        .trusted_register(&chain.call(trusted), address(1), "alice", Address::ZERO, Fid(1), Fid(2))
        .unwrap();
    assert_matches!(
        names.journal().last(),
        Some(NameEvent::Invite { inviter: Fid(1), invitee: Fid(2), .. })
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn status_is_monotonic_until_renewed(offsets in proptest::collection::vec(0u64..40 * DAY, 1..12)) {
        let f = fixture();
        let token = register(&f, "alice", address(1));
        let mut times: Vec<u64> = offsets.iter().map(|o| JAN_1_2025 - DAY + o).collect();
        times.sort_unstable();
        let rank = |s: NameStatus| match s {
            NameStatus::Registrable => 0,
            NameStatus::Registered => 1,
            NameStatus::Renewable => 2,
            NameStatus::Biddable => 3,
        };
        let mut last = 1;
        for t in times {
            let status = f.names.read(|n| n.status(token, t));
            prop_assert!(rank(status) >= last);
            last = rank(status);
        }
    }
}
