//! Price oracle behavior against scripted feeds

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use idreg_core::{Categorized, ErrorCategory, PriceFeed};
use idreg_oracle::{quote, FeedKind, OracleConfig, OracleError, OracleEvent, PriceOracle};
use idreg_testkit::{init_tracing, FakePriceFeed, TestChain, DAY, USD};
use proptest::prelude::*;
use std::sync::Arc;

const START: u64 = 1_700_000_000;

fn oracle_on(chain: &TestChain, price: &Arc<FakePriceFeed>) -> PriceOracle {
    let feed: Arc<dyn PriceFeed> = price.clone();
    PriceOracle::new(OracleConfig::default(), feed, None, chain.block()).unwrap()
}

#[test]
fn storage_unit_quote_at_two_thousand_dollars() {
    init_tracing();
    let chain = TestChain::starting_at(START);
    let feed = FakePriceFeed::price(2_000 * USD as i128, START);
    let mut oracle = oracle_on(&chain, &feed);

    let block = chain.mine();
    let eth_usd = oracle.current_price(block).unwrap();
    assert_eq!(quote(1, 5 * USD, eth_usd).unwrap(), 2_500_000_000_000_000);
}

#[test]
fn construction_fails_on_bad_feed() {
    let chain = TestChain::starting_at(START);
    let feed = FakePriceFeed::price(2_000 * USD as i128, START);
    feed.fail("rpc timeout");
    let result = PriceOracle::new(OracleConfig::default(), feed, None, chain.block());
    assert_matches!(
        result,
        Err(OracleError::Feed {
            feed: FeedKind::Price,
            ..
        })
    );
}

#[test]
fn refresh_is_journaled_with_previous_price() {
    let chain = TestChain::starting_at(START);
    let feed = FakePriceFeed::price(2_000 * USD as i128, START);
    let mut oracle = oracle_on(&chain, &feed);

    let block = chain.advance(60);
    feed.answer(2_100 * USD as i128, block.timestamp);
    oracle.refresh_price(block).unwrap();

    let events: Vec<_> = oracle.journal().events().cloned().collect();
    assert_eq!(
        events,
        vec![
            OracleEvent::PriceRefreshed {
                previous: 2_000 * USD,
                current: 2_000 * USD,
            },
            OracleEvent::PriceRefreshed {
                previous: 2_000 * USD,
                current: 2_100 * USD,
            },
        ]
    );
}

#[test]
fn rejected_refresh_keeps_cached_price() {
    let chain = TestChain::starting_at(START);
    let feed = FakePriceFeed::price(2_000 * USD as i128, START);
    let mut oracle = oracle_on(&chain, &feed);

    let block = chain.advance(DAY + 1);
    // last answer is now a day old
    let err = oracle.current_price(block).unwrap_err();
    assert_matches!(err, OracleError::StaleAnswer { feed: FeedKind::Price });
    assert_eq!(err.category(), ErrorCategory::ExternalDependency);
    assert_eq!(oracle.eth_usd_price(), 2_000 * USD);
    assert_eq!(oracle.last_update_time(), START);
}

#[test]
fn carried_over_round_is_stale() {
    let chain = TestChain::starting_at(START);
    let feed = FakePriceFeed::price(2_000 * USD as i128, START);
    let mut oracle = oracle_on(&chain, &feed);

    let block = chain.mine();
    let mut round = FakePriceFeed::round(5, 2_000 * USD as i128, block.timestamp);
    round.answered_in_round = 4;
    feed.set_round(round);
    assert_matches!(
        oracle.refresh_price(block),
        Err(OracleError::StaleAnswer { feed: FeedKind::Price })
    );
}

#[test]
fn uptime_feed_gates_refresh() {
    let chain = TestChain::starting_at(START);
    let price = FakePriceFeed::price(2_000 * USD as i128, START);
    let uptime = FakePriceFeed::uptime(START - 2 * 3_600);
    let mut oracle = PriceOracle::new(
        OracleConfig::default(),
        price.clone(),
        Some(uptime.clone()),
        chain.block(),
    )
    .unwrap();

    let block = chain.mine();
    price.answer(2_000 * USD as i128, block.timestamp);

    uptime.answer(1, block.timestamp - 10);
    assert_matches!(oracle.refresh_price(block), Err(OracleError::SequencerDown));

    // back up, but only for ten seconds
    uptime.answer(0, block.timestamp - 10);
    assert_matches!(
        oracle.refresh_price(block),
        Err(OracleError::GracePeriodNotOver { .. })
    );

    let later = chain.advance(3_600);
    price.answer(2_000 * USD as i128, later.timestamp);
    oracle.refresh_price(later).unwrap();
}

#[test]
fn uptime_round_must_be_complete() {
    let chain = TestChain::starting_at(START);
    let price = FakePriceFeed::price(2_000 * USD as i128, START);
    let uptime = FakePriceFeed::uptime(START - 2 * 3_600);
    uptime.set_round(FakePriceFeed::round(0, 0, START - 2 * 3_600));
    let result = PriceOracle::new(OracleConfig::default(), price, Some(uptime), chain.block());
    assert_matches!(
        result,
        Err(OracleError::IncompleteRound {
            feed: FeedKind::Uptime
        })
    );
}

#[test]
fn fixed_price_config_skips_initial_refresh() {
    let chain = TestChain::starting_at(START);
    let feed = FakePriceFeed::price(2_000 * USD as i128, START);
    feed.fail("not deployed");
    let config = OracleConfig {
        fixed_eth_usd_price: 3_000 * USD,
        ..OracleConfig::default()
    };
    let mut oracle = PriceOracle::new(config, feed, None, chain.block()).unwrap();
    assert_eq!(oracle.current_price(chain.mine()).unwrap(), 3_000 * USD);

    assert_eq!(oracle.set_fixed_price(0).unwrap(), 3_000 * USD);
    assert_matches!(oracle.current_price(chain.mine()), Err(OracleError::Feed { .. }));
}

proptest! {
    #[test]
    fn quote_never_undercharges(units in 1u64..10_000, usd in 1u128..1_000 * USD, eth in 100 * USD..10_000 * USD) {
        let wei = quote(units, usd, eth).unwrap();
        let owed = u128::from(units) * usd * 1_000_000_000_000_000_000;
        prop_assert!(wei * eth >= owed);
        prop_assert!((wei - 1) * eth < owed);
    }
}
