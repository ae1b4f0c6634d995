//! End-to-end flows across the whole casino: one economy shared by every
//! game, with the ledger and persistence observable from the outside.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use minivegas::slots::WinKind;
use minivegas::{Casino, Config, Error};

#[tokio::test(start_paused = true)]
async fn slots_session_keeps_the_books_straight() {
    let dir = tempfile::tempdir().unwrap();
    let casino = Casino::with_seed(Config::default(), dir.path(), 42).unwrap();
    casino.add_coins(1_000).unwrap();

    let mut expected = 1_000u64;
    for _ in 0..10 {
        let report = casino.spin_slots(5).await.unwrap();
        expected = expected - 5 + report.payout;
        assert_eq!(report.balance, expected);

        let multiplier = match report.outcome.kind() {
            WinKind::None => 0,
            WinKind::Vertical => 10,
            WinKind::Horizontal => 15,
            WinKind::BigWin => 100,
        };
        assert_eq!(report.payout, 5 * multiplier);
    }
    assert_eq!(casino.balance(), expected);
}

#[tokio::test(start_paused = true)]
async fn every_game_settles_through_one_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let casino = Casino::with_seed(Config::default(), dir.path(), 7).unwrap();
    casino.add_coins(10_000).unwrap();

    let notifications = Arc::new(AtomicU64::new(0));
    let _watch = {
        let notifications = Arc::clone(&notifications);
        casino.watch_balance(move |_| {
            notifications.fetch_add(1, Ordering::SeqCst);
        })
    };

    let spin = casino.spin_slots(10).await.unwrap();
    let thimble = casino.play_thimble(10, 1).unwrap();
    let volley = casino.drop_volley(3, 10).unwrap();

    let expected = 10_000 - 10 + spin.payout - 10 + thimble.payout - 30 + volley.won;
    assert_eq!(casino.balance(), expected);

    // Every successful mutation notified: the slots debit (+credit on a
    // win), the thimble debit (+credit on a win), the volley debit and one
    // credit per paying ball
    let mut mutations = 1 + 1 + 1;
    if spin.payout > 0 {
        mutations += 1;
    }
    if thimble.payout > 0 {
        mutations += 1;
    }
    mutations += volley.balls.iter().filter(|b| b.payout > 0).count() as u64;
    assert_eq!(notifications.load(Ordering::SeqCst), mutations);
}

#[tokio::test(start_paused = true)]
async fn rejected_commands_leave_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let casino = Casino::with_seed(Config::default(), dir.path(), 3).unwrap();
    casino.add_coins(8).unwrap();

    assert!(matches!(
        casino.spin_slots(0).await,
        Err(Error::InvalidBet { .. })
    ));
    assert!(matches!(
        casino.spin_slots(11).await,
        Err(Error::InvalidBet { .. })
    ));
    assert!(matches!(
        casino.spin_slots(9).await,
        Err(Error::InsufficientFunds { .. })
    ));
    assert!(matches!(
        casino.play_thimble(9, 0),
        Err(Error::InsufficientFunds { .. })
    ));
    assert!(matches!(
        casino.drop_volley(5, 100),
        Err(Error::InsufficientFunds { .. })
    ));
    assert!(matches!(
        casino.open_reward_box("purple"),
        Err(Error::GateNotFound(_))
    ));

    assert_eq!(casino.balance(), 8);
}

#[tokio::test(start_paused = true)]
async fn coins_persist_between_sessions() {
    let dir = tempfile::tempdir().unwrap();

    let after_play = {
        let casino = Casino::with_seed(Config::default(), dir.path(), 11).unwrap();
        casino.add_coins(500).unwrap();
        casino.spin_slots(5).await.unwrap();
        casino.balance()
    };

    let casino = Casino::with_seed(Config::default(), dir.path(), 11).unwrap();
    assert_eq!(casino.balance(), after_play);
}

#[tokio::test(start_paused = true)]
async fn seeded_sessions_replay_identically() {
    let run = |seed: u64| async move {
        let dir = tempfile::tempdir().unwrap();
        let casino = Casino::with_seed(Config::default(), dir.path(), seed).unwrap();
        casino.add_coins(1_000).unwrap();

        let mut balances = Vec::new();
        for _ in 0..5 {
            balances.push(casino.spin_slots(5).await.unwrap().balance);
        }
        balances.push(casino.play_thimble(5, 2).unwrap().balance);
        balances.push(casino.drop_volley(5, 5).unwrap().balance);
        balances
    };

    assert_eq!(run(99).await, run(99).await);
}
