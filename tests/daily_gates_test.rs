//! Cooldown gating across the wheel and the reward boxes, including the
//! persisted timestamps surviving a restart.

use chrono::{DateTime, Duration, TimeZone, Utc};
use minivegas::{Casino, Config, Error};

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#[test]
fn wheel_gate_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    let coins = {
        let casino = Casino::with_seed(Config::default(), dir.path(), 5).unwrap();
        casino.wheel.spin(noon()).unwrap().coins
    };

    let casino = Casino::with_seed(Config::default(), dir.path(), 5).unwrap();
    assert_eq!(casino.balance(), coins);

    // Still gated an hour later, across the restart
    let result = casino.wheel.spin(noon() + Duration::hours(1));
    assert!(matches!(result, Err(Error::CooldownActive { .. })));
    assert_eq!(
        casino.wheel.time_remaining(noon() + Duration::hours(1)),
        Duration::hours(23)
    );

    // Exactly one window after the recorded spin the wheel reopens
    casino.wheel.spin(noon() + Duration::hours(24)).unwrap();
}

#[test]
fn each_box_keeps_its_own_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let casino = Casino::with_seed(Config::default(), dir.path(), 6).unwrap();

    casino.rewards.open("red", noon()).unwrap();
    casino
        .rewards
        .open("green", noon() + Duration::hours(2))
        .unwrap();

    let at = noon() + Duration::hours(12);
    let statuses = casino.rewards.statuses(at);
    let by_id = |id: &str| {
        statuses
            .iter()
            .find(|s| s.box_id == id)
            .unwrap()
            .remaining
    };

    assert_eq!(by_id("red"), Duration::hours(12));
    assert_eq!(by_id("green"), Duration::hours(14));
    assert_eq!(by_id("blue"), Duration::zero());

    // Red reopens first
    assert!(matches!(
        casino.rewards.open("red", noon() + Duration::hours(23)),
        Err(Error::CooldownActive { .. })
    ));
    casino
        .rewards
        .open("red", noon() + Duration::hours(24))
        .unwrap();
}

#[test]
fn gates_do_not_interfere_across_features() {
    let dir = tempfile::tempdir().unwrap();
    let casino = Casino::with_seed(Config::default(), dir.path(), 8).unwrap();

    // Closing the wheel leaves every box open, and vice versa
    casino.wheel.spin(noon()).unwrap();
    casino.rewards.open("red", noon()).unwrap();
    casino.rewards.open("green", noon()).unwrap();
    casino.rewards.open("blue", noon()).unwrap();

    assert!(matches!(
        casino.wheel.spin(noon()),
        Err(Error::CooldownActive { .. })
    ));
}

#[test]
fn box_openings_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let casino = Casino::with_seed(Config::default(), dir.path(), 9).unwrap();
        casino.rewards.open("blue", noon()).unwrap();
    }

    let casino = Casino::with_seed(Config::default(), dir.path(), 9).unwrap();
    assert!(matches!(
        casino.rewards.open("blue", noon() + Duration::hours(5)),
        Err(Error::CooldownActive { .. })
    ));
    casino
        .rewards
        .open("blue", noon() + Duration::days(1))
        .unwrap();
}
