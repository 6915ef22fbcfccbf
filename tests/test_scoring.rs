use wave_shooter::scoring::*;

#[test]
fn multiplier_tiers() {
    assert_eq!(combo_multiplier(0), 1);
    assert_eq!(combo_multiplier(4), 1);
    assert_eq!(combo_multiplier(5), 2);
    assert_eq!(combo_multiplier(9), 2);
    assert_eq!(combo_multiplier(10), 3);
    assert_eq!(combo_multiplier(14), 3);
    assert_eq!(combo_multiplier(15), 4);
    assert_eq!(combo_multiplier(1000), 4);
}

#[test]
fn multiplier_is_monotonic() {
    let mut previous = 0;
    for streak in 0..200 {
        let m = combo_multiplier(streak);
        assert!(m >= previous);
        assert!((1..=4).contains(&m));
        previous = m;
    }
}

#[test]
fn points_use_multiplier() {
    assert_eq!(points_for(10, 0), 10);
    assert_eq!(points_for(30, 12), 90);
    assert_eq!(points_for(50, 99), 200);
}

#[test]
fn tracker_scores_then_extends_streak() {
    let mut combo = ComboTracker::default();
    let total: u64 = (0..6).map(|_| combo.register_kill(10)).sum();
    // five kills at ×1, the sixth at ×2
    assert_eq!(total, 70);
    assert_eq!(combo.streak, 6);
    assert_eq!(combo.multiplier(), 2);
}

#[test]
fn damage_breaks_streak_but_not_peak() {
    let mut combo = ComboTracker::default();
    for _ in 0..8 {
        let _ = combo.register_kill(10);
    }
    combo.break_streak();
    assert_eq!(combo.streak, 0);
    assert_eq!(combo.peak, 8);
    assert_eq!(combo.multiplier(), 1);

    let _ = combo.register_kill(10);
    assert_eq!(combo.peak, 8);
}
