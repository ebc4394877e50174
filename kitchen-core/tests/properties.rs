use kitchen_core::{
    classify_distance, Customer, Flavor, FlavorSpace, FlavorVector, GoalMatcher, Handicap,
    Ingredient, PatienceModel, Point2, Pot, ScoreAccumulator, ScoringConfig, Tier,
};

fn blend(spicy: f64, savory: f64, sweet: f64) -> FlavorVector {
    FlavorVector::new(spicy, savory, sweet).normalized()
}

// === Classification ===

#[test]
fn classifier_bounds_are_exclusive() {
    let spread = 0.5;
    assert_eq!(classify_distance(0.0, spread), Tier::Great);
    assert_eq!(classify_distance(0.249_999, spread), Tier::Great);
    assert_eq!(classify_distance(0.25, spread), Tier::Okay);
    assert_eq!(classify_distance(0.499_999, spread), Tier::Okay);
    assert_eq!(classify_distance(0.5, spread), Tier::Bad);
    assert_eq!(classify_distance(2.0, spread), Tier::Bad);
}

#[test]
fn classifier_is_monotonic_in_distance() {
    let mut matcher = GoalMatcher::new();
    let goal = blend(20.0, 30.0, 50.0);
    matcher.set_goal(goal, 0.4);

    // Walk from the goal toward the spicy corner.
    let corner = blend(100.0, 0.0, 0.0);
    let mut last_tier = Tier::Great;
    let mut last_dist = 0.0;
    for step in 0..=50 {
        let t = step as f64 / 50.0;
        let mut candidate = FlavorVector::default();
        for flavor in Flavor::gameplay() {
            candidate[flavor] = goal[flavor] * (1.0 - t) + corner[flavor] * t;
        }
        let dist = matcher.distance(&candidate).unwrap();
        let tier = matcher.classify(&candidate);
        assert!(dist >= last_dist);
        assert!(tier <= last_tier, "tier rose from {last_tier:?} to {tier:?} at t={t}");
        last_dist = dist;
        last_tier = tier;
    }
    assert_eq!(last_tier, Tier::Bad);
}

#[test]
fn no_goal_is_bad() {
    let matcher = GoalMatcher::new();
    assert_eq!(matcher.classify(&FlavorVector::uniform()), Tier::Bad);
    assert_eq!(matcher.distance(&FlavorVector::uniform()), None);
}

#[test]
fn distance_ignores_radius() {
    let a = blend(100.0, 0.0, 0.0);
    let b = blend(0.0, 100.0, 0.0);
    // Two vertices of a unit-circumradius triangle are √3 apart.
    assert!((FlavorSpace::distance(&a, &b) - 3f64.sqrt()).abs() < 1e-12);
}

#[test]
fn point_round_trip_for_interior_blends() {
    let space = FlavorSpace::new(180.0);
    for b in [blend(10.0, 20.0, 70.0), blend(50.0, 25.0, 25.0), FlavorVector::uniform()] {
        let back = space.from_point(space.to_point(&b));
        assert!(back.approx_eq(&b, 1e-9), "{b:?} -> {back:?}");
    }
    assert_eq!(space.to_point(&FlavorVector::uniform()), Point2::new(0.0, 0.0));
}

// === Mixing ===

#[test]
fn uniform_ingredient_is_a_noop() {
    let mut pot = Pot::new();
    pot.add_profile(&blend(70.0, 20.0, 10.0));
    let before = *pot.blend();

    let neutral = Ingredient::from_raw_profile("water", FlavorVector::new(5.0, 5.0, 5.0));
    pot.add_ingredient(&neutral);
    assert!(pot.blend().approx_eq(&before, 1e-9));
    assert_eq!(pot.ingredient_count(), 2);
}

#[test]
fn raw_profiles_are_biased_to_center() {
    let honey = Ingredient::from_raw_profile("honey", FlavorVector::new(0.0, 0.0, 100.0));
    assert!(honey.flavors.approx_eq(&FlavorVector::new(25.0, 25.0, 50.0), 1e-9));
    assert_eq!(honey.primary_flavor(), Some(Flavor::Sweet));

    let flat = Ingredient::from_raw_profile("flat", FlavorVector::new(0.0, 0.0, 0.0));
    assert_eq!(flat.primary_flavor(), None);
}

#[test]
fn negative_components_clamp_before_normalizing() {
    let mut pot = Pot::new();
    for _ in 0..5 {
        pot.add_profile(&blend(100.0, 0.0, 0.0));
    }
    let b = pot.blend();
    assert_eq!(b.savory, 0.0);
    assert_eq!(b.sweet, 0.0);
    assert!((b.spicy - 100.0).abs() < 1e-9);
}

// === Patience ===

#[test]
fn warmup_budgets_are_fixed() {
    let model = PatienceModel::default();
    let mut handicap = Handicap::default();
    handicap.penalize(30.0);
    assert_eq!(model.budget(1, &handicap), Some(120.0));
    assert_eq!(model.budget(2, &handicap), Some(60.0));
    assert_eq!(model.budget(3, &handicap), Some(30.0));
    assert_eq!(model.budget(0, &handicap), None);
    assert_eq!(model.budget(-1, &handicap), None);
}

#[test]
fn ramp_decreases_after_warmup() {
    let model = PatienceModel::default();
    let handicap = Handicap::default();
    let n4 = model.budget(4, &handicap).unwrap();
    // 20 * (3 + 8) / (4 + 8)
    assert!((n4 - 55.0 / 3.0).abs() < 1e-12);

    let mut last = f64::INFINITY;
    for n in 4..200 {
        let budget = model.budget(n, &handicap).unwrap();
        assert!(budget < last, "n={n}: {budget} >= {last}");
        assert!(budget > 0.0);
        last = budget;
    }
}

#[test]
fn handicap_rubber_band() {
    let model = PatienceModel::default();
    let mut handicap = Handicap::default();
    model.on_timeout(&mut handicap);
    assert_eq!(handicap.value(), 10.0);
    model.on_served(&mut handicap);
    assert_eq!(handicap.value(), 5.0);

    let plain = model.budget(10, &Handicap::default()).unwrap();
    assert!((model.budget(10, &handicap).unwrap() - plain - 5.0).abs() < 1e-12);
}

#[test]
fn timeout_boundary() {
    let mut customer = Customer::new(
        1,
        Point2::new(0.0, 0.0),
        0.5,
        FlavorVector::uniform(),
        Some(30.0),
        Point2::new(-200.0, 0.0),
    );
    customer.speak();
    customer.time_left = -0.04;
    assert!(!customer.has_timed_out(0.05));
    customer.time_left = -0.06;
    assert!(customer.has_timed_out(0.05));
}

// === Scoring ===

#[test]
fn score_scenario() {
    let mut score = ScoreAccumulator::new();
    score.record(Tier::Great, 0.5);
    score.record(Tier::Great, 0.5);
    score.record(Tier::Okay, 0.5);
    score.record(Tier::Bad, 0.5);

    let b = score.breakdown(&ScoringConfig::default());
    assert_eq!(b.customers_served, 4);
    assert_eq!(b.rating_multiplier, 3.5);
    assert_eq!(b.quick_bonus, 1000);
    assert_eq!(b.raw_score, 400);
    assert_eq!(b.final_score, 400 * 7 / 2 + 1000);
}

#[test]
fn empty_score_is_zero() {
    let b = ScoreAccumulator::new().breakdown(&ScoringConfig::default());
    assert_eq!(b.final_score, 0);
    assert_eq!(b.rating_multiplier, 0.0);
    assert_eq!(b.quick_bonus, 0);
}
