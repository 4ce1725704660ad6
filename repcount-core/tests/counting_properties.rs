use repcount_core::counting::{
    ContractionCounter, CountEdge, PhaseCounter, RepCounter, Stage, Threshold,
};
use repcount_core::profile::{Exercise, ExerciseProfile};

fn contraction_thresholds() -> Vec<Threshold> {
    [Exercise::KneeRaise, Exercise::ButtKick]
        .into_iter()
        .map(|e| ExerciseProfile::builtin(e).threshold)
        .collect()
}

#[test]
fn monotonic_sweep_counts_once_at_any_density() {
    for threshold in contraction_thresholds() {
        for steps in [2usize, 3, 7, 19, 180, 1000, 5000] {
            let mut counter = ContractionCounter::new(threshold);
            let mut first_hit = None;
            for i in 0..=steps {
                let angle = 180.0 - 180.0 * i as f32 / steps as f32;
                if counter.update(angle).completed && first_hit.is_none() {
                    first_hit = Some(angle);
                }
            }
            assert_eq!(counter.reps(), 1, "steps={steps} {threshold:?}");
            let hit = first_hit.unwrap();
            assert!(hit < threshold.low, "fired at {hit} for {threshold:?}");
        }
    }
}

#[test]
fn dead_zone_oscillation_never_counts() {
    for threshold in contraction_thresholds() {
        let mut counter = ContractionCounter::new(threshold);
        let span = threshold.high - threshold.low;
        for i in 0..500 {
            // Triangle wave strictly inside (low, high), touching both bounds.
            let phase = (i % 20) as f32 / 19.0;
            let wave = if (i / 20) % 2 == 0 { phase } else { 1.0 - phase };
            let angle = threshold.low + span * wave;
            assert!(!counter.update(angle).completed);
        }
        assert_eq!(counter.reps(), 0);
    }
}

#[test]
fn dead_zone_oscillation_never_counts_phase() {
    let leg = ExerciseProfile::builtin(Exercise::LegRaise).threshold;
    let mut counter = PhaseCounter::new(leg, CountEdge::EnterDown, Some(Stage::Down));
    for angle in [60.0, 149.9, 61.0, 150.0, 100.0, 60.0].repeat(50) {
        assert!(!counter.update(angle).completed);
    }
    assert_eq!(counter.state(), Some(Stage::Down));
}

#[test]
fn glute_bridge_counts_on_third_sample() {
    let threshold = ExerciseProfile::builtin(Exercise::GluteBridge).threshold;
    let mut counter = PhaseCounter::new(threshold, CountEdge::EnterUp, None);
    let completed: Vec<bool> = [170.0, 100.0, 175.0]
        .into_iter()
        .map(|a| counter.update(a).completed)
        .collect();
    assert_eq!(completed, [false, false, true]);
    assert_eq!(counter.reps(), 1);
}

#[test]
fn leg_raise_counts_on_the_way_down() {
    let threshold = ExerciseProfile::builtin(Exercise::LegRaise).threshold;
    let mut counter = PhaseCounter::new(threshold, CountEdge::EnterDown, Some(Stage::Down));
    let completed: Vec<bool> = [170.0, 40.0, 175.0, 30.0, 35.0]
        .into_iter()
        .map(|a| counter.update(a).completed)
        .collect();
    assert_eq!(completed, [false, true, false, true, false]);
    assert_eq!(counter.reps(), 2);
}

#[test]
fn reps_never_decrease() {
    let threshold = ExerciseProfile::builtin(Exercise::KneeRaise).threshold;
    let mut counter = ContractionCounter::new(threshold);
    let mut last = 0;
    for i in 0..2000u32 {
        // Deterministic pseudo-noise across the whole range.
        let angle = ((i.wrapping_mul(2654435761) >> 8) % 181) as f32;
        counter.update(angle);
        assert!(counter.reps() >= last);
        assert!(counter.reps() - last <= 1);
        last = counter.reps();
    }
}
