use repcount_core::counting::{Counting, Threshold};
use repcount_core::profile::{Exercise, ExerciseProfile};
use tempfile::tempdir;

#[test]
fn builtin_profiles_survive_toml() {
    let dir = tempdir().unwrap();
    for exercise in Exercise::ALL {
        let path = dir.path().join(format!("{exercise}.toml"));
        let profile = ExerciseProfile::builtin(exercise);
        profile.save(&path).unwrap();
        assert_eq!(ExerciseProfile::load(&path).unwrap(), profile);
    }
}

#[test]
fn edited_thresholds_are_picked_up() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("knee.toml");
    let mut profile = ExerciseProfile::builtin(Exercise::KneeRaise);
    profile.threshold = Threshold::new(90.0, 150.0);
    profile.announce_every = 1;
    profile.save(&path).unwrap();

    let loaded = ExerciseProfile::load(&path).unwrap();
    assert_eq!(loaded.threshold, Threshold::new(90.0, 150.0));
    assert_eq!(loaded.counting, Counting::Contraction);
    assert_eq!(loaded.announce_every, 1);
}

#[test]
fn minimal_profile_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("minimal.toml");
    std::fs::write(
        &path,
        r#"
exercise = "butt-kick"
name = "Soft butt kicks"
rep_message = "{side} {reps}"
threshold = { low = 60.0, high = 110.0 }
counting = { kind = "contraction" }

[[limbs]]
side = "left"
proximal = "left_hip"
vertex = "left_knee"
distal = "left_ankle"
"#,
    )
    .unwrap();

    let profile = ExerciseProfile::load(&path).unwrap();
    assert_eq!(profile.announce_every, 1);
    assert_eq!(profile.min_visibility, 0.5);
    assert!(profile.feedback_bands.is_empty());
    assert!(profile.start_message.is_none());
    assert_eq!(profile.frame_stride, 1);
    assert!(!profile.reset_feedback_on_rep);
}

#[test]
fn invalid_profile_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    let mut profile = ExerciseProfile::builtin(Exercise::LegRaise);
    profile.announce_every = 0;
    profile.save(&path).unwrap();
    assert!(ExerciseProfile::load(&path).is_err());
    assert!(ExerciseProfile::load(dir.path().join("missing.toml")).is_err());
}
