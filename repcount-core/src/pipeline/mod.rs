use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info};

use crate::counting::LimbCounter;
use crate::feedback::{classify, render_rep_message, FeedbackCategory, FeedbackDispatcher};
use crate::geometry::joint_angle;
use crate::landmarks::{Joint, PoseFrame, Side};
use crate::profile::{Exercise, ExerciseProfile, LimbJoints};
use crate::source::LandmarkSource;
use crate::speech::SpeechWorker;

/// Processed frames between timing summaries.
const PROFILE_EVERY: u64 = 300;

// ── Per-frame output ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LimbReading {
    pub side: Side,
    pub angle: Option<f32>,
    pub reps: u32,
    pub completed: bool,
    pub stage: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    pub person_detected: bool,
    pub limbs: Vec<LimbReading>,
    /// Sentences to speak for this frame, in order.
    pub messages: Vec<String>,
    /// Feedback category issued on this frame, if it changed.
    pub feedback: Option<FeedbackCategory>,
}

impl FrameOutcome {
    pub fn reps_completed(&self) -> usize {
        self.limbs.iter().filter(|l| l.completed).count()
    }
}

// ── ExerciseTracker ──────────────────────────────────────────────────────────

struct Limb {
    joints: LimbJoints,
    counter: LimbCounter,
}

/// Person gate → joint angle → counter → feedback, one frame at a time.
pub struct ExerciseTracker {
    profile: ExerciseProfile,
    required: Vec<Joint>,
    limbs: Vec<Limb>,
    feedback: FeedbackDispatcher,
}

impl ExerciseTracker {
    pub fn new(profile: ExerciseProfile) -> Result<Self> {
        profile.validate()?;
        let required = profile.required_joints();
        let limbs = profile
            .limbs
            .iter()
            .map(|&joints| Limb {
                joints,
                counter: LimbCounter::new(profile.counting, profile.threshold),
            })
            .collect();

        Ok(Self {
            profile,
            required,
            limbs,
            feedback: FeedbackDispatcher::new(),
        })
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    pub fn reps(&self, side: Side) -> Option<u32> {
        self.limbs
            .iter()
            .find(|l| l.joints.side == side)
            .map(|l| l.counter.reps())
    }

    pub fn all_reps(&self) -> Vec<(Side, u32)> {
        self.limbs
            .iter()
            .map(|l| (l.joints.side, l.counter.reps()))
            .collect()
    }

    pub fn process(&mut self, frame: &PoseFrame) -> FrameOutcome {
        let person_detected = frame.person_detected(&self.required, self.profile.min_visibility);
        let mut outcome = FrameOutcome {
            person_detected,
            ..FrameOutcome::default()
        };

        if !person_detected {
            if let Some(category) = self.feedback.observe(FeedbackCategory::NoPerson) {
                outcome.feedback = Some(category);
                outcome
                    .messages
                    .push(self.profile.no_person_message.clone());
            }
            outcome.limbs = self
                .limbs
                .iter()
                .map(|l| LimbReading {
                    side: l.joints.side,
                    angle: None,
                    reps: l.counter.reps(),
                    completed: false,
                    stage: l.counter.stage_label(),
                })
                .collect();
            return outcome;
        }

        // Back in view: the next absence must be announced again.
        if self.feedback.last() == Some(FeedbackCategory::NoPerson) {
            self.feedback.reset();
        }

        let space = self.profile.space;
        let mut any_completed = false;
        for limb in &mut self.limbs {
            let j = limb.joints;
            let angle = match (
                frame.point(j.proximal, space),
                frame.point(j.vertex, space),
                frame.point(j.distal, space),
            ) {
                (Some(a), Some(b), Some(c)) => Some(joint_angle(a, b, c)),
                _ => None,
            };

            let completed = angle.is_some_and(|a| limb.counter.update(a));
            let reps = limb.counter.reps();
            if completed {
                any_completed = true;
                debug!(side = ?j.side, reps, "rep completed");
                if reps % self.profile.announce_every == 0 {
                    outcome.messages.push(render_rep_message(
                        &self.profile.rep_message,
                        j.side.label(),
                        reps,
                    ));
                }
            }

            outcome.limbs.push(LimbReading {
                side: j.side,
                angle,
                reps,
                completed,
                stage: limb.counter.stage_label(),
            });
        }

        if any_completed && self.profile.reset_feedback_on_rep {
            self.feedback.reset();
        }

        // Posture guidance follows the primary limb.
        let primary_angle = outcome.limbs.first().and_then(|l| l.angle);
        if let Some(band) = primary_angle.and_then(|a| classify(&self.profile.feedback_bands, a)) {
            if let Some(category) = self.feedback.observe(band.category) {
                outcome.feedback = Some(category);
                outcome.messages.push(band.message.clone());
            }
        }

        outcome
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Process only every Nth frame read from the source.
    pub frame_stride: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { frame_stride: 1 }
    }
}

impl SessionOptions {
    /// Options carrying the profile's own sampling stride.
    pub fn for_profile(profile: &ExerciseProfile) -> Self {
        Self {
            frame_stride: profile.frame_stride,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub exercise: Exercise,
    pub frames_read: u64,
    pub frames_processed: u64,
    pub reps: Vec<(Side, u32)>,
    pub elapsed: Duration,
    pub speech_superseded: u64,
}

impl SessionSummary {
    pub fn total_reps(&self) -> u32 {
        self.reps.iter().map(|(_, n)| n).sum()
    }
}

/// One counting run: owns the landmark source, the tracker and the speech
/// worker. The source is released on every exit path, including drop after
/// an error.
pub struct Session<S: LandmarkSource> {
    source: S,
    tracker: ExerciseTracker,
    speech: Option<SpeechWorker>,
    options: SessionOptions,
    frames_read: u64,
    frames_processed: u64,
    started: Instant,
    prof_process: Duration,
    closed: bool,
}

impl<S: LandmarkSource> Session<S> {
    pub fn open(
        source: S,
        profile: ExerciseProfile,
        speech: Option<SpeechWorker>,
        options: SessionOptions,
    ) -> Result<Self> {
        anyhow::ensure!(options.frame_stride > 0, "frame stride must be at least 1");

        let tracker = ExerciseTracker::new(profile)?;
        info!(
            exercise = %tracker.profile().exercise,
            low = tracker.profile().threshold.low,
            high = tracker.profile().threshold.high,
            stride = options.frame_stride,
            "session opened"
        );

        let session = Self {
            source,
            tracker,
            speech,
            options,
            frames_read: 0,
            frames_processed: 0,
            started: Instant::now(),
            prof_process: Duration::ZERO,
            closed: false,
        };
        if let Some(msg) = session.tracker.profile().start_message.clone() {
            session.say(msg);
        }
        Ok(session)
    }

    pub fn tracker(&self) -> &ExerciseTracker {
        &self.tracker
    }

    /// Read frames until the source is exhausted. `progress_fn` receives each
    /// processed frame's outcome together with `(frames_read, total)`.
    pub fn run<F>(&mut self, mut progress_fn: F) -> Result<()>
    where
        F: FnMut(&FrameOutcome, u64, u64),
    {
        let total = self.source.len_hint().unwrap_or(0);

        while let Some(frame) = self.source.next_frame()? {
            self.frames_read += 1;
            if self.frames_read % self.options.frame_stride as u64 != 0 {
                continue;
            }

            let process_start = Instant::now();
            let outcome = self.tracker.process(&frame);
            self.prof_process += process_start.elapsed();
            self.frames_processed += 1;

            if !outcome.messages.is_empty() {
                // One utterance per frame so the single speech slot never
                // drops a rep count in favour of the guidance spoken with it.
                self.say(outcome.messages.join(" "));
            }

            progress_fn(&outcome, self.frames_read, total);

            if self.frames_processed % PROFILE_EVERY == 0 {
                info!(
                    frames = self.frames_processed,
                    process_us_per_frame = format!(
                        "{:.1}",
                        self.prof_process.as_secs_f64() * 1e6 / self.frames_processed as f64
                    ),
                    "session timings"
                );
            }
        }

        Ok(())
    }

    /// Speak the closing message, stop the speech worker and release the
    /// source.
    pub fn close(mut self) -> SessionSummary {
        if let Some(msg) = self.tracker.profile().end_message.clone() {
            self.say(msg);
        }
        let speech_superseded = match self.speech.take() {
            Some(worker) => {
                let n = worker.superseded();
                worker.shutdown();
                n
            }
            None => 0,
        };
        self.release();

        let summary = SessionSummary {
            exercise: self.tracker.profile().exercise,
            frames_read: self.frames_read,
            frames_processed: self.frames_processed,
            reps: self.tracker.all_reps(),
            elapsed: self.started.elapsed(),
            speech_superseded,
        };
        info!(
            frames = summary.frames_read,
            processed = summary.frames_processed,
            reps = summary.total_reps(),
            "session closed"
        );
        summary
    }

    fn say(&self, text: String) {
        if let Some(worker) = &self.speech {
            worker.say(text);
        }
    }

    fn release(&mut self) {
        if !self.closed {
            self.source.close();
            self.closed = true;
        }
    }
}

impl<S: LandmarkSource> Drop for Session<S> {
    fn drop(&mut self) {
        self.release();
    }
}
