//! First-Last-Invert-Play relayout animations.
//!
//! The controller captures each surviving view's box before mutating (First), reads it
//! again once layout settled (Last), starts the view at the inverse offset (Invert) and
//! interpolates the offset back to identity (Play). Views entering the grid get a separate
//! fade-and-slide entrance.
//!
//! Animations are driven by explicit timestamps so the host's frame loop decides when time
//! advances; nothing here sleeps or spawns.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::grid::registry::ViewId;
use crate::model::{BoundingBox, Translate};

pub use easing::*;

/// Duration of the relayout (FLIP) animation.
pub const FLIP_DURATION: Duration = Duration::from_millis(200);

/// Duration of the entrance animation for newly added views.
pub const ENTRANCE_DURATION: Duration = Duration::from_millis(500);

/// Visual state of a view for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// Offset from the laid-out position.
    pub translate: Translate,
    /// 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f64,
}

impl AnimationFrame {
    /// At rest: laid-out position, fully opaque.
    pub const IDENTITY: Self = Self {
        translate: Translate::IDENTITY,
        opacity: 1.0,
    };

    /// True when the frame leaves the view untouched.
    pub fn is_identity(&self) -> bool {
        self.translate.is_identity() && self.opacity >= 1.0
    }

    fn combine(&self, other: &AnimationFrame) -> AnimationFrame {
        AnimationFrame {
            translate: Translate::new(
                self.translate.dx + other.translate.dx,
                self.translate.dy + other.translate.dy,
            ),
            opacity: self.opacity * other.opacity,
        }
    }
}

impl Default for AnimationFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Durations used by the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTimings {
    /// Relayout animation length.
    pub flip: Duration,
    /// Entrance animation length.
    pub entrance: Duration,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            flip: FLIP_DURATION,
            entrance: ENTRANCE_DURATION,
        }
    }
}

/// Outcome of requesting a FLIP for one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlipStart {
    /// Animation running; the view starts at this inverse offset.
    Started(Translate),
    /// The view was never measured before, so there is nothing to interpolate from.
    NoPreviousBox,
    /// The view did not move.
    InPlace,
}

/// One interpolation from a start frame back to identity.
#[derive(Debug, Clone, Copy)]
struct Tween {
    from: AnimationFrame,
    started_at: Instant,
    duration: Duration,
    easing: fn(f64) -> f64,
}

impl Tween {
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn frame_at(&self, now: Instant) -> AnimationFrame {
        let eased = (self.easing)(self.progress(now));
        AnimationFrame {
            translate: self.from.translate.scaled(1.0 - eased),
            opacity: self.from.opacity + (1.0 - self.from.opacity) * eased,
        }
    }

    fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

#[derive(Debug, Default)]
struct ViewAnimations {
    flip: Option<Tween>,
    entrance: Option<Tween>,
}

impl ViewAnimations {
    fn tweens(&self) -> impl Iterator<Item = &Tween> {
        self.flip.iter().chain(self.entrance.iter())
    }

    fn frame_at(&self, now: Instant) -> AnimationFrame {
        self.tweens()
            .fold(AnimationFrame::IDENTITY, |acc, tween| acc.combine(&tween.frame_at(now)))
    }

    fn is_finished(&self, now: Instant) -> bool {
        self.tweens().all(|tween| tween.is_finished(now))
    }
}

/// Frame produced for a view by [`FlipAnimator::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    /// The animated view.
    pub id: ViewId,
    /// Its visual state at the sampled instant.
    pub frame: AnimationFrame,
    /// The view's animations completed; `frame` is identity.
    pub finished: bool,
}

/// Tracks in-flight animations per view.
#[derive(Debug, Default)]
pub struct FlipAnimator {
    timings: AnimationTimings,
    active: HashMap<ViewId, ViewAnimations>,
}

impl FlipAnimator {
    /// Animator with the given durations.
    pub fn new(timings: AnimationTimings) -> Self {
        Self {
            timings,
            active: HashMap::new(),
        }
    }

    /// Configured durations.
    pub fn timings(&self) -> AnimationTimings {
        self.timings
    }

    /// Start a FLIP for `id` from `from` to `to`.
    ///
    /// Without a previous box, or when the view did not move, no animation is started and
    /// the view is considered settled immediately.
    pub fn flip(
        &mut self,
        id: ViewId,
        from: Option<BoundingBox>,
        to: BoundingBox,
        now: Instant,
    ) -> FlipStart {
        let Some(from) = from else {
            return FlipStart::NoPreviousBox;
        };
        let invert = to.delta_from(&from);
        if invert.is_identity() {
            return FlipStart::InPlace;
        }
        self.active.entry(id).or_default().flip = Some(Tween {
            from: AnimationFrame {
                translate: invert,
                opacity: 1.0,
            },
            started_at: now,
            duration: self.timings.flip,
            easing: ease_in_out,
        });
        FlipStart::Started(invert)
    }

    /// Start the entrance animation for a freshly created view: fade in while sliding up
    /// from `offset_y` pixels below its slot.
    pub fn enter(&mut self, id: ViewId, offset_y: f64, now: Instant) -> AnimationFrame {
        let from = AnimationFrame {
            translate: Translate::new(0.0, offset_y),
            opacity: 0.0,
        };
        self.active.entry(id).or_default().entrance = Some(Tween {
            from,
            started_at: now,
            duration: self.timings.entrance,
            easing: ease_out,
        });
        from
    }

    /// Sample every running animation at `now`, dropping the ones that completed.
    pub fn advance(&mut self, now: Instant) -> Vec<FrameUpdate> {
        let mut updates: Vec<FrameUpdate> = self
            .active
            .iter()
            .map(|(&id, animations)| {
                let finished = animations.is_finished(now);
                FrameUpdate {
                    id,
                    frame: if finished {
                        AnimationFrame::IDENTITY
                    } else {
                        animations.frame_at(now)
                    },
                    finished,
                }
            })
            .collect();
        self.active.retain(|_, animations| !animations.is_finished(now));
        updates.sort_by_key(|update| update.id);
        updates
    }

    /// Current frame of `id` without advancing anything.
    pub fn frame_of(&self, id: ViewId, now: Instant) -> AnimationFrame {
        self.active
            .get(&id)
            .map(|animations| animations.frame_at(now))
            .unwrap_or(AnimationFrame::IDENTITY)
    }

    /// Jump every animation to its end. Returns the views that were animating.
    pub fn finish_all(&mut self) -> Vec<ViewId> {
        let mut ids: Vec<ViewId> = self.active.drain().map(|(id, _)| id).collect();
        ids.sort();
        ids
    }

    /// Drop any animation attached to `id`. Returns whether one was running.
    pub fn cancel(&mut self, id: ViewId) -> bool {
        self.active.remove(&id).is_some()
    }

    /// Whether `id` has a running animation.
    pub fn is_animating(&self, id: ViewId) -> bool {
        self.active.contains_key(&id)
    }

    /// Number of views with running animations.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// No animation is running.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

mod easing {
    /// Progress passed through.
    pub fn linear(delta: f64) -> f64 {
        delta
    }

    /// Quadratic in the first half, mirrored in the second.
    pub fn ease_in_out(delta: f64) -> f64 {
        if delta < 0.5 {
            2.0 * delta * delta
        } else {
            let x = -2.0 * delta + 2.0;
            1.0 - x * x / 2.0
        }
    }

    /// Quadratic, decelerating towards 1.
    pub fn ease_out(delta: f64) -> f64 {
        1.0 - (1.0 - delta) * (1.0 - delta)
    }
}
