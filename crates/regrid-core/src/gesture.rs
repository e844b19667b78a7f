#![forbid(unsafe_code)]

//! Drag gesture tracking: turns raw pointer samples into drag lifecycle
//! signals carrying the displacement since pointer-down.
//!
//! The grid layer never looks at pointers. It consumes [`DragSignal`]s, which
//! is all a host needs to produce if it already has its own gesture system.
//! [`DragTracker`] is the default producer for hosts that only have pointer
//! down/move/up.
//!
//! # State Machine
//!
//! ```text
//! Idle -> Pressed -> Dragging -> Idle
//!            \          \---> Idle (Release / Terminate)
//!             \-> Rejected -> Idle (pointer up)
//! ```
//!
//! # Invariants
//!
//! 1. `Claim` is emitted at most once per pointer-down, and always before the
//!    first `Move`.
//! 2. Every claimed drag ends with exactly one `Release` or `Terminate`.
//! 3. A rejected claim produces no further signals until the next
//!    pointer-down.
//! 4. While dragging, [`DragTracker::request_termination`] refuses to yield
//!    the pointer to a competing gesture.

use crate::geometry::Point;

/// Thresholds for drag recognition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Minimum pointer travel (pixels) before a drag is offered (default: 3.0).
    pub drag_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
        }
    }
}

impl GestureConfig {
    /// Set the drag threshold (builder pattern). Negative values clamp to 0.
    #[must_use]
    pub fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.drag_threshold = threshold.max(0.0);
        self
    }
}

/// A raw pointer sample in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// The host lost the pointer (focus loss, touch cancel, window blur).
    Cancel,
}

/// Drag lifecycle signal delivered to an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragSignal {
    /// The pointer moved far enough to start a drag. The consumer decides
    /// whether to claim it.
    Claim,
    /// Displacement since pointer-down.
    Move { delta: Point },
    /// The pointer was released.
    Release { delta: Point },
    /// Another gesture took the pointer or the host cancelled it.
    Terminate { delta: Point },
}

impl DragSignal {
    /// Displacement carried by the signal, zero for `Claim`.
    #[must_use]
    pub fn delta(&self) -> Point {
        match self {
            Self::Claim => Point::ZERO,
            Self::Move { delta } | Self::Release { delta } | Self::Terminate { delta } => *delta,
        }
    }

    /// Whether the signal finishes the drag.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::Release { .. } | Self::Terminate { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TrackerState {
    Idle,
    Pressed { origin: Point },
    Dragging { origin: Point, last: Point },
    Rejected,
}

/// Converts pointer samples into [`DragSignal`]s.
#[derive(Debug, Clone)]
pub struct DragTracker {
    config: GestureConfig,
    state: TrackerState,
}

impl Default for DragTracker {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl DragTracker {
    /// Create a tracker with the given configuration.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: TrackerState::Idle,
        }
    }

    /// Process one pointer sample.
    ///
    /// A move that crosses the threshold yields `Claim`; the caller answers
    /// with [`reject`](Self::reject) if it does not want the drag, otherwise
    /// subsequent moves yield `Move`. The crossing sample itself is reported
    /// on the next call to [`pending_move`](Self::pending_move).
    pub fn process(&mut self, event: PointerEvent) -> Option<DragSignal> {
        match (self.state, event) {
            (_, PointerEvent::Down(pos)) => {
                let was_dragging = self.terminate();
                self.state = TrackerState::Pressed { origin: pos };
                was_dragging
            }
            (TrackerState::Pressed { origin }, PointerEvent::Move(pos)) => {
                if (pos - origin).length() >= self.config.drag_threshold {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(
                        message = "gesture.claim",
                        threshold = self.config.drag_threshold
                    );
                    self.state = TrackerState::Dragging { origin, last: pos };
                    Some(DragSignal::Claim)
                } else {
                    None
                }
            }
            (TrackerState::Dragging { origin, .. }, PointerEvent::Move(pos)) => {
                self.state = TrackerState::Dragging { origin, last: pos };
                Some(DragSignal::Move {
                    delta: pos - origin,
                })
            }
            (TrackerState::Dragging { origin, .. }, PointerEvent::Up(pos)) => {
                self.state = TrackerState::Idle;
                Some(DragSignal::Release {
                    delta: pos - origin,
                })
            }
            (_, PointerEvent::Up(_)) => {
                self.state = TrackerState::Idle;
                None
            }
            (_, PointerEvent::Cancel) => self.terminate(),
            (TrackerState::Idle | TrackerState::Rejected, PointerEvent::Move(_)) => None,
        }
    }

    /// The move that caused the most recent `Claim`.
    ///
    /// Returns `None` unless a drag is in progress.
    #[must_use]
    pub fn pending_move(&self) -> Option<DragSignal> {
        match self.state {
            TrackerState::Dragging { origin, last } => Some(DragSignal::Move {
                delta: last - origin,
            }),
            _ => None,
        }
    }

    /// Decline the drag offered by the last `Claim`.
    pub fn reject(&mut self) {
        if matches!(self.state, TrackerState::Dragging { .. }) {
            #[cfg(feature = "tracing")]
            tracing::trace!(message = "gesture.reject");
            self.state = TrackerState::Rejected;
        }
    }

    /// A competing gesture asks for the pointer. Returns `true` if it may
    /// have it; an active drag keeps it.
    #[must_use]
    pub fn request_termination(&self) -> bool {
        !self.is_dragging()
    }

    /// Force the drag to end, returning the `Terminate` signal if one was in
    /// progress.
    pub fn terminate(&mut self) -> Option<DragSignal> {
        let signal = match self.state {
            TrackerState::Dragging { origin, last } => Some(DragSignal::Terminate {
                delta: last - origin,
            }),
            _ => None,
        };
        #[cfg(feature = "tracing")]
        {
            if signal.is_some() {
                tracing::trace!(message = "gesture.terminate");
            }
        }
        self.state = TrackerState::Idle;
        signal
    }

    /// Whether a claimed drag is in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, TrackerState::Dragging { .. })
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }
}
