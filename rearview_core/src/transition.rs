// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility state machine as a pure function.
//!
//! [`transition`] maps the current [`VisibilityState`] and an [`Event`] to
//! the next state plus the list of [`Effect`]s the controller must carry
//! out. It performs no I/O: the controller applies the effects afterwards,
//! skipping those whose collaborator is absent (no window, nothing
//! allocated).
//!
//! ```text
//!   NotVisible ──Request(VisibleOnNextFrame)──► VisibleOnNextFrame
//!        ▲                                            │
//!        │ Request(NotVisible)          FrameReturned │ show + present
//!        │                                            ▼
//!        └──────────────────────────────────────── Visible ──┐
//!                                                   ▲        │ FrameReturned
//!                                                   └────────┘ present
//!
//!   any ──ForceShutdown──► Dead (release resources); Dead rejects the rest.
//! ```

use crate::error::DisplayError;
use crate::state::VisibilityState;

/// Something that happened to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// The client asked for a visibility state.
    Request(VisibilityState),
    /// The client returned the checked-out buffer with a frame in it.
    FrameReturned,
    /// Another owner took the display, or the controller is being torn down.
    ForceShutdown,
}

/// A side effect the controller carries out after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Show the presentation window.
    ShowWindow,
    /// Hide the presentation window.
    HideWindow,
    /// Push the returned buffer into the window and render it.
    PresentFrame,
    /// Free the render target and shut the window down.
    ReleaseResources,
}

/// Result of a successful [`transition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    /// State to record.
    pub next: VisibilityState,
    /// Effects to apply, in order.
    pub effects: &'static [Effect],
}

impl Transition {
    const fn to(next: VisibilityState, effects: &'static [Effect]) -> Self {
        Self { next, effects }
    }
}

/// Computes the next state and its effects.
///
/// # Errors
///
/// Returns [`DisplayError::OwnershipLost`] for every event other than
/// [`Event::ForceShutdown`] once the state is [`VisibilityState::Dead`].
pub const fn transition(
    current: VisibilityState,
    event: Event,
) -> Result<Transition, DisplayError> {
    use Effect::{HideWindow, PresentFrame, ReleaseResources, ShowWindow};
    use VisibilityState::{Dead, NotVisible, Visible, VisibleOnNextFrame};

    let t = match (current, event) {
        (_, Event::ForceShutdown) => Transition::to(Dead, &[ReleaseResources]),
        (Dead, _) => return Err(DisplayError::OwnershipLost),
        (_, Event::Request(NotVisible)) => Transition::to(NotVisible, &[HideWindow]),
        (_, Event::Request(VisibleOnNextFrame)) => Transition::to(VisibleOnNextFrame, &[]),
        (_, Event::Request(Visible)) => Transition::to(Visible, &[ShowWindow]),
        (_, Event::Request(Dead)) => Transition::to(Dead, &[ReleaseResources]),
        (VisibleOnNextFrame, Event::FrameReturned) => {
            Transition::to(Visible, &[ShowWindow, PresentFrame])
        }
        (Visible, Event::FrameReturned) => Transition::to(Visible, &[PresentFrame]),
        (NotVisible, Event::FrameReturned) => Transition::to(NotVisible, &[]),
    };
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::{Effect, Event, Transition, transition};
    use crate::error::DisplayError;
    use crate::state::VisibilityState::{self, Dead, NotVisible, Visible, VisibleOnNextFrame};

    const LIVE: [VisibilityState; 3] = [NotVisible, VisibleOnNextFrame, Visible];

    fn ok(current: VisibilityState, event: Event) -> Transition {
        transition(current, event).unwrap()
    }

    #[test]
    fn first_frame_makes_display_visible() {
        let t = ok(NotVisible, Event::Request(VisibleOnNextFrame));
        assert_eq!(t.next, VisibleOnNextFrame);
        assert!(t.effects.is_empty());

        let t = ok(VisibleOnNextFrame, Event::FrameReturned);
        assert_eq!(t.next, Visible);
        assert_eq!(t.effects, &[Effect::ShowWindow, Effect::PresentFrame]);
    }

    #[test]
    fn visible_frames_are_presented() {
        let t = ok(Visible, Event::FrameReturned);
        assert_eq!(t.next, Visible);
        assert_eq!(t.effects, &[Effect::PresentFrame]);
    }

    #[test]
    fn frame_while_not_visible_is_accepted_without_effects() {
        let t = ok(NotVisible, Event::FrameReturned);
        assert_eq!(t.next, NotVisible);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn requests_are_recorded_from_every_live_state() {
        for current in LIVE {
            let t = ok(current, Event::Request(NotVisible));
            assert_eq!(t.next, NotVisible);
            assert_eq!(t.effects, &[Effect::HideWindow]);

            let t = ok(current, Event::Request(Visible));
            assert_eq!(t.next, Visible);
            assert_eq!(t.effects, &[Effect::ShowWindow]);

            let t = ok(current, Event::Request(VisibleOnNextFrame));
            assert_eq!(t.next, VisibleOnNextFrame);
            assert!(t.effects.is_empty());
        }
    }

    #[test]
    fn requesting_dead_releases_resources() {
        for current in LIVE {
            let t = ok(current, Event::Request(Dead));
            assert_eq!(t.next, Dead);
            assert_eq!(t.effects, &[Effect::ReleaseResources]);
        }
    }

    #[test]
    fn shutdown_is_accepted_from_every_state() {
        for current in [NotVisible, VisibleOnNextFrame, Visible, Dead] {
            let t = ok(current, Event::ForceShutdown);
            assert_eq!(t.next, Dead);
            assert_eq!(t.effects, &[Effect::ReleaseResources]);
        }
    }

    #[test]
    fn dead_rejects_everything_but_shutdown() {
        let events = [
            Event::Request(NotVisible),
            Event::Request(VisibleOnNextFrame),
            Event::Request(Visible),
            Event::Request(Dead),
            Event::FrameReturned,
        ];
        for event in events {
            assert_eq!(transition(Dead, event), Err(DisplayError::OwnershipLost));
        }
    }
}
