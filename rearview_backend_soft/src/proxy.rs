// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-process stand-in for the display proxy service.

use std::collections::HashMap;

use parking_lot::RwLock;
use rearview_core::backend::DisplayProxy;
use rearview_core::display::{DisplayId, HwDisplayConfig, HwDisplayState, Rotation};

/// A [`DisplayProxy`] over a table of simulated panels.
///
/// Unknown displays report the default (null) configuration and state.
#[derive(Debug, Default)]
pub struct SoftDisplayProxy {
    displays: RwLock<HashMap<DisplayId, (HwDisplayConfig, HwDisplayState)>>,
}

impl SoftDisplayProxy {
    /// Creates a proxy that knows no displays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a proxy with a single powered `width` x `height` panel.
    #[must_use]
    pub fn single(display: DisplayId, width: u32, height: u32) -> Self {
        let proxy = Self::new();
        proxy.add_display(
            display,
            HwDisplayConfig {
                width,
                height,
                refresh_interval_nanos: Some(16_666_667),
            },
        );
        proxy
    }

    /// Adds or replaces a panel. New panels are powered and unrotated.
    pub fn add_display(&self, display: DisplayId, config: HwDisplayConfig) {
        let state = HwDisplayState {
            powered: true,
            rotation: Rotation::Deg0,
        };
        self.displays.write().insert(display, (config, state));
    }

    /// Changes the rotation of a known panel.
    pub fn set_rotation(&self, display: DisplayId, rotation: Rotation) {
        if let Some((_, state)) = self.displays.write().get_mut(&display) {
            state.rotation = rotation;
        }
    }

    /// Powers a known panel on or off.
    pub fn set_powered(&self, display: DisplayId, powered: bool) {
        if let Some((_, state)) = self.displays.write().get_mut(&display) {
            state.powered = powered;
        }
    }
}

impl DisplayProxy for SoftDisplayProxy {
    fn display_info(&self, display: DisplayId) -> (HwDisplayConfig, HwDisplayState) {
        let info = self.displays.read().get(&display).copied();
        info.unwrap_or_else(|| {
            log::warn!("no simulated panel for {display:?}");
            (HwDisplayConfig::default(), HwDisplayState::default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_displays() {
        let proxy = SoftDisplayProxy::single(DisplayId(1), 1280, 720);
        let (config, state) = proxy.display_info(DisplayId(1));
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(state.powered);

        let (config, state) = proxy.display_info(DisplayId(2));
        assert_eq!(config, HwDisplayConfig::default());
        assert_eq!(state, HwDisplayState::default());
    }

    #[test]
    fn state_updates_are_visible() {
        let proxy = SoftDisplayProxy::single(DisplayId(0), 800, 480);
        proxy.set_rotation(DisplayId(0), Rotation::Deg90);
        proxy.set_powered(DisplayId(0), false);
        let (_, state) = proxy.display_info(DisplayId(0));
        assert_eq!(state.rotation, Rotation::Deg90);
        assert!(!state.powered);
    }
}
