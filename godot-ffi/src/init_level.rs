/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Step in the engine's initialization process.
///
/// Initialization and deinitialization are split into stages, like a stack. At each level, a different amount of engine
/// functionality is available. Deinitialization happens in reverse order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum InitLevel {
    /// First level loaded by the engine. Builtin types are available, classes are not.
    Core,

    /// Second level. Only server classes and builtins are available.
    Servers,

    /// Third level. Most classes are available; the default level for class registration.
    Scene,

    /// Fourth level, only in the editor. All classes are available.
    Editor,
}

impl InitLevel {
    /// All levels in initialization order.
    pub const ALL: [InitLevel; 4] = [Self::Core, Self::Servers, Self::Scene, Self::Editor];

    /// Converts an engine level. Unknown values are reported and treated as `Scene`.
    #[doc(hidden)]
    pub fn from_sys(level: crate::GDExtensionInitializationLevel) -> Self {
        match level {
            crate::GDEXTENSION_INITIALIZATION_CORE => Self::Core,
            crate::GDEXTENSION_INITIALIZATION_SERVERS => Self::Servers,
            crate::GDEXTENSION_INITIALIZATION_SCENE => Self::Scene,
            crate::GDEXTENSION_INITIALIZATION_EDITOR => Self::Editor,
            _ => {
                eprintln!("WARNING: unknown initialization level {level}");
                Self::Scene
            }
        }
    }

    #[doc(hidden)]
    pub fn to_sys(self) -> crate::GDExtensionInitializationLevel {
        match self {
            Self::Core => crate::GDEXTENSION_INITIALIZATION_CORE,
            Self::Servers => crate::GDEXTENSION_INITIALIZATION_SERVERS,
            Self::Scene => crate::GDEXTENSION_INITIALIZATION_SCENE,
            Self::Editor => crate::GDEXTENSION_INITIALIZATION_EDITOR,
        }
    }

    /// The later of `self` and `other`. Usable in constants, unlike [`Ord::max`].
    pub const fn at_least(self, other: InitLevel) -> InitLevel {
        if (self as u8) < (other as u8) {
            other
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        for pair in InitLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(InitLevel::from_sys(pair[0].to_sys()), pair[0]);
        }
    }

    #[test]
    fn at_least_picks_later_level() {
        assert_eq!(InitLevel::Scene.at_least(InitLevel::Core), InitLevel::Scene);
        assert_eq!(InitLevel::Scene.at_least(InitLevel::Editor), InitLevel::Editor);
        assert_eq!(InitLevel::Servers.at_least(InitLevel::Servers), InitLevel::Servers);
    }
}
