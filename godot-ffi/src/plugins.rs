/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Distributed self-registration of "plugins" without central list.
//!
//! Each `#[derive(GodotClass)]` and `#[godot_api]` expansion adds items to a registry through a static constructor, which the
//! platform runs when the library is loaded. The registry is later drained at class registration.

// Note: code in this file is safe, however overridden link sections count as unsafe attributes in some lints:
//   the program's behavior with overridden link sections on items is unpredictable
//   and Rust cannot provide guarantees when you manually override them

/// Declares a global registry for plugins of a given type.
#[doc(hidden)]
#[macro_export]
macro_rules! plugin_registry {
    ($vis:vis $registry:ident: $Type:ty) => {
        #[used]
        #[allow(non_upper_case_globals)]
        #[doc(hidden)]
        $vis static $registry: std::sync::Mutex<Vec<$Type>> = std::sync::Mutex::new(Vec::new());
    };
}

/// Registers a plugin in a registry, at load time.
#[doc(hidden)]
#[macro_export]
#[allow(clippy::deprecated_cfg_attr)]
#[cfg_attr(rustfmt, rustfmt::skip)]
macro_rules! plugin_add {
    ($registry:path; $plugin:expr) => {
        const _: () = {
            #[allow(non_upper_case_globals)]
            #[used]
            // Windows:
            #[cfg_attr(target_os = "windows", link_section = ".CRT$XCU")]
            // MacOS + iOS:
            #[cfg_attr(target_os = "ios", link_section = "__DATA,__mod_init_func")]
            #[cfg_attr(target_os = "macos", link_section = "__DATA,__mod_init_func")]
            // Linux, Android, BSD:
            #[cfg_attr(target_os = "android", link_section = ".init_array")]
            #[cfg_attr(target_os = "freebsd", link_section = ".init_array")]
            #[cfg_attr(target_os = "linux", link_section = ".init_array")]
            #[cfg_attr(target_os = "netbsd", link_section = ".init_array")]
            #[cfg_attr(target_os = "openbsd", link_section = ".init_array")]
            static __init: extern "C" fn() = {
                #[cfg_attr(target_os = "android", link_section = ".text.startup")]
                #[cfg_attr(target_os = "linux", link_section = ".text.startup")]
                extern "C" fn __inner_init() {
                    let mut guard = $registry
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    guard.push($plugin);
                }
                __inner_init
            };
        };
    };
}

/// Visits all plugins of a registry, in unspecified order.
#[doc(hidden)]
#[macro_export]
macro_rules! plugin_foreach {
    ($registry:path; $closure:expr) => {{
        let guard = $registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        for e in guard.iter() {
            $closure(e);
        }
    }};
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    plugin_registry!(V: &'static str);

    plugin_add!(V; "three");
    plugin_add!(V; "four");
    plugin_add!(V; "one");
    plugin_add!(V; "two");

    #[test]
    fn plugin_registry() {
        let expected = HashSet::from(["one", "two", "three", "four"]);
        let mut actual = HashSet::new();

        plugin_foreach!(V; |e: &&'static str| {
            actual.insert(*e);
        });

        assert_eq!(actual, expected);
    }
}
