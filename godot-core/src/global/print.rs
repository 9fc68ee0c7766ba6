/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Printing and logging functionality.

use std::io::Write;

// https://stackoverflow.com/a/40234666
#[macro_export]
#[doc(hidden)]
macro_rules! inner_function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! inner_godot_msg {
    ($godot_fn:ident; $fmt:literal $(, $args:expr)* $(,)?) => {{
        let msg = format!("{}\0", format_args!($fmt $(, $args)*));

        // Check whether engine is loaded, otherwise fall back to stderr.
        if $crate::sys::is_initialized() {
            let function = format!("{}\0", $crate::inner_function!());
            #[allow(unused_unsafe)]
            unsafe {
                $crate::sys::interface_fn!($godot_fn)(
                    $crate::sys::c_str(msg.as_bytes()),
                    $crate::sys::c_str(function.as_bytes()),
                    $crate::sys::c_str(concat!(file!(), "\0").as_bytes()),
                    line!() as i32,
                    $crate::sys::SYS_FALSE, // whether to create a toast notification in editor
                );
            }
        } else {
            eprintln!("[{}] {}", stringify!($godot_fn), &msg[..msg.len() - 1]);
        }
    }};
}

/// Pushes a warning message to Godot's built-in debugger and to the OS terminal.
///
/// _Godot equivalent: [`@GlobalScope.push_warning()`](https://docs.godotengine.org/en/stable/classes/class_@globalscope.html#class-globalscope-method-push-warning)_.
#[macro_export]
macro_rules! godot_warn {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::inner_godot_msg!(print_warning; $fmt $(, $args)*)
    };
}

/// Pushes an error message to Godot's built-in debugger and to the OS terminal.
///
/// _Godot equivalent: [`@GlobalScope.push_error()`](https://docs.godotengine.org/en/stable/classes/class_@globalscope.html#class-globalscope-method-push-error)_.
#[macro_export]
macro_rules! godot_error {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::inner_godot_msg!(print_error; $fmt $(, $args)*)
    };
}

/// Logs a script error to Godot's built-in debugger and to the OS terminal.
#[macro_export]
macro_rules! godot_script_error {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::inner_godot_msg!(print_script_error; $fmt $(, $args)*)
    };
}

/// Prints a line to standard output.
///
/// The extension interface has no console function, so unlike the other logging macros this never goes through the engine.
///
/// _Godot equivalent: [`@GlobalScope.print()`](https://docs.godotengine.org/en/stable/classes/class_@globalscope.html#class-globalscope-method-print)_.
#[macro_export]
macro_rules! godot_print {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::global::print(&format!($fmt $(, $args)*))
    };
}

/// Writes `message` and a line break to stdout, ignoring I/O errors (closed pipes).
pub fn print(message: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{message}");
}
