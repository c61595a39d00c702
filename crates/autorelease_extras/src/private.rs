//! Support items for macro-generated code. Not public API.
//!
//! Argument rendering uses autoref specialization over three levels: the
//! generated code calls `render` on `&&&Arg`, which selects `Display` if the
//! argument type has it, else `Debug`, else the opaque placeholder.

use core::fmt::{Debug, Display};

/// Wraps one argument of a timed method.
pub struct Arg<'a, T: ?Sized>(pub &'a T);

/// Selected for `Display` arguments.
pub trait ViaDisplay {
    /// Renders with `Display`.
    fn render(&self) -> String;
}

impl<T: Display + ?Sized> ViaDisplay for &&Arg<'_, T> {
    fn render(&self) -> String {
        self.0.to_string()
    }
}

/// Selected for `Debug` arguments without `Display`.
pub trait ViaDebug {
    /// Renders with `Debug`.
    fn render(&self) -> String;
}

impl<T: Debug + ?Sized> ViaDebug for &Arg<'_, T> {
    fn render(&self) -> String {
        format!("{:?}", self.0)
    }
}

/// Fallback for arguments that cannot be formatted.
pub trait ViaPlaceholder {
    /// Returns `_`.
    fn render(&self) -> String {
        String::from("_")
    }
}

impl<T: ?Sized> ViaPlaceholder for Arg<'_, T> {}
