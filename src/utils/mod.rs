//! Shared helpers for markup, script text and messages.

pub mod html;
pub mod js;
pub mod plural;
