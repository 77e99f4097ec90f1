//! Terminal switchboard for Clash/Mihomo proxy groups: browse the
//! daemon's selector groups, move a cursor, and switch the active
//! member without leaving the keyboard.

pub mod clash;
pub mod logging;
pub mod model;
pub mod tui;
