//! Number-key module selection.
//!
//! Keys `1`..=`9` select catalog entries `0`..=`8`. Only fresh presses count:
//! crossterm repeat and release events are ignored so a held key loads its
//! module once.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Highest number key that selects a module.
pub const MAX_SLOT_KEYS: usize = 9;

/// Map a key press to a catalog index, bounded by `catalog_len` and
/// [`MAX_SLOT_KEYS`].
pub fn module_slot_for_key(key: &KeyEvent, catalog_len: usize) -> Option<usize> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let digit = c.to_digit(10)? as usize;
    let slot = digit.checked_sub(1)?;
    (slot < catalog_len.min(MAX_SLOT_KEYS)).then_some(slot)
}
