#![forbid(unsafe_code)]

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTROLLER_SEQ: AtomicU64 = AtomicU64::new(1);

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Unique identifier of one frame controller.
///
/// The container element carries this value as its `id` attribute and the
/// overlay carries [`ControllerId::overlay_id`]. Host callbacks route events
/// back to their controller through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(String);

impl ControllerId {
    /// Wrap an explicit identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generate a process-unique identifier under `prefix`.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        let seq = NEXT_CONTROLLER_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("{prefix}{}", to_base36(seq)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn overlay_id(&self) -> String {
        format!("{}-overlay", self.0)
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{ControllerId, to_base36};

    #[test]
    fn base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "zz");
    }

    #[test]
    fn generated_ids_are_unique_and_prefixed() {
        let a = ControllerId::generate("iframe-fullscreen-");
        let b = ControllerId::generate("iframe-fullscreen-");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("iframe-fullscreen-"));
    }

    #[test]
    fn overlay_id_is_derived() {
        let id = ControllerId::new("stage-7");
        assert_eq!(id.overlay_id(), "stage-7-overlay");
        assert_eq!(id.to_string(), "stage-7");
    }
}
