//! Human-readable rendering of a system snapshot.
//!
//! Restructured as a pure string builder (testable without capturing
//! stdout) rather than printing directly, in the spirit of
//! `teste.py`'s `imprimir_caches`. The driver is the only caller that
//! actually prints the result.

use std::fmt::Write as _;

use crate::address::CacheId;
use crate::system::SystemView;

/// Render a full snapshot: every cache's lines, then main memory's blocks.
pub fn render_system(view: &SystemView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Cache state ===");
    for cache in &view.caches {
        let _ = writeln!(out, "Cache {}:", cache.id);
        for (i, line) in cache.lines.iter().enumerate() {
            match line.tag {
                Some(tag) => {
                    let _ = writeln!(
                        out,
                        "  line {}: block {}, state {}, data {:?}",
                        i, tag, line.state, line.data
                    );
                }
                None => {
                    let _ = writeln!(out, "  line {}: empty, state {}", i, line.state);
                }
            }
        }
    }

    let _ = writeln!(out, "=== Main memory ===");
    for (block, data) in view.memory.iter().enumerate() {
        let _ = writeln!(out, "  block {}: {:?}", block, data);
    }

    out
}

/// Render the single cache named by `id`, for a more focused prompt-loop
/// report.
pub fn render_cache(view: &SystemView, id: CacheId) -> String {
    let cache = &view.caches[id.index()];
    let mut out = String::new();
    let _ = writeln!(out, "Cache {}:", cache.id);
    for (i, line) in cache.lines.iter().enumerate() {
        match line.tag {
            Some(tag) => {
                let _ = writeln!(
                    out,
                    "  line {}: block {}, state {}, data {:?}",
                    i, tag, line.state, line.data
                );
            }
            None => {
                let _ = writeln!(out, "  line {}: empty, state {}", i, line.state);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::system::System;

    #[test]
    fn render_mentions_every_cache_and_block_count() {
        let mut sys = System::new_zeroed();
        sys.read(CacheId::Heloise, Address::new(5).unwrap());
        let report = render_system(&sys.snapshot());

        for id in CacheId::ALL {
            assert!(report.contains(&id.to_string()));
        }
        assert_eq!(report.matches("block ").count() >= 32, true);
    }

    #[test]
    fn render_cache_is_focused_on_one_cache() {
        let sys = System::new_zeroed();
        let report = render_cache(&sys.snapshot(), CacheId::Valeria);
        assert!(report.contains("Valeria"));
        assert!(!report.contains("Heloise"));
    }
}
