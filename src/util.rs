use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Per-id pair in [-1, 1], stable for the lifetime of the process.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Cuts `text` to `max_chars` characters, the last of which becomes `…`.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut truncated = text.chars().take(max_chars - 1).collect::<String>();
    truncated.truncate(truncated.trim_end().len());
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_pair_range_and_stability() {
        let (x, y) = stable_pair("Opportunity");
        assert!((-1.0..=1.0).contains(&x));
        assert!((-1.0..=1.0).contains(&y));
        assert_eq!(stable_pair("Opportunity"), (x, y));
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Account", 18), "Account");
        assert_eq!(
            truncate_label("Require Budget On Qualification", 18),
            "Require Budget On…"
        );
        assert_eq!(truncate_label("Ünïcödé labels here", 5), "Ünïc…");
        assert_eq!(truncate_label("abc", 0), "");
    }
}
