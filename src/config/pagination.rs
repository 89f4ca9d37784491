use std::env;
use std::sync::OnceLock;

const DEFAULT_POSTS_PER_PAGE: u64 = 10;

/// Fixed feed page size. Read once at first use; feeds never accept a
/// per-request page size.
pub fn posts_per_page() -> u64 {
    static PER_PAGE: OnceLock<u64> = OnceLock::new();
    *PER_PAGE.get_or_init(|| {
        env::var("POSTS_PER_PAGE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_POSTS_PER_PAGE)
    })
}
