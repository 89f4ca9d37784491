use crate::models::{CategoryModel, PostModel};
use chrono::NaiveDateTime;

/// Whether a post is visible to `viewer` at instant `now`.
///
/// Authors always see their own posts. Everyone else sees a post only
/// when it is published, sits in a published category, and its publish
/// timestamp has passed. A post without a category is never live.
///
/// `now` is resolved once per request by the handler so that every
/// check within one request agrees on the boundary instant.
pub fn is_live(
    post: &PostModel,
    category: Option<&CategoryModel>,
    viewer: Option<i32>,
    now: NaiveDateTime,
) -> bool {
    if viewer == Some(post.author_id) {
        return true;
    }

    post.is_published
        && category.is_some_and(|c| c.is_published)
        && post.pub_date <= now
}

/// SQL mirror of [`is_live`] for the feed queries. Expects the posts
/// table aliased `p` and its category left-joined as `c`. `now_param`
/// and `viewer_param` are positional placeholders; the viewer binds as
/// NULL for anonymous requests and then never matches.
pub fn visible_clause(now_param: &str, viewer_param: &str) -> String {
    format!(
        "((p.is_published AND p.category_id IS NOT NULL AND c.is_published \
         AND p.pub_date <= {now_param}) OR p.author_id = {viewer_param})"
    )
}
