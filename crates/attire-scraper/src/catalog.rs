//! Walking a category listing and harvesting product links.

use std::collections::HashSet;
use std::time::Duration;

use crate::guard::NavigationGuard;

#[derive(Debug, Clone)]
pub struct PaginationRules {
    pub link_selector: String,
    pub page_label_selector: String,
    /// Consecutive empty pages tolerated before the category is abandoned.
    pub max_empty_pages: u32,
    /// Stagnant scroll iterations tolerated before the feed is considered
    /// exhausted.
    pub max_stagnant_scrolls: u32,
    pub items_limit: Option<usize>,
    /// Settle time after each scroll step.
    pub scroll_pause: Duration,
}

impl Default for PaginationRules {
    fn default() -> Self {
        Self {
            link_selector: "#catalog-grid [data-component=\"ProductCardLink\"]".to_string(),
            page_label_selector: "[data-component=\"PaginationLabel\"]".to_string(),
            max_empty_pages: 5,
            max_stagnant_scrolls: 5,
            items_limit: None,
            scroll_pause: Duration::from_secs(5),
        }
    }
}

/// Total page count for a listing, read from its pagination label.
/// Returns 0 when the label is absent or unparsable — the caller skips
/// the category.
pub async fn page_count(guard: &mut NavigationGuard, url: &str, label_selector: &str) -> usize {
    if !guard.goto(url, true).await {
        return 0;
    }
    let label = match guard.page_mut().text_first(label_selector).await {
        Ok(Some(text)) => text,
        Ok(None) | Err(_) => return 0,
    };
    parse_page_total(&label).unwrap_or(0)
}

/// The label's trailing integer is the page total, whatever the locale
/// ("Page 1 of 42", "1 из 42", ...).
fn parse_page_total(label: &str) -> Option<usize> {
    label
        .split(|c: char| !c.is_ascii_digit())
        .filter(|chunk| !chunk.is_empty())
        .next_back()?
        .parse()
        .ok()
}

/// Walk a numbered listing page by page, collecting deduplicated product
/// links in discovery order. A streak of empty pages aborts the category;
/// a failed navigation counts as an empty page.
pub async fn collect_paged_links(
    guard: &mut NavigationGuard,
    listing_url: &str,
    rules: &PaginationRules,
) -> Vec<String> {
    let pages = page_count(guard, listing_url, &rules.page_label_selector).await;
    if pages == 0 {
        tracing::warn!(url = listing_url, "no pagination label; skipping category");
        return Vec::new();
    }
    tracing::info!(url = listing_url, pages, "walking category pages");

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut consecutive_empty = 0u32;

    for page in 1..=pages {
        let page_url = page_url(listing_url, page);
        let hrefs = if guard.goto(&page_url, true).await {
            guard
                .page_mut()
                .attr_all(&rules.link_selector, "href")
                .await
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        if hrefs.is_empty() {
            consecutive_empty += 1;
            tracing::warn!(page, consecutive_empty, "empty catalog page");
            if consecutive_empty >= rules.max_empty_pages {
                tracing::warn!(url = listing_url, page, "aborting category after empty-page streak");
                break;
            }
            continue;
        }

        consecutive_empty = 0;
        for href in hrefs {
            if seen.insert(href.clone()) {
                links.push(href);
            }
        }
    }

    tracing::info!(url = listing_url, count = links.len(), "collected product links");
    links
}

/// Scroll an infinite feed to the bottom until the link set stops growing
/// or the items limit is reached.
pub async fn collect_scroll_links(
    guard: &mut NavigationGuard,
    listing_url: &str,
    rules: &PaginationRules,
) -> Vec<String> {
    if !guard.goto(listing_url, true).await {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut links: Vec<String> = Vec::new();
    let mut stagnant = 0u32;
    let mut previous = 0usize;

    loop {
        if let Err(err) = guard.page_mut().scroll_to_bottom().await {
            tracing::warn!(url = listing_url, error = %err, "scroll failed; stopping");
            break;
        }
        if !rules.scroll_pause.is_zero() {
            tokio::time::sleep(rules.scroll_pause).await;
        }

        let hrefs = guard
            .page_mut()
            .attr_all(&rules.link_selector, "href")
            .await
            .unwrap_or_default();
        for href in hrefs {
            if seen.insert(href.clone()) {
                links.push(href);
            }
        }

        if let Some(limit) = rules.items_limit {
            if links.len() >= limit {
                links.truncate(limit);
                tracing::info!(url = listing_url, limit, "items limit reached");
                break;
            }
        }

        if links.len() == previous {
            stagnant += 1;
            if stagnant >= rules.max_stagnant_scrolls {
                break;
            }
        } else {
            stagnant = 0;
            previous = links.len();
        }
    }

    tracing::info!(url = listing_url, count = links.len(), "collected product links");
    links
}

fn page_url(base: &str, page: usize) -> String {
    if base.contains('?') {
        format!("{base}&page={page}")
    } else {
        format!("{base}?page={page}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::delay::DelayPolicy;
    use crate::guard::GuardConfig;
    use crate::proxy::ProxyPool;
    use crate::testing::{NavStep, Script, ScriptedFactory};

    const LINKS: &str = "#catalog-grid [data-component=\"ProductCardLink\"]";
    const LABEL: &str = "[data-component=\"PaginationLabel\"]";

    fn rules() -> PaginationRules {
        PaginationRules {
            scroll_pause: Duration::ZERO,
            ..PaginationRules::default()
        }
    }

    async fn guard_for(script: &Arc<Script>) -> NavigationGuard {
        NavigationGuard::start(
            ScriptedFactory::new(Arc::clone(script)),
            ProxyPool::default(),
            DelayPolicy::new(0.0, 0.0),
            GuardConfig {
                backoff_base: Duration::ZERO,
                rate_limit_pause: Duration::ZERO,
                ..GuardConfig::default()
            },
        )
        .await
        .unwrap()
    }

    #[test]
    fn parse_page_total_variants() {
        assert_eq!(parse_page_total("Page 1 of 42"), Some(42));
        assert_eq!(parse_page_total("1 из 17"), Some(17));
        assert_eq!(parse_page_total("no digits here"), None);
    }

    #[test]
    fn page_url_appends_query() {
        assert_eq!(page_url("https://m.example/coats", 3), "https://m.example/coats?page=3");
        assert_eq!(
            page_url("https://m.example/coats?sort=new", 3),
            "https://m.example/coats?sort=new&page=3"
        );
    }

    #[tokio::test]
    async fn paged_walk_collects_and_dedups() {
        let script = Script::new(vec![
            NavStep::ok().text(LABEL, "1 of 2"),
            NavStep::ok().attrs(LINKS, &["/p/1", "/p/2"]),
            NavStep::ok().attrs(LINKS, &["/p/2", "/p/3"]),
        ]);
        let mut guard = guard_for(&script).await;

        let links = collect_paged_links(&mut guard, "https://m.example/coats", &rules()).await;
        assert_eq!(links, vec!["/p/1", "/p/2", "/p/3"]);
    }

    #[tokio::test]
    async fn missing_label_skips_category() {
        let script = Script::new(vec![NavStep::ok()]);
        let mut guard = guard_for(&script).await;

        let links = collect_paged_links(&mut guard, "https://m.example/coats", &rules()).await;
        assert!(links.is_empty());
        assert_eq!(script.navigations().len(), 1);
    }

    #[tokio::test]
    async fn empty_streak_aborts_category_early() {
        // 10 pages; page 1 has items, pages 2-6 are empty, so the walk must
        // stop after page 6 and never request pages 7-10.
        let mut steps = vec![
            NavStep::ok().text(LABEL, "1 of 10"),
            NavStep::ok().attrs(LINKS, &["/p/1"]),
        ];
        for _ in 0..5 {
            steps.push(NavStep::ok());
        }
        let script = Script::new(steps);
        let mut guard = guard_for(&script).await;

        let links = collect_paged_links(&mut guard, "https://m.example/coats", &rules()).await;
        assert_eq!(links, vec!["/p/1"]);

        let navigations = script.navigations();
        // listing probe + pages 1..=6
        assert_eq!(navigations.len(), 7);
        assert!(navigations
            .last()
            .unwrap()
            .ends_with("page=6"));
    }

    #[tokio::test]
    async fn empty_counter_resets_on_content() {
        let script = Script::new(vec![
            NavStep::ok().text(LABEL, "1 of 6"),
            NavStep::ok(),
            NavStep::ok(),
            NavStep::ok().attrs(LINKS, &["/p/1"]),
            NavStep::ok(),
            NavStep::ok(),
            NavStep::ok().attrs(LINKS, &["/p/2"]),
        ]);
        let mut guard = guard_for(&script).await;

        let links = collect_paged_links(&mut guard, "https://m.example/coats", &rules()).await;
        assert_eq!(links, vec!["/p/1", "/p/2"]);
        assert_eq!(script.navigations().len(), 7);
    }

    #[tokio::test]
    async fn scroll_stops_after_stagnation() {
        let script = Script::with_scroll(
            vec![NavStep::ok()],
            LINKS,
            vec![vec!["/p/1"], vec!["/p/2"]],
        );
        let mut guard = guard_for(&script).await;

        let links = collect_scroll_links(&mut guard, "https://m.example/feed", &rules()).await;
        assert_eq!(links, vec!["/p/1", "/p/2"]);

        let scrolls = script
            .log()
            .iter()
            .filter(|entry| entry.as_str() == "scroll")
            .count();
        // 2 productive scrolls + 5 stagnant ones
        assert_eq!(scrolls, 7);
    }

    #[tokio::test]
    async fn scroll_respects_items_limit() {
        let script = Script::with_scroll(
            vec![NavStep::ok()],
            LINKS,
            vec![vec!["/p/1", "/p/2"], vec!["/p/3", "/p/4"]],
        );
        let mut guard = guard_for(&script).await;

        let limited = PaginationRules {
            items_limit: Some(3),
            ..rules()
        };
        let links = collect_scroll_links(&mut guard, "https://m.example/feed", &limited).await;
        assert_eq!(links, vec!["/p/1", "/p/2", "/p/3"]);
    }
}
