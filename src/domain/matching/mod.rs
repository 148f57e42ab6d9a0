//! Matching domain - candidate selection across storefronts

use std::collections::HashMap;

use tracing::debug;

use crate::domain::title;
use crate::shared::types::{Platform, PriceQuote, SearchHit};

/// One storefront's search surface.
///
/// Implementations own their selectors and request shape; a storefront
/// layout change stays inside one implementation. `search` never fails:
/// exhausted retries or empty listings come back as a single
/// [`SearchHit::not_found`].
pub trait StorefrontScraper {
    fn platform(&self) -> Platform;
    fn search(&self, title: &str) -> Vec<SearchHit>;
}

/// Candidate titles containing any of these are never the game itself
/// (currency bundles, DLC, soundtracks and the like).
const IGNORE_KEYWORDS: &[&str] = &[
    "moeda",
    "pacote de",
    "stubs",
    "créditos",
    "coins",
    "points",
    "bundle",
    "dlc",
    "passe de temporada",
    "season pass",
    "expansão",
    "expansion",
    "upgrade",
    "demo",
    "beta",
    "soundtrack",
    "trilha sonora",
    "artbook",
];

/// Picks the best storefront candidate per platform for a game.
pub struct PriceAggregator {
    scrapers: Vec<Box<dyn StorefrontScraper>>,
    similarity_threshold: u8,
}

impl PriceAggregator {
    pub fn new(scrapers: Vec<Box<dyn StorefrontScraper>>, similarity_threshold: u8) -> Self {
        Self {
            scrapers,
            similarity_threshold,
        }
    }

    /// Search every platform and keep the highest-scoring relevant candidate
    /// for each. A platform whose best score is below the threshold is
    /// omitted entirely rather than returned as a low-confidence guess.
    /// Scoring exactly at the threshold is enough to be kept.
    pub fn best_match(&self, game_name: &str) -> HashMap<Platform, PriceQuote> {
        let query_norm = title::normalize(game_name);
        let mut quotes = HashMap::new();

        for scraper in &self.scrapers {
            let platform = scraper.platform();
            let hits = scraper.search(game_name);

            let mut best: Option<(u8, SearchHit)> = None;
            for hit in hits {
                let score = title::token_sort_ratio(&query_norm, &title::normalize(&hit.title));
                if !self.is_relevant(&hit.title, game_name, score) {
                    continue;
                }
                if best.as_ref().map_or(true, |(top, _)| score > *top) {
                    best = Some((score, hit));
                }
            }

            match best {
                Some((score, hit)) if score >= self.similarity_threshold => {
                    quotes.insert(
                        platform,
                        PriceQuote {
                            platform,
                            matched_title: hit.title,
                            price: hit.price,
                            source_url: hit.url,
                            similarity: score,
                        },
                    );
                }
                Some((score, hit)) => {
                    debug!(
                        platform = %platform,
                        title = %hit.title,
                        score,
                        "best candidate below similarity threshold, platform omitted"
                    );
                }
                None => {
                    debug!(platform = %platform, game = %game_name, "no relevant candidates");
                }
            }
        }

        quotes
    }

    /// Filter out candidates that cannot be the queried game: empty titles,
    /// known irrelevance keywords, and "edition" variants the query did not
    /// ask for unless they still score at or above the threshold.
    fn is_relevant(&self, candidate_title: &str, query: &str, score: u8) -> bool {
        if candidate_title.trim().is_empty() {
            return false;
        }
        let lowered = candidate_title.to_lowercase();
        if IGNORE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return false;
        }
        let query_lowered = query.to_lowercase();
        let candidate_is_edition = lowered.contains("edition") || lowered.contains("edição");
        let query_is_edition = query_lowered.contains("edition") || query_lowered.contains("edição");
        if candidate_is_edition && !query_is_edition && score < self.similarity_threshold {
            return false;
        }
        true
    }
}
