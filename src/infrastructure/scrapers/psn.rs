//! PlayStation Store search scraper

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use scraper::{Html, Selector};
use tracing::{info, warn};

use super::HttpFetcher;
use crate::config::Config;
use crate::domain::matching::StorefrontScraper;
use crate::domain::price;
use crate::shared::types::{Platform, SearchHit};

const STORE_ORIGIN: &str = "https://store.playstation.com";

pub struct PsnScraper {
    fetcher: HttpFetcher,
    max_candidates: usize,
}

impl PsnScraper {
    pub fn new(fetcher: HttpFetcher, config: &Config) -> Self {
        Self {
            fetcher,
            max_candidates: config.clamped_candidates(),
        }
    }

    fn search_url(title: &str) -> String {
        // the title is a path segment; reserved chars like ? # & must not
        // survive raw or they truncate the URL
        let encoded = utf8_percent_encode(title, NON_ALPHANUMERIC);
        format!("{STORE_ORIGIN}/pt-br/search/{encoded}")
    }
}

impl StorefrontScraper for PsnScraper {
    fn platform(&self) -> Platform {
        Platform::Psn
    }

    fn search(&self, title: &str) -> Vec<SearchHit> {
        info!(title, "psn: searching");
        let url = Self::search_url(title);
        let body = self.fetcher.get_with_retry(|client| client.get(&url));

        match body {
            Ok(html) => {
                let hits = parse_search_page(&html, self.max_candidates);
                if hits.is_empty() {
                    vec![SearchHit::not_found()]
                } else {
                    hits
                }
            }
            Err(e) => {
                warn!(title, error = %e, "psn: search failed");
                vec![SearchHit::not_found()]
            }
        }
    }
}

/// Extract up to `max` product tiles. Tiles without a product title are
/// omitted. A tile with no price span may still be free when it carries a
/// "Gratuito" badge.
fn parse_search_page(html: &str, max: usize) -> Vec<SearchHit> {
    let Some(tile_sel) = sel("a.psw-link") else { return Vec::new() };
    let Some(title_sel) = sel("span.psw-product-tile__product-title") else { return Vec::new() };
    let Some(price_sel) = sel(".psw-product-tile__price span.psw-m-r-3") else { return Vec::new() };
    let Some(badge_sel) = sel("span.psw-product-tile__badge-label") else { return Vec::new() };

    let doc = Html::parse_document(html);
    let mut hits = Vec::new();
    for tile in doc.select(&tile_sel) {
        if hits.len() >= max {
            break;
        }
        let Some(title_el) = tile.select(&title_sel).next() else { continue };
        let title = text_of(title_el);
        if title.is_empty() {
            continue;
        }

        let mut parsed = tile
            .select(&price_sel)
            .next()
            .and_then(|el| price::parse(&text_of(el)));
        if parsed.is_none() {
            // free games carry a badge instead of a price span
            parsed = tile
                .select(&badge_sel)
                .next()
                .and_then(|el| price::parse(&text_of(el)))
                .filter(|p| *p == 0);
        }

        let url = tile.value().attr("href").map(|href| {
            if href.starts_with('/') {
                format!("{STORE_ORIGIN}{href}")
            } else {
                href.to_string()
            }
        });

        hits.push(SearchHit {
            title,
            price: parsed,
            url,
        });
    }
    hits
}

fn sel(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

fn text_of(el: scraper::ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
