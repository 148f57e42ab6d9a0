//! Steam storefront search scraper

use reqwest::header::COOKIE;
use scraper::{Html, Selector};
use tracing::{info, warn};

use super::HttpFetcher;
use crate::config::Config;
use crate::domain::matching::StorefrontScraper;
use crate::domain::price;
use crate::shared::types::{Platform, SearchHit};

const SEARCH_URL: &str = "https://store.steampowered.com/search/";

/// Bypasses Steam's age verification interstitial on mature titles.
const AGE_GATE_COOKIE: &str = "birthtime=315532800; wants_mature_content=1; mature_content=1";

pub struct SteamScraper {
    fetcher: HttpFetcher,
    search_url: String,
    country: String,
    max_candidates: usize,
}

impl SteamScraper {
    pub fn new(fetcher: HttpFetcher, config: &Config) -> Self {
        Self {
            fetcher,
            search_url: SEARCH_URL.to_string(),
            country: config.country.clone(),
            max_candidates: config.clamped_candidates(),
        }
    }
}

impl StorefrontScraper for SteamScraper {
    fn platform(&self) -> Platform {
        Platform::Steam
    }

    fn search(&self, title: &str) -> Vec<SearchHit> {
        info!(title, "steam: searching");
        let body = self.fetcher.get_with_retry(|client| {
            client
                .get(&self.search_url)
                .query(&[
                    ("term", title),
                    ("l", "brazilian"),
                    ("cc", self.country.as_str()),
                ])
                .header(COOKIE, AGE_GATE_COOKIE)
        });

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
                warn!(title, error = %e, "steam: search failed");
                vec![SearchHit::not_found()]
            }
        }
    }
}

/// Extract up to `max` result tiles. A tile missing its title span is
/// skipped; a missing or unparseable price keeps the tile with no price.
fn parse_search_page(html: &str, max: usize) -> Vec<SearchHit> {
    let Some(row_sel) = sel("#search_resultsRows a") else { return Vec::new() };
    let Some(title_sel) = sel("span.title") else { return Vec::new() };
    let Some(discounted_sel) = sel(".search_price.discounted") else { return Vec::new() };
    let Some(final_price_sel) = sel(".discount_final_price") else { return Vec::new() };
    let Some(price_sel) = sel(".search_price") else { return Vec::new() };

    let doc = Html::parse_document(html);
    let mut hits = Vec::new();
    for row in doc.select(&row_sel).take(max) {
        let Some(title_el) = row.select(&title_sel).next() else { continue };
        let title = text_of(title_el);
        if title.is_empty() {
            continue;
        }

        // A discounted tile carries the sale price in its own element;
        // otherwise the plain search price applies.
        let price_el = if row.select(&discounted_sel).next().is_some() {
            row.select(&final_price_sel).next()
        } else {
            row.select(&price_sel).next()
        };
        let parsed = price_el.and_then(|el| price::parse(&text_of(el)));

        hits.push(SearchHit {
            title,
            price: parsed,
            url: row.value().attr("href").map(String::from),
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
