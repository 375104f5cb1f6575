//! Static catalog of News API sources grouped by category.
//!
//! # Categories
//!
//! | Kind | Labels |
//! |------|--------|
//! | Aggregate | `All` |
//! | Topic | Business, Entertainment, Gaming, Health, Music, Politics, Science, Sport, Technology |
//! | Country | Argentina through United States |
//!
//! The raw table may repeat a source inside one category; lookups return an
//! ordered set (first occurrence wins). Labels match case-insensitively.

use itertools::Itertools;
use once_cell::sync::Lazy;

/// Label of the aggregate category that lists every known source.
pub const ALL: &str = "All";

/// Pseudo-category resolved by the session to the configured sources.
pub const DEFAULT: &str = "Default";

const CATALOG: &[(&str, &[&str])] = &[
    (
        ALL,
        &[
            "abc-news", "abc-news-au", "al-jazeera-english", "aftenposten", "ansa", "argaam",
            "ars-technica", "ary-news", "associated-press", "australian-financial-review", "axios",
            "bbc-news", "bbc-sport", "bild", "blasting-news-br", "bleacher-report", "bloomberg",
            "breitbart-news", "business-insider", "business-insider-uk", "buzzfeed", "cbc-news",
            "cbs-news", "cnbc", "cnn", "cnn-es", "crypto-coins-news", "daily-mail",
            "der-tagesspiegel", "die-zeit", "el-mundo", "engadget", "entertainment-weekly", "espn",
            "espn-cric-info", "financial-post", "financial-times", "focus", "football-italia",
            "fortune", "four-four-two", "fox-news", "fox-sports", "globo", "google-news",
            "google-news-ar", "google-news-au", "google-news-br", "google-news-ca",
            "google-news-fr", "google-news-in", "google-news-is", "google-news-it",
            "google-news-ru", "google-news-sa", "google-news-uk", "goteborgs-posten",
            "gruenderszene", "hacker-news", "handelsblatt", "ign", "il-sole-24-ore", "independent",
            "infobae", "info-money", "la-gaceta", "la-nacion", "la-repubblica", "le-monde",
            "lenta", "lequipe", "les-echos", "liberation", "marca", "mashable",
            "medical-news-today", "metro", "mirror", "msnbc", "mtv-news", "mtv-news-uk",
            "national-geographic", "nbc-news", "news24", "new-scientist", "news-com-au",
            "newsweek", "new-york-magazine", "next-big-future", "nfl-news", "nhl-news", "nrk",
            "politico", "polygon", "rbc", "recode", "reuters", "rt", "rte", "rtl-nieuws", "sabq",
            "spiegel-online", "svenska-dagbladet", "t3n", "talksport", "techcrunch",
            "techcrunch-cn", "techradar", "the-economist", "the-globe-and-mail", "the-guardian-au",
            "the-guardian-uk", "the-hill", "the-hindu", "the-huffington-post", "the-irish-times",
            "the-lad-bible", "the-new-york-times", "the-next-web", "the-sport-bible",
            "the-telegraph", "the-times-of-india", "the-verge", "the-wall-street-journal",
            "the-washington-post", "time", "usa-today", "vice-news", "wired", "wired-de",
            "wirtschafts-woche", "xinhua-net", "ynet",
        ],
    ),
    (
        "Business",
        &[
            "bloomberg", "australian-financial-review", "bloomberg", "business-insider",
            "business-insider-uk", "cnbc", "die-zeit", "financial-post", "financial-times",
            "fortune", "handelsblatt", "il-sole-24-ore", "info-money", "les-echos",
            "the-economist", "the-wall-street-journal", "wirtschafts-woche",
        ],
    ),
    (
        "Entertainment",
        &["buzzfeed", "daily-mail", "entertainment-weekly", "mashable", "the-lad-bible"],
    ),
    ("Gaming", &["ign", "polygon"]),
    ("Health", &["medical-news-today"]),
    ("Music", &["mtv-news", "mtv-news-uk"]),
    ("Politics", &["breitbart-news", "la-nacion", "politico", "the-hill"]),
    ("Science", &["national-geographic", "new-scientist", "next-big-future"]),
    (
        "Sport",
        &[
            "bbc-sport", "bleacher-report", "espn", "football-italia", "four-four-two",
            "fox-sports", "lequipe", "marca", "nfl-news", "nhl-news", "talksport",
            "the-sport-bible",
        ],
    ),
    (
        "Technology",
        &[
            "gruenderszene", "hacker-news", "recode", "t3n", "techcrunch", "techradar",
            "the-next-web", "the-verge", "wired", "wired-de",
        ],
    ),
    ("Argentina", &["infobae", "la-gaceta", "la-nacion"]),
    (
        "Australia",
        &[
            "abc-news-au", "australian-financial-review", "google-news-au", "news-com-au",
            "the-guardian-au",
        ],
    ),
    ("Brazil", &["blasting-news-br", "globo", "google-news-br", "info-money"]),
    ("Canada", &["cbc-news", "financial-post", "google-news-ca", "the-globe-and-mail"]),
    ("China", &["techcrunch-cn", "xinhua-net"]),
    ("France", &["google-news-fr", "le-monde", "lequipe", "les-echos", "liberation"]),
    (
        "Germany",
        &[
            "bild", "der-tagesspiegel", "die-zeit", "focus", "gruenderszene", "handelsblatt",
            "spiegel-online", "t3n", "wired-de", "wirtschafts-woche",
        ],
    ),
    ("India", &["google-news-in", "the-hindu", "the-times-of-india"]),
    ("Ireland", &["rte", "the-irish-times"]),
    ("Israel", &["google-news-is", "ynet"]),
    (
        "Italy",
        &["ansa", "football-italia", "google-news-it", "il-sole-24-ore", "la-repubblica"],
    ),
    ("Netherlands", &["rtl-nieuws"]),
    ("Norway", &["aftenposten", "nrk"]),
    ("Pakistan", &["ary-news"]),
    ("Russia", &["google-news-ru", "lenta", "rbc", "rt"]),
    ("Saudi Arabia", &["argaam", "google-news-sa", "sabq"]),
    ("South Africa", &["news24"]),
    ("Spain", &["el-mundo", "marca"]),
    ("Sweden", &["goteborgs-posten", "svenska-dagbladet"]),
    (
        "United Kingdom",
        &[
            "bbc-news", "bbc-sport", "business-insider", "daily-mail", "financial-times",
            "four-four-two", "google-news-uk", "independent", "metro", "mirror", "mtv-news-uk",
            "talksport", "the-economist", "the-guardian-uk", "the-lad-bible", "the-sport-bible",
            "the-telegraph",
        ],
    ),
    (
        "United States",
        &[
            "abc-news", "associated-press", "axios", "bleacher-report", "bloomberg",
            "breitbart-news", "business-insider", "cbs-news", "cnbc", "cnn", "espn", "fortune",
            "fox-news", "google-news", "msnbc", "mtv-news", "national-geographic", "nbc-news",
            "new-york-magazine", "nfl-news", "polygon", "reuters", "time", "usa-today",
            "the-washington-post", "wired", "the-new-york-times",
        ],
    ),
];

/// One catalog category with its de-duplicated, ordered sources.
#[derive(Debug, Clone)]
pub struct Category {
    pub label: &'static str,
    pub sources: Vec<&'static str>,
}

static CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    CATALOG
        .iter()
        .map(|&(label, sources)| Category {
            label,
            sources: sources.iter().copied().unique().collect(),
        })
        .collect()
});

/// Every category in display order, `All` first.
pub fn categories() -> &'static [Category] {
    &CATEGORIES
}

/// Sources for a category label, or `None` when the label is unknown.
pub fn sources_for(label: &str) -> Option<Vec<String>> {
    CATEGORIES
        .iter()
        .find(|c| c.label.eq_ignore_ascii_case(label.trim()))
        .map(|c| c.sources.iter().map(|s| s.to_string()).collect())
}
