//! Results table parser for NorBits `browse.php` pages.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::categories::CategoryMapping;
use crate::indexer::parse_util::{coerce_int, parse_imdb_id, parse_size};
use crate::indexer::types::{IndexerError, ReleaseRecord};

/// Date and time cells are rendered on two lines with no separator.
const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%d%H:%M:%S";

const MINIMUM_RATIO: f64 = 1.0;

/// 48 hours.
const MINIMUM_SEED_TIME: u64 = 172_800;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static ROWS: Lazy<Selector> = Lazy::new(|| selector("#torrentTable > tbody > tr"));
static DOWNLOAD_LINK: Lazy<Selector> =
    Lazy::new(|| selector(r#"td:nth-of-type(2) > a[href*="download.php?id="]"#));
static DETAILS_LINK: Lazy<Selector> =
    Lazy::new(|| selector(r#"td:nth-of-type(2) > a[href*="details.php?id="]"#));
static CATEGORY_LINK: Lazy<Selector> =
    Lazy::new(|| selector(r#"td:nth-of-type(1) a[href*="main_cat[]"]"#));
static FILES: Lazy<Selector> = Lazy::new(|| selector("td:nth-of-type(3) > a"));
static PUBLISH_DATE: Lazy<Selector> = Lazy::new(|| selector("td:nth-of-type(5)"));
static SIZE: Lazy<Selector> = Lazy::new(|| selector("td:nth-of-type(7)"));
static GRABS: Lazy<Selector> = Lazy::new(|| selector("td:nth-of-type(8)"));
static SEEDERS: Lazy<Selector> = Lazy::new(|| selector("td:nth-of-type(9)"));
static LEECHERS: Lazy<Selector> = Lazy::new(|| selector("td:nth-of-type(10)"));
static GENRES: Lazy<Selector> = Lazy::new(|| selector("span.genres"));
static IMDB_LINK: Lazy<Selector> = Lazy::new(|| selector(r#"a[href*="imdb.com/title/tt"]"#));

/// Discount badges in match order; the first one present wins.
static DISCOUNT_BADGES: Lazy<Vec<(Selector, f64)>> = Lazy::new(|| {
    vec![
        (selector(r#"img[title="100% freeleech"]"#), 0.0),
        (selector(r#"img[title="Halfleech"]"#), 0.5),
        (selector(r#"img[title="90% Freeleech"]"#), 0.1),
    ]
});

/// Parse every data row of the results table.
///
/// The header row is skipped; every other row yields a record, even when
/// its links are missing. Only an unreadable publish date fails the parse.
pub(super) fn parse_results(
    body: &str,
    base_url: &str,
    categories: &CategoryMapping,
) -> Result<Vec<ReleaseRecord>, IndexerError> {
    let document = Html::parse_document(body);

    document
        .select(&ROWS)
        .skip(1)
        .enumerate()
        .map(|(index, row)| parse_row(row, index, base_url, categories))
        .collect()
}

fn parse_row(
    row: ElementRef<'_>,
    index: usize,
    base_url: &str,
    categories: &CategoryMapping,
) -> Result<ReleaseRecord, IndexerError> {
    let download_href = first(row, &DOWNLOAD_LINK).and_then(|a| a.value().attr("href"));
    let details = first(row, &DETAILS_LINK);
    let details_href = details.and_then(|a| a.value().attr("href"));

    let download_url = absolute(base_url, download_href);
    let details_url = absolute(base_url, details_href);
    let title = details
        .and_then(|a| a.value().attr("title"))
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    let category_token = first(row, &CATEGORY_LINK)
        .and_then(|a| a.value().attr("href"))
        .and_then(category_from_href);

    let seeders = cell_text(row, &SEEDERS)
        .and_then(|t| coerce_int(&t))
        .unwrap_or(0);
    let leechers = cell_text(row, &LEECHERS)
        .and_then(|t| coerce_int(&t))
        .unwrap_or(0);

    let publish_date = parse_publish_date(cell_text(row, &PUBLISH_DATE).as_deref())
        .ok_or_else(|| {
            IndexerError::Format(format!(
                "unreadable publish date in result row {}",
                index + 1
            ))
        })?;

    let (description, genres) = match cell_text(row, &GENRES) {
        Some(raw) if !raw.trim().is_empty() => {
            let normalized = normalize_genres(&raw);
            let genres = normalized
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect();
            (Some(normalized), genres)
        }
        _ => (None, Vec::new()),
    };

    let imdb_id = first(row, &IMDB_LINK)
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| href.trim_end_matches('/').rsplit('/').next())
        .and_then(parse_imdb_id);

    let download_volume_factor = DISCOUNT_BADGES
        .iter()
        .find(|(badge, _)| first(row, badge).is_some())
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0);

    Ok(ReleaseRecord {
        guid: details_url.clone(),
        info_url: details_url,
        download_url,
        title,
        categories: categories.map_tracker_to_standard(category_token.as_deref()),
        size: cell_text(row, &SIZE).and_then(|t| parse_size(&t)),
        files: cell_text(row, &FILES).and_then(|t| coerce_int(&t)),
        grabs: first(row, &GRABS)
            .and_then(first_child_text)
            .and_then(|t| coerce_int(&t)),
        seeders,
        leechers,
        peers: seeders.saturating_add(leechers),
        publish_date,
        download_volume_factor,
        upload_volume_factor: 1.0,
        minimum_ratio: MINIMUM_RATIO,
        minimum_seed_time: MINIMUM_SEED_TIME,
        imdb_id,
        genres,
        description,
    })
}

fn first<'a>(row: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    row.select(selector).next()
}

fn cell_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    first(row, selector).map(|el| el.text().collect::<String>())
}

/// Text of the first child node only, ignoring trailing labels.
fn first_child_text(cell: ElementRef<'_>) -> Option<String> {
    let node = cell.first_child()?;
    if let Some(text) = node.value().as_text() {
        return Some(text.trim().to_string());
    }
    ElementRef::wrap(node).map(|el| el.text().collect::<String>().trim().to_string())
}

fn absolute(base_url: &str, href: Option<&str>) -> String {
    format!("{}{}", base_url, href.unwrap_or_default().trim_start_matches('/'))
}

/// Pull the `main_cat[]=N` token out of a category link's query string.
fn category_from_href(href: &str) -> Option<String> {
    let query = href.rsplit('?').next()?;
    query
        .split('&')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .find(|part| {
            part.get(..11)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("main_cat[]="))
        })
        .map(str::to_string)
}

fn parse_publish_date(text: Option<&str>) -> Option<DateTime<Utc>> {
    let compact: String = text?.split_whitespace().collect();
    NaiveDateTime::parse_from_str(&compact, PUBLISH_DATE_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

fn normalize_genres(raw: &str) -> String {
    raw.trim()
        .replace('\u{a0}', " ")
        .replace(['(', ')'], "")
        .replace(" | ", ",")
}
