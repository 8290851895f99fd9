//! Directory listing HTML parsers
//!
//! The directory root carries a country `<select>`; listing pages carry
//! `username`-classed elements and, when a country spans several pages, a
//! link titled "last page" whose text is the bracketed final page number.

use scraper::{Html, Selector};

/// Extracts the country options from the directory root page, in document
/// order. Empty option texts are skipped. A page without the country
/// select yields an empty list.
pub fn parse_country_options(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut countries = Vec::new();
    if let Ok(selector) = Selector::parse("#avatars-country option") {
        for option in document.select(&selector) {
            let text = option.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                countries.push(text);
            }
        }
    }

    countries
}

/// Finds the last page number on a listing page.
///
/// The marker renders as a link titled "last page" with text like `[42]`.
/// A missing marker means a single-page listing; an unparseable marker is
/// treated the same way rather than failing the page.
pub fn parse_last_page(html: &str) -> u32 {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse(r#"[title="last page"]"#) else {
        return 1;
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| {
            let text = element.text().collect::<String>();
            text.trim().trim_matches(['[', ']']).parse::<u32>().ok()
        })
        .filter(|&page| page >= 1)
        .unwrap_or(1)
}

/// Extracts the username tokens from one listing page.
///
/// Usernames render wrapped in parentheses; the decoration is stripped and
/// empty tokens are skipped. A page with no username elements yields an
/// empty list.
pub fn parse_usernames(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let mut usernames = Vec::new();
    if let Ok(selector) = Selector::parse(".username") {
        for element in document.select(&selector) {
            let text = element.text().collect::<String>();
            let username = text.trim().trim_matches(['(', ')']).to_string();
            if !username.is_empty() {
                usernames.push(username);
            }
        }
    }

    usernames
}
