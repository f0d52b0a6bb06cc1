//! Scraped multi-bank cash-rate table (minfin.com.ua).
//!
//! One localized page per currency and date. The page carries several tables;
//! the second one holds the per-bank cash rates, with a final aggregate row
//! that is not a bank. Coverage starts in 2015; earlier dates come back with
//! an empty table.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use crate::{RateSource, RawRate, SourceConfig, SourceError};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.75 Safari/537.36";

#[derive(Debug)]
pub struct MinfinSource {
    http: Client,
    base_url: String,
}

impl MinfinSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            http,
            base_url: config.minfin_base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl RateSource for MinfinSource {
    fn name(&self) -> &'static str {
        "minfin"
    }

    fn localized_names(&self) -> bool {
        true
    }

    fn fetch(&self, cc: &str, date: NaiveDate) -> Result<Vec<RawRate>, SourceError> {
        let url = format!(
            "{}/ua/currency/banks/{}/{}/",
            self.base_url,
            cc.to_lowercase(),
            date.format("%Y-%m-%d")
        );
        let unavailable = |cause: reqwest::Error| SourceError::Unavailable {
            src: "minfin",
            cc: cc.to_string(),
            date,
            cause,
        };

        let html = self
            .http
            .get(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .text()
            .map_err(unavailable)?;

        let rows = parse_rate_table(&html);
        if rows.is_empty() {
            return Err(SourceError::NoData {
                src: "minfin",
                cc: cc.to_string(),
                date,
            });
        }
        Ok(rows)
    }
}

/// Extracts (bank, rate) pairs from the second table of a rates page,
/// dropping the aggregate footer row present on every page.
fn parse_rate_table(html: &str) -> Vec<RawRate> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("static selector");
    let row_sel = Selector::parse("tr").expect("static selector");
    let cell_sel = Selector::parse("td").expect("static selector");

    let Some(table) = document.select(&table_sel).nth(1) else {
        return Vec::new();
    };

    let mut rows: Vec<(String, String)> = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
        if cells.len() < 2 {
            continue;
        }
        rows.push((cell_text(cells[0]), cell_text(cells[1])));
    }
    rows.pop();

    rows.into_iter()
        .filter_map(|(bank, rate_cell)| match parse_rate(&rate_cell) {
            Some(rate) => Some(RawRate { bank, rate }),
            None => {
                log::warn!("minfin: skipping {bank:?}, unparseable rate cell {rate_cell:?}");
                None
            }
        })
        .collect()
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First numeric token of a rate cell ("27.85", "27,85", "27.85/28.10").
fn parse_rate(cell: &str) -> Option<f64> {
    cell.split(|c: char| c.is_whitespace() || c == '/')
        .find(|token| !token.is_empty())
        .and_then(|token| token.replace(',', ".").parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table><tr><td>nav junk</td><td>more junk</td></tr></table>
        <table>
            <tr><th>Банк</th><th>Курс</th></tr>
            <tr><td><a>ПриватБанк</a></td><td>27.55</td></tr>
            <tr><td>Ощадбанк</td><td>27,60</td></tr>
            <tr><td>ПУМБ</td><td>27.70/28.10</td></tr>
            <tr><td>Середній курс</td><td>27.62</td></tr>
        </table>
        </body></html>"#;

    #[test]
    fn parses_bank_and_rate_columns_and_drops_footer() {
        let rows = parse_rate_table(PAGE);
        assert_eq!(
            rows,
            vec![
                RawRate {
                    bank: "ПриватБанк".to_string(),
                    rate: 27.55
                },
                RawRate {
                    bank: "Ощадбанк".to_string(),
                    rate: 27.60
                },
                RawRate {
                    bank: "ПУМБ".to_string(),
                    rate: 27.70
                },
            ]
        );
    }

    #[test]
    fn unparseable_rate_rows_are_skipped() {
        let page = r#"
            <table></table>
            <table>
                <tr><td>Банк А</td><td>27.55</td></tr>
                <tr><td>Банк Б</td><td>немає</td></tr>
                <tr><td>підсумок</td><td>27.55</td></tr>
            </table>"#;
        let rows = parse_rate_table(page);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bank, "Банк А");
    }

    #[test]
    fn page_without_a_rate_table_yields_nothing() {
        assert!(parse_rate_table("<html><table></table></html>").is_empty());
        assert!(parse_rate_table("").is_empty());
    }

    #[test]
    fn rate_cell_variants_parse() {
        assert_eq!(parse_rate("27.85"), Some(27.85));
        assert_eq!(parse_rate("27,85"), Some(27.85));
        assert_eq!(parse_rate("27.85/28.10"), Some(27.85));
        assert_eq!(parse_rate(" 27.85 +0.05"), Some(27.85));
        assert_eq!(parse_rate("—"), None);
    }
}
