use encoding_rs::{Encoding, GBK, UTF_8};
use log::{info, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::record::BookRecord;

/// Result of extracting one listing page.
#[derive(Debug, Default)]
pub struct PageExtract {
    pub records: Vec<BookRecord>,
    /// Book blocks skipped because an expected element was missing.
    pub skipped: usize,
}

/// Pulls `BookRecord`s out of listing-page HTML.
///
/// Selectors and patterns are compiled once. The rating count is matched by
/// an explicit numeric pattern anchored on the 人评价 suffix, and the
/// author line of the abstract is optional; publisher and year are required.
pub struct Extractor {
    book_sel: Selector,
    title_sel: Selector,
    rating_sel: Selector,
    rate_point_sel: Selector,
    abstract_sel: Selector,
    pic_sel: Selector,
    count_re: Regex,
    abstract_re: Regex,
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            book_sel: Selector::parse("div.bd.doulist-subject").unwrap(),
            title_sel: Selector::parse("div.title").unwrap(),
            rating_sel: Selector::parse("div.rating").unwrap(),
            rate_point_sel: Selector::parse("span.rating_nums").unwrap(),
            abstract_sel: Selector::parse("div.abstract").unwrap(),
            pic_sel: Selector::parse("div.post a img").unwrap(),
            count_re: Regex::new(r"(\d+)人评价").unwrap(),
            abstract_re: Regex::new(
                r"^(?:作者:\s*(?P<author>[^\n]*)\n)?(?s:.*?)出版社:\s*(?P<publisher>[^\n]*)(?s:.*?)出版年:\s*(?P<year>[^\n]*)",
            )
            .unwrap(),
        }
    }

    /// Decode, parse, and extract every book block on the page. A malformed
    /// block is skipped and counted, never fatal.
    pub fn extract(&self, body: &[u8]) -> PageExtract {
        let text = decode(body);
        let doc = Html::parse_document(&text);

        let mut page = PageExtract::default();
        for block in doc.select(&self.book_sel) {
            match self.extract_block(block) {
                Ok(record) => {
                    info!("{}", record);
                    page.records.push(record);
                }
                Err(e) => {
                    warn!("entry skipped: {}", e);
                    page.skipped += 1;
                }
            }
        }
        page
    }

    fn extract_block(&self, block: ElementRef<'_>) -> Result<BookRecord, ScrapeError> {
        let title = block
            .select(&self.title_sel)
            .next()
            .ok_or(ScrapeError::MalformedEntry("title"))?;
        let book_name = title.text().collect::<String>().trim().to_string();

        let rating = block
            .select(&self.rating_sel)
            .next()
            .ok_or(ScrapeError::MalformedEntry("rating"))?;
        let rate_point = rating
            .select(&self.rate_point_sel)
            .next()
            .ok_or(ScrapeError::MalformedEntry("rating value"))?
            .text()
            .collect::<String>()
            .trim()
            .to_string();
        let rating_text = rating.text().collect::<String>();
        let rate_number = self
            .count_re
            .captures(&rating_text)
            .map(|c| c[1].to_string())
            .ok_or(ScrapeError::MalformedEntry("rating count"))?;

        let abstract_el = block
            .select(&self.abstract_sel)
            .next()
            .ok_or(ScrapeError::MalformedEntry("abstract"))?;
        let (author, publisher, publish_date) = self.parse_abstract(&text_lines(abstract_el))?;

        let pic_link = block
            .select(&self.pic_sel)
            .next()
            .ok_or(ScrapeError::MalformedEntry("cover image"))?
            .value()
            .attr("src")
            .ok_or(ScrapeError::MalformedEntry("cover image src"))?
            .to_string();

        Ok(BookRecord {
            book_name,
            rate_point,
            rate_number,
            author,
            publisher,
            publish_date,
            pic_link,
        })
    }

    /// Author is optional and defaults to empty; publisher and year must be
    /// present for the entry to count.
    fn parse_abstract(&self, text: &str) -> Result<(String, String, String), ScrapeError> {
        let caps = self
            .abstract_re
            .captures(text.trim())
            .ok_or(ScrapeError::MalformedEntry("abstract fields"))?;
        let author = caps
            .name("author")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        let publisher = caps
            .name("publisher")
            .ok_or(ScrapeError::MalformedEntry("publisher"))?
            .as_str()
            .trim()
            .to_string();
        let publish_date = caps
            .name("year")
            .ok_or(ScrapeError::MalformedEntry("publish year"))?
            .as_str()
            .trim()
            .to_string();
        Ok((author, publisher, publish_date))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Text content of `el` with every line trimmed and blank lines dropped.
fn text_lines(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(|t| t.split('\n'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// BOM first, then strict UTF-8, then a GBK heuristic; lossy UTF-8 as the
/// last resort. The listing pages carry no reliable charset declaration.
fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    if looks_like_gbk(bytes) {
        return GBK;
    }
    UTF_8
}

fn decode(bytes: &[u8]) -> String {
    let (text, _, _) = detect_encoding(bytes).decode(bytes);
    text.into_owned()
}

/// Share of non-ASCII byte pairs falling in the GBK lead/trail ranges.
fn looks_like_gbk(bytes: &[u8]) -> bool {
    let mut pairs = 0usize;
    let mut hits = 0usize;
    let mut i = 0;
    while i + 1 < bytes.len() {
        let b1 = bytes[i];
        if b1 < 0x80 {
            i += 1;
            continue;
        }
        pairs += 1;
        let b2 = bytes[i + 1];
        if (0x81..=0xFE).contains(&b1) && (0x40..=0xFE).contains(&b2) && b2 != 0x7F {
            hits += 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    pairs > 0 && hits * 10 >= pairs * 9
}
