use std::fmt;

use serde::{Deserialize, Serialize};

/// One extracted book entry. Field order fixes the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub book_name: String,
    pub rate_point: String,
    pub rate_number: String,
    /// Empty string when the abstract carries no author line.
    pub author: String,
    pub publisher: String,
    pub publish_date: String,
    pub pic_link: String,
}

impl BookRecord {
    /// Canonical CSV header, in field order.
    pub const FIELDS: [&'static str; 7] = [
        "book_name",
        "rate_point",
        "rate_number",
        "author",
        "publisher",
        "publish_date",
        "pic_link",
    ];
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "《{}》 author: {} | rating: {} ({} ratings) | publisher: {} | year: {} | cover: {}",
            self.book_name,
            self.author,
            self.rate_point,
            self.rate_number,
            self.publisher,
            self.publish_date,
            self.pic_link
        )
    }
}
