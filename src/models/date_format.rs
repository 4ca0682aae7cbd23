//! Calendar dates travel over the wire as `YYYY-MM-DDZ`, the same form the
//! API accepts in requests and query strings.

use chrono::NaiveDate;
use serde::Serializer;

pub const DATE_FORMAT: &str = "%Y-%m-%dZ";

pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format(DATE_FORMAT))
}
