use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime};

use crate::categories::repo::Category;

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub category_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub category_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct AddCategoryResponse {
    pub status: &'static str,
    pub message: String,
    pub category_id: i64,
    pub category_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct UpdateCategoryResponse {
    pub status: &'static str,
    pub message: String,
    pub category_id: i64,
    pub category_name: String,
    pub original_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Same-name update: reported as informational, nothing written.
#[derive(Debug, Serialize)]
pub struct NoChangeResponse {
    pub status: &'static str,
    pub message: String,
    pub category_id: i64,
    pub category_name: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    pub status: &'static str,
    pub message: String,
    pub category_id: i64,
    pub category_name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryListItem {
    pub category_id: i64,
    pub category_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub formatted_date: String,
    pub formatted_time: String,
    pub time_ago: String,
    pub row_number: usize,
}

#[derive(Debug, Serialize)]
pub struct FetchCategoriesResponse {
    pub status: &'static str,
    pub message: String,
    pub categories: Vec<CategoryListItem>,
    pub count: usize,
    pub total_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchCategoriesResponse {
    pub status: &'static str,
    pub message: String,
    pub categories: Vec<CategoryListItem>,
    pub count: usize,
}

const DATE_FMT: &[FormatItem<'_>] = format_description!("[month repr:short] [day], [year]");
const TIME_FMT: &[FormatItem<'_>] = format_description!(
    "[month repr:short] [day], [year] [hour repr:12 padding:none]:[minute] [period]"
);

impl CategoryListItem {
    pub fn from_row(category: &Category, index: usize) -> Self {
        Self {
            category_id: category.id,
            category_name: category.name.clone(),
            created_at: category.created_at,
            formatted_date: category.created_at.format(DATE_FMT).unwrap_or_default(),
            formatted_time: category.created_at.format(TIME_FMT).unwrap_or_default(),
            time_ago: time_ago(category.created_at, OffsetDateTime::now_utc()),
            row_number: index + 1,
        }
    }
}

/// Coarse human-readable age, matching the granularity clients display.
pub fn time_ago(created_at: OffsetDateTime, now: OffsetDateTime) -> String {
    let secs = (now - created_at).whole_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{} min ago", secs / 60),
        3_600..=86_399 => format!("{} hr ago", secs / 3_600),
        86_400..=2_591_999 => format!("{} days ago", secs / 86_400),
        2_592_000..=31_535_999 => format!("{} months ago", secs / 2_592_000),
        _ => format!("{} years ago", secs / 31_536_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    #[test]
    fn time_ago_buckets() {
        let now = datetime!(2025-09-05 12:00 UTC);
        let cases = [
            (Duration::seconds(30), "just now"),
            (Duration::minutes(5), "5 min ago"),
            (Duration::hours(3), "3 hr ago"),
            (Duration::days(4), "4 days ago"),
            (Duration::days(90), "3 months ago"),
            (Duration::days(800), "2 years ago"),
        ];
        for (age, expected) in cases {
            assert_eq!(time_ago(now - age, now), expected);
        }
    }

    #[test]
    fn time_ago_never_reports_the_future() {
        let now = datetime!(2025-09-05 12:00 UTC);
        assert_eq!(time_ago(now + Duration::hours(1), now), "just now");
    }

    #[test]
    fn list_item_formats_dates() {
        let category = Category {
            id: 9,
            user_id: 1,
            name: "Snacks".into(),
            created_at: datetime!(2025-09-05 15:04 UTC),
        };
        let item = CategoryListItem::from_row(&category, 0);
        assert_eq!(item.category_id, 9);
        assert_eq!(item.row_number, 1);
        assert_eq!(item.formatted_date, "Sep 05, 2025");
        assert_eq!(item.formatted_time, "Sep 05, 2025 3:04 PM");
    }

    #[test]
    fn list_item_serializes_envelope_fields() {
        let category = Category {
            id: 1,
            user_id: 1,
            name: "Snacks".into(),
            created_at: datetime!(2025-01-02 00:30 UTC),
        };
        let json = serde_json::to_value(CategoryListItem::from_row(&category, 2)).unwrap();
        assert_eq!(json["category_name"], "Snacks");
        assert_eq!(json["row_number"], 3);
        assert!(json["created_at"].as_str().unwrap().starts_with("2025-01-02"));
    }
}
