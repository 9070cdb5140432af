use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::RequestBody,
    store::{CreatedWindow, Expense, ExpenseFields},
};

pub const BAD_EXPENSE_REQUEST: &str = "these fields must not be empty: name, amount";
pub const BAD_FILTER_REQUEST: &str = "start and end must be RFC3339 timestamps";

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_DESCRIPTION: &str = "-";

/// Body of add and update. Missing fields decode as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExpenseRequest {
    pub name: String,
    pub desc: String,
    pub category: String,
    #[serde(deserialize_with = "exact_amount")]
    pub amount: Option<Decimal>,
}

/// Reads the amount from its literal JSON text, so a number such as
/// `12.50` keeps every digit and its scale. Quoted amounts are accepted too.
fn exact_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Box<RawValue>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_amount(raw.get())
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// Values that need more than 28 significant digits are rejected, not rounded.
fn parse_amount(literal: &str) -> Result<Decimal, rust_decimal::Error> {
    let text = literal.trim();
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .trim();
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str_exact(text)
    }
}

impl RequestBody for ExpenseRequest {
    const INVALID: &'static str = BAD_EXPENSE_REQUEST;
}

impl ExpenseRequest {
    /// Name and amount are required; an explicit amount of 0 is accepted.
    /// Empty category and description fall back to their defaults.
    pub fn into_fields(self) -> Result<ExpenseFields, ApiError> {
        let name = self.name.trim();
        let Some(amount) = self.amount else {
            return Err(ApiError::Validation(BAD_EXPENSE_REQUEST));
        };
        if name.is_empty() {
            return Err(ApiError::Validation(BAD_EXPENSE_REQUEST));
        }
        Ok(ExpenseFields {
            name: name.to_string(),
            description: or_default(self.desc, DEFAULT_DESCRIPTION),
            category: or_default(self.category, DEFAULT_CATEGORY),
            amount,
        })
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub name: String,
    pub desc: String,
    pub category: String,
    pub amount: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Expense> for ExpenseResponse {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            name: e.name,
            desc: e.description,
            category: e.category,
            amount: e.amount,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

pub const BAD_LIST_QUERY: &str = "invalid query string";

/// Query string of a list request. A repeated `filterTime` keeps its first value.
#[derive(Debug, Default)]
pub struct ListQuery {
    pub filter_time: Option<String>,
}

impl ListQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let filter_time = pairs
            .into_iter()
            .find(|(key, _)| key == "filterTime")
            .map(|(_, value)| value);
        Self { filter_time }
    }
}

/// Relative windows accepted by `filterTime=fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInterval {
    PastWeek,
    PastMonth,
    LastThreeMonths,
    /// Anything unrecognised.
    PastYear,
}

impl TimeInterval {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "past_week" => TimeInterval::PastWeek,
            "past_month" => TimeInterval::PastMonth,
            "last_three_months" => TimeInterval::LastThreeMonths,
            _ => TimeInterval::PastYear,
        }
    }

    pub fn span(self) -> Duration {
        match self {
            TimeInterval::PastWeek => Duration::days(7),
            TimeInterval::PastMonth => Duration::days(30),
            TimeInterval::LastThreeMonths => Duration::days(90),
            TimeInterval::PastYear => Duration::days(365),
        }
    }

    pub fn window(self, now: OffsetDateTime) -> CreatedWindow {
        CreatedWindow {
            start: now - self.span(),
            end: now,
        }
    }
}

/// Body of a filtered list request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimeFilter {
    pub start: String,
    pub end: Option<String>,
}

impl RequestBody for TimeFilter {
    const INVALID: &'static str = BAD_FILTER_REQUEST;
}

impl TimeFilter {
    pub fn fixed_window(&self, now: OffsetDateTime) -> CreatedWindow {
        TimeInterval::parse(self.start.trim()).window(now)
    }

    /// `end` defaults to `now`.
    pub fn custom_window(&self, now: OffsetDateTime) -> Result<CreatedWindow, ApiError> {
        let parse = |raw: &str| {
            OffsetDateTime::parse(raw.trim(), &Rfc3339)
                .map_err(|_| ApiError::Validation(BAD_FILTER_REQUEST))
        };
        let start = parse(&self.start)?;
        let end = match self.end.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse(raw)?,
            _ => now,
        };
        Ok(CreatedWindow { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn body(json: &str) -> ExpenseRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn empty_category_and_description_get_defaults() {
        let fields = body(r#"{"name":"Lunch","amount":12.50,"category":"","desc":""}"#)
            .into_fields()
            .unwrap();
        assert_eq!(fields.name, "Lunch");
        assert_eq!(fields.category, "general");
        assert_eq!(fields.description, "-");
        assert_eq!(fields.amount, Decimal::new(1250, 2));
        assert_eq!(fields.amount.to_string(), "12.50");
    }

    #[test]
    fn number_literals_are_read_without_floating_point() {
        let fields = body(r#"{"name":"Rent","amount":12345678901234567.89}"#)
            .into_fields()
            .unwrap();
        assert_eq!(fields.amount.to_string(), "12345678901234567.89");

        let fields = body(r#"{"name":"Fee","amount":1.5e2}"#).into_fields().unwrap();
        assert_eq!(fields.amount, Decimal::new(150, 0));

        let fields = body(r#"{"name":"Refund","amount":-0.30}"#).into_fields().unwrap();
        assert_eq!(fields.amount.to_string(), "-0.30");
    }

    #[test]
    fn amounts_beyond_decimal_precision_do_not_decode() {
        for raw in [
            r#"{"name":"x","amount":0.1000000000000000055511151231257827}"#,
            r#"{"name":"x","amount":"ten"}"#,
            r#"{"name":"x","amount":true}"#,
        ] {
            assert!(serde_json::from_str::<ExpenseRequest>(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn amount_keeps_decimal_precision_from_strings() {
        let fields = body(r#"{"name":"Coffee","amount":"0.10"}"#)
            .into_fields()
            .unwrap();
        assert_eq!(fields.amount, Decimal::new(10, 2));
        assert_eq!(fields.amount.to_string(), "0.10");
    }

    #[test]
    fn name_and_amount_are_required() {
        for raw in [
            r#"{"amount":5}"#,
            r#"{"name":"   ","amount":5}"#,
            r#"{"name":"Taxi"}"#,
            r#"{"name":"Taxi","amount":null}"#,
        ] {
            assert!(matches!(
                body(raw).into_fields(),
                Err(ApiError::Validation(BAD_EXPENSE_REQUEST))
            ));
        }
    }

    #[test]
    fn explicit_zero_amount_is_accepted() {
        let fields = body(r#"{"name":"Free sample","amount":0}"#)
            .into_fields()
            .unwrap();
        assert!(fields.amount.is_zero());
    }

    #[test]
    fn response_uses_wire_names() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let res = ExpenseResponse::from(Expense {
            id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            name: "Lunch".into(),
            description: "-".into(),
            category: "general".into(),
            amount: Decimal::new(1250, 2),
            created_at: at,
            updated_at: at,
        });
        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(value["desc"], "-");
        assert_eq!(value["amount"], "12.50");
        assert_eq!(value["created_at"], "2024-05-01T12:00:00Z");
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn list_query_takes_the_first_filter() {
        let pairs = vec![
            ("page".to_string(), "2".to_string()),
            ("filterTime".to_string(), "fixed".to_string()),
            ("filterTime".to_string(), "custom".to_string()),
        ];
        assert_eq!(ListQuery::from_pairs(pairs).filter_time.as_deref(), Some("fixed"));
        assert!(ListQuery::from_pairs(Vec::new()).filter_time.is_none());
    }

    #[test]
    fn fixed_intervals() {
        let now = datetime!(2024-05-31 00:00 UTC);
        let window = |s: &str| TimeFilter { start: s.into(), end: None }.fixed_window(now);
        assert_eq!(window("past_week").start, datetime!(2024-05-24 00:00 UTC));
        assert_eq!(window("past_month").start, datetime!(2024-05-01 00:00 UTC));
        assert_eq!(window("last_three_months").start, now - Duration::days(90));
        assert_eq!(window("").start, now - Duration::days(365));
        assert_eq!(window("past_week").end, now);
    }

    #[test]
    fn custom_window_parses_rfc3339_and_defaults_end() {
        let now = datetime!(2024-05-31 00:00 UTC);
        let filter = TimeFilter {
            start: "2024-01-01T00:00:00Z".into(),
            end: Some("2024-02-01T00:00:00+01:00".into()),
        };
        let w = filter.custom_window(now).unwrap();
        assert_eq!(w.start, datetime!(2024-01-01 00:00 UTC));
        assert_eq!(w.end, datetime!(2024-01-31 23:00 UTC));

        let open = TimeFilter {
            start: "2024-01-01T00:00:00Z".into(),
            end: None,
        };
        assert_eq!(open.custom_window(now).unwrap().end, now);
    }

    #[test]
    fn custom_window_rejects_garbage() {
        let now = OffsetDateTime::now_utc();
        let bad_start = TimeFilter {
            start: "yesterday".into(),
            end: None,
        };
        assert!(bad_start.custom_window(now).is_err());
        let bad_end = TimeFilter {
            start: "2024-01-01T00:00:00Z".into(),
            end: Some("2024-13-01".into()),
        };
        assert!(bad_end.custom_window(now).is_err());
    }
}
