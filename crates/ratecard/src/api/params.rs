//! Query-string parameters of the listing endpoint.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::db::transformation_repo::TransformationFilter;
use crate::error::ValidationError;
use crate::model::TransformationStatus;
use crate::service::TransformationQuery;

/// Raw listing parameters. Multi-valued keys (`carrier`, `trade_lane`,
/// `status`) may repeat; values are validated by [`Self::to_query`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListTransformationsParams {
    #[serde(rename = "date.start", default)]
    pub date_start: Option<String>,
    #[serde(rename = "date.end", default)]
    pub date_end: Option<String>,
    #[serde(default)]
    pub carrier: Vec<String>,
    #[serde(default)]
    pub trade_lane: Vec<String>,
    #[serde(default)]
    pub status: Vec<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl ListTransformationsParams {
    /// Parses dates and statuses. The limit bound is checked by the service.
    pub fn to_query(&self, default_limit: u32) -> Result<TransformationQuery, ValidationError> {
        let date_start = parse_date("date.start", self.date_start.as_deref())?;
        let date_end = parse_date("date.end", self.date_end.as_deref())?;
        if let (Some(start), Some(end)) = (date_start, date_end) {
            if start > end {
                return Err(ValidationError::InvertedDateRange { start, end });
            }
        }

        let statuses = non_blank(&self.status)
            .into_iter()
            .map(|s| s.parse::<TransformationStatus>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransformationQuery {
            filter: TransformationFilter {
                date_start,
                date_end,
                carriers: non_blank(&self.carrier),
                trade_lanes: non_blank(&self.trade_lane),
                statuses,
            },
            cursor: self
                .cursor
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            limit: self.limit.unwrap_or(default_limit),
        })
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::InvalidDate {
                field: field.to_string(),
                value: v.to_string(),
            }),
    }
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
