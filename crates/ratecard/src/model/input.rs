//! Metadata payload attached to a transformation submission.
//!
//! The optional sections are opaque to the job store: they are validated
//! structurally here and then persisted verbatim.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationInput {
    pub carrier: String,
    pub trade_lane: String,
    pub dates: Vec<DatesItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheets_and_filters: Option<SheetsAndFilters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharges_to_exclude: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharges_included: Option<Vec<SurchargeIncluded>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharges_to_be_added: Option<Vec<SurchargeToBeAdded>>,
}

/// A validity window for the rate card, optionally restricted to some sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatesItem {
    pub application_date: NaiveDate,
    pub validity_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheets: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetsAndFilters {
    pub sheets_to_exclude: Vec<String>,
    pub filters: Vec<SheetFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetFilter {
    pub name: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeIncluded {
    pub surcharge_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeToBeAdded {
    pub surcharge_code: String,
    pub price: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    pub basis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

impl TransformationInput {
    /// Parses the `data` form field of a submission and validates it.
    pub fn from_json(data: &str) -> Result<Self, ValidationError> {
        let input: TransformationInput = serde_json::from_str(data).map_err(|e| match e.classify() {
            Category::Syntax | Category::Eof | Category::Io => ValidationError::InvalidJson {
                reason: e.to_string(),
            },
            Category::Data => ValidationError::InvalidField {
                field: "data".to_string(),
                reason: e.to_string(),
            },
        })?;
        let input = input.normalized();
        input.validate()?;
        Ok(input)
    }

    /// Trims the filterable fields so stored values match trimmed filters.
    pub fn normalized(mut self) -> Self {
        self.carrier = self.carrier.trim().to_string();
        self.trade_lane = self.trade_lane.trim().to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("carrier", &self.carrier)?;
        require_text("trade_lane", &self.trade_lane)?;

        for (i, item) in self.dates.iter().enumerate() {
            if item.application_date > item.validity_date {
                return Err(invalid(
                    format!("dates[{}]", i),
                    format!(
                        "application_date {} is after validity_date {}",
                        item.application_date, item.validity_date
                    ),
                ));
            }
        }

        if let Some(sheets) = &self.sheets_and_filters {
            for (i, filter) in sheets.filters.iter().enumerate() {
                require_text(&format!("sheets_and_filters.filters[{}].name", i), &filter.name)?;
                require_text(
                    &format!("sheets_and_filters.filters[{}].column", i),
                    &filter.column,
                )?;
            }
        }

        for (i, surcharge) in self.surcharges_included.iter().flatten().enumerate() {
            let field = format!("surcharges_included[{}]", i);
            require_text(&field, &surcharge.surcharge_code)?;
            check_window(&field, surcharge.validity_date, surcharge.expiry_date)?;
        }

        for (i, surcharge) in self.surcharges_to_be_added.iter().flatten().enumerate() {
            let field = format!("surcharges_to_be_added[{}]", i);
            require_text(&field, &surcharge.surcharge_code)?;
            require_text(&format!("{}.currency", field), &surcharge.currency)?;
            require_text(&format!("{}.basis", field), &surcharge.basis)?;
            if !surcharge.price.is_finite() {
                return Err(invalid(format!("{}.price", field), "must be a finite number"));
            }
            check_window(&field, surcharge.validity_date, surcharge.expiry_date)?;
        }

        Ok(())
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.into(),
        reason: reason.into(),
    }
}

fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be blank"));
    }
    Ok(())
}

fn check_window(
    field: &str,
    validity: Option<NaiveDate>,
    expiry: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (validity, expiry) {
        (Some(from), Some(to)) if from > to => Err(invalid(
            field,
            format!("validity_date {} is after expiry_date {}", from, to),
        )),
        _ => Ok(()),
    }
}
