//! The request body for creating and editing expenses.

use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    amount::RawAmount,
    expense::core::{ExpenseFields, date_format::DATE_FORMAT},
};

pub const INVALID_DATE_MSG: &str = "Date must be a valid calendar date in the format YYYY-MM-DD.";

/// The JSON body of an add or edit expense request, before validation.
///
/// Every field is optional here so that a missing field is reported with the
/// same kind of message as an invalid one.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseForm {
    pub date: Option<String>,
    #[serde(rename = "descr", alias = "description")]
    pub description: Option<String>,
    pub amount: Option<RawAmount>,
    pub method: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ExpenseForm {
    /// Check every field and convert the form into [ExpenseFields].
    ///
    /// Text fields are trimmed.
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first field that is missing or invalid.
    pub fn validate(self) -> Result<ExpenseFields, Error> {
        let amount = self
            .amount
            .ok_or_else(|| Error::Validation("Amount is required.".to_owned()))?
            .parse()?;

        let date = self
            .date
            .as_deref()
            .map(str::trim)
            .and_then(|date| Date::parse(date, DATE_FORMAT).ok())
            .ok_or_else(|| Error::Validation(INVALID_DATE_MSG.to_owned()))?;

        Ok(ExpenseFields {
            date,
            description: required_text(self.description, "Description")?,
            amount,
            method: required_text(self.method, "Method")?,
            category: required_text(self.category, "Category")?,
            kind: required_text(self.kind, "Type")?,
        })
    }
}

fn required_text(value: Option<String>, field_name: &str) -> Result<String, Error> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_owned()),
        _ => Err(Error::Validation(format!("{field_name} is required."))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error,
        amount::{Amount, NOT_A_NUMBER_MSG, NOT_POSITIVE_MSG},
    };

    use super::{ExpenseForm, INVALID_DATE_MSG};

    fn form(value: serde_json::Value) -> ExpenseForm {
        serde_json::from_value(value).unwrap()
    }

    fn valid_json() -> serde_json::Value {
        json!({
            "date": "2025-03-14",
            "descr": "  Groceries ",
            "amount": "40",
            "method": "cash",
            "category": "Food",
            "type": "Need",
        })
    }

    #[test]
    fn validates_complete_form() {
        let fields = form(valid_json()).validate().unwrap();

        assert_eq!(fields.date, date!(2025 - 03 - 14));
        assert_eq!(fields.description, "Groceries");
        assert_eq!(fields.amount, Amount::from_cents(4000).unwrap());
        assert_eq!(fields.method, "cash");
        assert_eq!(fields.category, "Food");
        assert_eq!(fields.kind, "Need");
    }

    #[test]
    fn accepts_description_alias_and_numeric_amount() {
        let fields = form(json!({
            "date": "2025-03-14",
            "description": "Coffee",
            "amount": 4.5,
            "method": "checking",
            "category": "Food",
            "type": "Want",
        }))
        .validate()
        .unwrap();

        assert_eq!(fields.description, "Coffee");
        assert_eq!(fields.amount, Amount::from_cents(450).unwrap());
    }

    #[test]
    fn rejects_bad_amounts() {
        let mut value = valid_json();
        value["amount"] = json!("abc");
        assert_eq!(
            form(value.clone()).validate(),
            Err(Error::Validation(NOT_A_NUMBER_MSG.to_owned()))
        );

        value["amount"] = json!(0);
        assert_eq!(
            form(value).validate(),
            Err(Error::Validation(NOT_POSITIVE_MSG.to_owned()))
        );
    }

    #[test]
    fn rejects_bad_dates() {
        for bad_date in ["2025-02-30", "14/03/2025", ""] {
            let mut value = valid_json();
            value["date"] = json!(bad_date);

            assert_eq!(
                form(value).validate(),
                Err(Error::Validation(INVALID_DATE_MSG.to_owned())),
                "date {bad_date:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_missing_fields() {
        let mut value = valid_json();
        value.as_object_mut().unwrap().remove("method");

        assert_eq!(
            form(value).validate(),
            Err(Error::Validation("Method is required.".to_owned()))
        );
        assert_eq!(
            ExpenseForm::default().validate(),
            Err(Error::Validation("Amount is required.".to_owned()))
        );
    }

    #[test]
    fn rejects_blank_text() {
        let mut value = valid_json();
        value["category"] = json!("   ");

        assert_eq!(
            form(value).validate(),
            Err(Error::Validation("Category is required.".to_owned()))
        );
    }
}
