use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of a 400 response: every failing field with its messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationProblem {
    pub title: String,
    pub status: u16,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationProblem {
    pub fn from_report(report: &garde::Report) -> Self {
        let mut errors = BTreeMap::<String, Vec<String>>::new();

        for (path, error) in report.iter() {
            let field = match path.to_string() {
                field if field.is_empty() => String::from("value"),
                field => field,
            };
            errors
                .entry(field)
                .or_default()
                .push(error.message().to_string());
        }

        Self {
            title: String::from("One or more validation errors occurred."),
            status: 400,
            errors,
        }
    }
}
