// src/domain/criteria.rs

use crate::domain::listing::Source;
use crate::errors::ServerError;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// One lakh rupees. The search form sends its budget in lakhs.
pub const LAKH: f64 = 100_000.0;

pub const DEFAULT_PAGES: u32 = 5;
pub const DEFAULT_BUDGET_LAKHS: f64 = 80.0;
pub const DEFAULT_BHK: [&str; 2] = ["2", "3"];

/// Immutable filters for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    /// Absolute rupees. `None` disables the budget check.
    pub budget_max: Option<f64>,
    /// Empty means any bedroom count.
    pub bhk_wanted: BTreeSet<String>,
    /// Parsed and carried for display, never enforced by validation.
    pub rera_required: bool,
    pub preferred_only: bool,
    pub pages_per_site: u32,
    pub enabled_sources: BTreeSet<Source>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            budget_max: Some(DEFAULT_BUDGET_LAKHS * LAKH),
            bhk_wanted: DEFAULT_BHK.iter().map(|s| s.to_string()).collect(),
            rera_required: true,
            preferred_only: false,
            pages_per_site: DEFAULT_PAGES,
            enabled_sources: Source::ALL.into_iter().collect(),
        }
    }
}

impl SearchCriteria {
    /// Bedroom digits in ascending order, as the 99acres URL wants them.
    pub fn bhk_list(&self) -> Vec<&str> {
        self.bhk_wanted.iter().map(String::as_str).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BhkInput {
    List(Vec<String>),
    Joined(String),
}

/// Body of `POST /start_scraping`. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    pub pages: Option<i64>,
    pub bhk: Option<BhkInput>,
    /// Lakhs.
    pub budget: Option<f64>,
    pub rera: Option<String>,
    pub preferred: Option<bool>,
    pub sites: Option<HashMap<String, bool>>,
}

impl StartRequest {
    pub fn into_criteria(self, max_pages: u32) -> Result<SearchCriteria, ServerError> {
        let pages = self.pages.unwrap_or(DEFAULT_PAGES as i64);
        if pages < 1 {
            return Err(ServerError::BadRequest("pages must be at least 1".into()));
        }
        let pages_per_site = pages.min(max_pages as i64) as u32;

        let budget_lakhs = self.budget.unwrap_or(DEFAULT_BUDGET_LAKHS);
        if !budget_lakhs.is_finite() || budget_lakhs < 0.0 {
            return Err(ServerError::BadRequest("budget must be a positive number".into()));
        }
        let budget_max = (budget_lakhs > 0.0).then_some(budget_lakhs * LAKH);

        let bhk_wanted = match self.bhk {
            None => DEFAULT_BHK.iter().map(|s| s.to_string()).collect(),
            Some(BhkInput::List(items)) => normalize_bhk(items.iter().map(String::as_str)),
            Some(BhkInput::Joined(joined)) => normalize_bhk(joined.split(',')),
        };

        let rera_required = self
            .rera
            .as_deref()
            .map(|r| r.trim().eq_ignore_ascii_case("yes"))
            .unwrap_or(true);

        let mut enabled_sources: BTreeSet<Source> = Source::ALL.into_iter().collect();
        if let Some(sites) = self.sites {
            for (key, enabled) in sites {
                match Source::from_key(&key) {
                    Some(source) if !enabled => {
                        enabled_sources.remove(&source);
                    }
                    Some(_) => {}
                    None => tracing::warn!(site = %key, "ignoring unknown site in request"),
                }
            }
        }

        if enabled_sources.is_empty() {
            return Err(ServerError::BadRequest("select at least one site".into()));
        }

        Ok(SearchCriteria {
            budget_max,
            bhk_wanted,
            rera_required,
            preferred_only: self.preferred.unwrap_or(false),
            pages_per_site,
            enabled_sources,
        })
    }
}

fn normalize_bhk<'a>(items: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    items
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
