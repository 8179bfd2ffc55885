// src/domain/listing.rs

use crate::domain::extract::{is_preferred_builder, parse_area_sqft, parse_bhk, parse_price};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Listing sites the finder knows how to scrape, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "99acres")]
    Acres99,
    #[serde(rename = "MagicBricks")]
    MagicBricks,
    #[serde(rename = "Housing.com")]
    Housing,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Acres99, Source::MagicBricks, Source::Housing];

    /// Display name, as shown on cards and written to exports.
    pub fn label(self) -> &'static str {
        match self {
            Source::Acres99 => "99acres",
            Source::MagicBricks => "MagicBricks",
            Source::Housing => "Housing.com",
        }
    }

    /// Key used by the search form's `sites` map.
    pub fn key(self) -> &'static str {
        match self {
            Source::Acres99 => "99acres",
            Source::MagicBricks => "magicbricks",
            Source::Housing => "housing",
        }
    }

    pub fn from_key(key: &str) -> Option<Source> {
        let key = key.trim().to_ascii_lowercase();
        Source::ALL
            .into_iter()
            .find(|s| s.key() == key || s.label().to_ascii_lowercase() == key)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bedroom count. Anything outside 1..=4 (or missing) is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bhk {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    Unknown,
}

impl Bhk {
    pub fn from_digits(digits: Option<&str>) -> Bhk {
        match digits.map(str::trim) {
            Some("1") => Bhk::One,
            Some("2") => Bhk::Two,
            Some("3") => Bhk::Three,
            Some("4") => Bhk::Four,
            _ => Bhk::Unknown,
        }
    }

    /// The digit string for a known count.
    pub fn digit(self) -> Option<&'static str> {
        match self {
            Bhk::One => Some("1"),
            Bhk::Two => Some("2"),
            Bhk::Three => Some("3"),
            Bhk::Four => Some("4"),
            Bhk::Unknown => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.digit().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReraStatus {
    Yes,
    #[serde(rename = "Not Mentioned")]
    NotMentioned,
}

impl ReraStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReraStatus::Yes => "Yes",
            ReraStatus::NotMentioned => "Not Mentioned",
        }
    }
}

/// Fields an adapter lifted out of one listing fragment, before normalization.
#[derive(Debug, Default, Clone)]
pub struct RawListing {
    pub title: Option<String>,
    pub project: Option<String>,
    pub builder: Option<String>,
    pub price_text: Option<String>,
    pub area_text: Option<String>,
    pub description: Option<String>,
    pub property_url: Option<String>,
    pub rera_mentioned: bool,
}

/// The normalized record every pipeline stage works on.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalListing {
    pub source: Source,
    pub title: Option<String>,
    pub project: Option<String>,
    pub builder: Option<String>,
    #[serde(default, deserialize_with = "blank_as_false")]
    pub is_preferred_builder: bool,
    pub bhk: Bhk,
    pub price_text: Option<String>,
    pub price_numeric: Option<f64>,
    pub area_text: Option<String>,
    pub area_sqft: Option<f64>,
    pub price_per_sqft: Option<f64>,
    pub rera: ReraStatus,
    pub property_url: Option<String>,
    pub description: Option<String>,
}

impl CanonicalListing {
    pub const FIELD_NAMES: [&'static str; 14] = [
        "source",
        "title",
        "project",
        "builder",
        "is_preferred_builder",
        "bhk",
        "price_text",
        "price_numeric",
        "area_text",
        "area_sqft",
        "price_per_sqft",
        "rera",
        "property_url",
        "description",
    ];

    /// Normalizes an adapter's raw fields. Every derived field is computed here.
    pub fn from_raw(source: Source, raw: RawListing) -> Self {
        let title = clean(raw.title);
        let project = clean(raw.project);
        let builder = clean(raw.builder).or_else(|| project.clone());
        let description = clean(raw.description);
        let price_text = clean(raw.price_text);
        let area_text = clean(raw.area_text);
        let bedrooms = bedrooms_in(title.as_deref(), description.as_deref());

        let mut listing = Self {
            source,
            title,
            project,
            builder,
            is_preferred_builder: false,
            bhk: Bhk::from_digits(bedrooms.as_deref()),
            price_numeric: price_text.as_deref().and_then(parse_price),
            price_text,
            area_sqft: area_text.as_deref().and_then(parse_area_sqft),
            area_text,
            price_per_sqft: None,
            rera: if raw.rera_mentioned {
                ReraStatus::Yes
            } else {
                ReraStatus::NotMentioned
            },
            property_url: clean(raw.property_url),
            description,
        };
        listing.recompute_derived();
        listing
    }

    /// Recomputes the builder flag and per-sq.ft price from the stored text.
    /// Imported rows go through this too, so a CSV can't smuggle in a flag.
    pub fn recompute_derived(&mut self) {
        self.is_preferred_builder = self
            .builder
            .as_deref()
            .or(self.project.as_deref())
            .map(is_preferred_builder)
            .unwrap_or(false);

        self.price_per_sqft = match (self.price_numeric, self.area_sqft) {
            (Some(price), Some(area)) if area > 0.0 => Some((price / area).round()),
            _ => None,
        };
    }

    /// Bedroom count as listed. Unlike `bhk`, this keeps counts above 4;
    /// `None` only when no count is mentioned at all.
    pub fn bedroom_count(&self) -> Option<String> {
        match self.bhk.digit() {
            Some(digit) => Some(digit.to_string()),
            None => bedrooms_in(self.title.as_deref(), self.description.as_deref()),
        }
    }

    /// Headline for display when the title is missing.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.project.as_deref())
            .unwrap_or("Details Not Available")
    }
}

/// The flag is recomputed after import, so an empty cell is not an error.
fn blank_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn bedrooms_in(title: Option<&str>, description: Option<&str>) -> Option<String> {
    title
        .and_then(parse_bhk)
        .or_else(|| description.and_then(parse_bhk))
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty())
}
