use std::{convert::TryFrom, fmt, str::FromStr};

use thiserror::Error;

/// One of the mutually exclusive ways a user can name a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    ByCity,
    ByZip,
    ByCoordinates,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown search mode '{0}'. Supported modes: city, zip, coordinates.")]
pub struct UnknownSearchMode(pub String);

/// An input shown on the field-entry screen of a search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
}

const CITY_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "city", label: "City", placeholder: "Lake Saint Louis" },
    FieldSpec { name: "state", label: "State code", placeholder: "MO" },
    FieldSpec { name: "country", label: "Country code", placeholder: "US" },
];

const ZIP_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "zip", label: "Zip code", placeholder: "63367" },
    FieldSpec { name: "country", label: "Country code", placeholder: "US" },
];

const COORDINATE_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "lat", label: "Latitude", placeholder: "38.79755" },
    FieldSpec { name: "lon", label: "Longitude", placeholder: "-90.785683" },
];

impl SearchMode {
    /// Stable name used in URLs and forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::ByCity => "city",
            SearchMode::ByZip => "zip",
            SearchMode::ByCoordinates => "coordinates",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::ByCity => "City name",
            SearchMode::ByZip => "Zip code",
            SearchMode::ByCoordinates => "Coordinates",
        }
    }

    /// Fields the user fills in for this mode, in display order.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            SearchMode::ByCity => CITY_FIELDS,
            SearchMode::ByZip => ZIP_FIELDS,
            SearchMode::ByCoordinates => COORDINATE_FIELDS,
        }
    }

    pub const fn all() -> &'static [SearchMode] {
        &[SearchMode::ByCity, SearchMode::ByZip, SearchMode::ByCoordinates]
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SearchMode {
    type Error = UnknownSearchMode;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "city" => Ok(SearchMode::ByCity),
            "zip" => Ok(SearchMode::ByZip),
            "coordinates" => Ok(SearchMode::ByCoordinates),
            _ => Err(UnknownSearchMode(value.to_string())),
        }
    }
}

impl FromStr for SearchMode {
    type Err = UnknownSearchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchMode::try_from(s)
    }
}
