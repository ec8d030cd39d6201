//! Fare API response DTOs.
//!
//! These types map directly to the JSON rows returned by the fare API.
//! Identifiers are sometimes sent as numbers and sometimes as strings, so
//! they are accepted either way and normalised to `String`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{City, County, LineRecord, Price, State};

/// A row of the `line` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineDto {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub code: Option<String>,

    pub origin: Option<String>,

    pub destination: Option<String>,

    /// Whether fares are given by a custom property (e.g. taxi meter).
    #[serde(rename = "has_custom_property_name", default)]
    pub has_custom_property: bool,

    pub city_id: Option<i64>,

    pub price: Option<Vec<PriceDto>>,
}

/// A fare entry embedded in a line row.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceDto {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,

    pub title: Option<String>,

    pub price: Option<f64>,

    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A row of the `city` table with its county and state embedded.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CityDto {
    pub id: i64,
    pub name: String,
    pub county: CountyDto,
    pub state: StateDto,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CountyDto {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub state_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateDto {
    pub id: i64,
    pub name: String,
}

impl From<LineDto> for LineRecord {
    fn from(dto: LineDto) -> Self {
        LineRecord {
            id: dto.id,
            code: dto.code,
            origin: dto.origin,
            destination: dto.destination,
            has_custom_property: dto.has_custom_property,
            city_id: dto.city_id,
            prices: dto
                .price
                .map(|prices| prices.into_iter().map(Price::from).collect()),
        }
    }
}

impl From<PriceDto> for Price {
    fn from(dto: PriceDto) -> Self {
        Price {
            id: dto.id,
            title: dto.title,
            amount: dto.price,
            extra: dto.extra,
        }
    }
}

impl From<CityDto> for City {
    fn from(dto: CityDto) -> Self {
        City {
            id: dto.id,
            name: dto.name,
            county: County {
                id: dto.county.id,
                name: dto.county.name,
                state_id: dto.county.state_id,
            },
            state: State {
                id: dto.state.id,
                name: dto.state.name,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}
