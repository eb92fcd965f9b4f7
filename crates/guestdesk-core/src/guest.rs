use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{self, unknown_date, unknown_instant};
use crate::{Error, Result};

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_ADDRESS_LEN: usize = 200;
pub const MAX_COUNTRY_LEN: usize = 50;

/// Normalized identity and stay data for one guest.
///
/// Serialized with PascalCase keys. This is the shape sent for translation
/// and the shape requested from the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GuestRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "text::deserialize")]
    pub first_name: String,
    #[serde(default, deserialize_with = "text::deserialize")]
    pub last_name: String,
    #[serde(with = "date_of_birth", default = "unknown_date")]
    pub date_of_birth: NaiveDate,
    #[serde(default, deserialize_with = "text::deserialize")]
    pub address: String,
    #[serde(default, deserialize_with = "text::deserialize")]
    pub country: String,
    #[serde(with = "check_in", default = "unknown_instant")]
    pub check_in_date: DateTime<Utc>,
}

/// A named text field of a [`GuestRecord`].
#[derive(Clone, Copy)]
pub struct TextField {
    pub name: &'static str,
    pub get: fn(&GuestRecord) -> &str,
}

fn first_name(g: &GuestRecord) -> &str {
    &g.first_name
}

fn last_name(g: &GuestRecord) -> &str {
    &g.last_name
}

fn address(g: &GuestRecord) -> &str {
    &g.address
}

fn country(g: &GuestRecord) -> &str {
    &g.country
}

/// Text fields in declaration order. Date fields are never part of this list.
pub const TEXT_FIELDS: [TextField; 4] = [
    TextField { name: "FirstName", get: first_name },
    TextField { name: "LastName", get: last_name },
    TextField { name: "Address", get: address },
    TextField { name: "Country", get: country },
];

impl GuestRecord {
    /// An empty record checked in at `check_in_date`, with an unknown date of birth.
    #[must_use]
    pub fn checked_in_at(check_in_date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: unknown_date(),
            address: String::new(),
            country: String::new(),
            check_in_date,
        }
    }

    #[must_use]
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    #[must_use]
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    #[must_use]
    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn text_fields(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        TEXT_FIELDS.iter().map(move |f| (f.name, (f.get)(self)))
    }

    /// Non-empty text fields joined by single spaces.
    ///
    /// Used both as the language-detection input and as the content signal:
    /// an empty result means nothing usable was extracted.
    #[must_use]
    pub fn content_signal(&self) -> String {
        self.text_fields()
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn has_known_date_of_birth(&self) -> bool {
        !dates::is_unknown(self.date_of_birth)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the column limits of the `guests` table.
    pub fn validate_for_storage(&self) -> Result<()> {
        let limits = [
            ("FirstName", &self.first_name, MAX_NAME_LEN),
            ("LastName", &self.last_name, MAX_NAME_LEN),
            ("Address", &self.address, MAX_ADDRESS_LEN),
            ("Country", &self.country, MAX_COUNTRY_LEN),
        ];

        for (name, value, max) in limits {
            let len = value.chars().count();
            if len > max {
                return Err(Error::InvalidGuest(format!(
                    "{name} is {len} characters (max: {max})"
                )));
            }
        }

        Ok(())
    }
}

mod text {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

mod date_of_birth {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::dates::{first_match, unknown_date, ISO_DATE, SERIALIZED_DATE_FORMATS};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(ISO_DATE))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;

        Ok(raw
            .as_deref()
            .and_then(|s| first_match(s, &SERIALIZED_DATE_FORMATS))
            .map_or_else(unknown_date, |(date, _)| date))
    }
}

mod check_in {
    use chrono::{DateTime, NaiveTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::dates::{first_match, unknown_instant, SERIALIZED_DATE_FORMATS};

    pub fn serialize<S: Serializer>(
        instant: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&instant.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(unknown_instant());
        };

        if let Ok(instant) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(instant.with_timezone(&Utc));
        }

        Ok(first_match(&raw, &SERIALIZED_DATE_FORMATS)
            .map_or_else(unknown_instant, |(date, _)| {
                date.and_time(NaiveTime::MIN).and_utc()
            }))
    }
}
