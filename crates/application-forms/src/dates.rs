//! Conversion between local dates and the server's date strings.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;

/// Pattern the REST backend uses for `LocalDate` fields (`yyyy-MM-dd`).
pub const SERVER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts a single date field between its wire and in-memory forms.
///
/// Both directions accept an absent value and return an absent value, so
/// callers can pass optional fields through without special casing them.
pub trait DateConverter: Send + Sync {
    fn from_server(&self, value: Option<&str>) -> Result<Option<NaiveDate>, DateConversionError>;
    fn to_server(&self, value: Option<NaiveDate>) -> Result<Option<String>, DateConversionError>;
}

/// Error raised when a date cannot cross the wire boundary.
#[derive(Debug, thiserror::Error)]
pub enum DateConversionError {
    #[error("'{value}' does not match server date format '{format}': {source}")]
    Malformed {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("date format '{format}' cannot be rendered")]
    InvalidFormat { format: String },
    #[error("date format '{format}' does not round-trip (rendered {sample} as '{rendered}')")]
    Lossy {
        format: String,
        sample: NaiveDate,
        rendered: String,
    },
}

const ROUND_TRIP_SAMPLES: [(i32, u32, u32); 4] =
    [(1900, 1, 2), (2021, 11, 30), (2099, 12, 31), (9999, 7, 4)];

/// strftime based converter; the default pattern matches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDateConverter {
    format: String,
}

impl ServerDateConverter {
    /// Builds a converter for `format`, rejecting patterns that cannot render a
    /// date or cannot parse their own output back to the same date.
    pub fn new(format: impl Into<String>) -> Result<Self, DateConversionError> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(DateConversionError::InvalidFormat { format });
        }

        let converter = Self { format };
        converter.verify_round_trip()?;
        Ok(converter)
    }

    fn render(&self, date: NaiveDate) -> Result<String, DateConversionError> {
        let mut rendered = String::new();
        write!(rendered, "{}", date.format(&self.format)).map_err(|_| {
            DateConversionError::InvalidFormat {
                format: self.format.clone(),
            }
        })?;
        Ok(rendered)
    }

    fn parse(&self, raw: &str) -> Result<NaiveDate, DateConversionError> {
        NaiveDate::parse_from_str(raw, &self.format).map_err(|source| {
            DateConversionError::Malformed {
                value: raw.to_string(),
                format: self.format.clone(),
                source,
            }
        })
    }

    // Day and month differ in every sample; 1900 and 2099 fall outside the
    // century a two-digit year parses into.
    fn verify_round_trip(&self) -> Result<(), DateConversionError> {
        for (year, month, day) in ROUND_TRIP_SAMPLES {
            let sample = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                DateConversionError::InvalidFormat {
                    format: self.format.clone(),
                }
            })?;
            let rendered = self.render(sample)?;
            match self.parse(&rendered) {
                Ok(parsed) if parsed == sample => {}
                _ => {
                    return Err(DateConversionError::Lossy {
                        format: self.format.clone(),
                        sample,
                        rendered,
                    })
                }
            }
        }
        Ok(())
    }
}

impl Default for ServerDateConverter {
    fn default() -> Self {
        Self {
            format: SERVER_DATE_FORMAT.to_string(),
        }
    }
}

impl DateConverter for ServerDateConverter {
    fn from_server(&self, value: Option<&str>) -> Result<Option<NaiveDate>, DateConversionError> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => self.parse(raw).map(Some),
        }
    }

    fn to_server(&self, value: Option<NaiveDate>) -> Result<Option<String>, DateConversionError> {
        value.map(|date| self.render(date)).transpose()
    }
}
