use serde::Deserialize;
use serde_json::Value;

use super::DataError;
use super::record::{CountryRecord, Metric};

const UNKNOWN_REGION: &str = "Unknown";

/// A single cell as it arrives from either export format.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RawField {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl RawField {
    fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Flag(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    fn as_text(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Flag(value) => value.to_string(),
            Self::Text(text) => text.trim().to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct RawCountryRow {
    #[serde(default, rename = "Country name")]
    pub(super) name: Option<RawField>,
    #[serde(default, rename = "Regional indicator")]
    pub(super) region: Option<RawField>,
    #[serde(default, rename = "Ladder score")]
    pub(super) ladder_score: Option<RawField>,
    #[serde(default, rename = "Log GDP per capita")]
    pub(super) gdp: Option<RawField>,
    #[serde(default, rename = "Social support")]
    pub(super) social_support: Option<RawField>,
    #[serde(default, rename = "Healthy life expectancy")]
    pub(super) life_expectancy: Option<RawField>,
    #[serde(default, rename = "Freedom to make life choices")]
    pub(super) freedom: Option<RawField>,
    #[serde(default, rename = "Generosity")]
    pub(super) generosity: Option<RawField>,
    #[serde(default, rename = "Perceptions of corruption")]
    pub(super) corruption: Option<RawField>,
    #[serde(default, rename = "Dystopia + residual")]
    pub(super) residual: Option<RawField>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum RowRejection {
    MissingName,
}

impl RowRejection {
    pub(super) fn reason(self) -> &'static str {
        match self {
            Self::MissingName => "country name is empty",
        }
    }
}

impl RawCountryRow {
    fn field(&self, metric: Metric) -> Option<&RawField> {
        match metric {
            Metric::Happiness => self.ladder_score.as_ref(),
            Metric::Gdp => self.gdp.as_ref(),
            Metric::SocialSupport => self.social_support.as_ref(),
            Metric::LifeExpectancy => self.life_expectancy.as_ref(),
            Metric::Freedom => self.freedom.as_ref(),
            Metric::Generosity => self.generosity.as_ref(),
            Metric::Corruption => self.corruption.as_ref(),
            Metric::Residual => self.residual.as_ref(),
        }
    }

    pub(super) fn into_record(self) -> Result<CountryRecord, RowRejection> {
        let name = self
            .name
            .as_ref()
            .map(RawField::as_text)
            .filter(|name| !name.is_empty())
            .ok_or(RowRejection::MissingName)?;

        let region = self
            .region
            .as_ref()
            .map(RawField::as_text)
            .filter(|region| !region.is_empty())
            .unwrap_or_else(|| UNKNOWN_REGION.to_owned());

        let mut record = CountryRecord::new(name, region);
        for metric in Metric::ALL {
            record.metrics[metric.index()] = self.field(metric).and_then(RawField::as_number);
        }
        Ok(record)
    }
}

pub(super) fn parse_json_rows(raw: &str) -> Result<Vec<Result<RawCountryRow, String>>, DataError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let rows = match parsed {
        Value::Array(rows) => rows,
        Value::Object(mut object) => match object.remove("rows").or_else(|| object.remove("data")) {
            Some(Value::Array(rows)) => rows,
            _ => return Err(DataError::Shape("expected an array of row objects")),
        },
        _ => return Err(DataError::Shape("expected an array of row objects")),
    };

    Ok(rows
        .into_iter()
        .map(|row| RawCountryRow::deserialize(row).map_err(|error| error.to_string()))
        .collect())
}

pub(super) fn parse_csv_rows(raw: &str) -> Result<Vec<Result<RawCountryRow, String>>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|header| header == "Country name") {
        return Err(DataError::Shape("missing `Country name` column"));
    }

    Ok(reader
        .deserialize::<RawCountryRow>()
        .map(|row| row.map_err(|error| error.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_rows_accept_numbers_strings_and_nulls() {
        let raw = r#"[
            {"Country name": " Finland ", "Regional indicator": "Western Europe",
             "Ladder score": 7.741, "Log GDP per capita": "1.844", "Social support": null,
             "Generosity": "n/a"}
        ]"#;
        let rows = parse_json_rows(raw).unwrap();
        let record = rows.into_iter().next().unwrap().unwrap().into_record().unwrap();

        assert_eq!(record.name, "Finland");
        assert_eq!(record.region, "Western Europe");
        assert_eq!(record.metric(Metric::Happiness), Some(7.741));
        assert_eq!(record.metric(Metric::Gdp), Some(1.844));
        assert_eq!(record.metric(Metric::SocialSupport), None);
        assert_eq!(record.metric(Metric::Generosity), None);
        assert_eq!(record.metric(Metric::Corruption), None);
    }

    #[test]
    fn blank_name_is_rejected_and_missing_region_defaults() {
        let blank = RawCountryRow {
            name: Some(RawField::Text("   ".to_owned())),
            ..RawCountryRow::default()
        };
        assert_eq!(blank.into_record(), Err(RowRejection::MissingName));

        let unnamed_region = RawCountryRow {
            name: Some(RawField::Text("Chad".to_owned())),
            ..RawCountryRow::default()
        };
        assert_eq!(unnamed_region.into_record().unwrap().region, "Unknown");
    }

    #[test]
    fn csv_rows_treat_empty_cells_as_absent() {
        let raw = "Country name,Regional indicator,Ladder score,Perceptions of corruption\n\
                   Denmark,Western Europe,7.583,0.525\n\
                   Bahrain,,5.959,\n";
        let rows = parse_csv_rows(raw).unwrap();
        let records = rows
            .into_iter()
            .map(|row| row.unwrap().into_record().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].metric(Metric::Corruption), Some(0.525));
        assert_eq!(records[1].region, "Unknown");
        assert_eq!(records[1].metric(Metric::Corruption), None);
    }

    #[test]
    fn non_finite_numbers_are_absent() {
        assert_eq!(RawField::Text("NaN".to_owned()).as_number(), None);
        assert_eq!(RawField::Text("inf".to_owned()).as_number(), None);
        assert_eq!(RawField::Number(2.5).as_number(), Some(2.5));
    }

    #[test]
    fn json_without_rows_is_a_shape_error() {
        assert!(matches!(
            parse_json_rows(r#"{"version": 1}"#),
            Err(DataError::Shape(_))
        ));
    }
}
