pub const METRIC_COUNT: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Happiness,
    Gdp,
    SocialSupport,
    LifeExpectancy,
    Freedom,
    Generosity,
    Corruption,
    Residual,
}

impl Metric {
    pub const ALL: [Self; METRIC_COUNT] = [
        Self::Happiness,
        Self::Gdp,
        Self::SocialSupport,
        Self::LifeExpectancy,
        Self::Freedom,
        Self::Generosity,
        Self::Corruption,
        Self::Residual,
    ];

    /// Metrics shown side by side when two countries are compared.
    pub const COMPARED: [Self; 6] = [
        Self::Happiness,
        Self::Gdp,
        Self::SocialSupport,
        Self::LifeExpectancy,
        Self::Freedom,
        Self::Corruption,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Happiness => "Happiness",
            Self::Gdp => "GDP",
            Self::SocialSupport => "Social support",
            Self::LifeExpectancy => "Life expectancy",
            Self::Freedom => "Freedom",
            Self::Generosity => "Generosity",
            Self::Corruption => "Corruption",
            Self::Residual => "Dystopia+residual",
        }
    }

    /// Column header used by the World Happiness Report exports.
    pub fn column(self) -> &'static str {
        match self {
            Self::Happiness => "Ladder score",
            Self::Gdp => "Log GDP per capita",
            Self::SocialSupport => "Social support",
            Self::LifeExpectancy => "Healthy life expectancy",
            Self::Freedom => "Freedom to make life choices",
            Self::Generosity => "Generosity",
            Self::Corruption => "Perceptions of corruption",
            Self::Residual => "Dystopia + residual",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountryRecord {
    pub name: String,
    pub region: String,
    pub metrics: [Option<f64>; METRIC_COUNT],
}

impl CountryRecord {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            metrics: [None; METRIC_COUNT],
        }
    }

    pub fn with_metric(mut self, metric: Metric, value: Option<f64>) -> Self {
        self.metrics[metric.index()] = value;
        self
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics[metric.index()]
    }
}

#[derive(Clone, Debug)]
pub struct Dataset {
    pub source: String,
    pub records: Vec<CountryRecord>,
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn region_count(&self) -> usize {
        let mut regions = self
            .records
            .iter()
            .map(|record| record.region.as_str())
            .collect::<Vec<_>>();
        regions.sort_unstable();
        regions.dedup();
        regions.len()
    }
}

pub fn format_metric(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.decimals$}"),
        _ => "–".to_owned(),
    }
}
