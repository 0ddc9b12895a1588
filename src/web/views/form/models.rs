use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use phf::{phf_ordered_set, OrderedSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prelude::*;

pub static CARRIERS: OrderedSet<&'static str> = phf_ordered_set! {
    "YV", "YX", "ZW", "9E", "AA", "AS", "B6", "DL", "F9", "G4", "HA", "NK", "OH", "OO", "UA", "WN"
};

pub static AIRPORTS: OrderedSet<&'static str> = phf_ordered_set! {
    "ATL", "AUS", "BNA", "BOS", "BWI", "CLT", "DCA", "DEN", "DFW", "DTW",
    "EWR", "FLL", "IAD", "IAH", "JFK", "LAS", "LAX", "LGA", "MCO", "MDW",
    "MIA", "MSP", "ORD", "PHL", "PHX", "SAN", "SEA", "SFO", "SLC", "TPA"
};

/// Raw form values, exactly as submitted, so that they can be rendered back.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct PredictionForm {
    pub date: String,
    pub time: String,
    pub carrier: String,
    pub origin: String,
    pub destination: String,
    pub num_flights: String,
    pub weather_delays: String,
}

/// Body posted to the prediction service.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct PredictionRequest<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub carrier: &'a str,
    pub origin: &'a str,
    pub destination: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_flights: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_delays: Option<u32>,
}

impl PredictionForm {
    /// Checks the same constraints the form inputs declare.
    ///
    /// Empty optional counters are left out of the request.
    pub fn validate(&self) -> Result<PredictionRequest<'_>> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .with_context(|| format!("`{}` is not a valid date", self.date))?;
        NaiveTime::parse_from_str(&self.time, "%H:%M")
            .with_context(|| format!("`{}` is not a valid time", self.time))?;
        ensure!(CARRIERS.contains(self.carrier.as_str()), "unknown airline `{}`", self.carrier);
        ensure!(AIRPORTS.contains(self.origin.as_str()), "unknown origin airport `{}`", self.origin);
        ensure!(
            AIRPORTS.contains(self.destination.as_str()),
            "unknown destination airport `{}`",
            self.destination,
        );

        let num_flights = parse_optional::<u32>(&self.num_flights)
            .context("the number of flights must be a positive number")?;
        ensure!(num_flights != Some(0), "the number of flights must be a positive number");
        let weather_delays = parse_optional::<u32>(&self.weather_delays)
            .context("the number of weather-related delays must not be negative")?;

        Ok(PredictionRequest {
            date: &self.date,
            time: &self.time,
            carrier: &self.carrier,
            origin: &self.origin,
            destination: &self.destination,
            num_flights,
            weather_delays,
        })
    }
}

fn parse_optional<T: FromStr>(value: &str) -> Result<Option<T>, T::Err> {
    match value.trim() {
        "" => Ok(None),
        value => value.parse().map(Some),
    }
}

/// Prediction service response, as far as the form displays it.
#[derive(Deserialize, Debug, PartialEq)]
pub struct PredictionResponse {
    pub regression_prediction: f64,
    pub classification_prediction: String,
    pub gradient_boosting_prediction: f64,

    #[serde(default)]
    pub cluster: Option<Cluster>,

    #[serde(default)]
    pub cluster_interpretation: Option<String>,
}

/// Cluster identifier, either numeric or textual.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(transparent)]
pub struct Cluster(Value);

impl Display for Cluster {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Value::String(value) => f.write_str(value),
            value => write!(f, "{}", value),
        }
    }
}
