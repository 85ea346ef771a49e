use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The fixed set of hazard and climate factors blended into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    SeismicRate,
    FloodRate,
    HurricaneRate,
    FireRate,
    Temperature,
    Humidity,
    Wind,
    Precipitation,
    Vegetation,
    Elevation,
}

impl Factor {
    pub const ALL: [Factor; 10] = [
        Factor::SeismicRate,
        Factor::FloodRate,
        Factor::HurricaneRate,
        Factor::FireRate,
        Factor::Temperature,
        Factor::Humidity,
        Factor::Wind,
        Factor::Precipitation,
        Factor::Vegetation,
        Factor::Elevation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Factor::SeismicRate => "seismic_rate",
            Factor::FloodRate => "flood_rate",
            Factor::HurricaneRate => "hurricane_rate",
            Factor::FireRate => "fire_rate",
            Factor::Temperature => "temperature",
            Factor::Humidity => "humidity",
            Factor::Wind => "wind",
            Factor::Precipitation => "precipitation",
            Factor::Vegetation => "vegetation",
            Factor::Elevation => "elevation",
        }
    }
}

/// A provider reading in whatever shape the upstream service returned it.
///
/// Keyed entries keep document order; extraction depends on it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    Number(f64),
    Keyed(Vec<(String, RawValue)>),
    Sequence(Vec<RawValue>),
    #[default]
    Missing,
}

impl RawValue {
    /// Collapses the value to a single float. Total: unusable shapes read
    /// as 0.0 rather than erroring.
    pub fn as_number(&self) -> f64 {
        match self {
            RawValue::Number(n) => *n,
            RawValue::Keyed(entries) => entries
                .iter()
                .find_map(|(_, value)| value.scalar())
                .unwrap_or(0.0),
            RawValue::Sequence(items) => {
                items.iter().find_map(RawValue::scalar).unwrap_or(0.0)
            }
            RawValue::Missing => 0.0,
        }
    }

    fn scalar(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&serde_json::Value> for RawValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Missing,
            serde_json::Value::Bool(b) => RawValue::Number(if *b { 1.0 } else { 0.0 }),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(RawValue::Number)
                .unwrap_or(RawValue::Missing),
            serde_json::Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(RawValue::Number)
                .unwrap_or(RawValue::Missing),
            serde_json::Value::Array(items) => {
                RawValue::Sequence(items.iter().map(RawValue::from).collect())
            }
            serde_json::Value::Object(entries) => RawValue::Keyed(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), RawValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        RawValue::from(&value)
    }
}

impl Serialize for RawValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawValue::Number(n) => serializer.serialize_f64(*n),
            RawValue::Keyed(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            RawValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            RawValue::Missing => serializer.serialize_none(),
        }
    }
}

struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, map, sequence, or null")
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(RawValue::Number(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(RawValue::Number(v as f64))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(RawValue::Number(v as f64))
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(RawValue::Number(if v { 1.0 } else { 0.0 }))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.trim()
            .parse::<f64>()
            .map(RawValue::Number)
            .unwrap_or(RawValue::Missing))
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawValue::Missing)
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(RawValue::Missing)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(RawValueVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<RawValue>()? {
            items.push(item);
        }
        Ok(RawValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, RawValue>()? {
            entries.push((key, value));
        }
        Ok(RawValue::Keyed(entries))
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

/// One reading per factor, exactly as collected. Built once per request and
/// echoed back untouched in the assessment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFactors {
    #[serde(default)]
    pub seismic_rate: RawValue,
    #[serde(default)]
    pub flood_rate: RawValue,
    #[serde(default)]
    pub hurricane_rate: RawValue,
    #[serde(default)]
    pub fire_rate: RawValue,
    #[serde(default)]
    pub temperature: RawValue,
    #[serde(default)]
    pub humidity: RawValue,
    #[serde(default)]
    pub wind: RawValue,
    #[serde(default)]
    pub precipitation: RawValue,
    #[serde(default)]
    pub vegetation: RawValue,
    #[serde(default)]
    pub elevation: RawValue,
}

impl RawFactors {
    pub fn get(&self, factor: Factor) -> &RawValue {
        match factor {
            Factor::SeismicRate => &self.seismic_rate,
            Factor::FloodRate => &self.flood_rate,
            Factor::HurricaneRate => &self.hurricane_rate,
            Factor::FireRate => &self.fire_rate,
            Factor::Temperature => &self.temperature,
            Factor::Humidity => &self.humidity,
            Factor::Wind => &self.wind,
            Factor::Precipitation => &self.precipitation,
            Factor::Vegetation => &self.vegetation,
            Factor::Elevation => &self.elevation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_extract_to_themselves() {
        assert_eq!(RawValue::Number(2.5).as_number(), 2.5);
        assert_eq!(RawValue::Number(-7.0).as_number(), -7.0);
        assert!(RawValue::Number(f64::NAN).as_number().is_nan());
    }

    #[test]
    fn missing_extracts_to_zero() {
        assert_eq!(RawValue::Missing.as_number(), 0.0);
    }

    #[test]
    fn keyed_extraction_takes_first_numeric_value_in_document_order() {
        let value = RawValue::Keyed(vec![
            ("label".to_string(), RawValue::Missing),
            ("RP10_depth_category".to_string(), RawValue::Number(2.0)),
            ("RP100_depth_category".to_string(), RawValue::Number(4.0)),
        ]);
        assert_eq!(value.as_number(), 2.0);
    }

    #[test]
    fn keyed_extraction_without_numeric_values_reads_zero() {
        let value = RawValue::Keyed(vec![
            ("a".to_string(), RawValue::Missing),
            ("b".to_string(), RawValue::Sequence(vec![])),
        ]);
        assert_eq!(value.as_number(), 0.0);
    }

    #[test]
    fn sequence_extraction_takes_first_numeric_element() {
        let value = RawValue::Sequence(vec![
            RawValue::Missing,
            RawValue::Number(9.5),
            RawValue::Number(1.0),
        ]);
        assert_eq!(value.as_number(), 9.5);
    }

    #[test]
    fn json_conversion_coerces_scalars() {
        assert_eq!(RawValue::from(json!(3)), RawValue::Number(3.0));
        assert_eq!(RawValue::from(json!(true)), RawValue::Number(1.0));
        assert_eq!(RawValue::from(json!("42.5")), RawValue::Number(42.5));
        assert_eq!(RawValue::from(json!("n/a")), RawValue::Missing);
        assert_eq!(RawValue::from(json!(null)), RawValue::Missing);
    }

    #[test]
    fn missing_serializes_as_null() {
        let rendered = serde_json::to_value(RawFactors::default()).expect("serializes");
        assert_eq!(rendered["vegetation"], json!(null));
        assert_eq!(rendered["seismic_rate"], json!(null));
    }

    #[test]
    fn factors_round_trip_through_json() {
        let factors = RawFactors {
            seismic_rate: RawValue::Number(12.0),
            flood_rate: RawValue::Keyed(vec![(
                "RP10_depth_category".to_string(),
                RawValue::Number(1.0),
            )]),
            wind: RawValue::Sequence(vec![RawValue::Number(4.0)]),
            ..RawFactors::default()
        };
        let rendered = serde_json::to_string(&factors).expect("serializes");
        let parsed: RawFactors = serde_json::from_str(&rendered).expect("parses");
        assert_eq!(parsed, factors);
    }

    #[test]
    fn every_factor_is_reachable_by_key() {
        let factors = RawFactors::default();
        for factor in Factor::ALL {
            assert!(factors.get(factor).is_missing());
            assert!(!factor.key().is_empty());
        }
    }
}
