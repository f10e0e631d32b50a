/// Serializes a `chrono::Duration` since service day start as `HH:MM:SS`, where
/// hours may exceed 24 (`25:10:00` is ten past one on the next day).
pub mod duration {
    use chrono::Duration;
    use schemars::gen::SchemaGenerator;
    use schemars::schema::{InstanceType, Schema, SchemaObject};
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::time::{format_time, parse_time};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_time(duration.num_seconds()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let seconds = parse_time(&s).map_err(D::Error::custom)?;
        Ok(Duration::seconds(seconds))
    }

    pub fn serialize_option<S>(
        option_duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match option_duration {
            Some(d) => serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize_option<'de, D>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        match s {
            Some(s) if !s.trim().is_empty() => parse_time(&s)
                .map(|seconds| Some(Duration::seconds(seconds)))
                .map_err(D::Error::custom),
            _ => Ok(None),
        }
    }

    pub fn schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            format: Some("hh:mm:ss".to_owned()),
            ..Default::default()
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde::{Deserialize, Serialize};

    use super::duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Visit {
        #[serde(with = "duration")]
        arrival: Duration,
        #[serde(
            serialize_with = "duration::serialize_option",
            deserialize_with = "duration::deserialize_option"
        )]
        departure: Option<Duration>,
    }

    #[test]
    fn writes_hours_past_midnight() {
        let visit = Visit {
            arrival: Duration::seconds(87000),
            departure: None,
        };
        let json = serde_json::to_string(&visit).unwrap();
        assert_eq!(json, r#"{"arrival":"24:10:00","departure":null}"#);
    }

    #[test]
    fn reads_day_prefixed_times() {
        let visit: Visit =
            serde_json::from_str(r#"{"arrival":"1.00:10:00","departure":"24:12:00"}"#)
                .unwrap();
        assert_eq!(visit.arrival, Duration::seconds(87000));
        assert_eq!(visit.departure, Some(Duration::seconds(87120)));
    }
}
