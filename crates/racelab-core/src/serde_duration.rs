//! Serialize a `Duration` as fractional milliseconds.

use std::time::Duration;

use serde::Serializer;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Timed {
        #[serde(serialize_with = "super::serialize")]
        took: Duration,
    }

    #[test]
    fn test_serializes_as_millis() -> serde_json::Result<()> {
        let json = serde_json::to_string(&Timed {
            took: Duration::from_micros(1500),
        })?;
        assert_eq!(json, r#"{"took":1.5}"#);
        Ok(())
    }
}
