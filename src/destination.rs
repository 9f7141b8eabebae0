use crate::record::LogRecord;
use chrono::{NaiveDate, Utc};

/// Where a record is stored: a log group and a stream inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    pub group: String,
    pub stream: String,
}

impl Destination {
    /// Derive the destination for `record`.
    ///
    /// - group: `{prefix}/{service_name}`
    /// - stream: `client_name` when present and non-empty, otherwise
    ///   `today` formatted as `YYYY-MM-DD`.
    ///
    /// Returns `None` when the record has no usable `service_name`.
    pub fn route(record: &LogRecord, prefix: &str, today: NaiveDate) -> Option<Self> {
        let service_name = record.service_name()?;
        let stream = record
            .client_name()
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

        Some(Self {
            group: format!("{}/{}", prefix, service_name),
            stream,
        })
    }

    /// [`Destination::route`] against the current UTC date.
    pub fn for_today(record: &LogRecord, prefix: &str) -> Option<Self> {
        Self::route(record, prefix, Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CLIENT_NAME, SERVICE_NAME};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    #[test]
    fn routes_by_service_and_client() {
        let mut record = LogRecord::default();
        record.insert(SERVICE_NAME, "billing");
        record.insert(CLIENT_NAME, "acme");

        let dest = Destination::route(&record, "/relay", date()).unwrap();
        assert_eq!(dest.group, "/relay/billing");
        assert_eq!(dest.stream, "acme");
        assert_eq!(Destination::route(&record, "/relay", date()), Some(dest));
    }

    #[test]
    fn falls_back_to_date_stream() {
        let mut record = LogRecord::default();
        record.insert(SERVICE_NAME, "billing");
        assert_eq!(
            Destination::route(&record, "/relay", date()).unwrap().stream,
            "2026-03-07"
        );

        record.insert(CLIENT_NAME, "");
        assert_eq!(
            Destination::route(&record, "/relay", date()).unwrap().stream,
            "2026-03-07"
        );
    }

    #[test]
    fn today_stream_matches_utc_date() {
        let mut record = LogRecord::default();
        record.insert(SERVICE_NAME, "billing");
        let before = Utc::now().format("%Y-%m-%d").to_string();
        let dest = Destination::for_today(&record, "/relay").unwrap();
        let after = Utc::now().format("%Y-%m-%d").to_string();
        assert!(dest.stream == before || dest.stream == after);
        assert_eq!(dest.stream.len(), 10);
    }

    #[test]
    fn requires_service_name() {
        let record = LogRecord::default();
        assert!(Destination::route(&record, "/relay", date()).is_none());
    }
}
