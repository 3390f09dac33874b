use crate::script::Outcome;
use crate::util::ring_buffer::OverflowPolicy;
use serde::Serialize;

/// Machine-readable summary of one replay, printed by `--json`.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub ringq_version: &'static str,
    /// RFC 3339, local time
    pub timestamp:     String,
    pub capacity:      usize,
    pub policy:        OverflowPolicy,
    pub outcomes:      &'a [Outcome],
    pub final_len:     usize,
}

impl<'a> Report<'a> {
    pub fn new(capacity: usize, policy: OverflowPolicy, outcomes: &'a [Outcome], final_len: usize) -> Self {
        Self {
            ringq_version: env!("CARGO_PKG_VERSION"),
            timestamp:     chrono::Local::now().to_rfc3339(),
            capacity,
            policy,
            outcomes,
            final_len,
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{collect_ops, Replay};
    use serde_json::Value;

    #[test]
    fn report_has_expected_shape() {
        let ops = collect_ops(Some("write 1\nwrite 2\n"), &["push 3".to_string()]).unwrap();
        let mut replay = Replay::new(2, OverflowPolicy::Overwrite);
        let outcomes = replay.run(&ops);

        let report = Report::new(2, OverflowPolicy::Overwrite, &outcomes, replay.buffer.len());
        let json: Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["capacity", "final_len", "outcomes", "policy", "ringq_version", "timestamp"]);
        assert_eq!(json["capacity"], 2);
        assert_eq!(json["policy"], "overwrite");
        assert_eq!(json["final_len"], 2);
        assert_eq!(json["ringq_version"], env!("CARGO_PKG_VERSION"));
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());

        let outcomes = json["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[2]["op"], "push 3");
        assert_eq!(outcomes[2]["status"], "evicted");
        assert_eq!(outcomes[2]["value"], "1");
    }

    #[test]
    fn pretty_and_compact_carry_the_same_data() {
        let report = Report::new(0, OverflowPolicy::Reject, &[], 0);
        let pretty: Value = serde_json::from_str(&report.to_json(true).unwrap()).unwrap();
        let compact: Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();
        assert_eq!(pretty, compact);
        assert!(report.to_json(true).unwrap().contains('\n'));
        assert!(!report.to_json(false).unwrap().contains('\n'));
    }
}
