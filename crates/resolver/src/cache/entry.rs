//! Cache-envelope bookkeeping: TTL computation on write, decay on read.

use crate::codec::DecodedResponse;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Attach the cache envelope: `ttl` is the minimum answer TTL clamped to
/// `[1, max_ttl]` (`default_ttl` when the response has none), `expires` the
/// absolute epoch-ms deadline.
pub fn enrich(
    mut response: DecodedResponse,
    default_ttl: u32,
    max_ttl: u32,
    now_ms: u64,
) -> DecodedResponse {
    let ttl = response
        .min_answer_ttl()
        .unwrap_or(default_ttl)
        .clamp(1, max_ttl.max(1));
    response.ttl = Some(ttl);
    response.expires = Some(now_ms + u64::from(ttl) * 1000);
    response
}

/// Rebuild a stored value into a usable response.
///
/// String values are JSON-parsed first (string-valued backends). Entries
/// missing the envelope, expired, or unparseable are treated as absent.
/// Each answer's TTL is decayed by the time the entry has already spent in
/// the cache; an answer decayed to zero invalidates the whole entry.
pub fn revive(value: serde_json::Value, now_ms: u64) -> Option<DecodedResponse> {
    let value = match value {
        serde_json::Value::String(text) => match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Discarding unparseable cached string value");
                return None;
            }
        },
        other => other,
    };

    let mut response: DecodedResponse = match serde_json::from_value(value) {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "Discarding cached value with unexpected shape");
            return None;
        }
    };

    let ttl = response.ttl.filter(|t| *t >= 1)?;
    let expires = response.expires?;
    if now_ms >= expires {
        debug!(expires, now_ms, "Cached entry expired");
        return None;
    }

    let remaining_secs = ((expires - now_ms) / 1000) as u32;
    let elapsed = ttl.saturating_sub(remaining_secs);

    for answer in &mut response.answers {
        if answer.ttl <= elapsed {
            debug!(name = %answer.name, "Answer TTL decayed to zero, treating entry as miss");
            return None;
        }
        answer.ttl -= elapsed;
    }

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{spoof_response, AnswerData};
    use ember_dns_domain::RecordType;

    fn sample() -> DecodedResponse {
        spoof_response(
            "example.com",
            RecordType::A,
            vec![AnswerData::A {
                address: "93.184.216.34".parse().unwrap(),
            }],
        )
    }

    #[test]
    fn enrich_uses_min_answer_ttl() {
        let enriched = enrich(sample(), 300, 86_400, 1_000);
        assert_eq!(enriched.ttl, Some(300));
        assert_eq!(enriched.expires, Some(1_000 + 300_000));
    }

    #[test]
    fn enrich_clamps_to_max() {
        let mut response = sample();
        response.answers[0].ttl = 1_000_000;
        let enriched = enrich(response, 300, 3600, 0);
        assert_eq!(enriched.ttl, Some(3600));
    }

    #[test]
    fn enrich_defaults_when_no_answers() {
        let mut response = sample();
        response.answers.clear();
        let enriched = enrich(response, 300, 86_400, 0);
        assert_eq!(enriched.ttl, Some(300));
    }

    #[test]
    fn revive_decays_answer_ttls() {
        let enriched = enrich(sample(), 300, 86_400, 0);
        let value = serde_json::to_value(&enriched).unwrap();
        // 100 seconds later: 200 seconds of the 300 remain.
        let revived = revive(value, 100_000).unwrap();
        assert_eq!(revived.answers[0].ttl, 200);
    }

    #[test]
    fn revive_rejects_expired() {
        let enriched = enrich(sample(), 300, 86_400, 0);
        let value = serde_json::to_value(&enriched).unwrap();
        assert!(revive(value, 300_000).is_none());
    }

    #[test]
    fn revive_parses_string_values() {
        let enriched = enrich(sample(), 300, 86_400, 0);
        let text = serde_json::to_string(&enriched).unwrap();
        let revived = revive(serde_json::Value::String(text), 1_000).unwrap();
        assert_eq!(revived.answers.len(), 1);
    }

    #[test]
    fn revive_treats_garbage_as_miss() {
        assert!(revive(serde_json::Value::String("not json".into()), 0).is_none());
        assert!(revive(serde_json::json!({"surprise": true}), 0).is_none());
    }

    #[test]
    fn revive_requires_envelope() {
        let bare = serde_json::to_value(sample()).unwrap();
        assert!(revive(bare, 0).is_none());
    }
}
