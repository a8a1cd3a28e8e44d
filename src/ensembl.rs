use std::collections::HashMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::VisError;

pub const ENSEMBL_REST: &str = "https://rest.ensembl.org";

pub trait EnsemblClient: Send + Sync {
    fn lookup_chunk(&self, ids: &[String]) -> Result<Value, VisError>;
}

#[derive(Clone)]
pub struct EnsemblHttpClient {
    client: Client,
    base: String,
}

impl EnsemblHttpClient {
    pub fn new(user_agent: &str) -> Result<Self, VisError> {
        Self::with_base(ENSEMBL_REST, user_agent)
    }

    pub fn with_base(base: &str, user_agent: &str) -> Result<Self, VisError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|err| VisError::ConfigValue(format!("user agent: {err}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| VisError::EnsemblHttp(err.to_string()))?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }
}

impl EnsemblClient for EnsemblHttpClient {
    fn lookup_chunk(&self, ids: &[String]) -> Result<Value, VisError> {
        let url = format!("{}/lookup/id?expand=1", self.base);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "ids": ids }))
            .send()
            .map_err(|err| VisError::EnsemblHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Ensembl request failed".to_string());
            return Err(VisError::EnsemblStatus { status, message });
        }
        response
            .json()
            .map_err(|err| VisError::EnsemblHttp(err.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub chunk_size: usize,
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            delay: Duration::from_millis(150),
        }
    }
}

pub struct EnsemblLookup<C: EnsemblClient> {
    client: C,
    options: BatchOptions,
    cache: Mutex<HashMap<String, Option<Value>>>,
}

impl<C: EnsemblClient> EnsemblLookup<C> {
    pub fn new(client: C, options: BatchOptions) -> Self {
        Self {
            client,
            options,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn lookup_batch(&self, ids: &[String]) -> HashMap<String, Option<Value>> {
        let mut out = HashMap::new();
        let mut to_fetch = Vec::new();
        {
            let cache = self.lock();
            for id in ids {
                match cache.get(id) {
                    Some(value) => {
                        out.insert(id.clone(), value.clone());
                    }
                    None if !to_fetch.contains(id) => to_fetch.push(id.clone()),
                    None => {}
                }
            }
        }
        debug!(
            cached = out.len(),
            pending = to_fetch.len(),
            "Ensembl lookup batch"
        );

        let chunk_size = self.options.chunk_size.max(1);
        let chunks: Vec<&[String]> = to_fetch.chunks(chunk_size).collect();
        for (index, chunk) in chunks.iter().enumerate() {
            let results: Vec<(String, Option<Value>)> = match self.client.lookup_chunk(chunk) {
                Ok(body) => chunk
                    .iter()
                    .map(|id| {
                        let value = body.get(id).filter(|value| !value.is_null()).cloned();
                        (id.clone(), value)
                    })
                    .collect(),
                Err(err) => {
                    warn!(error = %err, ids = chunk.len(), "Ensembl lookup chunk failed");
                    chunk.iter().map(|id| (id.clone(), None)).collect()
                }
            };
            let mut cache = self.lock();
            for (id, value) in results {
                cache.insert(id.clone(), value.clone());
                out.insert(id, value);
            }
            drop(cache);
            if index + 1 < chunks.len() && !self.options.delay.is_zero() {
                thread::sleep(self.options.delay);
            }
        }
        out
    }

    pub fn cached(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Option<Value>>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

const TRANSCRIPT_KEYS: [&str; 6] = [
    "Transcript",
    "transcript",
    "Transcripts",
    "transcripts",
    "children",
    "translated",
];

pub fn transcript_count(lookup: Option<&Value>) -> usize {
    let Some(record) = lookup.and_then(Value::as_object) else {
        return 0;
    };
    for key in TRANSCRIPT_KEYS {
        if let Some(items) = record.get(key).and_then(Value::as_array) {
            return items.len();
        }
    }
    record
        .values()
        .filter_map(Value::as_array)
        .find(|items| {
            items
                .first()
                .and_then(|first| first.get("object_type"))
                .and_then(Value::as_str)
                == Some("Transcript")
        })
        .map(Vec::len)
        .unwrap_or(0)
}

pub fn ratio_from_counts(human: usize, rat: usize) -> f64 {
    if human == 0 && rat == 0 {
        return 0.0;
    }
    human.min(rat) as f64 / human.max(rat) as f64
}

/// Piecewise score: nothing below 0.3, up to 0.5 at a ratio of 0.5, up to 1
/// at a ratio of 1.
pub fn transcript_score(ratio: f64) -> f64 {
    if ratio < 0.3 {
        0.0
    } else if ratio < 0.5 {
        ((ratio - 0.3) / 0.2) * 0.5
    } else {
        0.5 + ((ratio - 0.5) / 0.5) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingClient {
        calls: AtomicUsize,
        fail_first: bool,
    }

    impl EnsemblClient for CountingClient {
        fn lookup_chunk(&self, ids: &[String]) -> Result<Value, VisError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(VisError::EnsemblStatus {
                    status: 503,
                    message: "busy".to_string(),
                });
            }
            let mut body = serde_json::Map::new();
            for id in ids {
                body.insert(id.clone(), json!({"id": id, "Transcript": [{}, {}]}));
            }
            Ok(Value::Object(body))
        }
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn batches_and_memoizes() {
        let lookup = EnsemblLookup::new(
            CountingClient {
                calls: AtomicUsize::new(0),
                fail_first: false,
            },
            BatchOptions {
                chunk_size: 2,
                delay: Duration::ZERO,
            },
        );
        let out = lookup.lookup_batch(&ids(&["A", "B", "C"]));
        assert_eq!(out.len(), 3);
        assert_eq!(lookup.client.calls.load(Ordering::SeqCst), 2);
        let again = lookup.lookup_batch(&ids(&["A", "C"]));
        assert_eq!(again.len(), 2);
        assert_eq!(lookup.client.calls.load(Ordering::SeqCst), 2);
        assert_eq!(transcript_count(again["A"].as_ref()), 2);
    }

    #[test]
    fn failed_chunk_records_none() {
        let lookup = EnsemblLookup::new(
            CountingClient {
                calls: AtomicUsize::new(0),
                fail_first: true,
            },
            BatchOptions {
                chunk_size: 1,
                delay: Duration::ZERO,
            },
        );
        let out = lookup.lookup_batch(&ids(&["A", "B"]));
        assert_eq!(out["A"], None);
        assert!(out["B"].is_some());
        assert_eq!(lookup.cached(), 2);
    }

    #[test]
    fn transcript_count_shapes() {
        assert_eq!(transcript_count(None), 0);
        assert_eq!(transcript_count(Some(&json!({"children": [1, 2, 3]}))), 3);
        let guessed = json!({"other": [{"object_type": "Transcript"}, {"object_type": "Transcript"}]});
        assert_eq!(transcript_count(Some(&guessed)), 2);
        assert_eq!(transcript_count(Some(&json!({"id": "ENSG1"}))), 0);
    }

    #[test]
    fn ratio_and_score() {
        assert_eq!(ratio_from_counts(0, 0), 0.0);
        assert_eq!(ratio_from_counts(4, 2), 0.5);
        assert_eq!(ratio_from_counts(2, 4), 0.5);
        assert_eq!(transcript_score(0.2), 0.0);
        assert!((transcript_score(0.4) - 0.25).abs() < 1e-12);
        assert_eq!(transcript_score(0.5), 0.5);
        assert_eq!(transcript_score(1.0), 1.0);
    }
}
