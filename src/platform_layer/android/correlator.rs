/*
 * Matches platform-service results to the requests that caused them.
 *
 * Every request sent to the Android host runtime carries a fresh numeric
 * `callbackId`; its continuation is parked here until the runtime delivers a result
 * with the same id. Results may arrive in any order and on any thread. A result
 * whose id is unknown (already delivered, cancelled, or never issued) is logged and
 * dropped. There is no expiry for asynchronous requests: a request the runtime never
 * answers keeps its continuation until the process ends. The blocking form used by
 * the identifier primitives takes an optional timeout instead.
 */
use crate::platform_layer::error::{PlatformError, Result as PlatformResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::time::Duration;

pub const CALLBACK_ID_KEY: &str = "callbackId";

// The runtime's answer to one request, as decoded from its JSON result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResult {
    #[serde(deserialize_with = "deserialize_callback_id")]
    pub callback_id: u64,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl ServiceResult {
    pub fn into_result(self) -> PlatformResult<Value> {
        if self.success {
            Ok(self.data)
        } else {
            Err(PlatformError::Service(
                self.error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Platform service failed.".to_string()),
            ))
        }
    }
}

// The runtime sends ids back either as numbers or as numeric strings.
fn deserialize_callback_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("callbackId {n} is not an unsigned integer"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("callbackId '{s}' is not numeric"))),
        other => Err(D::Error::custom(format!("unexpected callbackId {other}"))),
    }
}

pub type ServiceContinuation = Box<dyn FnOnce(PlatformResult<Value>) + Send + 'static>;

pub struct ServiceCorrelator {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, ServiceContinuation>>,
}

impl Default for ServiceCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceCorrelator {
    pub fn new() -> Self {
        ServiceCorrelator {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn pending_map(&self) -> std::sync::MutexGuard<'_, HashMap<u64, ServiceContinuation>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /*
     * Issues a request. The continuation is registered before `send` runs, because
     * the runtime may answer on another thread before `send` even returns. If sending
     * fails, the continuation is removed again and called with the failure.
     * Returns the id used.
     */
    pub fn request(
        &self,
        action: &str,
        payload: Value,
        send: impl FnOnce(&str) -> PlatformResult<()>,
        continuation: ServiceContinuation,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = match payload {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let request = serde_json::json!({
            "action": action,
            "callbackId": id,
            "payload": payload,
        });

        self.pending_map().insert(id, continuation);
        log::debug!("ServiceCorrelator: Request {id} '{action}'");

        if let Err(e) = send(&request.to_string()) {
            log::error!("ServiceCorrelator: Sending request {id} '{action}' failed: {e}");
            if let Some(continuation) = self.pending_map().remove(&id) {
                continuation(Err(e));
            }
        }
        id
    }

    // Issues a request and waits for its result on the calling thread.
    pub fn request_blocking(
        &self,
        action: &str,
        payload: Value,
        send: impl FnOnce(&str) -> PlatformResult<()>,
        timeout: Option<Duration>,
    ) -> PlatformResult<Value> {
        let (tx, rx) = mpsc::channel();
        let id = self.request(
            action,
            payload,
            send,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        let received = match timeout {
            Some(limit) => rx.recv_timeout(limit).map_err(|_| ()),
            None => rx.recv().map_err(|_| ()),
        };
        match received {
            Ok(result) => result,
            Err(()) => {
                self.cancel(id);
                Err(PlatformError::Service(format!(
                    "No result for '{action}' (request {id})."
                )))
            }
        }
    }

    /*
     * Delivers one result from the runtime. The continuation runs on the calling
     * thread, after the pending table has been released, so it may issue new
     * requests.
     */
    pub fn on_result(&self, result_json: &str) {
        let result: ServiceResult = match serde_json::from_str(result_json) {
            Ok(result) => result,
            Err(e) => {
                log::error!("ServiceCorrelator: Unreadable service result ({e}): {result_json}");
                return;
            }
        };
        let continuation = self.pending_map().remove(&result.callback_id);
        match continuation {
            Some(continuation) => continuation(result.into_result()),
            None => log::warn!(
                "ServiceCorrelator: Dropping result for unknown request {}",
                result.callback_id
            ),
        }
    }

    // Forgets a pending request without calling it. Returns whether it was pending.
    pub fn cancel(&self, id: u64) -> bool {
        self.pending_map().remove(&id).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_map().len()
    }
}
