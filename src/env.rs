use std::env;
use std::time::Duration;

use tracing::warn;

/// Overrides the collector endpoint URL.
/// e.g. "http://zipkin.internal:9411/api/v1/spans"
const ENV_ENDPOINT: &str = "ZIPKIN_OT_COLLECTOR_ENDPOINT";

/// Overrides the periodic flush interval, in milliseconds.
const ENV_FLUSH_INTERVAL: &str = "ZIPKIN_OT_FLUSH_INTERVAL";

pub(crate) fn get_endpoint() -> Option<String> {
    env::var(ENV_ENDPOINT).ok().filter(|var| !var.is_empty())
}

pub(crate) fn get_flush_interval() -> Option<Duration> {
    match env::var(ENV_FLUSH_INTERVAL).ok().filter(|var| !var.is_empty()) {
        Some(interval) => match interval.parse() {
            Ok(millis) => Some(Duration::from_millis(millis)),
            Err(err) => {
                warn!(
                    target: "zipkin_ot_reporter",
                    "{ENV_FLUSH_INTERVAL} malformed, using configured interval: {err}"
                );
                None
            }
        },
        None => None,
    }
}
