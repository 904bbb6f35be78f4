use core::{num::NonZeroUsize, time::Duration};

use nonzero_ext::nonzero;
use serde::Deserialize;
use strum::{Display, EnumString};
use types::redacting_url::RedactingUrl;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_ASSIGNMENT_CACHE_CAPACITY: NonZeroUsize = nonzero!(128_usize);
pub const DEFAULT_MISSED_SLOT_GRACE_PERIOD: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, EnumString, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendKind {
    Grpc,
    Rest,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub backend: BackendKind,
    pub url: RedactingUrl,
    #[serde(default = "default_request_timeout", with = "serde_utils::duration_seconds")]
    pub request_timeout: Duration,
    #[serde(default = "default_assignment_cache_capacity")]
    pub assignment_cache_capacity: NonZeroUsize,
    /// Time after the start of a slot before a slot without blocks counts as missed.
    #[serde(default = "default_missed_slot_grace_period", with = "serde_utils::duration_seconds")]
    pub missed_slot_grace_period: Duration,
}

impl Config {
    #[must_use]
    pub const fn new(backend: BackendKind, url: RedactingUrl) -> Self {
        Self {
            backend,
            url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            assignment_cache_capacity: DEFAULT_ASSIGNMENT_CACHE_CAPACITY,
            missed_slot_grace_period: DEFAULT_MISSED_SLOT_GRACE_PERIOD,
        }
    }
}

const fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

const fn default_assignment_cache_capacity() -> NonZeroUsize {
    DEFAULT_ASSIGNMENT_CACHE_CAPACITY
}

const fn default_missed_slot_grace_period() -> Duration {
    DEFAULT_MISSED_SLOT_GRACE_PERIOD
}
