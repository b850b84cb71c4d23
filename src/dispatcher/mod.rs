//! Batch dispatch.
//!
//! For each record the dispatcher runs every rule in its table. Each match
//! becomes an alert that goes through the same pipeline on its own:
//!
//! ```text
//! classified -> resolved (camera scope only) -> rendered -> published
//!            \-> skipped (device not found, lookup failed)
//!                                                        \-> failed (publish error)
//! ```
//!
//! Nothing that happens to one alert stops the next alert or the next
//! record. There are no retries here: redelivery of the batch by the stream
//! source is the retry mechanism, and a redelivered record may alert twice.

mod bounded;
mod report;

pub use bounded::CancellationToken;
pub use report::{DispatchReport, Outcome, SkipReason};

use crate::attributes::{build_attributes, AlertTarget, PublishAttributes};
use crate::classify::{classify_all, AlertRule, Detection};
use crate::config::DispatcherConfig;
use crate::error::Result;
use crate::publish::Publisher;
use crate::render::render;
use crate::resolver::{CachedResolver, EntityResolver};
use crate::stream::StreamBatch;
use crate::types::{Device, StreamRecord};
use bounded::bounded_call;
use crossbeam_channel::unbounded;
use report::RecordResult;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

/// Classifies stream records and publishes the resulting alerts.
pub struct Dispatcher {
    config: DispatcherConfig,
    rules: Vec<AlertRule>,
    resolver: Arc<dyn EntityResolver>,
    publisher: Arc<dyn Publisher>,
}

impl Dispatcher {
    /// Create a dispatcher over the default rule table.
    ///
    /// When the config enables a device cache the resolver is wrapped in a
    /// [`CachedResolver`].
    pub fn new(
        config: DispatcherConfig,
        resolver: Arc<dyn EntityResolver>,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Self> {
        config.validate()?;
        let resolver: Arc<dyn EntityResolver> = if config.device_cache_size > 0 {
            Arc::new(CachedResolver::new(
                resolver,
                config.device_cache_size,
                config.device_cache_ttl,
            ))
        } else {
            resolver
        };
        Ok(Self {
            config,
            rules: AlertRule::ALL.to_vec(),
            resolver,
            publisher,
        })
    }

    /// Replace the rule table. Rules run in the given order.
    pub fn with_rules(mut self, rules: Vec<AlertRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// Dispatch every record in a batch.
    pub fn dispatch_batch(&self, records: &[StreamRecord]) -> DispatchReport {
        self.dispatch_batch_with(records, &CancellationToken::new())
    }

    /// Dispatch a batch, starting no further records once `token` is
    /// cancelled.
    pub fn dispatch_batch_with(
        &self,
        records: &[StreamRecord],
        token: &CancellationToken,
    ) -> DispatchReport {
        let workers = self.config.workers.min(records.len()).max(1);
        let results: Vec<RecordResult> = if workers == 1 {
            records
                .iter()
                .map(|record| self.process_record(record, token))
                .collect()
        } else {
            self.process_parallel(records, token, workers)
        };

        let mut report = DispatchReport::default();
        for result in results {
            report.record(result);
        }
        tracing::debug!(
            records = report.records,
            published = report.published(),
            skipped = report.skipped(),
            failed = report.failed(),
            abandoned = report.abandoned(),
            cancelled = report.cancelled,
            "batch dispatched"
        );
        report
    }

    /// Dispatch a decoded stream batch, carrying over its rejected count.
    pub fn dispatch_stream_batch(&self, batch: &StreamBatch) -> DispatchReport {
        let mut report = self.dispatch_batch(&batch.records);
        report.rejected = batch.rejected;
        report
    }

    /// Decode a stream envelope and dispatch it.
    pub fn dispatch_json(&self, json: &str) -> Result<DispatchReport> {
        let batch = StreamBatch::from_json(json)?;
        Ok(self.dispatch_stream_batch(&batch))
    }

    /// Dispatch a single record, returning one outcome per matched alert.
    pub fn dispatch_record(&self, record: &StreamRecord) -> Vec<Outcome> {
        match self.process_record(record, &CancellationToken::new()) {
            RecordResult::Alerts(outcomes) => outcomes,
            RecordResult::Unmatched | RecordResult::Cancelled => Vec::new(),
        }
    }

    fn process_parallel(
        &self,
        records: &[StreamRecord],
        token: &CancellationToken,
        workers: usize,
    ) -> Vec<RecordResult> {
        let (work_tx, work_rx) = unbounded::<usize>();
        let (result_tx, result_rx) = unbounded::<(usize, RecordResult)>();
        for index in 0..records.len() {
            let _ = work_tx.send(index);
        }
        drop(work_tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for index in work_rx.iter() {
                        let result = self.process_record(&records[index], token);
                        let _ = result_tx.send((index, result));
                    }
                });
            }
        });
        drop(result_tx);

        let mut results: Vec<(usize, RecordResult)> = result_rx.try_iter().collect();
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }

    fn process_record(&self, record: &StreamRecord, token: &CancellationToken) -> RecordResult {
        if token.is_cancelled() {
            return RecordResult::Cancelled;
        }

        let detections = classify_all(&self.rules, record, &self.config.account_id);
        if detections.is_empty() {
            tracing::debug!(record = record.label(), kind = ?record.event_kind, "no rule matched");
            return RecordResult::Unmatched;
        }

        RecordResult::Alerts(
            detections
                .into_iter()
                .map(|detection| self.process_detection(record, detection))
                .collect(),
        )
    }

    fn process_detection(&self, record: &StreamRecord, detection: Detection) -> Outcome {
        let category = detection.category();
        let device_id = detection.device_id().map(str::to_string);

        let (target, device) = match detection.device_id() {
            Some(thing_name) => match self.resolve(thing_name) {
                Ok(Some((device, groups))) => (
                    AlertTarget::Camera {
                        device_id: thing_name.to_string(),
                        groups,
                    },
                    Some(device),
                ),
                Ok(None) => {
                    tracing::warn!(
                        record = record.label(),
                        %category,
                        device = %thing_name,
                        account = %self.config.account_id,
                        "no device registered, skipping alert"
                    );
                    return Outcome::Skipped {
                        category,
                        device: device_id,
                        reason: SkipReason::DeviceNotFound,
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        record = record.label(),
                        %category,
                        device = %thing_name,
                        %error,
                        "device lookup failed, skipping alert"
                    );
                    return Outcome::Skipped {
                        category,
                        device: device_id,
                        reason: SkipReason::ResolutionFailed(error),
                    };
                }
            },
            None => (AlertTarget::Global, None),
        };

        let alert = render(&detection, device.as_ref(), &self.config.base_url);
        let attributes = build_attributes(category, &target, detection.time());

        match self.publish(&alert.subject, &alert.body, attributes) {
            Ok(()) => {
                tracing::info!(
                    record = record.label(),
                    %category,
                    device = device_id.as_deref().unwrap_or("-"),
                    subject = %alert.subject,
                    "alert published"
                );
                Outcome::Published {
                    category,
                    device: device_id,
                }
            }
            Err(error) => {
                tracing::error!(
                    record = record.label(),
                    %category,
                    device = device_id.as_deref().unwrap_or("-"),
                    %error,
                    "failed to publish alert"
                );
                Outcome::Failed {
                    category,
                    device: device_id,
                    error,
                }
            }
        }
    }

    /// Device and group memberships, `None` when the device is unknown.
    fn resolve(&self, thing_name: &str) -> Result<Option<(Device, BTreeSet<String>)>> {
        let timeout = self.config.call_timeout;

        let resolver = Arc::clone(&self.resolver);
        let account = self.config.account_id.clone();
        let thing = thing_name.to_string();
        let device = bounded_call("resolve_device", timeout, move || {
            resolver.resolve_device(&account, &thing)
        })?;
        let Some(device) = device else {
            return Ok(None);
        };

        let resolver = Arc::clone(&self.resolver);
        let account = self.config.account_id.clone();
        let thing = thing_name.to_string();
        let groups = bounded_call("resolve_groups", timeout, move || {
            resolver.resolve_groups(&account, &thing)
        })?;

        Ok(Some((device, groups)))
    }

    fn publish(&self, subject: &str, body: &str, attributes: PublishAttributes) -> Result<()> {
        let publisher = Arc::clone(&self.publisher);
        let subject = subject.to_string();
        let body = body.to_string();
        bounded_call("publish", self.config.call_timeout, move || {
            publisher.publish(&subject, &body, &attributes)
        })
    }
}
