//! The sync orchestrator.
//!
//! [`SyncClient`] drives the shared CRUD lifecycle for records (save, fetch,
//! destroy) and record sets (fetch with reconciliation, create). Configuration
//! faults are returned as `Err`; validation failures return
//! [`SyncOutcome::Invalid`] without sending or notifying; remote and storage
//! failures complete the lifecycle with the error carried in the exchange, so
//! the Save/Fetch/Delete notification and the completion callback still run
//! but nothing is snapshotted or committed.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::lifecycle::{Lifecycle, SyncPhase};
use crate::options::{Completion, SyncOptions};
use crate::outcome::{SyncOutcome, SyncReport};
use crate::transport::Transport;
use crate::url::compose_url;
use std::fmt;
use std::sync::Arc;
use syncstack_model::{diff, NotificationKind, Payload, Record};
use syncstack_types::{Encoding, Exchange, ExchangeError, Method, PropertyMap, Request};
use tracing::{debug, info, warn};

/// What a successful exchange does to the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreStep {
    /// Write mapped fields and snapshot the synced baseline.
    Write,
    /// Delete the record's row.
    Remove,
}

/// Orchestrates remote round trips for records and record sets.
pub struct SyncClient {
    transport: Arc<dyn Transport>,
    config: SyncConfig,
}

impl fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SyncClient {
    pub fn new(transport: Arc<dyn Transport>, config: SyncConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Saves a record: POST to `url/name` when it is new, PUT to
    /// `url/name/id` otherwise.
    pub async fn save(&self, record: &Record, options: SyncOptions) -> SyncResult<SyncOutcome> {
        let (base, name) = require_location(record)?;
        let method = if record.is_new() { Method::Post } else { Method::Put };
        let mut lifecycle = Lifecycle::new();
        if let Some(invalid) = validate(record, method, &mut lifecycle) {
            return Ok(invalid);
        }

        lifecycle.advance(SyncPhase::BuildingRequest);
        let id = record.id();
        let url = compose_url(&base, &name, (method == Method::Put).then_some(id.as_str()));
        let mut payload = save_payload(record, &options);
        if let Some(params) = &options.params {
            payload.extend(params.clone());
        }
        let mut request = self.request(method, url, &options).with_params(payload);
        record.hooks().authenticate(&mut request);

        let exchange = self.dispatch(request, &mut lifecycle).await;
        Ok(self.complete_record(record, exchange, lifecycle, NotificationKind::Save, StoreStep::Write, options))
    }

    /// Refreshes a record from `url/name/id`. A record without an id is left
    /// alone.
    pub async fn fetch(&self, record: &Record, options: SyncOptions) -> SyncResult<SyncOutcome> {
        let (base, name) = require_location(record)?;
        if record.is_new() {
            debug!("skipping fetch of {} record {}: no id", record.hooks().type_name(), record.client_id());
            return Ok(SyncOutcome::Skipped {
                reason: "record has no id".into(),
            });
        }
        let mut lifecycle = Lifecycle::new();
        if let Some(invalid) = validate(record, Method::Get, &mut lifecycle) {
            return Ok(invalid);
        }

        lifecycle.advance(SyncPhase::BuildingRequest);
        let url = compose_url(&base, &name, Some(&record.id()));
        let mut request = self.request(Method::Get, url, &options);
        request.params = options.params.clone();
        record.hooks().authenticate(&mut request);

        let exchange = self.dispatch(request, &mut lifecycle).await;
        Ok(self.complete_record(record, exchange, lifecycle, NotificationKind::Fetch, StoreStep::Write, options))
    }

    /// Deletes a record remotely and, on success, from the local store.
    ///
    /// Membership in any record set is untouched. A record that was never
    /// saved is only removed locally: no request is sent, Delete fires with an
    /// empty payload, the completion runs with a local exchange for the
    /// unsent DELETE and the outcome is `Skipped`.
    pub async fn destroy(&self, record: &Record, options: SyncOptions) -> SyncResult<SyncOutcome> {
        let (base, name) = require_location(record)?;
        let mut lifecycle = Lifecycle::new();
        if let Some(invalid) = validate(record, Method::Delete, &mut lifecycle) {
            return Ok(invalid);
        }

        if record.is_new() {
            lifecycle.advance(SyncPhase::Persisting);
            if let Err(e) = record.remove_from_store() {
                warn!("removing unsaved record {} failed: {e}", record.client_id());
            }
            lifecycle.advance(SyncPhase::Notifying);
            record.publish(NotificationKind::Delete, Payload::Empty);
            let request = self.request(Method::Delete, compose_url(&base, &name, None), &options);
            run_completion(options.on_complete, &Exchange::local(request));
            lifecycle.finish();
            return Ok(SyncOutcome::Skipped {
                reason: "record was never saved".into(),
            });
        }

        lifecycle.advance(SyncPhase::BuildingRequest);
        let url = compose_url(&base, &name, Some(&record.id()));
        let mut request = self.request(Method::Delete, url, &options);
        request.params = options.params.clone();
        record.hooks().authenticate(&mut request);

        let exchange = self.dispatch(request, &mut lifecycle).await;
        Ok(self.complete_record(record, exchange, lifecycle, NotificationKind::Delete, StoreStep::Remove, options))
    }

    /// A request carrying the configured headers.
    pub(crate) fn request(&self, method: Method, url: String, options: &SyncOptions) -> Request {
        let encoding: Encoding = options.encoding.unwrap_or(self.config.default_encoding);
        let mut request = Request::new(method, url, encoding);
        for (name, value) in &self.config.headers {
            request.set_header(name.clone(), value.clone());
        }
        request
    }

    pub(crate) async fn dispatch(&self, request: Request, lifecycle: &mut Lifecycle) -> Exchange {
        lifecycle.advance(SyncPhase::AwaitingResponse);
        let (method, url) = (request.method, request.url.clone());
        let exchange = self.transport.send(request).await;
        match &exchange.error {
            None => info!("{method} {url} completed"),
            Some(e) => warn!("{method} {url} failed: {e}"),
        }
        exchange
    }

    fn complete_record(
        &self,
        record: &Record,
        mut exchange: Exchange,
        mut lifecycle: Lifecycle,
        kind: NotificationKind,
        step: StoreStep,
        options: SyncOptions,
    ) -> SyncOutcome {
        lifecycle.advance(SyncPhase::Merging);
        let body = exchange.parsed_body();
        let merged = record
            .hooks()
            .parse(&exchange, body.as_ref())
            .is_some_and(|parsed| record.merge_parsed(parsed, options.set_options()));

        let mut persisted = false;
        if exchange.is_success() {
            lifecycle.advance(SyncPhase::Persisting);
            let stored = match step {
                StoreStep::Write => record.persist(),
                StoreStep::Remove => record.remove_from_store(),
            };
            match stored {
                Ok(()) => {
                    if step == StoreStep::Write {
                        record.mark_synced();
                    }
                    persisted = true;
                }
                Err(e) => {
                    warn!("local commit for {} failed: {e}", record.client_id());
                    exchange.error = Some(ExchangeError::Storage(e.to_string()));
                }
            }
        }

        lifecycle.advance(SyncPhase::Notifying);
        record.publish(kind, Payload::Exchange(exchange.clone()));
        run_completion(options.on_complete, &exchange);

        SyncOutcome::Completed(SyncReport {
            exchange,
            phases: lifecycle.finish(),
            merged: usize::from(merged),
            added: 0,
            persisted,
        })
    }
}

pub(crate) fn run_completion(callback: Option<Completion>, exchange: &Exchange) {
    if let Some(callback) = callback {
        callback(exchange);
    }
}

/// The base URL and resource name, both required.
fn require_location(record: &Record) -> SyncResult<(String, String)> {
    let (base, name) = (record.url(), record.name());
    if base.trim().is_empty() {
        return Err(SyncError::MissingUrl(record.hooks().type_name().to_string()));
    }
    if name.trim().is_empty() {
        return Err(SyncError::MissingName(record.hooks().type_name().to_string()));
    }
    Ok((base, name))
}

/// Runs the validate hook. Returns the outcome to stop with on failure.
fn validate(record: &Record, method: Method, lifecycle: &mut Lifecycle) -> Option<SyncOutcome> {
    lifecycle.advance(SyncPhase::Validating);
    if record.is_valid(Some(method)) {
        return None;
    }
    let error = record.validation_error().unwrap_or_default();
    debug!("{method} of {} aborted by validation: {error}", record.client_id());
    Some(SyncOutcome::Invalid {
        error,
        phases: lifecycle.clone().finish(),
    })
}

/// Full properties or the `only` subset, reduced to the changed ones in
/// difference mode.
fn save_payload(record: &Record, options: &SyncOptions) -> PropertyMap {
    let keys: Option<Vec<&str>> = options
        .only
        .as_ref()
        .map(|keys| keys.iter().map(String::as_str).collect());
    let payload = record.subset(keys.as_deref());
    if options.difference {
        diff(&payload, &record.prior_properties())
    } else {
        payload
    }
}
