//! Record set operations: fetch with reconciliation, and create.

use crate::client::{run_completion, SyncClient};
use crate::error::{SyncError, SyncResult};
use crate::lifecycle::{Lifecycle, SyncPhase};
use crate::options::SyncOptions;
use crate::outcome::{SyncOutcome, SyncReport};
use crate::url::compose_url;
use syncstack_model::{NotificationKind, Payload, Record, RecordSet, SetOptions};
use syncstack_storage::PersistentStore;
use syncstack_types::{ExchangeError, Method, PropertyMap};
use tracing::{debug, info, warn};

impl SyncClient {
    /// Fetches `url/name` and reconciles the response into the set.
    ///
    /// Each fragment of the collection response is matched to an existing
    /// member by server identity, or becomes a new record. Matched records
    /// only change (and only fire Change) where the fragment differs.
    /// Fragments that end up without an id are discarded. Members absent from
    /// the response are kept. One Fetch notification is published for the
    /// whole batch.
    pub async fn fetch_set(&self, set: &RecordSet, options: SyncOptions) -> SyncResult<SyncOutcome> {
        let type_name = set.factory().type_name().to_string();
        let (base, name) = (set.url(), set.name());
        if base.trim().is_empty() {
            return Err(SyncError::MissingUrl(type_name));
        }
        if name.trim().is_empty() {
            return Err(SyncError::MissingName(type_name));
        }

        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(SyncPhase::BuildingRequest);
        set.snapshot_prior();
        let mut request = self.request(Method::Get, compose_url(&base, &name, None), &options);
        request.params = options.params.clone();
        set.hooks().authenticate(&mut request);

        let mut exchange = self.dispatch(request, &mut lifecycle).await;

        lifecycle.advance(SyncPhase::Merging);
        let succeeded = exchange.is_success();
        let body = exchange.parsed_body();
        let fragments = set.hooks().parse(&exchange, body.as_ref()).unwrap_or_default();
        let store = set.services().store().clone();
        let (mut merged, mut added) = (0, 0);

        for fragment in &fragments {
            let existing = match set.factory().identity(fragment) {
                Some(id) if !set.is_empty() => set.get(&id),
                _ => None,
            };
            let is_match = existing.is_some();
            let record = existing.unwrap_or_else(|| set.create_record(PropertyMap::new()));

            if succeeded {
                record.mark_synced();
            }
            let changed = record
                .hooks()
                .parse(&exchange, Some(fragment))
                .is_some_and(|parsed| record.merge_parsed(parsed, options.set_options()));
            if changed {
                merged += 1;
            }

            if record.is_new() {
                if !is_match {
                    debug!("discarding {type_name} fragment without id");
                    store.delete(record.store_handle());
                }
                continue;
            }
            if !set.add(std::slice::from_ref(&record), SetOptions::silent()).is_empty() {
                added += 1;
            }
            if succeeded {
                record.stage_fields();
            }
        }

        let mut persisted = false;
        if succeeded {
            lifecycle.advance(SyncPhase::Persisting);
            match store.commit() {
                Ok(()) => persisted = true,
                Err(e) => {
                    warn!("local commit for {type_name} set failed: {e}");
                    exchange.error = Some(ExchangeError::Storage(e.to_string()));
                }
            }
        }
        info!(
            "reconciled {} {type_name} fragments: {merged} merged, {added} added",
            fragments.len()
        );

        lifecycle.advance(SyncPhase::Notifying);
        set.publish(NotificationKind::Fetch, Payload::Exchange(exchange.clone()));
        run_completion(options.on_complete, &exchange);

        Ok(SyncOutcome::Completed(SyncReport {
            exchange,
            phases: lifecycle.finish(),
            merged,
            added,
            persisted,
        }))
    }

    /// Builds a record from `properties`, adds it to the set and saves it.
    pub async fn create(
        &self,
        set: &RecordSet,
        properties: PropertyMap,
        options: SyncOptions,
    ) -> SyncResult<(Record, SyncOutcome)> {
        let record = set.create_record(properties);
        set.add(std::slice::from_ref(&record), options.set_options());
        let outcome = self.save(&record, options).await?;
        Ok((record, outcome))
    }
}
