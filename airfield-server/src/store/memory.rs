//! In-memory record store.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::{
    Airport, AirportId, CodeKind, LookupCode, TimezoneId, TimezoneLink, TimezoneRecord,
    TimezoneRecordId,
};
use crate::resolver::ResolvedTimezone;

use super::{
    AirportLoader, AirportStore, AliasLoader, StoreError, TimezoneStore, Upserted,
};

/// Airports and timezone records with their secondary indexes.
#[derive(Debug, Clone, Default)]
pub(super) struct Tables {
    pub(super) airports: BTreeMap<AirportId, Airport>,
    by_iata: HashMap<String, AirportId>,
    by_ident: HashMap<String, AirportId>,
    pub(super) timezones: BTreeMap<TimezoneRecordId, TimezoneRecord>,
    by_canonical: HashMap<TimezoneId, TimezoneRecordId>,
    next_timezone_id: u64,
}

impl Tables {
    fn allocate_timezone_id(&mut self) -> TimezoneRecordId {
        self.next_timezone_id += 1;
        TimezoneRecordId(self.next_timezone_id)
    }

    /// Existing record for `canonical_id`, or a fresh empty one.
    pub(super) fn get_or_create(&mut self, canonical_id: &TimezoneId) -> (&mut TimezoneRecord, bool) {
        let (id, created) = match self.by_canonical.get(canonical_id).copied() {
            Some(id) => (id, false),
            None => {
                let id = self.allocate_timezone_id();
                self.by_canonical.insert(canonical_id.clone(), id);
                (id, true)
            }
        };

        let record = self
            .timezones
            .entry(id)
            .or_insert_with(|| TimezoneRecord::new(id, Some(canonical_id.clone())));
        (record, created)
    }

    fn linked_count(&self, record: TimezoneRecordId) -> usize {
        self.airports
            .values()
            .filter(|a| a.timezone.is_some_and(|l| l.record == record))
            .count()
    }

    /// Insert or replace one airport by primary id.
    ///
    /// An IATA code that is not three letters could never be looked up, so
    /// it is dropped rather than indexed.
    pub(super) fn upsert_airport(&mut self, mut row: Airport) -> Result<(), StoreError> {
        let iata = match row.iata_code.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match LookupCode::parse(CodeKind::Iata, raw) {
                Ok(code) => Some(code.as_str().to_string()),
                Err(e) => {
                    warn!(airport = %row.id, error = %e, "dropping unusable IATA code");
                    None
                }
            },
        };
        if let Some(code) = &iata
            && let Some(holder) = self.by_iata.get(code)
            && holder != &row.id
        {
            return Err(StoreError::DuplicateIata {
                code: code.clone(),
                existing: holder.clone(),
            });
        }

        if let Some(link) = row.timezone
            && !self.timezones.contains_key(&link.record)
        {
            return Err(StoreError::TimezoneNotFound(link.record));
        }

        if let Some(old) = self.airports.get(&row.id) {
            if row.timezone.is_none() {
                row.timezone = old.timezone;
            }
            if let Some(old_iata) = &old.iata_code {
                self.by_iata.remove(&old_iata.to_ascii_uppercase());
            }
            self.by_ident.remove(&old.ident.to_ascii_uppercase());
        }

        row.iata_code = iata;
        row.updated = Utc::now();

        if let Some(code) = &row.iata_code {
            self.by_iata.insert(code.clone(), row.id.clone());
        }
        if !row.ident.is_empty() {
            self.by_ident
                .insert(row.ident.to_ascii_uppercase(), row.id.clone());
        }
        self.airports.insert(row.id.clone(), row);
        Ok(())
    }
}

/// Thread-safe in-memory store.
///
/// Both tables sit behind one lock, so every write (an upsert by canonical
/// identifier, a link replacement) is atomic with respect to readers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(super) inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of airports stored.
    pub async fn airport_count(&self) -> usize {
        self.inner.read().await.airports.len()
    }

    /// Number of timezone records stored.
    pub async fn timezone_count(&self) -> usize {
        self.inner.read().await.timezones.len()
    }

    /// Insert an incomplete record for `canonical_id` if none exists, as an
    /// import would. Returns the record either way.
    pub async fn ensure_timezone(&self, canonical_id: &TimezoneId) -> TimezoneRecord {
        let mut tables = self.inner.write().await;
        let (record, _) = tables.get_or_create(canonical_id);
        record.clone()
    }
}

#[async_trait]
impl AirportStore for MemoryStore {
    async fn find_by_code(&self, code: &LookupCode) -> Result<Option<Airport>, StoreError> {
        let tables = self.inner.read().await;
        let index = match code.kind() {
            CodeKind::Iata => &tables.by_iata,
            CodeKind::Icao => &tables.by_ident,
        };
        Ok(index
            .get(code.as_str())
            .and_then(|id| tables.airports.get(id))
            .cloned())
    }

    async fn get(&self, id: &AirportId) -> Result<Option<Airport>, StoreError> {
        Ok(self.inner.read().await.airports.get(id).cloned())
    }

    async fn ids(&self) -> Result<Vec<AirportId>, StoreError> {
        Ok(self.inner.read().await.airports.keys().cloned().collect())
    }

    async fn set_timezone_link(
        &self,
        id: &AirportId,
        link: TimezoneLink,
    ) -> Result<Airport, StoreError> {
        let mut tables = self.inner.write().await;

        if !tables.timezones.contains_key(&link.record) {
            return Err(StoreError::TimezoneNotFound(link.record));
        }

        let airport = tables
            .airports
            .get_mut(id)
            .ok_or_else(|| StoreError::AirportNotFound(id.clone()))?;
        airport.timezone = Some(link);
        airport.updated = Utc::now();
        Ok(airport.clone())
    }
}

#[async_trait]
impl TimezoneStore for MemoryStore {
    async fn get(&self, id: TimezoneRecordId) -> Result<Option<TimezoneRecord>, StoreError> {
        Ok(self.inner.read().await.timezones.get(&id).cloned())
    }

    async fn find_by_canonical_id(
        &self,
        canonical_id: &TimezoneId,
    ) -> Result<Option<TimezoneRecord>, StoreError> {
        let tables = self.inner.read().await;
        Ok(tables
            .by_canonical
            .get(canonical_id)
            .and_then(|id| tables.timezones.get(id))
            .cloned())
    }

    async fn upsert_resolved(
        &self,
        resolved: &ResolvedTimezone,
        now: DateTime<Utc>,
    ) -> Result<Upserted, StoreError> {
        let mut tables = self.inner.write().await;
        let (record, created) = tables.get_or_create(&resolved.canonical_id);

        record.display_name = Some(resolved.display_name.clone());
        record.raw_offset = Some(resolved.raw_offset);
        record.dst_offset = Some(resolved.dst_offset);
        record.last_refreshed = Some(now);

        debug!(record = %record.id, canonical_id = %resolved.canonical_id, created, "upserted timezone record");

        Ok(Upserted {
            record: record.clone(),
            created,
        })
    }

    async fn delete(&self, id: TimezoneRecordId) -> Result<(), StoreError> {
        let mut tables = self.inner.write().await;

        if !tables.timezones.contains_key(&id) {
            return Err(StoreError::TimezoneNotFound(id));
        }

        let airports = tables.linked_count(id);
        if airports > 0 {
            return Err(StoreError::InUse {
                record: id,
                airports,
            });
        }

        if let Some(record) = tables.timezones.remove(&id)
            && let Some(canonical_id) = record.canonical_id
        {
            tables.by_canonical.remove(&canonical_id);
        }
        Ok(())
    }
}

#[async_trait]
impl AirportLoader for MemoryStore {
    async fn upsert_airports(&self, rows: Vec<Airport>) -> Result<usize, StoreError> {
        let mut tables = self.inner.write().await;
        let count = rows.len();

        // Applied to a copy and swapped in, so a failing row writes nothing.
        let mut staged = tables.clone();
        for row in rows {
            staged.upsert_airport(row)?;
        }
        *tables = staged;
        Ok(count)
    }
}

#[async_trait]
impl AliasLoader for MemoryStore {
    async fn apply_aliases(
        &self,
        table: &BTreeMap<String, Vec<String>>,
    ) -> Result<usize, StoreError> {
        let mut tables = self.inner.write().await;
        let mut annotated = 0;

        for (key, aliases) in table {
            let target = TimezoneId::parse(key)
                .ok()
                .and_then(|id| tables.by_canonical.get(&id).copied())
                .or_else(|| {
                    aliases.iter().find_map(|alias| {
                        let id = TimezoneId::parse(alias).ok()?;
                        tables.by_canonical.get(&id).copied()
                    })
                });

            let Some(target) = target else {
                continue;
            };
            let Some(record) = tables.timezones.get_mut(&target) else {
                continue;
            };

            let own = record.canonical_id.as_ref().map(TimezoneId::as_str);
            let names: BTreeSet<String> = std::iter::once(key)
                .chain(aliases)
                .filter(|name| !name.is_empty() && Some(name.as_str()) != own)
                .cloned()
                .collect();

            record.aliases = names;
            annotated += 1;
        }

        Ok(annotated)
    }
}
