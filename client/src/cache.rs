//! Query cache for the employee list and search results.
//!
//! Every invalidation bumps a generation counter. An entry is stale when it was fetched
//! under an older generation, and a fetch started before an invalidation can never make
//! its key look fresh again.

use std::collections::HashMap;

use platform_api::Employee;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    GetAll,
    Search(String),
}

impl QueryKey {
    /// The key the list view shows for a search box value.
    pub fn for_search(query: &str) -> Self {
        if query.is_empty() {
            QueryKey::GetAll
        } else {
            QueryKey::Search(query.to_string())
        }
    }
}

/// Handed out when a fetch starts; returned with its result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: QueryKey,
    generation: u64,
}

#[derive(Clone, Debug)]
struct Entry {
    rows: Vec<Employee>,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,
    in_flight: HashMap<QueryKey, u64>,
    generation: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached rows for `key`, stale or not.
    pub fn get(&self, key: &QueryKey) -> Option<&[Employee]> {
        self.entries.get(key).map(|entry| entry.rows.as_slice())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.generation < self.generation)
    }

    pub fn is_loading(&self, key: &QueryKey) -> bool {
        self.in_flight.contains_key(key)
    }

    pub fn needs_fetch(&self, key: &QueryKey) -> bool {
        if self.in_flight.get(key) == Some(&self.generation) {
            return false;
        }
        self.entries
            .get(key)
            .is_none_or(|entry| entry.generation < self.generation)
    }

    /// Starts a fetch for `key` unless a current one is cached or already running.
    pub fn begin_fetch(&mut self, key: &QueryKey) -> Option<FetchTicket> {
        if !self.needs_fetch(key) {
            return None;
        }
        self.in_flight.insert(key.clone(), self.generation);
        Some(FetchTicket {
            key: key.clone(),
            generation: self.generation,
        })
    }

    pub fn complete(&mut self, ticket: FetchTicket, rows: Vec<Employee>) {
        self.finish(&ticket);
        let newer_cached = self
            .entries
            .get(&ticket.key)
            .is_some_and(|entry| entry.generation > ticket.generation);
        if newer_cached {
            return;
        }
        self.entries.insert(
            ticket.key,
            Entry {
                rows,
                generation: ticket.generation,
            },
        );
    }

    /// Drops the in-flight marker; cached rows stay as they were.
    pub fn fail(&mut self, ticket: &FetchTicket) {
        self.finish(ticket);
    }

    fn finish(&mut self, ticket: &FetchTicket) {
        if self.in_flight.get(&ticket.key) == Some(&ticket.generation) {
            self.in_flight.remove(&ticket.key);
        }
    }

    /// Marks every employee query stale. Rows for `current` and the full list remain
    /// visible until refetched; other search results are dropped.
    pub fn invalidate_all(&mut self, current: &QueryKey) {
        self.generation += 1;
        self.entries.retain(|key, _| key == current || *key == QueryKey::GetAll);
    }
}
