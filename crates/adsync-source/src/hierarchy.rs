//! # Hierarchy Resolver
//!
//! Flattens the Google Ads manager/client tree into the (manager, leaf)
//! pairs to report on.
//!
//! Each seed is walked breadth-first with its own visited set. For every
//! dequeued account the directory returns the account itself (level 0) and
//! its direct children (level 1). Managers among the children are enqueued
//! once; non-manager children become leaves under the account that listed
//! them. A seed whose own level-0 row is not a manager is itself a leaf.
//!
//! A failed directory call abandons that seed entirely: nothing it had
//! discovered so far is emitted. Other seeds still resolve.

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use adsync_core::CustomerId;

use crate::adapter::{AccountDirectory, CustomerClient};
use crate::error::SourceError;

/// How to treat a leaf reachable through more than one manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeafPolicy {
    /// One link per distinct (manager, client) pair.
    #[default]
    PerManager,
    /// One link per client, under the first manager it was found under.
    Unique,
}

impl FromStr for LeafPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-manager" | "per_manager" => Ok(Self::PerManager),
            "unique" => Ok(Self::Unique),
            other => Err(format!("unknown leaf policy {other:?} (expected per-manager or unique)")),
        }
    }
}

/// One hierarchy edge from a manager to a leaf account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientLink {
    pub manager_id: CustomerId,
    pub client_id: CustomerId,
}

/// Flattened hierarchy for one run.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub links: Vec<ClientLink>,
    /// Seeds whose traversal failed and contributed nothing.
    pub failed_seeds: Vec<CustomerId>,
}

impl Resolution {
    /// Distinct leaf accounts, in the order they were first discovered.
    pub fn leaf_accounts(&self) -> Vec<CustomerId> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .filter(|l| seen.insert(&l.client_id))
            .map(|l| l.client_id.clone())
            .collect()
    }
}

pub struct HierarchyResolver<'a, D: ?Sized> {
    directory: &'a D,
    policy: LeafPolicy,
}

impl<'a, D: AccountDirectory + ?Sized> HierarchyResolver<'a, D> {
    pub fn new(directory: &'a D, policy: LeafPolicy) -> Self {
        Self { directory, policy }
    }

    /// Resolve from the seeds the directory reports as accessible.
    pub async fn resolve_accessible(&self) -> Result<Resolution, SourceError> {
        let seeds = self.directory.accessible_customers().await?;
        tracing::info!(seeds = seeds.len(), "discovered accessible customers");
        Ok(self.resolve(&seeds).await)
    }

    /// Resolve from explicit seeds.
    pub async fn resolve(&self, seeds: &[CustomerId]) -> Resolution {
        let mut resolution = Resolution::default();
        let mut emitted_pairs = HashSet::new();
        let mut emitted_clients = HashSet::new();

        for seed in seeds {
            match self.walk(seed).await {
                Ok(links) => {
                    for link in links {
                        let keep = match self.policy {
                            LeafPolicy::PerManager => emitted_pairs.insert(link.clone()),
                            LeafPolicy::Unique => emitted_clients.insert(link.client_id.clone()),
                        };
                        if keep {
                            resolution.links.push(link);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(seed = %seed, error = %e, "account hierarchy lookup failed, skipping seed");
                    resolution.failed_seeds.push(seed.clone());
                }
            }
        }

        tracing::info!(
            links = resolution.links.len(),
            leaves = resolution.leaf_accounts().len(),
            failed_seeds = resolution.failed_seeds.len(),
            "account hierarchy resolved"
        );
        resolution
    }

    async fn walk(&self, seed: &CustomerId) -> Result<Vec<ClientLink>, SourceError> {
        let mut queue = VecDeque::from([seed.clone()]);
        let mut visited = HashSet::from([seed.clone()]);
        let mut links = Vec::new();

        while let Some(current) = queue.pop_front() {
            let rows = self.directory.direct_children(&current).await?;
            for CustomerClient { id, level, manager, .. } in rows {
                match level {
                    0 => {
                        if current == *seed && !manager {
                            links.push(ClientLink {
                                manager_id: seed.clone(),
                                client_id: id,
                            });
                        }
                    }
                    1 if manager => {
                        if visited.insert(id.clone()) {
                            queue.push_back(id);
                        }
                    }
                    1 => links.push(ClientLink {
                        manager_id: current.clone(),
                        client_id: id,
                    }),
                    _ => {}
                }
            }
        }
        Ok(links)
    }
}
