//! The set of resource collections served by one process.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{CollectionsConfig, Config};
use crate::error::Result;
use crate::schema::{Schema, APPOINTMENTS, STUDENTS, TEACHERS, USERS};
use crate::store::{CollectionStore, RecordCollection};

/// A resource type exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Registered users.
    Users,
    /// Health professionals.
    Professionals,
    /// Teachers.
    Teachers,
    /// Students.
    Students,
    /// Appointments between patients and professionals.
    Appointments,
    /// School events.
    Events,
}

impl Resource {
    /// Every resource, in display order.
    pub const ALL: [Resource; 6] = [
        Self::Users,
        Self::Professionals,
        Self::Teachers,
        Self::Students,
        Self::Appointments,
        Self::Events,
    ];

    /// The route segment and collection name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Professionals => "professionals",
            Self::Teachers => "teachers",
            Self::Students => "students",
            Self::Appointments => "appointments",
            Self::Events => "events",
        }
    }

    /// The Portuguese route segment served alongside [`Resource::as_str`].
    #[must_use]
    pub fn alias(self) -> Option<&'static str> {
        match self {
            Self::Users => Some("usuarios"),
            Self::Professionals => Some("profissionais"),
            Self::Teachers => Some("professores"),
            Self::Students => None,
            Self::Appointments => Some("consultas"),
            Self::Events => Some("eventos"),
        }
    }

    /// Look up a resource by its route segment or its alias.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|resource| resource.as_str() == name || resource.alias() == Some(name))
    }

    /// The schema this resource uses under the given configuration.
    #[must_use]
    pub fn schema(self, collections: &CollectionsConfig) -> &'static Schema {
        match self {
            Self::Users => &USERS,
            Self::Professionals => collections.professionals.schema(),
            Self::Teachers => &TEACHERS,
            Self::Students => &STUDENTS,
            Self::Appointments => &APPOINTMENTS,
            Self::Events => collections.events.schema(),
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One collection per resource.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    collections: HashMap<Resource, Arc<dyn RecordCollection>>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a file-backed store for every resource.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut catalog = Self::new();
        for resource in Resource::ALL {
            let schema = resource.schema(&config.collections);
            let store = CollectionStore::new(schema, config.collection_path(schema))
                .with_id_policy(config.storage.id_policy)
                .with_concurrency(config.storage.concurrency);
            catalog.insert(resource, Arc::new(store));
        }
        catalog
    }

    /// Register the collection serving a resource, replacing any previous one.
    pub fn insert(&mut self, resource: Resource, collection: Arc<dyn RecordCollection>) {
        self.collections.insert(resource, collection);
    }

    /// The collection serving a resource.
    #[must_use]
    pub fn get(&self, resource: Resource) -> Option<Arc<dyn RecordCollection>> {
        self.collections.get(&resource).cloned()
    }

    /// The collection serving a route segment such as `"students"`.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<Arc<dyn RecordCollection>> {
        Resource::from_name(name).and_then(|resource| self.get(resource))
    }

    /// Registered collections in [`Resource::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, &Arc<dyn RecordCollection>)> + '_ {
        Resource::ALL.into_iter().filter_map(|resource| {
            self.collections
                .get(&resource)
                .map(|collection| (resource, collection))
        })
    }

    /// Number of registered collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether no collections are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Create every missing backing file as an empty array.
    ///
    /// Returns the resources whose files were created.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub async fn ensure_all(&self) -> Result<Vec<Resource>> {
        let mut created = Vec::new();
        for (resource, collection) in self.iter() {
            if collection.ensure_exists().await? {
                created.push(resource);
            }
        }
        if !created.is_empty() {
            info!("Initialized {} empty collection file(s)", created.len());
        }
        Ok(created)
    }
}
