//! Shared state for command execution

use crate::api::GraphClient;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::store::FileMappingStore;
use tsync_common::types::{Destination, Selection};
use tsync_engine::mapping::MappingResolver;
use tsync_engine::store::{MappingStore, SelectionKind};
use tsync_engine::{RecordBuilder, LOGICAL_FIELDS};

/// Configuration, Graph client and store, built once per invocation
#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub client: GraphClient,
    pub store: FileMappingStore,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let client = GraphClient::from_config(&config)?;
        let store = FileMappingStore::new(&config.state_dir);

        Ok(Self {
            config,
            client,
            store,
        })
    }

    /// Load configuration, with `graph_url` taking precedence when given
    pub fn load(graph_url: Option<&str>) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(url) = graph_url {
            config.graph_url = url.to_string();
        }
        Self::new(config)
    }

    pub fn selected_site(&self) -> Option<Selection> {
        self.store.load_last_selection(SelectionKind::Site)
    }

    pub fn selected_list(&self) -> Option<Selection> {
        self.store.load_last_selection(SelectionKind::List)
    }

    /// The remembered (site, list) pair, if both are set
    pub fn destination(&self) -> Option<Destination> {
        let site = self.selected_site()?;
        let list = self.selected_list()?;
        Some(Destination::new(site.id, list.id))
    }

    /// Like [`destination`](Self::destination), naming what is missing
    pub fn require_destination(&self) -> Result<Destination> {
        let site = self
            .selected_site()
            .ok_or_else(|| CliError::no_selection("site"))?;
        let list = self
            .selected_list()
            .ok_or_else(|| CliError::no_selection("list"))?;
        Ok(Destination::new(site.id, list.id))
    }

    pub fn resolver(&self) -> MappingResolver<'_, FileMappingStore> {
        MappingResolver::new(&self.store, &LOGICAL_FIELDS)
    }

    pub fn record_builder(&self) -> Result<RecordBuilder> {
        Ok(RecordBuilder::with_zone(self.config.ticket_zone()?))
    }
}
