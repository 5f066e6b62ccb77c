// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use invtrack_api::Client;
use invtrack_app::{ApiRequest, Item, ItemId, ItemPayload};
use invtrack_tui::{InternalEvent, execute_request};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{info, warn};

/// Runs UI requests against the inventory API on worker threads.
#[derive(Debug, Clone)]
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl invtrack_tui::AppRuntime for ApiRuntime {
    fn list_items(&mut self) -> Result<Vec<Item>> {
        let items = self.client.list_items()?;
        info!(count = items.len(), "loaded items");
        Ok(items)
    }

    fn create_item(&mut self, payload: &ItemPayload) -> Result<Item> {
        let item = self.client.create_item(payload)?;
        info!(id = %item.id, name = %item.name, "created item");
        Ok(item)
    }

    fn update_item(&mut self, id: ItemId, payload: &ItemPayload) -> Result<Item> {
        let item = self.client.update_item(id, payload)?;
        info!(%id, name = %item.name, "updated item");
        Ok(item)
    }

    fn delete_item(&mut self, id: ItemId) -> Result<()> {
        self.client.delete_item(id)?;
        info!(%id, "deleted item");
        Ok(())
    }

    fn api_label(&self) -> String {
        self.client.base_url().to_owned()
    }

    fn spawn_request(&mut self, request: ApiRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let kind = request.kind();
        let mut worker = self.clone();
        thread::Builder::new()
            .name(format!("invtrack-{}", kind.as_str()))
            .spawn(move || {
                let outcome = execute_request(&mut worker, request);
                if tx.send(InternalEvent::Api(outcome)).is_err() {
                    warn!(request = kind.as_str(), "UI closed before API outcome arrived");
                }
            })
            .with_context(|| format!("spawn {} worker", kind.as_str()))?;
        Ok(())
    }
}
