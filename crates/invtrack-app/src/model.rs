// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use crate::ids::*;

/// Server-owned inventory record as returned by `GET /items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Item {
    /// Calendar day the server stamped the row with, if it sent a parseable
    /// `created_at`. Fractional seconds and offsets are ignored.
    pub fn added_on(&self) -> Option<Date> {
        let raw = self.created_at.as_deref()?;
        let prefix = raw.get(..19)?;
        PrimitiveDateTime::parse(
            prefix,
            &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
        .ok()
        .map(PrimitiveDateTime::date)
    }
}

/// Body of `POST /items` and `PUT /items/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit(ItemId),
}

impl DraftMode {
    pub const fn target(self) -> Option<ItemId> {
        match self {
            Self::Create => None,
            Self::Edit(id) => Some(id),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "add item",
            Self::Edit(_) => "edit item",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    ListItems,
    CreateItem(ItemPayload),
    UpdateItem(ItemId, ItemPayload),
    DeleteItem(ItemId),
}

impl ApiRequest {
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::ListItems => RequestKind::List,
            Self::CreateItem(_) => RequestKind::Create,
            Self::UpdateItem(..) => RequestKind::Update,
            Self::DeleteItem(_) => RequestKind::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    List,
    Create,
    Update,
    Delete,
}

impl RequestKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "load",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    ItemsListed(Vec<Item>),
    ItemSaved(Item),
    ItemDeleted(ItemId),
    Failed { request: RequestKind, error: String },
}
