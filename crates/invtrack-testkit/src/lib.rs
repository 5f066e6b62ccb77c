// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod mock_api;

pub use mock_api::{MockApi, RecordedRequest};

use invtrack_app::{Item, ItemId, ItemPayload};

const ITEM_NAMES: [&str; 24] = [
    "Chair",
    "Desk",
    "Monitor",
    "Keyboard",
    "Stapler",
    "Printer",
    "Whiteboard",
    "Projector",
    "Extension Cord",
    "Filing Cabinet",
    "Bookshelf",
    "Desk Lamp",
    "Laptop Stand",
    "Headset",
    "Webcam",
    "Router",
    "Label Maker",
    "Paper Shredder",
    "Coffee Maker",
    "First Aid Kit",
    "Fire Extinguisher",
    "Step Ladder",
    "Toolbox",
    "Hand Truck",
];

const LOCATIONS: [&str; 12] = [
    "Room A",
    "Room B",
    "Storage Closet",
    "Front Desk",
    "Server Room",
    "Break Room",
    "Conference Room",
    "Warehouse Bay 1",
    "Warehouse Bay 2",
    "Loading Dock",
    "Basement",
    "Annex",
];

const DESCRIPTION_WORDS: [&str; 20] = [
    "spare",
    "refurbished",
    "new",
    "boxed",
    "labeled",
    "ergonomic",
    "wireless",
    "heavy",
    "compact",
    "shared",
    "loaner",
    "backup",
    "portable",
    "black",
    "grey",
    "adjustable",
    "donated",
    "surplus",
    "inspected",
    "tagged",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of plausible inventory rows.
#[derive(Debug, Clone)]
pub struct ItemFaker {
    rng: DeterministicRng,
}

impl ItemFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn payload(&mut self) -> ItemPayload {
        let description = if self.rng.bool() {
            self.phrase(1, 3)
        } else {
            String::new()
        };
        ItemPayload {
            name: self.pick(&ITEM_NAMES).to_owned(),
            description,
            quantity: self.int_range(1, 40),
            location: self.pick(&LOCATIONS).to_owned(),
        }
    }

    pub fn item(&mut self, id: i64) -> Item {
        let payload = self.payload();
        Item {
            id: ItemId::new(id),
            name: payload.name,
            description: non_empty(payload.description),
            quantity: payload.quantity,
            location: non_empty(payload.location),
            created_at: Some(fixture_timestamp().to_owned()),
        }
    }

    /// Rows with ids `1..=count`.
    pub fn items(&mut self, count: usize) -> Vec<Item> {
        (1..=count as i64).map(|id| self.item(id)).collect()
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn phrase(&mut self, min_words: i64, max_words: i64) -> String {
        let count = self.int_range(min_words, max_words) as usize;
        let words = (0..count)
            .map(|_| self.pick(&DESCRIPTION_WORDS))
            .collect::<Vec<&str>>();
        words.join(" ")
    }
}

/// `created_at` in the shape the inventory API emits (no offset, microseconds).
pub fn fixture_timestamp() -> &'static str {
    "2026-02-19T12:34:56.789012"
}

pub fn item_names() -> &'static [&'static str] {
    &ITEM_NAMES
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
