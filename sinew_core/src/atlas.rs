// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Texture region lookup.
//!
//! Atlas pages are loaded by the host before any view exists. What the core
//! needs afterwards is a synchronous name-to-region lookup, used when
//! building attachments and when a host swaps a slot's texture at runtime.

use alloc::sync::Arc;

use hashbrown::HashMap;

use crate::attachment::TextureRegion;

/// Resolves texture regions by name.
pub trait TextureResolver {
    /// Returns the region with the given name, if loaded.
    fn resolve(&self, name: &str) -> Option<TextureRegion>;
}

impl<F> TextureResolver for F
where
    F: Fn(&str) -> Option<TextureRegion>,
{
    fn resolve(&self, name: &str) -> Option<TextureRegion> {
        self(name)
    }
}

/// An in-memory region table.
#[derive(Clone, Debug, Default)]
pub struct AtlasRegions {
    regions: HashMap<Arc<str>, TextureRegion>,
}

impl AtlasRegions {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region under its own name, replacing any previous entry.
    pub fn insert(&mut self, region: TextureRegion) -> Option<TextureRegion> {
        self.regions.insert(region.name.clone(), region)
    }

    /// Returns the region with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TextureRegion> {
        self.regions.get(name)
    }

    /// Returns the number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl TextureResolver for AtlasRegions {
    fn resolve(&self, name: &str) -> Option<TextureRegion> {
        self.get(name).cloned()
    }
}

impl FromIterator<TextureRegion> for AtlasRegions {
    fn from_iter<I: IntoIterator<Item = TextureRegion>>(iter: I) -> Self {
        let mut atlas = Self::new();
        for region in iter {
            atlas.insert(region);
        }
        atlas
    }
}
