use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::foundation::error::{MotionError, MotionResult};

/// Virtual scroll position (px). Wrapped on looping tracks.
pub const SCROLL_POSITION: &str = "scroll.position";
/// Scroll velocity (px/s).
pub const SCROLL_VELOCITY: &str = "scroll.velocity";
/// Index of the active section.
pub const ACTIVE_SECTION: &str = "section.active";
/// Momentum mode (`idle`, `free`, `snapping`, `dragging`).
pub const MOMENTUM_MODE: &str = "momentum.mode";
/// Kind of driver currently owning the container.
pub const DRIVER_KIND: &str = "driver.kind";

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum StoreValue {
    Number(f64),
    Index(usize),
    Text(String),
}

#[derive(Debug, Default)]
struct StoreInner {
    values: BTreeMap<String, StoreValue>,
    writer: Option<String>,
    revision: u64,
}

/// Key-value state shared between a driver and UI consumers.
///
/// One writer at a time ([`claim_writer`](Self::claim_writer)), any number of readers.
#[derive(Clone, Debug, Default)]
pub struct SharedStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reader(&self) -> StoreReader {
        StoreReader {
            inner: self.inner.clone(),
        }
    }

    /// Take the writer role. Fails while another writer is alive.
    pub fn claim_writer(&self, owner: impl Into<String>) -> MotionResult<StoreWriter> {
        let owner = owner.into();
        let mut inner = self.inner.borrow_mut();
        if let Some(current) = &inner.writer {
            return Err(MotionError::lifecycle(format!(
                "store already written by '{current}', '{owner}' rejected"
            )));
        }
        inner.writer = Some(owner);
        Ok(StoreWriter {
            inner: self.inner.clone(),
        })
    }

    pub fn has_writer(&self) -> bool {
        self.inner.borrow().writer.is_some()
    }
}

/// Exclusive write handle. Dropping it releases the writer role.
#[derive(Debug)]
pub struct StoreWriter {
    inner: Rc<RefCell<StoreInner>>,
}

impl StoreWriter {
    /// Set `key`; the revision only moves when the value changes.
    pub fn set(&self, key: &str, value: StoreValue) {
        let mut inner = self.inner.borrow_mut();
        if inner.values.get(key) == Some(&value) {
            return;
        }
        inner.values.insert(key.to_owned(), value);
        inner.revision += 1;
    }

    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.borrow_mut();
        if inner.values.remove(key).is_some() {
            inner.revision += 1;
        }
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        self.inner.borrow_mut().writer = None;
    }
}

/// Read-only view of a [`SharedStore`].
#[derive(Clone, Debug)]
pub struct StoreReader {
    inner: Rc<RefCell<StoreInner>>,
}

impl StoreReader {
    pub fn get(&self, key: &str) -> Option<StoreValue> {
        self.inner.borrow().values.get(key).cloned()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            StoreValue::Number(n) => Some(n),
            StoreValue::Index(i) => Some(i as f64),
            StoreValue::Text(_) => None,
        }
    }

    pub fn index(&self, key: &str) -> Option<usize> {
        match self.get(key)? {
            StoreValue::Index(i) => Some(i),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            StoreValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Increments on every effective change.
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    pub fn snapshot(&self) -> BTreeMap<String, StoreValue> {
        self.inner.borrow().values.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/shared.rs"]
mod tests;
