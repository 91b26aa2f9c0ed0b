use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::foundation::core::ElementId;
use crate::style::value::StyleValue;

/// The single mutation the runtime performs on the host element tree.
pub trait StyleSink {
    fn set_style_property(&mut self, element: &ElementId, key: &str, value: &StyleValue);
}

/// Sink handle shared by every driver on one host.
pub type SharedSink = Rc<RefCell<dyn StyleSink>>;

/// One recorded style write.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StyleWrite {
    pub element: ElementId,
    pub key: String,
    pub value: StyleValue,
}

/// In-memory sink keeping every write plus the latest value per (element, key).
#[derive(Debug, Default)]
pub struct RecordingSink {
    writes: Vec<StyleWrite>,
    current: BTreeMap<(ElementId, String), StyleValue>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning both the concrete handle and its shared form.
    pub fn shared() -> (Rc<RefCell<RecordingSink>>, SharedSink) {
        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        let shared: SharedSink = sink.clone();
        (sink, shared)
    }

    pub fn writes(&self) -> &[StyleWrite] {
        &self.writes
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Latest value written for `key` on `element`.
    pub fn current(&self, element: &ElementId, key: &str) -> Option<&StyleValue> {
        self.current.get(&(element.clone(), key.to_owned()))
    }

    /// Writes that targeted `element`.
    pub fn writes_for<'a>(&'a self, element: &'a ElementId) -> impl Iterator<Item = &'a StyleWrite> {
        self.writes.iter().filter(move |w| &w.element == element)
    }

    /// Forget the write log, keeping current values.
    pub fn clear_log(&mut self) {
        self.writes.clear();
    }
}

impl StyleSink for RecordingSink {
    fn set_style_property(&mut self, element: &ElementId, key: &str, value: &StyleValue) {
        self.writes.push(StyleWrite {
            element: element.clone(),
            key: key.to_owned(),
            value: value.clone(),
        });
        self.current
            .insert((element.clone(), key.to_owned()), value.clone());
    }
}
