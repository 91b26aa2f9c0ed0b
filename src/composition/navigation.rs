use std::collections::BTreeSet;

use crate::foundation::core::FrameTime;
use crate::store::shared::{ACTIVE_SECTION, StoreReader};
use crate::trigger::state::NavKey;

/// Input channels a composition enables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InputChannels {
    pub wheel: bool,
    pub touch: bool,
    pub keyboard: bool,
    /// In-page `#section` links, followed by the momentum driver. Native scrolling
    /// already follows them.
    pub anchors: bool,
}

impl Default for InputChannels {
    fn default() -> Self {
        Self {
            wheel: true,
            touch: true,
            keyboard: true,
            anchors: true,
        }
    }
}

/// Resolved rules for discrete navigation commands.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct NavigationPolicy {
    pub channels: InputChannels,
    /// Wrap from the last section to the first and back.
    pub looping: bool,
    /// Ignore commands while a transition is in flight.
    pub lock_during_transition: bool,
    /// Minimum spacing between accepted commands.
    pub debounce_ms: f64,
    /// Section indices navigation steps over.
    pub skip: BTreeSet<usize>,
}

/// Stateful gate applying a [`NavigationPolicy`] to a stream of commands.
#[derive(Clone, Debug, Default)]
pub struct NavigationGate {
    policy: NavigationPolicy,
    last_accepted: Option<FrameTime>,
}

impl NavigationGate {
    pub fn new(policy: NavigationPolicy) -> Self {
        Self {
            policy,
            last_accepted: None,
        }
    }

    pub fn policy(&self) -> &NavigationPolicy {
        &self.policy
    }

    /// Decide whether `key` moves, and by how many sections.
    ///
    /// The returned step is signed and may cross the wrap point on looping tracks, so
    /// `Next` from the last section is `+1`, not `-(count - 1)`.
    pub fn accept(
        &mut self,
        key: NavKey,
        now: FrameTime,
        current: usize,
        count: usize,
        transitioning: bool,
    ) -> Option<isize> {
        if count == 0 {
            return None;
        }
        if self.policy.lock_during_transition && transitioning {
            return None;
        }
        if let Some(last) = self.last_accepted
            && now.since(last) < self.policy.debounce_ms
        {
            return None;
        }

        let step = match key {
            NavKey::Next => self.walk(current, count, 1),
            NavKey::Previous => self.walk(current, count, -1),
            NavKey::First => self
                .first_allowed(count, (0..count).collect())
                .map(|t| t as isize - current as isize),
            NavKey::Last => self
                .first_allowed(count, (0..count).rev().collect())
                .map(|t| t as isize - current as isize),
        }?;
        if step == 0 {
            return None;
        }
        self.last_accepted = Some(now);
        Some(step)
    }

    fn walk(&self, current: usize, count: usize, dir: isize) -> Option<isize> {
        let n = count as isize;
        let mut step = 0;
        for _ in 0..count {
            step += dir;
            let raw = current as isize + step;
            if !self.policy.looping && !(0..n).contains(&raw) {
                return None;
            }
            if !self.policy.skip.contains(&(raw.rem_euclid(n) as usize)) {
                return Some(step);
            }
        }
        None
    }

    fn first_allowed(&self, count: usize, order: Vec<usize>) -> Option<usize> {
        order
            .into_iter()
            .take(count)
            .find(|i| !self.policy.skip.contains(i))
    }
}

/// How the address bar follows the active section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryMode {
    #[default]
    None,
    Replace,
    Push,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct HistoryUpdate {
    /// `#section-id`.
    pub fragment: String,
    pub mode: HistoryMode,
}

/// Mirrors the store's active section into URL fragment updates.
///
/// Reads only; the driver stays the single writer of the store.
pub struct HistorySync {
    reader: StoreReader,
    mode: HistoryMode,
    section_ids: Vec<String>,
    last: Option<usize>,
}

impl HistorySync {
    pub fn new(reader: StoreReader, mode: HistoryMode, section_ids: Vec<String>) -> Self {
        Self {
            reader,
            mode,
            section_ids,
            last: None,
        }
    }

    /// Emit an update when the active section changed since the previous poll.
    pub fn poll(&mut self) -> Option<HistoryUpdate> {
        if self.mode == HistoryMode::None {
            return None;
        }
        let active = self.reader.index(ACTIVE_SECTION)?;
        if self.last == Some(active) {
            return None;
        }
        let id = self.section_ids.get(active)?;
        self.last = Some(active);
        Some(HistoryUpdate {
            fragment: format!("#{id}"),
            mode: self.mode,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/navigation.rs"]
mod tests;
