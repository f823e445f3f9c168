//! # Navigation back stack
//!
//! An ordered sequence of `(name, destination-node)` pairs. Stack order is
//! the sole source of navigation history; no layout knowledge lives here.
//!
//! Names are not unique. Lookups scan from the back so the most recently
//! pushed entry wins. Every operation is total: popping an empty stack is a
//! no-op that returns `None`, never a panic.

use pagoda_core::error::LayoutError;
use pagoda_core::tree::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavPathEntry {
    pub name: String,
    pub node: NodeId,
}

/// Route info attached to a push, surfaced to lifecycle consumers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub name: String,
    pub param: Option<String>,
}

#[derive(Default)]
pub struct NavPathStack {
    entries: Vec<NavPathEntry>,
    route_infos: Vec<Option<RouteInfo>>,
    /// One-shot counter: a replace-style mutation bumps it, the next
    /// transition orchestration consumes it back to zero.
    replace: u32,
}

impl NavPathStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `len() <= 1` means there is nothing to go back to.
    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn push(&mut self, name: impl Into<String>, node: NodeId) {
        self.push_with_route(name, node, None);
    }

    pub fn push_with_route(
        &mut self,
        name: impl Into<String>,
        node: NodeId,
        route: Option<RouteInfo>,
    ) {
        self.entries.push(NavPathEntry {
            name: name.into(),
            node,
        });
        self.route_infos.push(route);
    }

    pub fn pop(&mut self) -> Option<NavPathEntry> {
        self.route_infos.pop();
        self.entries.pop()
    }

    /// Pop, surfacing underflow to command-style callers; `pop` itself stays
    /// a silent no-op.
    pub fn try_pop(&mut self) -> Result<NavPathEntry, LayoutError> {
        self.pop().ok_or(LayoutError::StackUnderflow)
    }

    /// Remove the last entry with this name, scanning from the back.
    pub fn remove_last(&mut self, name: &str) -> bool {
        if let Some(idx) = self.entries.iter().rposition(|e| e.name == name) {
            self.entries.remove(idx);
            self.route_infos.remove(idx);
            true
        } else {
            false
        }
    }

    /// Remove every entry with this name. Returns how many were removed.
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        let mut kept_routes = Vec::with_capacity(self.route_infos.len());
        let mut kept = Vec::with_capacity(self.entries.len());
        for (entry, route) in self.entries.drain(..).zip(self.route_infos.drain(..)) {
            if entry.name != name {
                kept.push(entry);
                kept_routes.push(route);
            }
        }
        self.entries = kept;
        self.route_infos = kept_routes;
        before - self.entries.len()
    }

    /// Remove an entry only if both name and node identity match.
    pub fn remove_entry(&mut self, name: &str, node: NodeId) -> bool {
        if let Some(idx) = self
            .entries
            .iter()
            .rposition(|e| e.name == name && e.node == node)
        {
            self.entries.remove(idx);
            self.route_infos.remove(idx);
            true
        } else {
            false
        }
    }

    /// Swap the top entry for a new one. Counts as a replace for the next
    /// transition (no directional slide, crossfade instead).
    pub fn replace(&mut self, name: impl Into<String>, node: NodeId) {
        self.pop();
        self.push(name, node);
        self.replace = self.replace.saturating_add(1);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.route_infos.clear();
    }

    pub fn clear_and_push(&mut self, name: impl Into<String>, node: NodeId) {
        self.clear();
        self.push(name, node);
    }

    /// Pop until `pred` matches (the matching entry is popped too when
    /// `inclusive`). Returns how many entries were removed.
    pub fn pop_to(&mut self, pred: impl Fn(&NavPathEntry) -> bool, inclusive: bool) -> usize {
        let Some(idx) = self.entries.iter().rposition(&pred) else {
            return 0;
        };
        let keep = if inclusive { idx } else { idx + 1 };
        let removed = self.entries.len() - keep;
        self.entries.truncate(keep);
        self.route_infos.truncate(keep);
        removed
    }

    pub fn top(&self) -> Option<&NavPathEntry> {
        self.entries.last()
    }

    /// Node of the last entry with this name, scanning from the back.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.node)
    }

    pub fn route_info(&self, index: usize) -> Option<&RouteInfo> {
        self.route_infos.get(index).and_then(|r| r.as_ref())
    }

    /// Entry immediately preceding the given `(name, node)` pair.
    pub fn pre(&self, name: &str, node: NodeId) -> Option<&NavPathEntry> {
        let idx = self
            .entries
            .iter()
            .rposition(|e| e.name == name && e.node == node)?;
        if idx == 0 {
            return None;
        }
        self.entries.get(idx - 1)
    }

    /// Second-from-top entry; the pop target when the top is dismissed.
    pub fn pre_top(&self) -> Option<&NavPathEntry> {
        let n = self.entries.len();
        if n < 2 {
            return None;
        }
        self.entries.get(n - 2)
    }

    /// Names in stack order. Restartable: each call yields a fresh pass.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Consume the one-shot replace marker. True when the latest stack
    /// mutation was a replace.
    pub fn consume_replace(&mut self) -> bool {
        let was = self.replace > 0;
        self.replace = 0;
        was
    }

    /// Serialize the name sequence for host-side state saving.
    pub fn to_json(&self) -> String {
        let names: Vec<&str> = self.all_names().collect();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".into())
    }

    /// Rebuild the stack from a saved name sequence. `resolve` supplies a
    /// destination node per name; names it cannot resolve are skipped.
    pub fn restore_from_json(
        &mut self,
        json: &str,
        mut resolve: impl FnMut(&str) -> Option<NodeId>,
    ) {
        let Ok(names) = serde_json::from_str::<Vec<String>>(json) else {
            log::warn!("navigation stack restore: malformed JSON, keeping current stack");
            return;
        };
        self.clear();
        for name in names {
            match resolve(&name) {
                Some(node) => self.push(name, node),
                None => log::warn!("navigation stack restore: no destination for {name:?}"),
            }
        }
        self.replace = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagoda_core::tree::{Arena, NodeKind};

    fn dest(arena: &mut Arena) -> NodeId {
        arena.alloc(NodeKind::Destination)
    }

    #[test]
    fn push_pop_algebra() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        let (a, b, c) = (dest(&mut arena), dest(&mut arena), dest(&mut arena));

        stack.push("a", a);
        stack.push("b", b);
        stack.push("c", c);
        assert_eq!(stack.len(), 3);
        assert!(stack.can_go_back());

        assert_eq!(stack.pop().map(|e| e.node), Some(c));
        assert_eq!(stack.pop().map(|e| e.node), Some(b));
        assert_eq!(stack.pop().map(|e| e.node), Some(a));
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.try_pop(), Err(LayoutError::StackUnderflow));
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn duplicate_names_last_pushed_wins() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        let first = dest(&mut arena);
        let second = dest(&mut arena);

        stack.push("detail", first);
        stack.push("home", dest(&mut arena));
        stack.push("detail", second);

        assert_eq!(stack.get("detail"), Some(second));
        assert!(stack.remove_last("detail"));
        assert_eq!(stack.get("detail"), Some(first));
    }

    #[test]
    fn remove_all_and_identity_remove() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        let x = dest(&mut arena);
        let y = dest(&mut arena);

        stack.push("dup", x);
        stack.push("other", dest(&mut arena));
        stack.push("dup", y);
        assert_eq!(stack.remove_all("dup"), 2);
        assert_eq!(stack.len(), 1);

        let z = dest(&mut arena);
        stack.push("p", z);
        assert!(!stack.remove_entry("p", x)); // wrong node identity
        assert!(stack.remove_entry("p", z));
    }

    #[test]
    fn pre_and_pre_top() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        let (a, b, c) = (dest(&mut arena), dest(&mut arena), dest(&mut arena));
        stack.push("a", a);
        stack.push("b", b);
        stack.push("c", c);

        assert_eq!(stack.pre_top().map(|e| e.node), Some(b));
        assert_eq!(stack.pre("b", b).map(|e| e.node), Some(a));
        assert_eq!(stack.pre("a", a), None);
    }

    #[test]
    fn replace_marks_one_shot_flag() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        stack.push("a", dest(&mut arena));
        let b = dest(&mut arena);
        stack.replace("b", b);

        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top().map(|e| e.node), Some(b));
        assert!(stack.consume_replace());
        assert!(!stack.consume_replace()); // reset after consumption
    }

    #[test]
    fn pop_to_predicate() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        for name in ["a", "b", "c", "d"] {
            stack.push(name, dest(&mut arena));
        }
        assert_eq!(stack.pop_to(|e| e.name == "b", false), 2);
        assert_eq!(stack.top().map(|e| e.name.clone()), Some("b".into()));
        assert_eq!(stack.pop_to(|e| e.name == "b", true), 1);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn json_round_trip() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        stack.push("home", dest(&mut arena));
        stack.push("detail", dest(&mut arena));
        let json = stack.to_json();

        let mut restored = NavPathStack::new();
        restored.restore_from_json(&json, |_| Some(dest(&mut arena)));
        let names: Vec<&str> = restored.all_names().collect();
        assert_eq!(names, vec!["home", "detail"]);
    }

    #[test]
    fn route_info_rides_along() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        stack.push_with_route(
            "detail",
            dest(&mut arena),
            Some(RouteInfo {
                name: "detail".into(),
                param: Some("id=42".into()),
            }),
        );
        stack.push("plain", dest(&mut arena));

        assert_eq!(stack.route_info(0).unwrap().param.as_deref(), Some("id=42"));
        assert!(stack.route_info(1).is_none());

        stack.pop();
        stack.pop();
        assert!(stack.route_info(0).is_none());
    }

    #[test]
    fn restartable_name_iteration() {
        let mut arena = Arena::new();
        let mut stack = NavPathStack::new();
        stack.push("a", dest(&mut arena));
        stack.push("b", dest(&mut arena));
        let first: Vec<&str> = stack.all_names().collect();
        let second: Vec<&str> = stack.all_names().collect();
        assert_eq!(first, second);
    }
}
