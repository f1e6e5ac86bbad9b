//! Object resolution: from object map entries to live widgets.
//!
//! # Matching rules
//!
//! - A widget matches when every constrained attribute equals the widget's
//!   property. `visible` is compared against *effective* visibility (the
//!   widget and all its ancestors).
//! - A `container` restricts candidates to descendants of the widget the
//!   container entry resolves to (recursively).
//! - Candidates are ordered depth-first. With `occurrence = n` the n-th
//!   candidate is chosen; without it, more than one candidate is an
//!   [`GroundcheckError::AmbiguousMatch`].
//!
//! Lookups that find nothing are retried until the wait timeout; ambiguity
//! is a defect of the object map and fails at once.

use serde::Serialize;
use tracing::debug;

use crate::app::Application;
use crate::object_map::{AttrValue, ObjectMap, ObjectMapEntry, KNOWN_ATTRIBUTES};
use crate::result::{GroundcheckError, GroundcheckResult};
use crate::wait::{poll_until, Probe, WaitOptions};
use crate::widget::{Widget, WidgetId, WidgetTree};

/// A resolved widget, captured from one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetHandle {
    /// Symbolic name it was resolved from
    pub name: String,
    /// Widget index in the snapshot
    pub id: WidgetId,
    /// Widget state at resolution time
    pub widget: Widget,
    /// Effective visibility at resolution time
    pub visible: bool,
}

impl WidgetHandle {
    fn capture(name: &str, tree: &WidgetTree, id: WidgetId) -> GroundcheckResult<Self> {
        Ok(Self {
            name: name.to_string(),
            id,
            widget: tree.widget(id)?.clone(),
            visible: tree.is_visible(id),
        })
    }

    /// Whether the widget can receive input
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.visible && self.widget.enabled
    }

    /// Read a property for assertions.
    ///
    /// Known but unset string properties read as an empty string.
    pub fn property(&self, property: &str) -> GroundcheckResult<AttrValue> {
        if property == "visible" {
            return Ok(AttrValue::Bool(self.visible));
        }
        if !KNOWN_ATTRIBUTES.contains(&property) {
            return Err(GroundcheckError::UnsupportedProperty(property.to_string()));
        }
        Ok(self
            .widget
            .property(property)
            .unwrap_or_else(|| AttrValue::Str(String::new())))
    }
}

fn attributes_match(entry: &ObjectMapEntry, tree: &WidgetTree, id: WidgetId, widget: &Widget) -> bool {
    entry.attributes.iter().all(|(key, expected)| match key.as_str() {
        "visible" => entry.visible() == Some(tree.is_visible(id)),
        _ => widget.property(key).is_some_and(|actual| expected.matches(&actual)),
    })
}

/// Resolve an entry against one snapshot without waiting
pub fn match_entry(map: &ObjectMap, name: &str, tree: &WidgetTree) -> GroundcheckResult<WidgetId> {
    let entry = map.entry(name)?;
    let scope = match &entry.container {
        Some(container) => Some(match_entry(map, container, tree).map_err(|e| match e {
            GroundcheckError::ObjectNotFound { detail, .. } => GroundcheckError::ObjectNotFound {
                name: name.to_string(),
                detail: format!("container '{container}' not found: {detail}"),
            },
            GroundcheckError::AmbiguousMatch { count, .. } => GroundcheckError::AmbiguousMatch {
                name: name.to_string(),
                count,
            },
            other => other,
        })?),
        None => None,
    };

    let candidates: Vec<WidgetId> = tree
        .iter()
        .filter(|(id, _)| scope.map_or(true, |c| tree.is_descendant_of(*id, c)))
        .filter(|(id, widget)| attributes_match(entry, tree, *id, widget))
        .map(|(id, _)| id)
        .collect();

    match (entry.occurrence, candidates.as_slice()) {
        (_, []) => Err(GroundcheckError::ObjectNotFound {
            name: name.to_string(),
            detail: format!("no widget with {entry}"),
        }),
        (None, [only]) => Ok(*only),
        (None, many) => Err(GroundcheckError::AmbiguousMatch {
            name: name.to_string(),
            count: many.len(),
        }),
        (Some(n), found) => (n as usize).checked_sub(1).and_then(|i| found.get(i)).copied().ok_or_else(|| {
            GroundcheckError::ObjectNotFound {
                name: name.to_string(),
                detail: format!("occurrence {n} requested but only {} match", found.len()),
            }
        }),
    }
}

/// Outcome of checking one entry against a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryCheck {
    /// Exactly one widget matches
    Unique {
        /// Matched widget
        widget: WidgetId,
    },
    /// No widget matches right now
    Absent {
        /// Why nothing matched
        detail: String,
    },
    /// Several widgets match and no occurrence is given
    Ambiguous {
        /// Number of matches
        count: usize,
    },
}

/// Resolves symbolic names through an object map with auto-waiting
#[derive(Debug, Clone)]
pub struct Resolver<'m> {
    map: &'m ObjectMap,
    options: WaitOptions,
}

impl<'m> Resolver<'m> {
    /// Create a resolver with default wait options
    #[must_use]
    pub fn new(map: &'m ObjectMap) -> Self {
        Self {
            map,
            options: WaitOptions::default(),
        }
    }

    /// Use custom wait options
    #[must_use]
    pub const fn with_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// The object map
    #[must_use]
    pub const fn map(&self) -> &'m ObjectMap {
        self.map
    }

    /// Wait options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Single lookup against the current snapshot
    pub fn find_object<A: Application + ?Sized>(
        &self,
        app: &A,
        name: &str,
    ) -> GroundcheckResult<WidgetHandle> {
        let tree = app.snapshot();
        let id = match_entry(self.map, name, &tree)?;
        WidgetHandle::capture(name, &tree, id)
    }

    /// Wait until `name` resolves to exactly one widget
    pub fn wait_for_object_exists<A: Application + ?Sized>(
        &self,
        app: &mut A,
        name: &str,
    ) -> GroundcheckResult<WidgetHandle> {
        let _ = self.map.entry(name)?;
        let handle = poll_until(app, &self.options, &format!("object '{name}'"), |a| {
            match self.find_object(a, name) {
                Ok(handle) => Ok(Probe::Ready(handle)),
                Err(e) if e.is_retryable() => Ok(Probe::Pending(e.to_string())),
                Err(e) => Err(e),
            }
        })?;
        debug!(object = name, widget = %handle.id, "object exists");
        Ok(handle)
    }

    /// Wait until `name` resolves and the widget is visible and enabled
    pub fn wait_for_object<A: Application + ?Sized>(
        &self,
        app: &mut A,
        name: &str,
    ) -> GroundcheckResult<WidgetHandle> {
        let _ = self.map.entry(name)?;
        let handle = poll_until(app, &self.options, &format!("object '{name}' to be ready"), |a| {
            match self.find_object(a, name) {
                Ok(handle) if handle.is_ready() => Ok(Probe::Ready(handle)),
                Ok(handle) => Ok(Probe::Pending(format!(
                    "{} is {}",
                    handle.id,
                    if handle.visible { "disabled" } else { "hidden" }
                ))),
                Err(e) if e.is_retryable() => Ok(Probe::Pending(e.to_string())),
                Err(e) => Err(e),
            }
        })?;
        debug!(object = name, widget = %handle.id, "object ready");
        Ok(handle)
    }

    /// Check every entry against one snapshot
    pub fn check_all(&self, tree: &WidgetTree) -> Vec<(String, EntryCheck)> {
        self.map
            .names()
            .map(|name| {
                let check = match match_entry(self.map, name, tree) {
                    Ok(widget) => EntryCheck::Unique { widget },
                    Err(GroundcheckError::AmbiguousMatch { count, .. }) => {
                        EntryCheck::Ambiguous { count }
                    }
                    Err(e) => EntryCheck::Absent {
                        detail: e.to_string(),
                    },
                };
                (name.to_string(), check)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Window with three buttons; the second is hidden when `hide_second`.
    fn button_tree(hide_second: bool) -> WidgetTree {
        let mut tree = WidgetTree::new();
        let window = tree.push_root(Widget::new("Window").with_title("GCS"));
        for (i, label) in ["TAKE OFF", "LAND", "GO TO"].iter().enumerate() {
            let button = tree.push_child(
                window,
                Widget::new("Rectangle")
                    .with_id("buttonRect")
                    .with_visible(!(hide_second && i == 1))
                    .with_bounds(0, i as i32 * 80, 240, 80),
            );
            let _ = tree.push_child(button, Widget::new("Text").with_text(*label));
        }
        tree
    }

    fn button_map() -> ObjectMap {
        ObjectMap::from_entries(vec![
            ObjectMapEntry::new("window", "Window").with("title", "GCS"),
            ObjectMapEntry::new("button", "Rectangle")
                .in_container("window")
                .with("id", "buttonRect")
                .with("visible", true),
            ObjectMapEntry::new("button_2", "Rectangle")
                .in_container("window")
                .with("id", "buttonRect")
                .with("visible", true)
                .with_occurrence(2),
            ObjectMapEntry::new("button_9", "Rectangle")
                .in_container("window")
                .with("id", "buttonRect")
                .with_occurrence(9),
            ObjectMapEntry::new("land", "Text")
                .in_container("window")
                .with("text", "LAND")
                .with("visible", true),
            ObjectMapEntry::new("orphan", "Text").in_container("missing_window"),
            ObjectMapEntry::new("missing_window", "Window").with("title", "Other"),
        ])
        .unwrap()
    }

    mod match_tests {
        use super::*;

        #[test]
        fn test_ambiguous_without_occurrence() {
            let err = match_entry(&button_map(), "button", &button_tree(false)).unwrap_err();
            assert!(matches!(err, GroundcheckError::AmbiguousMatch { count: 3, .. }));
        }

        #[test]
        fn test_occurrence_is_one_based_depth_first() {
            let tree = button_tree(false);
            let id = match_entry(&button_map(), "button_2", &tree).unwrap();
            // Window, button 1, its label, button 2.
            assert_eq!(id, WidgetId(3));
        }

        #[test]
        fn test_hidden_widgets_do_not_count() {
            let tree = button_tree(true);
            let id = match_entry(&button_map(), "button_2", &tree).unwrap();
            assert_eq!(id, WidgetId(5));
            let err = match_entry(&button_map(), "land", &tree).unwrap_err();
            assert!(matches!(err, GroundcheckError::ObjectNotFound { .. }));
        }

        #[test]
        fn test_occurrence_past_end() {
            let err = match_entry(&button_map(), "button_9", &button_tree(false)).unwrap_err();
            assert!(err.to_string().contains("occurrence 9 requested but only 3 match"));
        }

        #[test]
        fn test_missing_container() {
            let err = match_entry(&button_map(), "orphan", &button_tree(false)).unwrap_err();
            assert!(err.to_string().contains("container 'missing_window' not found"));
        }

        #[test]
        fn test_ambiguous_container_names_the_entry() {
            let map = ObjectMap::from_entries(vec![
                ObjectMapEntry::new("any_button", "Rectangle").with("id", "buttonRect"),
                ObjectMapEntry::new("label", "Text").in_container("any_button"),
            ])
            .unwrap();
            let err = match_entry(&map, "label", &button_tree(false)).unwrap_err();
            assert!(matches!(
                &err,
                GroundcheckError::AmbiguousMatch { name, count: 3 } if name == "label"
            ));
            assert!(!err.is_retryable());
        }

        #[test]
        fn test_numeric_attribute_matches_text() {
            let mut tree = WidgetTree::new();
            let window = tree.push_root(Widget::new("Window").with_title("GCS"));
            let battery = tree.push_child(window, Widget::new("Text").with_text("100"));
            let _ = tree.push_child(window, Widget::new("Text").with_text("42.331400"));
            let map = ObjectMap::from_entries(vec![
                ObjectMapEntry::new("battery", "Text").with("text", 100_i64),
                ObjectMapEntry::new("latitude", "Text").with("text", 42.3314),
            ])
            .unwrap();
            assert_eq!(match_entry(&map, "battery", &tree).unwrap(), battery);
            let id = match_entry(&map, "latitude", &tree).unwrap();
            assert_eq!(tree.get(id).unwrap().text.as_deref(), Some("42.331400"));
        }

        #[test]
        fn test_unique_match() {
            let tree = button_tree(false);
            let id = match_entry(&button_map(), "land", &tree).unwrap();
            assert_eq!(tree.get(id).unwrap().text.as_deref(), Some("LAND"));
        }

        #[test]
        fn test_check_all() {
            let map = button_map();
            let tree = button_tree(false);
            let checks: std::collections::BTreeMap<_, _> =
                Resolver::new(&map).check_all(&tree).into_iter().collect();
            assert_eq!(checks["button"], EntryCheck::Ambiguous { count: 3 });
            assert_eq!(checks["button_2"], EntryCheck::Unique { widget: WidgetId(3) });
            assert!(matches!(checks["orphan"], EntryCheck::Absent { .. }));
        }
    }

    mod handle_tests {
        use super::*;

        #[test]
        fn test_property_reads() {
            let tree = button_tree(false);
            let handle = WidgetHandle::capture("land", &tree, WidgetId(4)).unwrap();
            assert_eq!(handle.property("text").unwrap(), AttrValue::from("LAND"));
            assert_eq!(handle.property("visible").unwrap(), AttrValue::Bool(true));
            assert_eq!(handle.property("color").unwrap(), AttrValue::from(""));
            assert!(matches!(
                handle.property("opacity"),
                Err(GroundcheckError::UnsupportedProperty(_))
            ));
        }

        #[test]
        fn test_hidden_parent_makes_handle_not_ready() {
            let tree = button_tree(true);
            let handle = WidgetHandle::capture("land", &tree, WidgetId(4)).unwrap();
            assert!(!handle.visible);
            assert!(!handle.is_ready());
        }
    }

    proptest! {
        #[test]
        fn prop_occurrence_selects_nth_candidate(count in 1usize..12, pick in 1u32..12) {
            let mut tree = WidgetTree::new();
            let root = tree.push_root(Widget::new("Window"));
            for i in 0..count {
                let _ = tree.push_child(root, Widget::new("DataLabel").with_text(i.to_string()));
            }
            let map = ObjectMap::from_entries(vec![
                ObjectMapEntry::new("label", "DataLabel").with_occurrence(pick),
            ]).unwrap();
            match match_entry(&map, "label", &tree) {
                Ok(id) => {
                    prop_assert!((pick as usize) <= count);
                    let expected = (pick - 1).to_string();
                    prop_assert_eq!(tree.get(id).unwrap().text.as_deref(), Some(expected.as_str()));
                }
                Err(e) => {
                    prop_assert!((pick as usize) > count);
                    prop_assert!(e.is_retryable());
                }
            }
        }
    }
}
