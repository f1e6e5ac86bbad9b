//! Live widget tree snapshots.
//!
//! An application exposes its UI as a [`WidgetTree`]: an arena of widgets
//! linked by parent index, stored in depth-first order. The resolver only
//! ever reads snapshots; it never holds on to a widget across polls.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::object_map::AttrValue;
use crate::result::{GroundcheckError, GroundcheckResult};

/// Index of a widget inside one [`WidgetTree`] snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(pub usize);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point in widget-local pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Bounding box of a widget relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// X offset from the parent
    pub x: i32,
    /// Y offset from the parent
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Bounds {
    /// Create new bounds
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a widget-local point lies inside these bounds
    #[must_use]
    pub const fn contains_local(&self, point: Point) -> bool {
        point.x >= 0 && point.y >= 0 && point.x < self.width && point.y < self.height
    }
}

/// One widget in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Widget type name (e.g. `Rectangle`, `Text`, `GeoMap`)
    pub type_name: String,
    /// QML-style `id`
    pub id: Option<String>,
    /// Object name; widgets without one are "unnamed"
    pub object_name: Option<String>,
    /// Displayed text
    pub text: Option<String>,
    /// Window title
    pub title: Option<String>,
    /// Fill colour as `#rrggbb`
    pub color: Option<String>,
    /// Image source path
    pub source: Option<String>,
    /// Own visibility flag (ancestors are not considered)
    pub visible: bool,
    /// Whether the widget accepts input
    pub enabled: bool,
    /// Bounds relative to the parent
    pub bounds: Bounds,
    /// Parent widget
    pub parent: Option<WidgetId>,
}

impl Widget {
    /// Create a visible, enabled widget of the given type
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            object_name: None,
            text: None,
            title: None,
            color: None,
            source: None,
            visible: true,
            enabled: true,
            bounds: Bounds::default(),
            parent: None,
        }
    }

    /// Set the `id`
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the colour
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the image source
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the own visibility flag
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set whether the widget accepts input
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the bounds
    #[must_use]
    pub const fn with_bounds(mut self, x: i32, y: i32, width: i32, height: i32) -> Self {
        self.bounds = Bounds::new(x, y, width, height);
        self
    }

    /// Read a property by its object map attribute name.
    ///
    /// `visible` here is the widget's own flag; effective visibility lives on
    /// [`WidgetTree::is_visible`].
    #[must_use]
    pub fn property(&self, name: &str) -> Option<AttrValue> {
        let text = |v: &Option<String>| v.as_ref().map(|s| AttrValue::Str(s.clone()));
        match name {
            "type" => Some(AttrValue::Str(self.type_name.clone())),
            "id" => text(&self.id),
            "objectName" => text(&self.object_name),
            "text" => text(&self.text),
            "title" => text(&self.title),
            "color" => text(&self.color),
            "source" => text(&self.source),
            "unnamed" => Some(AttrValue::Int(i64::from(self.object_name.is_none()))),
            "visible" => Some(AttrValue::Bool(self.visible)),
            "enabled" => Some(AttrValue::Bool(self.enabled)),
            _ => None,
        }
    }
}

/// A snapshot of an application's widget tree.
///
/// Widgets are stored in depth-first order: a parent is always pushed before
/// its children, and siblings in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetTree {
    widgets: Vec<Widget>,
}

impl WidgetTree {
    /// Create an empty tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root widget
    pub fn push_root(&mut self, widget: Widget) -> WidgetId {
        self.insert(None, widget)
    }

    /// Append a child of `parent`.
    ///
    /// Children must be pushed depth-first (a child's whole subtree before
    /// its next sibling) to keep occurrence order stable.
    pub fn push_child(&mut self, parent: WidgetId, widget: Widget) -> WidgetId {
        self.insert(Some(parent), widget)
    }

    fn insert(&mut self, parent: Option<WidgetId>, mut widget: Widget) -> WidgetId {
        widget.parent = parent;
        let id = WidgetId(self.widgets.len());
        self.widgets.push(widget);
        id
    }

    /// Number of widgets
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the tree is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Get a widget
    #[must_use]
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.0)
    }

    /// Get a widget or fail with a descriptive error
    pub fn widget(&self, id: WidgetId) -> GroundcheckResult<&Widget> {
        self.get(id).ok_or_else(|| GroundcheckError::ObjectNotFound {
            name: id.to_string(),
            detail: "widget handle is stale".to_string(),
        })
    }

    /// Iterate over all widgets in depth-first order
    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &Widget)> {
        self.widgets.iter().enumerate().map(|(i, w)| (WidgetId(i), w))
    }

    /// Ancestors of a widget, nearest first
    pub fn ancestors(&self, id: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        std::iter::successors(self.get(id).and_then(|w| w.parent), move |p| {
            self.get(*p).and_then(|w| w.parent)
        })
    }

    /// Check if `id` is a (strict) descendant of `ancestor`
    #[must_use]
    pub fn is_descendant_of(&self, id: WidgetId, ancestor: WidgetId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Effective visibility: the widget and all its ancestors are visible
    #[must_use]
    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.get(id).is_some_and(|w| w.visible)
            && self
                .ancestors(id)
                .all(|a| self.get(a).is_some_and(|w| w.visible))
    }

    /// Depth of a widget (roots are at depth 0)
    #[must_use]
    pub fn depth(&self, id: WidgetId) -> usize {
        self.ancestors(id).count()
    }

    /// Render an indented outline, one widget per line
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for (id, widget) in self.iter() {
            let indent = "  ".repeat(self.depth(id));
            out.push_str(&indent);
            out.push_str(&widget.type_name);
            for key in ["id", "title", "text", "color", "source"] {
                if let Some(AttrValue::Str(value)) = widget.property(key) {
                    out.push_str(&format!(" {key}={value:?}"));
                }
            }
            if !self.is_visible(id) {
                out.push_str(" [hidden]");
            } else if !widget.enabled {
                out.push_str(" [disabled]");
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_tree() -> (WidgetTree, WidgetId, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new();
        let window = tree.push_root(Widget::new("Window").with_title("GCS"));
        let panel = tree.push_child(window, Widget::new("Rectangle").with_visible(false));
        let label = tree.push_child(panel, Widget::new("Text").with_text("→"));
        (tree, window, panel, label)
    }

    mod property_tests {
        use super::*;

        #[test]
        fn test_unnamed_defaults_to_one() {
            let widget = Widget::new("Text");
            assert_eq!(widget.property("unnamed"), Some(AttrValue::Int(1)));
        }

        #[test]
        fn test_named_widget_is_not_unnamed() {
            let mut widget = Widget::new("Text");
            widget.object_name = Some("status".to_string());
            assert_eq!(widget.property("unnamed"), Some(AttrValue::Int(0)));
        }

        #[test]
        fn test_missing_optional_property() {
            let widget = Widget::new("Rectangle");
            assert_eq!(widget.property("text"), None);
            assert_eq!(widget.property("no_such_thing"), None);
        }
    }

    mod tree_tests {
        use super::*;

        #[test]
        fn test_hidden_ancestor_hides_descendants() {
            let (tree, window, panel, label) = sample_tree();
            assert!(tree.is_visible(window));
            assert!(!tree.is_visible(panel));
            assert!(!tree.is_visible(label));
            assert!(tree.get(label).unwrap().visible);
        }

        #[test]
        fn test_descendant_relation() {
            let (tree, window, panel, label) = sample_tree();
            assert!(tree.is_descendant_of(label, window));
            assert!(tree.is_descendant_of(label, panel));
            assert!(!tree.is_descendant_of(window, label));
            assert!(!tree.is_descendant_of(window, window));
        }

        #[test]
        fn test_depth_and_outline() {
            let (tree, _, _, label) = sample_tree();
            assert_eq!(tree.depth(label), 2);
            let outline = tree.outline();
            assert!(outline.starts_with("Window title=\"GCS\""));
            assert!(outline.contains("    Text text=\"→\" [hidden]"));
        }

        #[test]
        fn test_bounds_contains_local() {
            let bounds = Bounds::new(100, 100, 60, 40);
            assert!(bounds.contains_local(Point::new(0, 0)));
            assert!(bounds.contains_local(Point::new(59, 39)));
            assert!(!bounds.contains_local(Point::new(60, 10)));
            assert!(!bounds.contains_local(Point::new(-1, 10)));
        }
    }
}
