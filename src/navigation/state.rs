//! Active item and accordion state.

use super::menu::MenuItem;

/// Result of matching the current route against the menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveLocation {
    pub active_key: Option<String>,
    /// Parent group of the active item, when the active item is a child.
    pub expanded_key: Option<String>,
}

/// Find the item whose path equals `current_path` exactly.
///
/// Top-level items are searched first, then one level of children; the
/// first match in declaration order wins.
pub fn locate_active(tree: &[MenuItem], current_path: &str) -> ActiveLocation {
    if let Some(item) = tree.iter().find(|item| item.path == current_path) {
        return ActiveLocation {
            active_key: Some(item.key.clone()),
            expanded_key: None,
        };
    }

    for parent in tree {
        let Some(children) = parent.children.as_deref() else {
            continue;
        };
        if let Some(child) = children.iter().find(|c| c.path == current_path) {
            return ActiveLocation {
                active_key: Some(child.key.clone()),
                expanded_key: Some(parent.key.clone()),
            };
        }
    }

    ActiveLocation::default()
}

/// Accordion toggle: clicking the open group closes it, clicking any other
/// group opens it and closes the previous one.
pub fn toggle_expand(expanded: Option<&str>, key: &str) -> Option<String> {
    if expanded == Some(key) {
        None
    } else {
        Some(key.to_string())
    }
}

/// Issues route changes on behalf of the sidebar.
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// Current viewport width and the breakpoint below which it counts as narrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width_px: u32,
    pub narrow_below_px: u32,
}

impl Viewport {
    pub fn new(width_px: u32, narrow_below_px: u32) -> Self {
        Self {
            width_px,
            narrow_below_px,
        }
    }

    pub fn is_narrow(&self) -> bool {
        self.width_px < self.narrow_below_px
    }
}

/// Sidebar interaction state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    active: Option<String>,
    expanded: Option<String>,
    sidebar_collapsed: bool,
}

impl MenuState {
    /// Everything collapsed except the group holding the initially active
    /// path.
    pub fn initial(tree: &[MenuItem], current_path: &str) -> Self {
        let location = locate_active(tree, current_path);
        Self {
            active: location.active_key,
            expanded: location.expanded_key,
            sidebar_collapsed: false,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.as_deref() == Some(key)
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn toggle(&mut self, key: &str) {
        self.expanded = toggle_expand(self.expanded.as_deref(), key);
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    /// Re-match after a route change. The open group follows the active
    /// child; a top-level match leaves the accordion as it is.
    pub fn sync_route(&mut self, tree: &[MenuItem], current_path: &str) {
        let location = locate_active(tree, current_path);
        self.active = location.active_key;
        if location.expanded_key.is_some() {
            self.expanded = location.expanded_key;
        }
    }

    /// Navigate to a leaf; on narrow viewports the sidebar collapses
    /// afterwards.
    pub fn select_leaf<N: Navigator + ?Sized>(
        &mut self,
        item: &MenuItem,
        viewport: Viewport,
        navigator: &mut N,
    ) {
        navigator.navigate(&item.path);
        if viewport.is_narrow() {
            self.sidebar_collapsed = true;
        }
    }

    /// Plain-text rendering: `>` marks the active item, `-`/`+` open and
    /// closed groups. Children of closed groups are not shown.
    pub fn render(&self, tree: &[MenuItem]) -> String {
        let mut out = String::new();
        for item in tree {
            let marker = match (item.is_group(), self.is_expanded(&item.key)) {
                (true, true) => '-',
                (true, false) => '+',
                (false, _) => ' ',
            };
            self.render_line(&mut out, item, marker, 0);
            if let (Some(children), true) = (&item.children, self.is_expanded(&item.key)) {
                for child in children {
                    self.render_line(&mut out, child, ' ', 1);
                }
            }
        }
        out
    }

    fn render_line(&self, out: &mut String, item: &MenuItem, marker: char, depth: usize) {
        let active = if self.active() == Some(item.key.as_str()) {
            '>'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{}{}{} {:<24} {}\n",
            active,
            "    ".repeat(depth),
            marker,
            item.label,
            item.path
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str, path: &str) -> MenuItem {
        MenuItem {
            key: key.into(),
            label: key.to_uppercase(),
            path: path.into(),
            children: None,
        }
    }

    fn group(key: &str, path: &str, children: Vec<MenuItem>) -> MenuItem {
        MenuItem {
            key: key.into(),
            label: key.to_uppercase(),
            path: path.into(),
            children: Some(children),
        }
    }

    fn tree() -> Vec<MenuItem> {
        vec![
            item("home", "/dashboard"),
            group(
                "services",
                "/dashboard/services",
                vec![
                    item("service-list", "/dashboard/services/list"),
                    item("service-categories", "/dashboard/services/categories"),
                ],
            ),
            group(
                "sms",
                "/dashboard/sms",
                vec![item("sms-send", "/dashboard/sms/send")],
            ),
        ]
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl Navigator for Recorder {
        fn navigate(&mut self, path: &str) {
            self.0.push(path.to_string());
        }
    }

    #[test]
    fn top_level_match_expands_nothing() {
        let loc = locate_active(&tree(), "/dashboard");
        assert_eq!(loc.active_key.as_deref(), Some("home"));
        assert_eq!(loc.expanded_key, None);
    }

    #[test]
    fn child_match_expands_parent() {
        let loc = locate_active(&tree(), "/dashboard/services/categories");
        assert_eq!(loc.active_key.as_deref(), Some("service-categories"));
        assert_eq!(loc.expanded_key.as_deref(), Some("services"));
    }

    #[test]
    fn no_prefix_matching() {
        let loc = locate_active(&tree(), "/dashboard/services/list/42");
        assert_eq!(loc, ActiveLocation::default());
    }

    #[test]
    fn top_level_wins_over_child_with_same_path() {
        let tree = vec![
            group("g", "/g", vec![item("dup-child", "/same")]),
            item("dup-top", "/same"),
        ];
        let loc = locate_active(&tree, "/same");
        assert_eq!(loc.active_key.as_deref(), Some("dup-top"));
        assert_eq!(loc.expanded_key, None);
    }

    #[test]
    fn toggle_is_an_accordion() {
        assert_eq!(toggle_expand(None, "a").as_deref(), Some("a"));
        assert_eq!(toggle_expand(Some("a"), "a"), None);
        assert_eq!(toggle_expand(Some("a"), "b").as_deref(), Some("b"));

        let mut state = MenuState::default();
        state.toggle("services");
        state.toggle("services");
        assert_eq!(state.expanded(), None);
        state.toggle("services");
        state.toggle("sms");
        assert!(state.is_expanded("sms"));
        assert!(!state.is_expanded("services"));
    }

    #[test]
    fn initial_state_opens_group_of_active_path() {
        let state = MenuState::initial(&tree(), "/dashboard/sms/send");
        assert_eq!(state.active(), Some("sms-send"));
        assert_eq!(state.expanded(), Some("sms"));
        assert!(!state.sidebar_collapsed());
    }

    #[test]
    fn sync_route_moves_accordion_with_child() {
        let tree = tree();
        let mut state = MenuState::initial(&tree, "/dashboard/sms/send");
        state.sync_route(&tree, "/dashboard/services/list");
        assert_eq!(state.active(), Some("service-list"));
        assert_eq!(state.expanded(), Some("services"));

        state.sync_route(&tree, "/dashboard");
        assert_eq!(state.active(), Some("home"));
        assert_eq!(state.expanded(), Some("services"));
    }

    #[test]
    fn select_leaf_navigates_and_collapses_on_narrow() {
        let tree = tree();
        let leaf = MenuItem::find(&tree, "sms-send").unwrap();
        let mut nav = Recorder::default();

        let mut state = MenuState::default();
        state.select_leaf(leaf, Viewport::new(1280, 768), &mut nav);
        assert!(!state.sidebar_collapsed());

        state.select_leaf(leaf, Viewport::new(400, 768), &mut nav);
        assert!(state.sidebar_collapsed());
        assert_eq!(nav.0, vec!["/dashboard/sms/send", "/dashboard/sms/send"]);
    }

    #[test]
    fn render_marks_active_and_open_group() {
        let tree = tree();
        let state = MenuState::initial(&tree, "/dashboard/services/list");
        let text = state.render(&tree);
        assert!(text.contains("- SERVICES"));
        assert!(text.contains("+ SMS"));
        assert!(text
            .lines()
            .any(|l| l.starts_with('>') && l.contains("SERVICE-LIST")));
        assert!(!text.contains("SMS-SEND"));
    }
}
