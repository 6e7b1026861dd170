//! Menu declarations and capability filtering.

use crate::error::NavigationError;
use beeconnect_policy::{Capability, PolicyError, UserCapabilities};
use serde::Serialize;
use std::collections::HashSet;

/// One node of the static menu declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub key: String,
    pub label: String,
    pub path: String,
    pub capability: Capability,
    pub children: Option<Vec<MenuNode>>,
}

impl MenuNode {
    /// A leaf visible to everyone.
    pub fn leaf(key: impl Into<String>, label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            path: path.into(),
            capability: Capability::unrestricted(),
            children: None,
        }
    }

    /// A group; its own path is what the group header links to.
    pub fn group(
        key: impl Into<String>,
        label: impl Into<String>,
        path: impl Into<String>,
        children: Vec<MenuNode>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            path: path.into(),
            capability: Capability::unrestricted(),
            children: Some(children),
        }
    }

    pub fn requires(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }
}

/// Validated menu declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDefinition {
    nodes: Vec<MenuNode>,
}

impl MenuDefinition {
    /// Rejects empty or duplicate keys anywhere in the tree.
    pub fn new(nodes: Vec<MenuNode>) -> Result<Self, NavigationError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&MenuNode> = nodes.iter().collect();
        while let Some(node) = stack.pop() {
            if node.key.is_empty() {
                return Err(NavigationError::EmptyKey {
                    label: node.label.clone(),
                });
            }
            if !seen.insert(node.key.as_str()) {
                return Err(NavigationError::DuplicateKey {
                    key: node.key.clone(),
                });
            }
            if let Some(children) = &node.children {
                stack.extend(children.iter());
            }
        }
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }
}

/// A node that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuItem>>,
}

impl MenuItem {
    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }

    /// Depth-first search by key.
    pub fn find<'a>(items: &'a [MenuItem], key: &str) -> Option<&'a MenuItem> {
        items.iter().find_map(|item| {
            if item.key == key {
                Some(item)
            } else {
                item.children
                    .as_deref()
                    .and_then(|children| Self::find(children, key))
            }
        })
    }
}

/// Walk the declaration depth-first, dropping every node (and its subtree)
/// whose capability the check rejects. A check that errors rejects.
pub fn build<F>(definition: &MenuDefinition, check: F) -> Vec<MenuItem>
where
    F: Fn(&Capability) -> Result<bool, PolicyError>,
{
    filter_nodes(definition.nodes(), &check)
}

/// [`build`] with the standard evaluation against a user.
pub fn build_for_user(definition: &MenuDefinition, user: &UserCapabilities) -> Vec<MenuItem> {
    build(definition, |capability| Ok(capability.allows(user)))
}

fn filter_nodes<F>(nodes: &[MenuNode], check: &F) -> Vec<MenuItem>
where
    F: Fn(&Capability) -> Result<bool, PolicyError>,
{
    nodes
        .iter()
        .filter(|node| visible(node, check))
        .map(|node| MenuItem {
            key: node.key.clone(),
            label: node.label.clone(),
            path: node.path.clone(),
            children: node
                .children
                .as_deref()
                .map(|children| filter_nodes(children, check)),
        })
        .collect()
}

fn visible<F>(node: &MenuNode, check: &F) -> bool
where
    F: Fn(&Capability) -> Result<bool, PolicyError>,
{
    match check(&node.capability) {
        Ok(allowed) => allowed,
        Err(e) => {
            tracing::warn!(key = %node.key, error = %e, "capability check failed; hiding menu item");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beeconnect_types::RoleId;

    fn definition() -> MenuDefinition {
        MenuDefinition::new(vec![
            MenuNode::leaf("home", "Home", "/dashboard"),
            MenuNode::group(
                "admin",
                "Admin",
                "/dashboard/admin",
                vec![
                    MenuNode::leaf("users", "Users", "/dashboard/users")
                        .requires(Capability::any_of(["manage-users"])),
                    MenuNode::leaf("roles", "Roles", "/dashboard/roles"),
                ],
            )
            .requires(Capability::unrestricted().with_roles([RoleId::ADMIN])),
            MenuNode::leaf("sms", "SMS", "/dashboard/sms")
                .requires(Capability::any_of(["send-sms"])),
        ])
        .unwrap()
    }

    fn keys(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|i| i.key.as_str()).collect()
    }

    #[test]
    fn failed_parent_drops_subtree() {
        let user = UserCapabilities::new(["manage-users", "send-sms"]).with_role(RoleId::OFFICER);
        let tree = build_for_user(&definition(), &user);
        assert_eq!(keys(&tree), vec!["home", "sms"]);
        assert!(MenuItem::find(&tree, "users").is_none());
    }

    #[test]
    fn children_filtered_in_declaration_order() {
        let user = UserCapabilities::new(Vec::<String>::new()).with_role(RoleId::ADMIN);
        let tree = build_for_user(&definition(), &user);
        assert_eq!(keys(&tree), vec!["home", "admin"]);
        let admin = MenuItem::find(&tree, "admin").unwrap();
        assert_eq!(keys(admin.children.as_deref().unwrap()), vec!["roles"]);
    }

    #[test]
    fn erroring_check_fails_closed() {
        let tree = build(&definition(), |cap| {
            if cap.is_unrestricted() {
                Ok(true)
            } else {
                Err(PolicyError::CheckFailed("policies not loaded".into()))
            }
        });
        assert_eq!(keys(&tree), vec!["home"]);
    }

    #[test]
    fn group_with_all_children_hidden_stays_as_empty_group() {
        let def = MenuDefinition::new(vec![MenuNode::group(
            "g",
            "Group",
            "/g",
            vec![MenuNode::leaf("c", "Child", "/g/c").requires(Capability::any_of(["x"]))],
        )])
        .unwrap();
        let tree = build_for_user(&def, &UserCapabilities::anonymous());
        assert_eq!(tree[0].children, Some(vec![]));
    }

    #[test]
    fn duplicate_keys_rejected() {
        let err = MenuDefinition::new(vec![
            MenuNode::leaf("a", "A", "/a"),
            MenuNode::group("g", "G", "/g", vec![MenuNode::leaf("a", "A again", "/g/a")]),
        ])
        .unwrap_err();
        assert_eq!(err, NavigationError::DuplicateKey { key: "a".into() });
    }

    #[test]
    fn empty_key_rejected() {
        let err = MenuDefinition::new(vec![MenuNode::leaf("", "Nameless", "/x")]).unwrap_err();
        assert!(matches!(err, NavigationError::EmptyKey { .. }));
    }

    fn nodes_by_key<'a>(nodes: &'a [MenuNode], out: &mut Vec<&'a MenuNode>) {
        for node in nodes {
            out.push(node);
            if let Some(children) = &node.children {
                nodes_by_key(children, out);
            }
        }
    }

    fn items_by_key<'a>(items: &'a [MenuItem], out: &mut Vec<&'a str>) {
        for item in items {
            out.push(&item.key);
            if let Some(children) = &item.children {
                items_by_key(children, out);
            }
        }
    }

    proptest::proptest! {
        #[test]
        fn every_visible_item_is_allowed(
            policies in proptest::collection::btree_set(
                proptest::sample::select(vec!["manage-users", "send-sms", "other"]),
                0..3,
            ),
            role in proptest::option::of(1i32..4),
        ) {
            let mut user = UserCapabilities::new(policies);
            if let Some(role) = role {
                user = user.with_role(RoleId(role));
            }
            let def = definition();
            let tree = build_for_user(&def, &user);

            let mut declared = Vec::new();
            nodes_by_key(def.nodes(), &mut declared);
            let mut shown = Vec::new();
            items_by_key(&tree, &mut shown);

            for key in shown {
                let node = declared.iter().find(|n| n.key == key).unwrap();
                proptest::prop_assert!(node.capability.allows(&user));
            }
            // Unrestricted top-level entries are always present.
            proptest::prop_assert!(MenuItem::find(&tree, "home").is_some());
        }
    }
}
