//! The BeeConnect dashboard sidebar.

use super::menu::{MenuDefinition, MenuNode};
use crate::error::NavigationError;
use beeconnect_policy::Capability;
use beeconnect_types::{OrgTypeId, RoleId};

/// Policy keys referenced by the sidebar.
pub mod keys {
    pub const VIEW_PARTNERS: &str = "view-partners";
    pub const MANAGE_PARTNERS: &str = "manage-partners";
    pub const VIEW_APPLICANTS: &str = "view-applicants";
    pub const MANAGE_APPLICANTS: &str = "manage-applicants";
    pub const VIEW_SERVICES: &str = "view-services";
    pub const MANAGE_SERVICES: &str = "manage-services";
    pub const MANAGE_SERVICE_CATEGORIES: &str = "manage-service-categories";
    pub const VIEW_ENTERPRISES: &str = "view-enterprises";
    pub const MANAGE_ENTERPRISES: &str = "manage-enterprises";
    pub const SEND_SMS: &str = "send-sms";
    pub const VIEW_SMS: &str = "view-sms";
    pub const MANAGE_USERS: &str = "manage-users";
    pub const MANAGE_PERMISSIONS: &str = "manage-permissions";
    pub const VIEW_REPORTS: &str = "view-reports";
}

pub const DASHBOARD_PATH: &str = "/dashboard";

pub fn sidebar() -> Result<MenuDefinition, NavigationError> {
    use keys::*;

    MenuDefinition::new(vec![
        MenuNode::leaf("dashboard", "Dashboard", DASHBOARD_PATH),
        MenuNode::leaf("partners", "Partners", "/dashboard/partners").requires(
            Capability::any_of([VIEW_PARTNERS, MANAGE_PARTNERS])
                .with_org_types([OrgTypeId::PROGRAM]),
        ),
        MenuNode::leaf("applicants", "Applicants", "/dashboard/applicants")
            .requires(Capability::any_of([VIEW_APPLICANTS, MANAGE_APPLICANTS])),
        MenuNode::group(
            "services",
            "Services",
            "/dashboard/services",
            vec![
                MenuNode::leaf("service-list", "All services", "/dashboard/services/list")
                    .requires(Capability::any_of([VIEW_SERVICES, MANAGE_SERVICES])),
                MenuNode::leaf(
                    "service-categories",
                    "Categories",
                    "/dashboard/services/categories",
                )
                .requires(Capability::any_of([MANAGE_SERVICE_CATEGORIES])),
            ],
        )
        .requires(Capability::any_of([
            VIEW_SERVICES,
            MANAGE_SERVICES,
            MANAGE_SERVICE_CATEGORIES,
        ])),
        MenuNode::leaf("enterprises", "Enterprises", "/dashboard/enterprises")
            .requires(Capability::any_of([VIEW_ENTERPRISES, MANAGE_ENTERPRISES])),
        MenuNode::group(
            "sms",
            "SMS",
            "/dashboard/sms",
            vec![
                MenuNode::leaf("sms-send", "Send SMS", "/dashboard/sms/send")
                    .requires(Capability::any_of([SEND_SMS])),
                MenuNode::leaf("sms-history", "History", "/dashboard/sms/history")
                    .requires(Capability::any_of([VIEW_SMS, SEND_SMS])),
            ],
        )
        .requires(Capability::any_of([SEND_SMS, VIEW_SMS])),
        MenuNode::group(
            "administration",
            "Administration",
            "/dashboard/administration",
            vec![
                MenuNode::leaf("users", "Users", "/dashboard/users")
                    .requires(Capability::any_of([MANAGE_USERS])),
                MenuNode::leaf("permissions", "Permissions", "/dashboard/permissions").requires(
                    Capability::any_of([MANAGE_PERMISSIONS])
                        .with_roles([RoleId::ADMIN])
                        .with_org_types([OrgTypeId::PROGRAM]),
                ),
            ],
        )
        .requires(Capability::any_of([MANAGE_USERS, MANAGE_PERMISSIONS])),
        MenuNode::leaf("reports", "Reports", "/dashboard/reports")
            .requires(Capability::any_of([VIEW_REPORTS])),
    ])
}
