//! Command identifiers for keyboard and mouse actions

use serde::{Deserialize, Serialize};

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Detail view document stepping
    pub const NAV_NEXT_ITEM: &'static str = "nav.next_item";
    pub const NAV_PREV_ITEM: &'static str = "nav.prev_item";

    // PDF preview pages
    pub const VIEW_NEXT_PAGE: &'static str = "view.next_page";
    pub const VIEW_PREV_PAGE: &'static str = "view.prev_page";

    // App commands
    pub const APP_UPLOAD: &'static str = "app.upload";
    pub const APP_SEARCH: &'static str = "app.search";
    pub const APP_DASHBOARD: &'static str = "app.dashboard";
    pub const APP_DETAILS: &'static str = "app.details";
    pub const APP_EXIT: &'static str = "app.exit";

    pub const ALL: [&'static str; 9] = [
        Self::NAV_NEXT_ITEM,
        Self::NAV_PREV_ITEM,
        Self::VIEW_NEXT_PAGE,
        Self::VIEW_PREV_PAGE,
        Self::APP_UPLOAD,
        Self::APP_SEARCH,
        Self::APP_DASHBOARD,
        Self::APP_DETAILS,
        Self::APP_EXIT,
    ];

    pub fn is_known(&self) -> bool {
        Self::ALL.contains(&self.as_str())
    }
}

/// A resolved user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub id: CommandId,
}

impl Command {
    pub fn new(id: &str) -> Self {
        Self { id: CommandId::new(id) }
    }

    pub fn is(&self, id: &str) -> bool {
        self.id.as_str() == id
    }
}
