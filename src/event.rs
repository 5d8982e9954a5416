use crate::PageKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An accepted edit with timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl FunnelEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// Create a new event with a specific timestamp
    pub fn with_timestamp(timestamp: DateTime<Utc>, event: EventType) -> Self {
        Self { timestamp, event }
    }
}

/// Every kind of change the mutation engine can make to a funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    ComponentAdded {
        page_id: String,
        component_id: String,
        component_type: String,
        index: usize,
    },

    ComponentDataChanged {
        page_id: String,
        component_id: String,
        fields: Vec<String>,
    },

    ComponentStyleChanged {
        page_id: String,
        component_id: String,
        properties: Vec<String>,
    },

    ComponentDeleted {
        page_id: String,
        component_id: String,
        index: usize,
    },

    ComponentDuplicated {
        page_id: String,
        source_id: String,
        component_id: String,
        index: usize,
    },

    /// `to` is the final index after the move
    ComponentMoved {
        page_id: String,
        component_id: String,
        from: usize,
        to: usize,
    },

    PageAdded {
        page_id: String,
        kind: PageKind,
        index: usize,
    },

    PageDuplicated {
        source_id: String,
        page_id: String,
        index: usize,
    },

    PageDeleted {
        page_id: String,
        index: usize,
    },

    PageUpdated {
        page_id: String,
    },

    PagesReordered {
        page_id: String,
        from: usize,
        to: usize,
    },

    FunnelRenamed {
        name: String,
    },
}

impl EventType {
    /// Component created by this edit, which becomes the new selection
    pub fn created_component(&self) -> Option<&str> {
        match self {
            Self::ComponentAdded { component_id, .. }
            | Self::ComponentDuplicated { component_id, .. } => Some(component_id),
            _ => None,
        }
    }

    /// Page created by this edit
    pub fn created_page(&self) -> Option<&str> {
        match self {
            Self::PageAdded { page_id, .. } | Self::PageDuplicated { page_id, .. } => Some(page_id),
            _ => None,
        }
    }

    /// Short label for undo/redo menus
    pub fn describe(&self) -> String {
        match self {
            Self::ComponentAdded { component_type, .. } => format!("Add {}", component_type),
            Self::ComponentDataChanged { .. } => "Edit content".to_string(),
            Self::ComponentStyleChanged { .. } => "Edit style".to_string(),
            Self::ComponentDeleted { .. } => "Delete component".to_string(),
            Self::ComponentDuplicated { .. } => "Duplicate component".to_string(),
            Self::ComponentMoved { .. } => "Move component".to_string(),
            Self::PageAdded { .. } => "Add page".to_string(),
            Self::PageDuplicated { .. } => "Duplicate page".to_string(),
            Self::PageDeleted { .. } => "Delete page".to_string(),
            Self::PageUpdated { .. } => "Edit page".to_string(),
            Self::PagesReordered { .. } => "Reorder pages".to_string(),
            Self::FunnelRenamed { .. } => "Rename funnel".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = FunnelEvent::new(EventType::PageAdded {
            page_id: "page-1".to_string(),
            kind: PageKind::Question,
            index: 1,
        });

        assert!(event.timestamp <= Utc::now());
        assert_eq!(event.event.created_page(), Some("page-1"));
        assert_eq!(event.event.created_component(), None);
    }

    #[test]
    fn test_describe() {
        let added = EventType::ComponentAdded {
            page_id: "page-1".to_string(),
            component_id: "button-1".to_string(),
            component_type: "button".to_string(),
            index: 0,
        };

        assert_eq!(added.describe(), "Add button");
        assert_eq!(added.created_component(), Some("button-1"));
    }

    #[test]
    fn test_event_serialization() {
        let event = FunnelEvent::new(EventType::ComponentMoved {
            page_id: "page-1".to_string(),
            component_id: "text-1".to_string(),
            from: 0,
            to: 2,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: FunnelEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.event, event.event);
    }
}
