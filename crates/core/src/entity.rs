use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DOMAIN: &str = "chinese_poetry";

/// Default refresh interval in hours.
pub const DEFAULT_SCAN_INTERVAL: u32 = 1;

/// Bundled dataset file name, resolved against the install directory.
pub const DATASET_FILE: &str = "古诗词.parquet";

pub const SENSOR_ENTITY_ID: &str = "sensor.chinese_poetry";
pub const SENSOR_NAME: &str = "古诗词";
pub const SENSOR_ICON: &str = "mdi:book-open-page-variant";

pub const BUTTON_ENTITY_ID: &str = "button.chinese_poetry_update";
pub const BUTTON_NAME: &str = "古诗词刷新";
pub const BUTTON_ICON: &str = "mdi:refresh";

// Column names in the dataset file; also used as attribute keys.
pub const ATTR_TITLE: &str = "标题";
pub const ATTR_DYNASTY: &str = "朝代";
pub const ATTR_AUTHOR: &str = "作者";
pub const ATTR_CONTENT1: &str = "正文1";
pub const ATTR_CONTENT2: &str = "正文2";

/// Placeholder for a missing title, dynasty or author.
pub const UNKNOWN: &str = "未知";

/// One poem row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub dynasty: String,
    pub author: String,
    pub content1: String,
    pub content2: String,
}

impl Record {
    /// Build a record from optional cells, filling placeholders for missing ones.
    pub fn from_cells(
        title: Option<&str>,
        dynasty: Option<&str>,
        author: Option<&str>,
        content1: Option<&str>,
        content2: Option<&str>,
    ) -> Self {
        Self {
            title: title.unwrap_or(UNKNOWN).to_string(),
            dynasty: dynasty.unwrap_or(UNKNOWN).to_string(),
            author: author.unwrap_or(UNKNOWN).to_string(),
            content1: content1.unwrap_or_default().to_string(),
            content2: content2.unwrap_or_default().to_string(),
        }
    }

    /// Attributes in column order, keyed by the column names.
    pub fn attributes(&self) -> IndexMap<String, String> {
        let mut attrs = IndexMap::with_capacity(5);
        attrs.insert(ATTR_TITLE.to_string(), self.title.clone());
        attrs.insert(ATTR_DYNASTY.to_string(), self.dynasty.clone());
        attrs.insert(ATTR_AUTHOR.to_string(), self.author.clone());
        attrs.insert(ATTR_CONTENT1.to_string(), self.content1.clone());
        attrs.insert(ATTR_CONTENT2.to_string(), self.content2.clone());
        attrs
    }
}

/// The currently published record plus its timestamp and availability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub current: Option<Record>,
    pub last_updated: Option<DateTime<Utc>>,
    pub available: bool,
}

/// Read model handed to the host's presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorState {
    pub entity_id: String,
    pub name: String,
    pub icon: String,
    /// Title of the current record, `None` before the first successful refresh.
    pub state: Option<String>,
    pub attributes: IndexMap<String, String>,
    pub available: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SensorState {
    pub fn from_selection(selection: &Selection) -> Self {
        Self {
            entity_id: SENSOR_ENTITY_ID.to_string(),
            name: SENSOR_NAME.to_string(),
            icon: SENSOR_ICON.to_string(),
            state: selection.current.as_ref().map(|r| r.title.clone()),
            attributes: selection
                .current
                .as_ref()
                .map(Record::attributes)
                .unwrap_or_default(),
            available: selection.available,
            last_updated: selection.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cells_get_placeholders() {
        let record = Record::from_cells(Some("静夜思"), None, None, Some("床前明月光"), None);
        assert_eq!(record.title, "静夜思");
        assert_eq!(record.dynasty, UNKNOWN);
        assert_eq!(record.author, UNKNOWN);
        assert_eq!(record.content1, "床前明月光");
        assert_eq!(record.content2, "");
    }

    #[test]
    fn attributes_keep_column_order() {
        let record = Record::from_cells(Some("a"), Some("b"), Some("c"), Some("d"), Some("e"));
        let attrs = record.attributes();
        let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![ATTR_TITLE, ATTR_DYNASTY, ATTR_AUTHOR, ATTR_CONTENT1, ATTR_CONTENT2]);
    }

    #[test]
    fn sensor_state_before_first_refresh() {
        let state = SensorState::from_selection(&Selection::default());
        assert_eq!(state.entity_id, SENSOR_ENTITY_ID);
        assert!(state.state.is_none());
        assert!(state.attributes.is_empty());
        assert!(!state.available);
    }

    #[test]
    fn sensor_state_serializes_attributes_by_column_name() {
        let selection = Selection {
            current: Some(Record::from_cells(
                Some("静夜思"),
                Some("唐"),
                Some("李白"),
                Some("床前明月光"),
                Some("疑是地上霜"),
            )),
            last_updated: None,
            available: true,
        };
        let json = serde_json::to_value(SensorState::from_selection(&selection)).unwrap();
        assert_eq!(json["state"], "静夜思");
        assert_eq!(json["attributes"]["作者"], "李白");
        assert_eq!(json["available"], true);
    }
}
