// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway event payloads.
//!
//! Only the fields the claim path reads are decoded; everything else in a
//! dispatch is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Component type of an action row.
pub const COMPONENT_ACTION_ROW: u8 = 1;
/// Component type of a button.
pub const COMPONENT_BUTTON: u8 = 2;

/// Snowflakes arrive as JSON strings. Bare integers are accepted too.
fn snowflake<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(id) => Ok(id),
        Raw::Text(text) => text
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid snowflake `{text}`"))),
    }
}

fn optional_snowflake<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    struct Id(#[serde(deserialize_with = "snowflake")] u64);

    Ok(Option::<Id>::deserialize(deserializer)?.map(|Id(id)| id))
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,
    #[serde(default)]
    pub username: String,
}

/// `READY` dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    pub session_id: String,
    pub user: User,
}

/// One message component. Action rows nest their children in `components`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub components: Vec<Component>,
}

/// `MESSAGE_CREATE` and `MESSAGE_UPDATE` dispatches.
///
/// Updates may be partial, so everything except the ids is optional.
/// `components` is `None` when the update did not touch them.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,
    #[serde(deserialize_with = "snowflake")]
    pub channel_id: u64,
    #[serde(default, deserialize_with = "optional_snowflake")]
    pub guild_id: Option<u64>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default, deserialize_with = "optional_snowflake")]
    pub application_id: Option<u64>,
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub components: Option<Vec<Component>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn message_decodes_string_snowflakes() {
        let msg: Message = serde_json::from_value(json!({
            "id": "175928847299117063",
            "channel_id": "2",
            "guild_id": "1",
            "author": {"id": "3", "username": "giveaways"},
            "application_id": "4",
            "edited_timestamp": "2024-05-01T12:00:00.250000+00:00",
            "content": "ignored",
            "components": []
        }))
        .unwrap();

        assert_eq!(msg.id, 175_928_847_299_117_063);
        assert_eq!(msg.guild_id, Some(1));
        assert_eq!(msg.author.map(|u| u.id), Some(3));
        assert_eq!(msg.application_id, Some(4));
        assert_eq!(msg.edited_timestamp.unwrap().timestamp_subsec_millis(), 250);
        assert_eq!(msg.components.map(|c| c.len()), Some(0));
    }

    #[test]
    fn partial_update_leaves_optionals_empty() {
        let msg: Message = serde_json::from_value(json!({
            "id": "10",
            "channel_id": "2",
            "guild_id": null,
            "edited_timestamp": null
        }))
        .unwrap();

        assert!(msg.guild_id.is_none());
        assert!(msg.author.is_none());
        assert!(msg.edited_timestamp.is_none());
        assert!(msg.components.is_none());
    }

    #[test]
    fn malformed_snowflake_is_rejected() {
        let result = serde_json::from_value::<Message>(json!({"id": "abc", "channel_id": "2"}));
        assert!(result.is_err());
    }
}
