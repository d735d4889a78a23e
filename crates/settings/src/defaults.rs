//! The built-in message-type table used before any `"udc"` update has
//! arrived, and as a fallback for tags the subscription never covers.

use collector_model::MessageTypeConfig;
use maplit::hashset;

use crate::subscriber::MessageTypeTable;

/// Builds the default message-type table, covering the tags named
/// throughout the end-to-end scenarios this collector is tested against.
pub fn default_message_types() -> MessageTypeTable {
    let table = MessageTypeTable::new();

    table.set("APPTRACK_SESSION_VOL_UPDATE".to_string(), MessageTypeConfig {
        process_and_summarize: true,
        int_fields: hashset! {
            "total-bytes".to_string(),
            "bytes-from-client".to_string(),
            "bytes-from-server".to_string(),
            "packets-from-client".to_string(),
            "packets-from-server".to_string(),
            "session-id-32".to_string(),
        },
        tagged_fields: hashset! {
            "routing-instance".to_string(),
            "source-zone-name".to_string(),
        },
        ..MessageTypeConfig::disabled("APPTRACK_SESSION_VOL_UPDATE")
    });

    table.set("APPTRACK_SESSION_CLOSE".to_string(), MessageTypeConfig {
        process_and_store: true,
        process_and_summarize: true,
        int_fields: hashset! {
            "total-bytes".to_string(),
            "bytes-from-client".to_string(),
            "bytes-from-server".to_string(),
            "packets-from-client".to_string(),
            "packets-from-server".to_string(),
            "session-id-32".to_string(),
        },
        tagged_fields: hashset! {
            "routing-instance".to_string(),
            "source-zone-name".to_string(),
        },
        ..MessageTypeConfig::disabled("APPTRACK_SESSION_CLOSE")
    });

    table.set("VncApiConfigLog".to_string(), MessageTypeConfig {
        process_and_store: true,
        ..MessageTypeConfig::disabled("VncApiConfigLog")
    });

    table.set("FLOW".to_string(), MessageTypeConfig {
        process_and_store: false,
        process_and_summarize: false,
        forward: true,
        ..MessageTypeConfig::disabled("FLOW")
    });

    table
}
