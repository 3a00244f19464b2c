//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements        | Connects to               |
//! |-----------------|-------------------|---------------------------|
//! | `http_registry` | SessionRegistry   | Drinkmon HTTP/JSON API    |
//! | `log_sink`      | EventSink         | Serial log output         |
//! | `nvs`           |:                 | Provisioning record (NVS) |
//! | `time`          | TimePort          | ESP32 system timer        |
//! | `wifi`          |:                 | ESP-IDF WiFi STA          |

pub mod http_registry;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;
