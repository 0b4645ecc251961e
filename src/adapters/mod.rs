//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements        | Connects to              |
//! |-----------------|-------------------|--------------------------|
//! | `hardware`      | SensorPort        | I²C mux + SHT31 nodes    |
//! |                 | ActuatorPort      | SSR GPIO lines           |
//! | `log_sink`      | EventSink         | Serial log output        |
//! |                 | PresentationSink  | Serial log (on change)   |
//! | `settings_file` | SettingsStorePort | Fixed-size record file   |
//! | `time`          | —                 | ESP32 timer + RTC        |

pub mod hardware;
pub mod log_sink;
pub mod settings_file;
pub mod time;
