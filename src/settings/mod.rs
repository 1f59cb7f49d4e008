//! Target settings.
//!
//! - [`group`] - Settings, setting groups and the byte vector layout
//! - [`shared`] - Settings relevant for all targets

pub mod group;
pub mod shared;

pub use group::{BoolSetting, GroupInfo, Setting, SettingGroup, SettingGroupBuilder, SettingKind};
