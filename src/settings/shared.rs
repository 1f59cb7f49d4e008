//! Shared settings.
//!
//! Settings that are relevant for all code generators. ISA-specific setting
//! groups use this group as their parent.

use crate::core::{Catalog, MetaResult};
use crate::settings::SettingGroup;

pub const GROUP_NAME: &str = "shared";

pub fn define(catalog: &mut Catalog) -> MetaResult<SettingGroup> {
    let mut group = catalog.open_settings(GROUP_NAME, None)?;

    group.enum_setting(
        "opt_level",
        "Optimization level:\n\n\
         - default: Very profitable optimizations enabled, none slow.\n\
         - best: Enable all optimizations\n\
         - fastest: Optimize for compile time by disabling most optimizations.",
        &["default", "best", "fastest"],
    )?;
    group.bool_setting("is_64bit", "Enable 64-bit code generation", false)?;
    group.bool_setting(
        "enable_float",
        "Enable the use of floating-point instructions",
        true,
    )?;
    group.bool_setting("enable_simd", "Enable the use of SIMD instructions.", true)?;
    group.bool_setting(
        "enable_atomics",
        "Enable the use of atomic instructions",
        true,
    )?;

    catalog.close_settings(group)
}
