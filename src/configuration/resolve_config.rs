use anyhow::Result;
use anyhow::bail;
use dprint_core::configuration::ConfigKeyMap;
use dprint_core::configuration::ConfigKeyValue;
use dprint_core::configuration::GlobalConfiguration;
use dprint_core::configuration::NewLineKind;
use dprint_core::configuration::ResolveConfigurationResult;
use dprint_core::configuration::get_nullable_value;
use dprint_core::configuration::get_unknown_property_diagnostics;
use dprint_core::configuration::get_value;

use super::Configuration;
use super::JavaStyle;
use crate::indentation::parse_tab_width;

/// Resolve raw configuration key-value pairs into a typed `Configuration`.
///
/// `tabSize` is accepted as an alias of `tabWidth`. Either one is read as raw
/// text so that a malformed value falls back to the default tab width instead
/// of failing resolution.
pub fn resolve_config(
    config: ConfigKeyMap,
    global_config: &GlobalConfiguration,
) -> ResolveConfigurationResult<Configuration> {
    let mut config = config;
    let mut diagnostics = Vec::new();

    let style: JavaStyle = get_value(&mut config, "style", JavaStyle::Palantir, &mut diagnostics);

    let line_width = get_value(
        &mut config,
        "lineWidth",
        global_config.line_width.unwrap_or(style.line_width()),
        &mut diagnostics,
    );
    let indent_width = get_value(
        &mut config,
        "indentWidth",
        global_config.indent_width.unwrap_or(style.indent_width()),
        &mut diagnostics,
    );
    let use_tabs = get_value(
        &mut config,
        "useTabs",
        global_config.use_tabs.unwrap_or(style.use_tabs()),
        &mut diagnostics,
    );
    let new_line_kind = get_value(
        &mut config,
        "newLineKind",
        global_config.new_line_kind.unwrap_or(NewLineKind::LineFeed),
        &mut diagnostics,
    );
    let tab_size: Option<String> = get_nullable_value(&mut config, "tabSize", &mut diagnostics);
    let tab_width: Option<String> = get_nullable_value(&mut config, "tabWidth", &mut diagnostics);
    let tab_width = tab_width
        .or(tab_size)
        .map_or(4, |raw| parse_tab_width(&raw));
    let format_javadoc = get_value(&mut config, "formatJavadoc", false, &mut diagnostics);

    diagnostics.extend(get_unknown_property_diagnostics(config));

    ResolveConfigurationResult {
        config: Configuration {
            line_width,
            indent_width,
            tab_width,
            use_tabs,
            new_line_kind,
            format_javadoc,
        },
        diagnostics,
    }
}

/// Convert a flat JSON object of options into a `ConfigKeyMap`.
///
/// Used for the per-directory option files of a test corpus. Nested objects,
/// arrays and numbers outside the `i32` range are rejected.
pub fn config_key_map_from_json(value: &serde_json::Value) -> Result<ConfigKeyMap> {
    let Some(object) = value.as_object() else {
        bail!("expected a JSON object of options, found {}", value);
    };

    let mut map = ConfigKeyMap::new();
    for (key, value) in object {
        let value = match value {
            serde_json::Value::String(s) => ConfigKeyValue::from_str(s),
            serde_json::Value::Bool(b) => ConfigKeyValue::from_bool(*b),
            serde_json::Value::Number(n) => match n.as_i64().and_then(|n| i32::try_from(n).ok()) {
                Some(n) => ConfigKeyValue::from_i32(n),
                None => bail!("option '{}' has an unsupported number: {}", key, n),
            },
            other => bail!("option '{}' has an unsupported value: {}", key, other),
        };
        map.insert(key.clone(), value);
    }
    Ok(map)
}
