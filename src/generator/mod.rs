//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Rendering of parsed definitions into a formatted Rust source file.

/// `#[doc]` attribute rendering.
pub mod doc;
/// Enum emission.
pub mod enum_def;
/// Identifier token wrappers.
pub mod names;
/// Struct, getter, action, and update emission.
pub mod struct_def;

pub use self::struct_def::ACTION_POSITIONAL_MAX;

use self::enum_def::EnumDef;
use self::struct_def::StructDef;
use crate::model::Definition;
use crate::Error;
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashMap;
use tracing::warn;

/// Per-file generation settings decided by the orchestrator.
#[derive(Debug, Default, Clone)]
pub struct GenerateOptions {
    /// Original name of the schema's principal definition; that type
    /// gets the `get`/`list` constructors.
    pub main_type: String,
    /// Prefix every emitted type with `SF` (conflicting Swordfish
    /// schema).
    pub prefix_sf: bool,
    /// Explicit type renames, applied before the `SF` prefix.
    pub type_renames: Vec<(String, String)>,
}

/// Render the definitions of one schema into a complete source file.
///
/// When the emitted token stream cannot be re-parsed for formatting the
/// unformatted text is still written, with a warning.
///
/// # Errors
///
/// Currently infallible; the `Result` keeps the signature aligned with
/// the write path.
pub fn generate_file(
    definitions: &[Definition],
    options: &GenerateOptions,
) -> Result<String, Error> {
    let definitions = apply_renames(definitions, options);

    let mut enums: Vec<&Definition> = definitions.iter().filter(|d| d.is_enum).collect();
    enums.sort_by(|a, b| a.name.cmp(&b.name));

    let mut structs: Vec<&Definition> = definitions.iter().filter(|d| !d.is_enum).collect();
    structs.sort_by(|a, b| {
        let a_main = a.original_name == options.main_type;
        let b_main = b.original_name == options.main_type;
        b_main.cmp(&a_main).then_with(|| a.name.cmp(&b.name))
    });

    let mut items = use_block(&structs, &definitions);
    for def in &enums {
        EnumDef {
            definition: def,
            name: &def.name,
        }
        .generate(&mut items);
    }
    for def in &structs {
        StructDef {
            definition: def,
            is_main: def.original_name == options.main_type,
        }
        .generate(&mut items);
    }

    let body = render(items, &options.main_type);
    Ok(format!("{}{}", header(&definitions, options), body))
}

/// Apply explicit renames and the `SF` conflict prefix to every type
/// defined in this file and to local references between them.
fn apply_renames(definitions: &[Definition], options: &GenerateOptions) -> Vec<Definition> {
    let mut renames: HashMap<String, String> = HashMap::new();
    for def in definitions {
        let mut new_name = def.name.clone();
        for (from, to) in &options.type_renames {
            if new_name == *from {
                new_name = to.clone();
            }
        }
        if options.prefix_sf {
            new_name = format!("SF{}", new_name);
        }
        if new_name != def.name {
            renames.insert(def.name.clone(), new_name);
        }
    }
    if renames.is_empty() {
        return definitions.to_vec();
    }

    let rename = |name: &mut String| {
        if let Some(new_name) = renames.get(name.as_str()) {
            *name = new_name.clone();
        }
    };
    let mut definitions = definitions.to_vec();
    for def in &mut definitions {
        rename(&mut def.name);
        for p in &mut def.properties {
            rename(&mut p.type_name);
        }
        for link in &mut def.links {
            rename(&mut link.type_name);
        }
        for action in &mut def.actions {
            rename(&mut action.response_type);
            for p in &mut action.parameters {
                rename(&mut p.type_name);
            }
        }
    }
    definitions
}

fn use_block(structs: &[&Definition], definitions: &[Definition]) -> TokenStream {
    let mut items = TokenStream::new();

    let references_common = definitions.iter().any(|d| {
        d.properties
            .iter()
            .any(|p| p.type_name.starts_with("common::") || p.is_link || p.is_collection)
            || !d.links.is_empty()
            || !d.actions.is_empty()
    });
    if references_common {
        items.extend(quote! { use crate::common; });
    }

    let has_entity = structs.iter().any(|d| d.is_entity);
    if has_entity {
        items.extend(quote! {
            use crate::common::Client;
            use crate::common::Entity;
            use crate::Error;
        });
    }

    items.extend(quote! { use serde::Deserialize; });
    let needs_custom_deserialize = structs
        .iter()
        .any(|d| d.is_entity && (!d.links.is_empty() || !d.actions.is_empty() || d.properties.iter().any(|p| p.is_private)));
    if needs_custom_deserialize {
        items.extend(quote! { use serde::Deserializer; });
    }
    items.extend(quote! { use serde::Serialize; });

    // Link getters and nested types may refer to any generated schema.
    items.extend(quote! {
        #[allow(unused_imports)]
        use crate::schemas::*;
    });
    items
}

/// Format through `prettyplease`; a parse failure downgrades to the
/// unformatted token text.
fn render(items: TokenStream, name: &str) -> String {
    let text = items.to_string();
    match syn::parse_file(&text) {
        Ok(file) => prettyplease::unparse(&file),
        Err(error) => {
            warn!(schema = %name, %error, "generated code failed to re-parse; writing unformatted");
            text
        }
    }
}

fn header(definitions: &[Definition], options: &GenerateOptions) -> String {
    let main = definitions
        .iter()
        .find(|d| d.original_name == options.main_type)
        .or_else(|| definitions.first());

    let mut header = String::from("//\n// SPDX-License-Identifier: BSD-3-Clause\n//\n");
    if let Some(def) = main {
        if !def.schema_id.is_empty() {
            header.push_str(&format!("// Generated from {}\n", def.schema_id));
        }
        if !def.release.is_empty() && !def.title.is_empty() {
            header.push_str(&format!("// Release {}: {}\n", def.release, def.title));
        }
        header.push_str("//\n");
    }
    header.push('\n');
    header
}

#[cfg(test)]
mod test {
    use super::generate_file;
    use super::GenerateOptions;
    use crate::model::Definition;
    use crate::model::EnumValue;
    use crate::model::Link;
    use crate::model::Property;

    fn entity(name: &str) -> Definition {
        Definition {
            name: name.to_string(),
            original_name: name.to_string(),
            is_entity: true,
            schema_id: format!("http://redfish.dmtf.org/schemas/v1/{}.json", name),
            release: "2020.1".to_string(),
            title: format!("#{}.v1_0_0.{}", name, name),
            ..Definition::default()
        }
    }

    #[test]
    fn test_generate_formatted_file() {
        let mut def = entity("Sensor");
        def.properties.push(Property {
            name: "reading".to_string(),
            json_name: "Reading".to_string(),
            type_name: "f64".to_string(),
            is_read_only: true,
            ..Property::default()
        });
        let options = GenerateOptions {
            main_type: "Sensor".to_string(),
            ..GenerateOptions::default()
        };
        let text = generate_file(&[def], &options).unwrap();
        assert!(text.starts_with("//\n// SPDX-License-Identifier: BSD-3-Clause"));
        assert!(text.contains("// Generated from http://redfish.dmtf.org/schemas/v1/Sensor.json"));
        assert!(text.contains("// Release 2020.1: #Sensor.v1_0_0.Sensor"));
        // prettyplease output, not raw token text.
        assert!(text.contains("pub struct Sensor {"));
        assert!(text.contains("pub fn get(client: &Client, uri: &str) -> Result<Self, Error>"));
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let mut def = entity("Sensor");
        def.description = vec!["A sensor reading.".to_string()];
        def.properties.push(Property {
            name: "reading".to_string(),
            json_name: "Reading".to_string(),
            type_name: "f64".to_string(),
            is_read_only: true,
            description: vec!["The current reading.".to_string()],
            ..Property::default()
        });
        let options = GenerateOptions {
            main_type: "Sensor".to_string(),
            ..GenerateOptions::default()
        };
        let text = generate_file(&[def], &options).unwrap();
        // Strip the comment header; the formatter only sees items.
        let body = text.splitn(2, "\n\n").nth(1).unwrap();
        let reparsed = syn::parse_file(body).unwrap();
        assert_eq!(prettyplease::unparse(&reparsed), body);
    }

    #[test]
    fn test_enums_before_structs() {
        let mut def = entity("Outlet");
        def.properties.push(Property {
            name: "state".to_string(),
            json_name: "State".to_string(),
            type_name: "PowerState".to_string(),
            is_read_only: true,
            ..Property::default()
        });
        let power_state = Definition {
            name: "PowerState".to_string(),
            original_name: "PowerState".to_string(),
            is_enum: true,
            enum_values: vec![EnumValue {
                name: "On".to_string(),
                value: "On".to_string(),
                description: Vec::new(),
            }],
            ..Definition::default()
        };
        let options = GenerateOptions {
            main_type: "Outlet".to_string(),
            ..GenerateOptions::default()
        };
        let text = generate_file(&[def, power_state], &options).unwrap();
        let enum_pos = text.find("pub enum PowerState").unwrap();
        let struct_pos = text.find("pub struct Outlet").unwrap();
        assert!(enum_pos < struct_pos);
    }

    #[test]
    fn test_sf_prefix_renames_local_references() {
        let mut def = entity("Schedule");
        def.links.push(Link {
            name: "tasks".to_string(),
            json_name: "Tasks".to_string(),
            type_name: "ScheduleTask".to_string(),
            is_array: true,
            ..Link::default()
        });
        let task = Definition {
            name: "ScheduleTask".to_string(),
            original_name: "ScheduleTask".to_string(),
            ..Definition::default()
        };
        let options = GenerateOptions {
            main_type: "Schedule".to_string(),
            prefix_sf: true,
            ..GenerateOptions::default()
        };
        let text = generate_file(&[def, task], &options).unwrap();
        assert!(text.contains("pub struct SFSchedule"));
        assert!(text.contains("pub struct SFScheduleTask"));
        assert!(text.contains("Vec<SFScheduleTask>"));
        assert!(!text.contains("pub struct Schedule "));
    }

    #[test]
    fn test_service_root_rename() {
        let def = entity("ServiceRoot");
        let options = GenerateOptions {
            main_type: "ServiceRoot".to_string(),
            type_renames: vec![("ServiceRoot".to_string(), "Service".to_string())],
            ..GenerateOptions::default()
        };
        let text = generate_file(&[def], &options).unwrap();
        assert!(text.contains("pub struct Service {"));
        assert!(!text.contains("pub struct ServiceRoot"));
    }
}
