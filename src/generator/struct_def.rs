//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Generation of a resource struct and its impl block.
//!
//! Entities embed the hand-written `Entity` base with `serde(flatten)`.
//! Link and collection references are stored privately as URI strings
//! behind typed getters; when a schema carries `Links` or `Actions` a
//! custom `Deserialize` impl lifts the nested wire shape into those
//! private fields.

use crate::generator::doc;
use crate::generator::names::FieldName;
use crate::generator::names::TypeName;
use crate::model::Action;
use crate::model::Definition;
use crate::naming;
use proc_macro2::Delimiter;
use proc_macro2::Group;
use proc_macro2::Literal;
use proc_macro2::TokenStream;
use quote::quote;
use quote::TokenStreamExt as _;

/// Parameter-count threshold above which an action method takes a
/// parameter struct instead of positional arguments.
pub const ACTION_POSITIONAL_MAX: usize = 3;

/// Generation of a Rust struct from an object definition.
#[derive(Debug)]
pub struct StructDef<'a> {
    pub definition: &'a Definition,
    /// True for the schema's principal type; adds the `get`/`list`
    /// constructors.
    pub is_main: bool,
}

/// A privately stored reference, either a direct link/collection
/// property or a `Links` block entry.
struct LinkField<'a> {
    field: &'a str,
    json_name: &'a str,
    target: &'a str,
    is_array: bool,
    from_links_block: bool,
    deprecated: bool,
    description: &'a [String],
}

impl<'a> StructDef<'a> {
    pub fn generate(&self, tokens: &mut TokenStream) {
        self.generate_struct(tokens);
        if self.needs_custom_deserialize() {
            self.generate_deserialize(tokens);
        }
        self.generate_impl(tokens);
        for action in &self.definition.actions {
            if action.parameters.len() > ACTION_POSITIONAL_MAX {
                self.generate_parameter_struct(tokens, action);
            }
        }
    }

    /// Links and actions arrive nested on the wire and are lifted into
    /// flat private fields, which derived deserialization cannot do.
    fn needs_custom_deserialize(&self) -> bool {
        self.definition.is_entity
            && (!self.link_fields().is_empty() || !self.definition.actions.is_empty())
    }

    fn link_fields(&self) -> Vec<LinkField<'a>> {
        let def = self.definition;
        if !def.is_entity {
            return Vec::new();
        }

        let mut fields: Vec<LinkField<'a>> = Vec::new();
        for p in &def.properties {
            if !p.is_private {
                continue;
            }
            fields.push(LinkField {
                field: &p.name,
                json_name: &p.json_name,
                target: &p.type_name,
                is_array: p.is_array,
                from_links_block: false,
                deprecated: p.is_deprecated,
                description: &p.description,
            });
        }
        for link in &def.links {
            // A Links entry shadowed by a direct property of the same
            // name loses; the property already claimed the field.
            if def.properties.iter().any(|p| p.json_name == link.json_name) {
                continue;
            }
            fields.push(LinkField {
                field: &link.name,
                json_name: &link.json_name,
                target: &link.type_name,
                is_array: link.is_array,
                from_links_block: true,
                deprecated: link.deprecated,
                description: &link.description,
            });
        }
        fields
    }

    fn generate_struct(&self, tokens: &mut TokenStream) {
        let def = self.definition;
        let name = TypeName::new(&def.name);
        let mut content = TokenStream::new();

        if def.is_entity {
            content.extend(quote! {
                #[serde(flatten)]
                pub entity: Entity,
            });
        }

        for p in &def.properties {
            // Entity link fields become private storage below.
            if def.is_entity && p.is_private {
                continue;
            }
            content.extend(doc::generate(&p.description));
            let rename = Literal::string(&p.json_name);
            let field = FieldName::new(&p.name);
            if !(p.is_link || p.is_collection) {
                let ptype = TypeName::new(&p.type_name);
                if p.is_array {
                    content.extend(quote! {
                        #[serde(rename = #rename, default, skip_serializing_if = "Vec::is_empty")]
                        pub #field: Vec<#ptype>,
                    });
                } else {
                    content.extend(quote! {
                        #[serde(rename = #rename, default, skip_serializing_if = "Option::is_none")]
                        pub #field: Option<#ptype>,
                    });
                }
            } else {
                // Plain objects have no entity to fetch through; the
                // reference stays a raw link.
                if p.is_array {
                    content.extend(quote! {
                        #[serde(rename = #rename, default, skip_serializing_if = "Vec::is_empty")]
                        pub #field: Vec<common::Link>,
                    });
                } else {
                    content.extend(quote! {
                        #[serde(rename = #rename, default, skip_serializing_if = "Option::is_none")]
                        pub #field: Option<common::Link>,
                    });
                }
            }
        }

        for link in self.link_fields() {
            let field = FieldName::new(link.field);
            if link.is_array {
                content.extend(quote! {
                    #[serde(skip)]
                    #field: Vec<String>,
                });
            } else {
                content.extend(quote! {
                    #[serde(skip)]
                    #field: String,
                });
            }
        }

        for action in &def.actions {
            let target = action_target_field(action);
            let field = FieldName::new(&target);
            content.extend(quote! {
                #[serde(skip)]
                #field: String,
            });
        }

        let derives = if self.needs_custom_deserialize() {
            quote! { #[derive(Serialize, Debug, Clone, PartialEq)] }
        } else {
            quote! { #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)] }
        };
        tokens.extend([doc::generate(&def.description), derives]);
        tokens.extend(quote! { pub struct #name });
        tokens.append(Group::new(Delimiter::Brace, content));
    }

    fn generate_deserialize(&self, tokens: &mut TokenStream) {
        let def = self.definition;
        let name = TypeName::new(&def.name);
        let link_fields = self.link_fields();

        let mut helpers = TokenStream::new();
        let has_links_block = link_fields.iter().any(|l| l.from_links_block);
        if has_links_block {
            let mut content = TokenStream::new();
            for link in link_fields.iter().filter(|l| l.from_links_block) {
                let rename = Literal::string(link.json_name);
                let field = FieldName::new(link.field);
                if link.is_array {
                    content.extend(quote! {
                        #[serde(rename = #rename, default)]
                        #field: Vec<common::Link>,
                    });
                } else {
                    content.extend(quote! {
                        #[serde(rename = #rename, default)]
                        #field: Option<common::Link>,
                    });
                }
            }
            helpers.extend(quote! {
                #[derive(Deserialize, Default)]
                struct Links
            });
            helpers.append(Group::new(Delimiter::Brace, content));
        }

        if !def.actions.is_empty() {
            let mut content = TokenStream::new();
            for action in &def.actions {
                let rename = Literal::string(&action.json_name);
                let method = naming::snake_field_name(&action.name);
                let field = FieldName::new(&method);
                content.extend(quote! {
                    #[serde(rename = #rename, default)]
                    #field: common::ActionTarget,
                });
            }
            helpers.extend(quote! {
                #[derive(Deserialize, Default)]
                struct Actions
            });
            helpers.append(Group::new(Delimiter::Brace, content));
        }

        let mut raw_fields = TokenStream::new();
        raw_fields.extend(quote! {
            #[serde(flatten)]
            entity: Entity,
        });
        for p in &def.properties {
            let rename = Literal::string(&p.json_name);
            let field = FieldName::new(&p.name);
            if p.is_private {
                if p.is_array {
                    raw_fields.extend(quote! {
                        #[serde(rename = #rename, default)]
                        #field: Vec<common::Link>,
                    });
                } else {
                    raw_fields.extend(quote! {
                        #[serde(rename = #rename, default)]
                        #field: Option<common::Link>,
                    });
                }
            } else {
                let ptype = TypeName::new(&p.type_name);
                if p.is_array {
                    raw_fields.extend(quote! {
                        #[serde(rename = #rename, default)]
                        #field: Vec<#ptype>,
                    });
                } else {
                    raw_fields.extend(quote! {
                        #[serde(rename = #rename, default)]
                        #field: Option<#ptype>,
                    });
                }
            }
        }
        if has_links_block {
            raw_fields.extend(quote! {
                #[serde(rename = "Links", default)]
                links: Links,
            });
        }
        if !def.actions.is_empty() {
            raw_fields.extend(quote! {
                #[serde(rename = "Actions", default)]
                actions: Actions,
            });
        }
        helpers.extend(quote! {
            #[derive(Deserialize)]
            struct Raw
        });
        helpers.append(Group::new(Delimiter::Brace, raw_fields));

        let mut assignments = TokenStream::new();
        assignments.extend(quote! { entity: raw.entity, });
        for p in &def.properties {
            let field = FieldName::new(&p.name);
            if p.is_private {
                if p.is_array {
                    assignments.extend(quote! {
                        #field: raw.#field.into_iter().map(|l| l.odata_id).collect(),
                    });
                } else {
                    assignments.extend(quote! {
                        #field: raw.#field.map(|l| l.odata_id).unwrap_or_default(),
                    });
                }
            } else {
                assignments.extend(quote! { #field: raw.#field, });
            }
        }
        for link in link_fields.iter().filter(|l| l.from_links_block) {
            let field = FieldName::new(link.field);
            if link.is_array {
                assignments.extend(quote! {
                    #field: raw.links.#field.into_iter().map(|l| l.odata_id).collect(),
                });
            } else {
                assignments.extend(quote! {
                    #field: raw.links.#field.map(|l| l.odata_id).unwrap_or_default(),
                });
            }
        }
        for action in &def.actions {
            let target = action_target_field(action);
            let field = FieldName::new(&target);
            let method = naming::snake_field_name(&action.name);
            let raw_field = FieldName::new(&method);
            assignments.extend(quote! {
                #field: raw.actions.#raw_field.target,
            });
        }

        tokens.extend(quote! {
            impl<'de> Deserialize<'de> for #name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    #helpers
                    let raw = Raw::deserialize(deserializer)?;
                    Ok(Self { #assignments })
                }
            }
        });
    }

    fn generate_impl(&self, tokens: &mut TokenStream) {
        let def = self.definition;
        if !def.is_entity {
            return;
        }

        let mut content = TokenStream::new();
        if self.is_main {
            self.generate_constructors(&mut content);
        }
        for link in self.link_fields() {
            Self::generate_getter(&mut content, &link);
        }
        for action in &def.actions {
            self.generate_action_method(&mut content, action);
        }
        if !def.read_write_properties.is_empty() {
            self.generate_update(&mut content);
        }

        if content.is_empty() {
            return;
        }
        let name = TypeName::new(&def.name);
        tokens.extend(quote! { impl #name });
        tokens.append(Group::new(Delimiter::Brace, content));
    }

    fn generate_constructors(&self, content: &mut TokenStream) {
        let get_doc = format!(" Get a `{}` instance from the service at `uri`.", self.definition.name);
        let list_doc = format!(
            " List all `{}` members of the collection at `uri`.",
            self.definition.name
        );
        content.extend(quote! {
            #[doc = #get_doc]
            pub fn get(client: &Client, uri: &str) -> Result<Self, Error> {
                client.get_object(uri)
            }

            #[doc = #list_doc]
            pub fn list(client: &Client, uri: &str) -> Result<Vec<Self>, Error> {
                client.get_collection(uri)
            }
        });
    }

    fn generate_getter(content: &mut TokenStream, link: &LinkField<'_>) {
        content.extend(doc::generate(link.description));
        if link.deprecated {
            content.extend(quote! { #[doc = ""] #[doc = " Deprecated."] });
        }
        let method = FieldName::new(link.field);
        let target = TypeName::new(link.target);
        if link.is_array {
            content.extend(quote! {
                pub fn #method(&self) -> Result<Vec<#target>, Error> {
                    self.entity.get_objects(&self.#method)
                }
            });
        } else {
            content.extend(quote! {
                pub fn #method(&self) -> Result<Option<#target>, Error> {
                    self.entity.get_object(&self.#method)
                }
            });
        }
    }

    fn generate_action_method(&self, content: &mut TokenStream, action: &Action) {
        content.extend(doc::generate(&action.description));
        let method_name = naming::snake_field_name(&action.name);
        let method = FieldName::new(&method_name);
        let target = action_target_field(action);
        let target_field = FieldName::new(&target);

        let response = if action.response_type.is_empty() {
            quote! { () }
        } else {
            let rtype = TypeName::new(&action.response_type);
            quote! { #rtype }
        };
        let post = if action.response_type.is_empty() {
            quote! { post }
        } else {
            quote! { post_decode }
        };

        if action.parameters.len() > ACTION_POSITIONAL_MAX {
            let struct_name = parameter_struct_name(&self.definition.name, action);
            let ptype = TypeName::new(&struct_name);
            content.extend(quote! {
                pub fn #method(&self, parameters: &#ptype) -> Result<#response, Error> {
                    self.entity.#post(&self.#target_field, parameters)
                }
            });
            return;
        }

        let mut arglist = TokenStream::new();
        let mut inserts = TokenStream::new();
        for p in &action.parameters {
            let arg = FieldName::new(&p.name);
            let ptype = TypeName::new(&p.type_name);
            let key = Literal::string(&p.original_name);
            match (p.required, p.is_array) {
                (true, false) => {
                    arglist.extend(quote! { , #arg: #ptype });
                    inserts.extend(quote! {
                        payload.insert(#key.to_string(), serde_json::to_value(#arg)?);
                    });
                }
                (false, false) => {
                    arglist.extend(quote! { , #arg: Option<#ptype> });
                    inserts.extend(quote! {
                        if let Some(value) = #arg {
                            payload.insert(#key.to_string(), serde_json::to_value(value)?);
                        }
                    });
                }
                (true, true) => {
                    arglist.extend(quote! { , #arg: Vec<#ptype> });
                    inserts.extend(quote! {
                        payload.insert(#key.to_string(), serde_json::to_value(#arg)?);
                    });
                }
                (false, true) => {
                    arglist.extend(quote! { , #arg: Vec<#ptype> });
                    inserts.extend(quote! {
                        if !#arg.is_empty() {
                            payload.insert(#key.to_string(), serde_json::to_value(#arg)?);
                        }
                    });
                }
            }
        }

        content.extend(quote! {
            pub fn #method(&self #arglist) -> Result<#response, Error> {
                let mut payload = serde_json::Map::new();
                #inserts
                self.entity.#post(&self.#target_field, &serde_json::Value::Object(payload))
            }
        });
    }

    fn generate_update(&self, content: &mut TokenStream) {
        let def = self.definition;
        let mut compares = TokenStream::new();
        for json_name in &def.read_write_properties {
            let p = match def.property_by_json_name(json_name) {
                Some(p) => p,
                None => continue,
            };
            if p.is_private {
                continue;
            }
            let field = FieldName::new(&p.name);
            let key = Literal::string(json_name);
            compares.extend(quote! {
                if self.#field != original.#field {
                    payload.insert(#key.to_string(), serde_json::to_value(&self.#field)?);
                }
            });
        }

        let doc = format!(
            " Send the writable properties of this `{}` that changed since it was read.",
            def.name
        );
        content.extend(quote! {
            #[doc = #doc]
            pub fn update(&self) -> Result<(), Error> {
                let original: Self = self.entity.original()?;
                let mut payload = serde_json::Map::new();
                #compares
                self.entity.patch(&serde_json::Value::Object(payload))
            }
        });
    }

    fn generate_parameter_struct(&self, tokens: &mut TokenStream, action: &Action) {
        let name = parameter_struct_name(&self.definition.name, action);
        let name = TypeName::new(&name);
        let mut content = TokenStream::new();
        for p in &action.parameters {
            content.extend(doc::generate(&p.description));
            let rename = Literal::string(&p.original_name);
            let field = FieldName::new(&p.name);
            let ptype = TypeName::new(&p.type_name);
            match (p.required, p.is_array) {
                (true, false) => content.extend(quote! {
                    #[serde(rename = #rename)]
                    pub #field: #ptype,
                }),
                (false, false) => content.extend(quote! {
                    #[serde(rename = #rename, skip_serializing_if = "Option::is_none")]
                    pub #field: Option<#ptype>,
                }),
                (true, true) => content.extend(quote! {
                    #[serde(rename = #rename)]
                    pub #field: Vec<#ptype>,
                }),
                (false, true) => content.extend(quote! {
                    #[serde(rename = #rename, skip_serializing_if = "Vec::is_empty")]
                    pub #field: Vec<#ptype>,
                }),
            }
        }

        let doc = format!(
            " Parameters for the `{}` action of `{}`.",
            action.name, self.definition.name
        );
        tokens.extend(quote! {
            #[doc = #doc]
            #[derive(Serialize, Debug, Clone)]
            pub struct #name
        });
        tokens.append(Group::new(Delimiter::Brace, content));
    }
}

fn action_target_field(action: &Action) -> String {
    format!("{}_target", naming::snake_field_name(&action.name))
}

fn parameter_struct_name(struct_name: &str, action: &Action) -> String {
    format!(
        "{}{}Parameters",
        struct_name,
        naming::clean_identifier(&action.name)
    )
}
