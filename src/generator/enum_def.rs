//
// SPDX-License-Identifier: BSD-3-Clause
//

use crate::generator::doc;
use crate::generator::names::TypeName;
use crate::model::Definition;
use proc_macro2::Delimiter;
use proc_macro2::Group;
use proc_macro2::Literal;
use proc_macro2::TokenStream;
use quote::quote;
use quote::TokenStreamExt as _;

/// Generation of a Rust enum from a string-enum definition.
#[derive(Debug)]
pub struct EnumDef<'a> {
    pub definition: &'a Definition,
    /// Emitted type name, after conflict prefixing and renames.
    pub name: &'a str,
}

impl EnumDef<'_> {
    pub fn generate(&self, tokens: &mut TokenStream) {
        let name = TypeName::new(self.name);
        let mut members_content = TokenStream::new();
        for value in &self.definition.enum_values {
            let rename = Literal::string(&value.value);
            let member_name = TypeName::new(&value.name);
            members_content.extend([
                doc::generate(&value.description),
                quote! {
                    #[serde(rename = #rename)]
                    #member_name,
                },
            ]);
        }

        tokens.extend([
            doc::generate(&self.definition.description),
            quote! {
                #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
                pub enum #name
            },
        ]);
        tokens.append(Group::new(Delimiter::Brace, members_content));
    }
}
