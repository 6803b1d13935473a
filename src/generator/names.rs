//
// SPDX-License-Identifier: BSD-3-Clause
//

use proc_macro2::Ident;
use proc_macro2::Punct;
use proc_macro2::Spacing;
use proc_macro2::Span;
use proc_macro2::TokenStream;
use proc_macro2::TokenTree;
use quote::ToTokens;
use quote::TokenStreamExt as _;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// A possibly path-qualified type name, e.g. `Endpoint` or
/// `common::Status`.
///
/// The parser only produces names whose segments are valid identifiers,
/// so rendering appends segments joined by `::` directly.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct TypeName<'a>(&'a str);

impl<'a> TypeName<'a> {
    #[must_use]
    pub const fn new(v: &'a str) -> Self {
        Self(v)
    }
}

impl ToTokens for TypeName<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        for (i, segment) in self.0.split("::").enumerate() {
            if i > 0 {
                tokens.extend([
                    TokenTree::Punct(Punct::new(':', Spacing::Joint)),
                    TokenTree::Punct(Punct::new(':', Spacing::Alone)),
                ]);
            }
            tokens.append(Ident::new(segment, Span::call_site()));
        }
    }
}

impl Display for TypeName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self.0, f)
    }
}

/// A snake-case field or method name, already keyword escaped.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct FieldName<'a>(&'a str);

impl<'a> FieldName<'a> {
    #[must_use]
    pub const fn new(v: &'a str) -> Self {
        Self(v)
    }
}

impl ToTokens for FieldName<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.append(Ident::new(self.0, Span::call_site()));
    }
}

impl Display for FieldName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self.0, f)
    }
}
