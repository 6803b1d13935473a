//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Generation of doc comment lines as `#[doc = "..."]` attributes.

use proc_macro2::Delimiter;
use proc_macro2::Group;
use proc_macro2::Ident;
use proc_macro2::Literal;
use proc_macro2::Punct;
use proc_macro2::Spacing;
use proc_macro2::Span;
use proc_macro2::TokenStream;
use proc_macro2::TokenTree;

/// Render formatted description lines as doc attributes.
///
/// Non-empty lines get a leading space so the rendered comment reads
/// `/// text`; empty lines separate paragraphs.
#[must_use]
pub fn generate(lines: &[String]) -> TokenStream {
    let mut ts = TokenStream::new();
    for line in lines {
        let text = if line.is_empty() {
            String::new()
        } else {
            format!(" {}", line)
        };
        let mut attr_inner = TokenStream::new();
        attr_inner.extend([
            TokenTree::Ident(Ident::new("doc", Span::call_site())),
            TokenTree::Punct(Punct::new('=', Spacing::Alone)),
            TokenTree::Literal(Literal::string(&text)),
        ]);
        ts.extend([
            TokenTree::Punct(Punct::new('#', Spacing::Alone)),
            TokenTree::Group(Group::new(Delimiter::Bracket, attr_inner)),
        ]);
    }
    ts
}
