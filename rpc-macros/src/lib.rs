//!
//! Proc-macro backing `duplex_rpc::server::method!`, which turns a typed
//! closure into a [`Method`](../duplex_rpc/server/struct.Method.html) whose
//! arguments are decoded from the request's positional JSON array.
//!
use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;
use quote::quote;
use syn::parse_macro_input;
mod method;

#[proc_macro]
#[proc_macro_error]
pub fn server_method(input: TokenStream) -> TokenStream {
    let result = parse_macro_input!(input as method::Method);
    let ts = quote! {
        ::duplex_rpc::server::Method::new(#result)
    };
    ts.into()
}
