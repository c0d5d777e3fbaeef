use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    ExprClosure, Pat, Result,
};

/// Parses `|arg1: T1, arg2: T2, ...| async move { ... }` into a closure that
/// takes `Vec<serde_json::Value>`, decodes each positional argument into its
/// declared type, runs the body, and re-encodes its result.
///
/// Expands
/// ```ignore
/// method!(|name: String, times: u32| async move {
///     Ok(name.repeat(times as usize))
/// })
/// ```
/// into a closure usable with `duplex_rpc::server::Method::new`: it decodes
/// `arguments[0]` into `name: String` and `arguments[1]` into `times: u32`
/// before running the body, then serializes the body's `Ok` value.
pub struct Method {
    result: TokenStream,
}

impl Parse for Method {
    fn parse(input: ParseStream) -> Result<Self> {
        let closure = input.parse::<ExprClosure>()?;
        let body = closure.body;

        let mut decodes = Vec::new();
        for (index, pat) in closure.inputs.iter().enumerate() {
            let Pat::Type(pat_type) = pat else {
                return Err(syn::Error::new_spanned(
                    pat,
                    "method! arguments must be `name: Type` pairs",
                ));
            };
            let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
                return Err(syn::Error::new_spanned(
                    &pat_type.pat,
                    "method! arguments must be simple identifiers",
                ));
            };
            let name = &pat_ident.ident;
            let ty = &pat_type.ty;
            decodes.push(quote! {
                let #name: #ty = match __duplex_rpc_args.get(#index) {
                    Some(__value) => ::duplex_rpc::serde_json::from_value(__value.clone())
                        .map_err(|err| ::duplex_rpc::error::ServerError::ArgumentDecode(err.to_string()))?,
                    None => return Err(::duplex_rpc::error::ServerError::ArgumentDecode(
                        format!("missing argument {}", #index)
                    )),
                };
            });
        }

        let result = quote! {
            |__duplex_rpc_args: ::std::vec::Vec<::duplex_rpc::serde_json::Value>| {
                ::std::boxed::Box::pin(async move {
                    #(#decodes)*
                    let __duplex_rpc_result: ::duplex_rpc::result::ServerResult<_> = async move { #body }.await;
                    __duplex_rpc_result.and_then(|__duplex_rpc_value| {
                        ::duplex_rpc::serde_json::to_value(__duplex_rpc_value)
                            .map_err(|_| ::duplex_rpc::error::ServerError::RespSerialize)
                    })
                })
            }
        };

        Ok(Self { result })
    }
}

impl ToTokens for Method {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.result.to_tokens(tokens);
    }
}
