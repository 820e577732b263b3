use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::TokenTree;
use quote::{format_ident, quote, ToTokens};
use syn::{punctuated::Punctuated, Meta, Token};

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs)]
struct ModelInputReceiver {
	ident: syn::Ident,

	generics: syn::Generics,

	data: ast::Data<(), ModelFieldReceiver>,

	attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs)]
struct ModelFieldReceiver {
	ident: Option<syn::Ident>,

	ty: syn::Type,
	vis: syn::Visibility,

	attrs: Vec<syn::Attribute>,
}

/// Returns true for `#[serde(skip_deserializing)]` and `#[serde(skip)]`.
fn is_skipped(attr: &syn::Attribute) -> bool {
	let Meta::List(ref list) = attr.meta else {
		return false;
	};

	if !list.path.is_ident("serde") {
		return false;
	}

	list.tokens.to_token_stream().into_iter().any(|token| {
		matches!(token, TokenTree::Ident(ref ident) if ident == "skip_deserializing" || ident == "skip")
	})
}

/// Rewrites a container attribute for the generated inputs.
///
/// Inputs are never read from a row, so `FromRow` is removed from derive lists.
/// A derive list that becomes empty is dropped entirely.
fn input_attr(attr: &syn::Attribute) -> syn::Result<Option<syn::Attribute>> {
	if !attr.path().is_ident("derive") {
		return Ok(Some(attr.clone()));
	}

	let paths = attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)?;
	let kept = paths
		.into_iter()
		.filter(|path| {
			path.segments
				.last()
				.map_or(true, |segment| segment.ident != "FromRow")
		})
		.collect::<Vec<_>>();

	if kept.is_empty() {
		return Ok(None);
	}

	Ok(Some(syn::parse_quote!(#[derive(#(#kept),*)])))
}

pub fn from_input(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = syn::parse_macro_input!(input as syn::DeriveInput);
	let receiver = match ModelInputReceiver::from_derive_input(&input) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let ident = &receiver.ident;
	let vis = &input.vis;
	let generics = &receiver.generics;
	let create_ident = format_ident!("Create{}Input", ident);
	let update_ident = format_ident!("Update{}Input", ident);

	let attrs = match receiver
		.attrs
		.iter()
		.map(input_attr)
		.collect::<syn::Result<Vec<_>>>()
	{
		Ok(attrs) => attrs.into_iter().flatten().collect::<Vec<_>>(),
		Err(e) => return e.into_compile_error().into(),
	};

	let Some(fields) = receiver.data.take_struct() else {
		return syn::Error::new_spanned(ident, "#[model] requires a struct with named fields")
			.into_compile_error()
			.into();
	};

	let fields = fields
		.iter()
		.filter_map(|field| {
			let ident = field.ident.as_ref()?;

			if field.attrs.iter().any(is_skipped) {
				return None;
			}

			let attrs = field
				.attrs
				.iter()
				.filter(|attr| !attr.path().is_ident("sqlx"))
				.collect::<Vec<_>>();

			Some((attrs, ident, &field.ty, &field.vis))
		})
		.collect::<Vec<_>>();

	let create_fields = fields.iter().map(|(attrs, ident, ty, vis)| {
		quote! {
			#(#attrs)*
			#vis #ident: #ty,
		}
	});

	let update_fields = fields.iter().map(|(attrs, ident, ty, vis)| {
		quote! {
			#(#attrs)*
			#vis #ident: Option<#ty>,
		}
	});

	quote! {
		#input

		#(#attrs)*
		#vis struct #create_ident #generics {
			#(
				#create_fields
			)*
		}

		#(#attrs)*
		#vis struct #update_ident #generics {
			#(
				#update_fields
			)*
		}
	}
	.into()
}
