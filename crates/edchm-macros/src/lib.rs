use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericArgument, Lit, Meta, PathArguments};

/// Derive macro that generates a companion `*Trajectory` struct collecting
/// per-timestep flux records over a whole simulation.
///
/// The source struct holds one timestep: every field must be `Array1<f64>`
/// with one entry per spatial unit. The generated trajectory has the same
/// fields as `ndarray::Array2<f64>` shaped `[n_time, n_spat]`, with `zeros`,
/// `record`, `n_time`, `n_spat`, `is_empty` and `field` methods.
/// A `field_names()` associated function is added to the source struct.
///
/// Use `#[trajectory(name = "CustomName")]` to override the default
/// trajectory struct name (`{StructName}Trajectory`).
#[proc_macro_derive(Trajectory, attributes(trajectory))]
pub fn derive_trajectory(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let traj_name = extract_trajectory_name(&input)
        .unwrap_or_else(|| format_ident!("{}Trajectory", name));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "Trajectory can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Trajectory can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    if fields.is_empty() {
        return syn::Error::new_spanned(name, "Trajectory struct must have at least one field")
            .to_compile_error()
            .into();
    }

    let mut field_names = Vec::new();
    let mut field_idents = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if !is_array1_f64(&field.ty) {
            return syn::Error::new_spanned(
                &field.ty,
                "Trajectory derive: all fields must be Array1<f64>",
            )
            .to_compile_error()
            .into();
        }
        field_names.push(ident.to_string());
        field_idents.push(ident);
    }

    let first_field = &field_idents[0];
    let field_name_strs: Vec<&str> = field_names.iter().map(|s| s.as_str()).collect();

    let traj_fields = field_idents.iter().map(|f| {
        quote! { pub #f: ::ndarray::Array2<f64> }
    });

    let zeros_fields = field_idents.iter().map(|f| {
        quote! { #f: ::ndarray::Array2::zeros((n_time, n_spat)) }
    });

    let record_fields = field_idents.iter().map(|f| {
        quote! { self.#f.row_mut(t).assign(&f.#f); }
    });

    let lookup_arms = field_idents
        .iter()
        .zip(field_name_strs.iter())
        .map(|(f, s)| quote! { #s => Some(&self.#f), });

    let expanded = quote! {
        /// Auto-generated trajectory struct: one `[n_time, n_spat]` matrix per flux.
        #[derive(Debug, Clone)]
        pub struct #traj_name {
            #(#traj_fields,)*
        }

        impl #traj_name {
            /// Allocate zero-filled matrices for `n_time` steps and `n_spat` units.
            pub fn zeros(n_time: usize, n_spat: usize) -> Self {
                Self {
                    #(#zeros_fields,)*
                }
            }

            /// Store one timestep's fluxes as row `t`.
            pub fn record(&mut self, t: usize, f: &#name) {
                #(#record_fields)*
            }

            /// Number of timesteps.
            pub fn n_time(&self) -> usize {
                self.#first_field.nrows()
            }

            /// Number of spatial units.
            pub fn n_spat(&self) -> usize {
                self.#first_field.ncols()
            }

            /// Returns `true` if the trajectory holds no values.
            pub fn is_empty(&self) -> bool {
                self.#first_field.is_empty()
            }

            /// Look up a flux matrix by field name.
            pub fn field(&self, name: &str) -> Option<&::ndarray::Array2<f64>> {
                match name {
                    #(#lookup_arms)*
                    _ => None,
                }
            }
        }

        impl #name {
            /// Returns the field names of this flux record.
            pub fn field_names() -> &'static [&'static str] {
                &[#(#field_name_strs),*]
            }
        }
    };

    expanded.into()
}

fn extract_trajectory_name(input: &DeriveInput) -> Option<proc_macro2::Ident> {
    for attr in &input.attrs {
        if attr.path().is_ident("trajectory") {
            let nested = attr
                .parse_args_with(
                    syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
                )
                .ok()?;
            for meta in nested {
                if let Meta::NameValue(nv) = meta {
                    if nv.path.is_ident("name") {
                        if let syn::Expr::Lit(expr_lit) = &nv.value {
                            if let Lit::Str(lit_str) = &expr_lit.lit {
                                return Some(format_ident!("{}", lit_str.value()));
                            }
                        }
                    }
                }
            }
        }
    }
    None
}

/// Accepts `Array1<f64>` with any leading path (`ndarray::Array1<f64>` too).
fn is_array1_f64(ty: &syn::Type) -> bool {
    let syn::Type::Path(type_path) = ty else {
        return false;
    };
    let Some(last) = type_path.path.segments.last() else {
        return false;
    };
    if last.ident != "Array1" {
        return false;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return false;
    };
    match args.args.first() {
        Some(GenericArgument::Type(syn::Type::Path(inner))) => {
            args.args.len() == 1 && inner.path.is_ident("f64")
        }
        _ => false,
    }
}
