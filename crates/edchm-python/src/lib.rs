#[macro_use]
mod macros;
mod convert;

mod gr4j;
mod iuh;
mod mini;
mod snow;

use pyo3::prelude::*;

type Register = fn(&Bound<'_, PyModule>) -> PyResult<()>;

/// Submodules of `_core`, each added as an attribute and to `sys.modules`.
const SUBMODULES: [(&str, Register); 4] = [
    ("gr4j", gr4j::register),
    ("iuh", iuh::register),
    ("mini", mini::register),
    ("snow", snow::register),
];

/// Make `from <parent>.<child> import ...` resolve.
fn alias_in_sys_modules(parent: &Bound<'_, PyModule>, child_name: &str) -> PyResult<()> {
    let child = parent.getattr(child_name)?;
    let full_name = format!("{}.{}", parent.name()?, child_name);
    parent
        .py()
        .import("sys")?
        .getattr("modules")?
        .set_item(full_name, child.downcast::<PyModule>()?)
}

/// Version of the compiled extension.
#[pyfunction]
fn rust_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(rust_version, m)?)?;
    for (name, register) in SUBMODULES {
        register(m)?;
        alias_in_sys_modules(m, name)?;
    }
    Ok(())
}
