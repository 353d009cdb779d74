/// Build a parameter struct of `Vec<f64>` fields from a `PyDict`, one key per field.
macro_rules! params_from_dict {
    ($dict:expr, $ty:ident { $($field:ident),+ $(,)? }) => {
        $ty {
            $(
                $field: $crate::convert::required_vec($dict, stringify!($field))?,
            )+
        }
    };
}

/// Convert a trajectory into a `PyDict` of `[n_time, n_spat]` numpy arrays,
/// one entry per flux named by `$fluxes::field_names()`.
macro_rules! trajectory_to_dict {
    ($py:expr, $traj:expr, $fluxes:ty) => {{
        let dict = pyo3::types::PyDict::new($py);
        for name in <$fluxes>::field_names() {
            if let Some(values) = $traj.field(name) {
                dict.set_item(*name, numpy::PyArray2::from_array($py, values))?;
            }
        }
        dict
    }};
}
