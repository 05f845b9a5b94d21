use glam::{Mat4, Vec4};

/// Multi-line dump of a matrix, one column per line, for debug logs.
pub fn format_mat4(name: &str, mat: &Mat4) -> String {
    let mut output = format!("{}:\n", name);
    let labels = ["x_axis", "y_axis", "z_axis", "w_axis"];
    for (label, col) in labels.iter().zip(mat.to_cols_array_2d()) {
        output.push_str(&format!("{}: {}\n", label, format_vec4(Vec4::from_array(col))));
    }
    output
}

pub fn format_vec4(v: Vec4) -> String {
    format!("[{:8.3},{:8.3},{:8.3},{:8.3}]", v.x, v.y, v.z, v.w)
}
