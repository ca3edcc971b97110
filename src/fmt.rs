/// Format a quantity with Swiss thousands separators: 1'234.50
pub fn quantity(val: f64) -> String {
    let negative = val < 0.0 && format!("{:.2}", val.abs()) != "0.00";
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('\'');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-{grouped}.{dec_part}")
    } else {
        format!("{grouped}.{dec_part}")
    }
}

/// Machine-readable number for exports. Shortest form that reads back to the same value.
pub fn plain(val: f64) -> String {
    if val == 0.0 {
        return "0".to_string();
    }
    val.to_string()
}
