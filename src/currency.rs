/**
 * Rupee formatting for the console report: two decimals, thousands grouped
 * in threes, and the minus sign ahead of the symbol (`-₹1,234.50`).
 *
 * Amounts that round to zero print as `₹0.00`, never `-₹0.00`.
 */
const RUPEE: char = '₹';

pub fn format_rupees(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, RUPEE, grouped, fraction)
}
