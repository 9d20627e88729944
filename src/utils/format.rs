// 數字顯示格式 (en-US 千分位，無小數)

pub fn fmt_int(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let rounded = value.round();
    // -0 與 0 顯示相同
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn fmt_money(value: f64) -> String {
    format!("${}", fmt_int(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_int_grouping() {
        assert_eq!(fmt_int(0.0), "0");
        assert_eq!(fmt_int(999.4), "999");
        assert_eq!(fmt_int(1000.0), "1,000");
        assert_eq!(fmt_int(1234567.5), "1,234,568");
        assert_eq!(fmt_int(-98765.2), "-98,765");
        assert_eq!(fmt_int(-0.3), "0");
        assert_eq!(fmt_int(f64::NAN), "0");
    }

    #[test]
    fn test_fmt_money() {
        assert_eq!(fmt_money(163.0), "$163");
        assert_eq!(fmt_money(2500000.0), "$2,500,000");
    }
}
