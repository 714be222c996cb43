use chrono::{Local, Utc};

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Server-local wall clock as `HH:MM:SS`.
pub fn time_of_day() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_is_hh_mm_ss() {
        let t = time_of_day();
        let parts: Vec<&str> = t.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit())));
    }
}
