//! Small helpers shared by commands, history, and the terminal front end.

/// Filter items by case-insensitive query matching on two string fields.
/// Returns all items when query is blank.
pub fn filter_by_query<'a, T, F>(items: &'a [T], query: &str, get_fields: F) -> Vec<&'a T>
where
    F: Fn(&'a T) -> (&'a str, &'a str),
{
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            let (a, b) = get_fields(item);
            a.to_lowercase().contains(&q) || b.to_lowercase().contains(&q)
        })
        .collect()
}

/// Human-readable byte count, e.g. "512 B", "1.5 KB", "20.0 MB".
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_blank_query_returns_all() {
        let items = vec!["a", "b", "c"];
        assert_eq!(filter_by_query(&items, "", |s| (s, "")).len(), 3);
        assert_eq!(filter_by_query(&items, "  ", |s| (s, "")).len(), 3);
    }

    #[test]
    fn filter_match_second_field() {
        let items = vec![("a", "hello"), ("b", "world")];
        let out = filter_by_query(&items, "orld", |t| (t.0, t.1));
        assert_eq!(out, vec![&("b", "world")]);
    }

    #[test]
    fn filter_case_insensitive() {
        let items = vec!["Hello", "World"];
        let out = filter_by_query(&items, "WORLD", |s| (s, ""));
        assert_eq!(out, vec![&"World"]);
    }

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(20 * 1024 * 1024), "20.0 MB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
