pub fn wrap_prev_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

pub fn wrap_next_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current + 1 >= len {
        0
    } else {
        current + 1
    }
}

/// Cuts `text` to at most `max_chars` characters, ending in an ellipsis when
/// anything was dropped.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(max_chars - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::{truncate_label, wrap_next_index, wrap_prev_index};

    #[test]
    fn test_wrap_prev_index_wraps_to_end() {
        assert_eq!(wrap_prev_index(0, 5), 4);
        assert_eq!(wrap_prev_index(3, 5), 2);
        assert_eq!(wrap_prev_index(0, 0), 0);
    }

    #[test]
    fn test_wrap_next_index_wraps_to_start() {
        assert_eq!(wrap_next_index(4, 5), 0);
        assert_eq!(wrap_next_index(1, 5), 2);
        assert_eq!(wrap_next_index(0, 0), 0);
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Lunch", 10), "Lunch");
        assert_eq!(truncate_label("Dinner & relax", 8), "Dinner …");
        assert_eq!(truncate_label("Work", 0), "");
    }
}
