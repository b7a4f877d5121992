use std::collections::VecDeque;

use proptest::prelude::*;
use sqltools::engine::result_as_list;
use sqltools::history::HistoryBuffer;

proptest! {
    // The buffer behaves like a bounded FIFO queue for any push sequence.
    #[test]
    fn history_matches_a_bounded_fifo(
        capacity in 1usize..16,
        pushes in proptest::collection::vec("[a-z ]{0,12}", 0..64),
    ) {
        let history = HistoryBuffer::new(capacity);
        let mut model: VecDeque<String> = VecDeque::new();

        for query in &pushes {
            history.push(query.clone());
            model.push_back(query.clone());
            if model.len() > capacity {
                model.pop_front();
            }
            prop_assert!(history.len() <= capacity);
        }

        prop_assert_eq!(history.entries(), model.into_iter().collect::<Vec<_>>());
    }

    // Every line with at least one `|` contributes exactly its trimmed second field.
    #[test]
    fn result_list_takes_second_field_of_piped_lines(
        rows in proptest::collection::vec(
            ("[a-z ]{0,6}", proptest::option::of("[a-z_ ]{0,10}")),
            0..20,
        ),
    ) {
        let mut text = String::new();
        let mut expected = Vec::new();
        for (head, field) in &rows {
            match field {
                Some(field) => {
                    text.push_str(&format!("{head}|{field}|tail\n"));
                    expected.push(field.trim().to_string());
                }
                None => {
                    text.push_str(head);
                    text.push('\n');
                }
            }
        }

        prop_assert_eq!(result_as_list(&text), expected);
    }
}
