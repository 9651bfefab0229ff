use crate::row::Row;

const FIELD_SEPARATOR: &str = " ";

/// Indices of the rows matching `query`, in their original order.
///
/// Matching is a case-insensitive substring test over the row's cells joined
/// by a space. An empty query matches everything.
pub fn filter_indices(rows: &[Row], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..rows.len()).collect();
    }

    let needle = query.to_lowercase();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| haystack(row).contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

pub fn filter<'a>(rows: &'a [Row], query: &str) -> Vec<&'a Row> {
    filter_indices(rows, query)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}

fn haystack(row: &Row) -> String {
    row.cells().join(FIELD_SEPARATOR).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use rstest::rstest;

    fn row(name: &str, host: &str, user: &str) -> Row {
        Row::from_config(Connection {
            name: name.to_string(),
            host: host.to_string(),
            port: "22".to_string(),
            user: user.to_string(),
            key_path: String::new(),
        })
    }

    fn rows() -> Vec<Row> {
        vec![
            row("Prod-Web", "10.0.0.1", "deploy"),
            row("staging", "stage.example.com", "root"),
            row("db", "10.0.0.2", "postgres"),
            row("", "prod-db.internal", "admin"),
        ]
    }

    #[test]
    fn empty_query_returns_all_rows_in_order() {
        let all = rows();
        let filtered: Vec<Row> = filter(&all, "").into_iter().cloned().collect();
        assert_eq!(filtered, all);
    }

    #[test]
    fn matching_is_case_insensitive_across_fields() {
        let all = rows();
        let names: Vec<&str> = filter(&all, "PROD")
            .iter()
            .map(|r| r.connection.host.as_str())
            .collect();
        assert_eq!(names, vec!["10.0.0.1", "prod-db.internal"]);
    }

    #[test]
    fn query_can_span_adjacent_fields() {
        let all = rows();
        assert_eq!(filter_indices(&all, "22 postgres"), vec![2]);
    }

    #[rstest]
    #[case("10.0")]
    #[case("root")]
    #[case("zzz")]
    #[case("O")]
    fn result_is_idempotent_ordered_subsequence(#[case] query: &str) {
        let all = rows();
        let once = filter_indices(&all, query);
        assert!(once.windows(2).all(|w| w[0] < w[1]));

        let narrowed: Vec<Row> = once.iter().map(|i| all[*i].clone()).collect();
        let twice: Vec<Row> = filter(&narrowed, query).into_iter().cloned().collect();
        assert_eq!(twice, narrowed);
    }
}
