//! Batch classification pipeline: one HTTP round-trip per table row, labels
//! written into the profile's target column.

use std::time::Instant;

use anyhow::anyhow;
use relabel_client::ClassifyClient;
use relabel_core::{Profile, Table};

#[derive(Debug)]
pub struct ClassifyStats {
    pub total_rows: usize,
    pub labelled: usize,
    pub failed: usize,
    pub elapsed_secs: f64,
}

/// Run the batch classification loop: for each row in input order, POST the
/// row's `message` cell to the endpoint and write the predicted label into
/// the profile's target column.
///
/// Rows are strictly sequential; a slow or hanging request blocks all
/// subsequent rows. A failed row is reported on stdout with its index and
/// the raw endpoint response, its target cell is left unchanged, and the run
/// continues with the next row.
pub async fn run_classify_pipeline(
    table: &mut Table,
    client: &ClassifyClient,
    profile: Profile,
) -> anyhow::Result<ClassifyStats> {
    let start = Instant::now();

    // The message column is mandatory; fail before any request goes out.
    let message_col = table
        .column_index("message")
        .ok_or_else(|| anyhow!("input CSV has no 'message' column"))?;
    let target_col = table.ensure_column(profile.target_column());

    let total_rows = table.row_count();
    let mut labelled = 0usize;
    let mut failed = 0usize;

    for row in 0..total_rows {
        let message = table.value(row, message_col).unwrap_or("").to_string();

        match client.classify(profile.request_id(), &message).await {
            Ok(label) => {
                table.set_value(row, target_col, label);
                labelled += 1;
            }
            Err(err) => {
                // Failed rows keep whatever the cell already held.
                println!("Failed to classify message at index {row}: {err}");
                failed += 1;
            }
        }

        eprint!(
            "\r  Classified {}/{} ({:.1}%)",
            row + 1,
            total_rows,
            (row + 1) as f64 / total_rows as f64 * 100.0
        );
    }
    if total_rows > 0 {
        eprintln!();
    }

    Ok(ClassifyStats {
        total_rows,
        labelled,
        failed,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    /// Bind a throwaway endpoint on a random port, return a client for it.
    async fn spawn_endpoint(router: Router) -> ClassifyClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ClassifyClient::new(format!("http://{addr}/classify"))
    }

    /// Endpoint that labels everything "spam".
    fn spam_endpoint() -> Router {
        Router::new().route(
            "/classify",
            post(|| async { Json(json!({"message_type": "spam"})) }),
        )
    }

    /// Endpoint that returns 500 for "hello" and "spam" for everything else.
    fn flaky_endpoint() -> Router {
        Router::new().route(
            "/classify",
            post(|Json(body): Json<Value>| async move {
                if body["message"] == "hello" {
                    (StatusCode::INTERNAL_SERVER_ERROR, "model offline").into_response()
                } else {
                    Json(json!({"message_type": "spam"})).into_response()
                }
            }),
        )
    }

    fn messages(messages: &[&str]) -> Table {
        Table::new(
            vec!["message".into()],
            messages
                .iter()
                .map(|m| vec![Some((*m).to_string())])
                .collect(),
        )
    }

    #[tokio::test]
    async fn creates_target_column_and_labels_every_row() {
        let client = spawn_endpoint(spam_endpoint()).await;
        let mut table = messages(&["buy now", "hello", "click here"]);

        let stats = run_classify_pipeline(&mut table, &client, Profile::ClassificationApi)
            .await
            .unwrap();

        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.labelled, 3);
        assert_eq!(stats.failed, 0);
        let col = table.column_index("label_classification_api").unwrap();
        for row in 0..table.row_count() {
            assert_eq!(table.value(row, col), Some("spam"));
        }
    }

    #[tokio::test]
    async fn failed_rows_are_left_missing_and_the_run_continues() {
        let client = spawn_endpoint(flaky_endpoint()).await;
        let mut table = messages(&["buy now", "hello"]);

        let stats = run_classify_pipeline(&mut table, &client, Profile::ClassificationApi)
            .await
            .unwrap();

        assert_eq!(stats.labelled, 1);
        assert_eq!(stats.failed, 1);
        let col = table.column_index("label_classification_api").unwrap();
        assert_eq!(table.value(0, col), Some("spam"));
        assert_eq!(table.value(1, col), None);
    }

    #[tokio::test]
    async fn failed_rows_keep_a_pre_existing_label() {
        let router = Router::new().route(
            "/classify",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        );
        let client = spawn_endpoint(router).await;
        let mut table = Table::new(
            vec!["message".into(), "label_data_science".into()],
            vec![vec![Some("hello".into()), Some("ham".into())]],
        );

        let stats = run_classify_pipeline(&mut table, &client, Profile::DataScience)
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(table.value(0, 1), Some("ham"));
    }

    #[tokio::test]
    async fn each_profile_writes_its_own_column_and_id() {
        // Echo the request id back as the label to observe the wire body.
        let router = Router::new().route(
            "/classify",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"message_type": body["id"]}))
            }),
        );
        let client = spawn_endpoint(router).await;
        let mut table = messages(&["hello"]);

        run_classify_pipeline(&mut table, &client, Profile::DataScience)
            .await
            .unwrap();

        assert!(table.column_index("label_classification_api").is_none());
        let col = table.column_index("label_data_science").unwrap();
        assert_eq!(
            table.value(0, col),
            Some("ad55bce2-e1fb-4d33-8206-2abe47f9928e")
        );
    }

    #[tokio::test]
    async fn missing_message_column_fails_before_any_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let router = Router::new().route(
            "/classify",
            post(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"message_type": "spam"}))
                }
            }),
        );
        let client = spawn_endpoint(router).await;
        let mut table = Table::new(vec!["body".into()], vec![vec![Some("hello".into())]]);

        let err = run_classify_pipeline(&mut table, &client, Profile::ClassificationApi)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("message"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deterministic_endpoint_makes_reruns_idempotent() {
        let client = spawn_endpoint(spam_endpoint()).await;
        let mut first = messages(&["buy now", "hello"]);
        let mut second = first.clone();

        run_classify_pipeline(&mut first, &client, Profile::ClassificationApi)
            .await
            .unwrap();
        run_classify_pipeline(&mut second, &client, Profile::ClassificationApi)
            .await
            .unwrap();
        // A second pass over already-labelled output changes nothing either.
        let mut third = first.clone();
        run_classify_pipeline(&mut third, &client, Profile::ClassificationApi)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[tokio::test]
    async fn empty_table_still_gains_the_target_column() {
        let client = spawn_endpoint(spam_endpoint()).await;
        let mut table = Table::new(vec!["message".into()], vec![]);

        let stats = run_classify_pipeline(&mut table, &client, Profile::ClassificationApi)
            .await
            .unwrap();

        assert_eq!(stats.total_rows, 0);
        assert!(table.column_index("label_classification_api").is_some());
    }

    #[tokio::test]
    async fn csv_file_round_trip_matches_expected_output() {
        // The full file-to-file flow: read, classify with one failing row,
        // write, re-read.
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("messages.csv");
        std::fs::write(&input, "message\nbuy now\nhello\n").unwrap();

        let client = spawn_endpoint(flaky_endpoint()).await;
        let mut table = Table::read_csv(&input).unwrap();
        run_classify_pipeline(&mut table, &client, Profile::ClassificationApi)
            .await
            .unwrap();
        table.write_csv(&input).unwrap();

        let reread = Table::read_csv(&input).unwrap();
        assert_eq!(reread.row_count(), 2);
        let col = reread.column_index("label_classification_api").unwrap();
        assert_eq!(reread.value(0, col), Some("spam"));
        assert_eq!(reread.value(1, col), None);
    }
}
