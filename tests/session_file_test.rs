use anyhow::Result;
use httpmock::prelude::*;
use real_estate_gems::{
    DiscountLevel, FileSessionStore, GeminiClient, GeminiConfig, ListingFetcher, SearchSession,
};
use serde_json::json;
use tempfile::TempDir;

/// A session file carries the last search, threshold and cache across runs.
#[tokio::test]
async fn test_file_session_resumes_from_cache() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let session_path = temp_dir.path().join("session.json");

    let server = MockServer::start();
    let body = json!({
        "properties": [
            {"id": "a", "listingPrice": 200000, "marketValue": 400000, "investmentScore": 60, "isActive": true},
            {"id": "b", "listingPrice": 350000, "marketValue": 400000, "investmentScore": 90, "isActive": true},
            {"id": "c", "listingPrice": 100000, "marketValue": 400000, "investmentScore": 99, "isActive": false}
        ]
    })
    .to_string();
    let api_mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200)
            .json_body(json!({"candidates": [{"content": {"parts": [{"text": body}]}}]}));
    });

    let config = GeminiConfig {
        endpoint: server.base_url(),
        ..GeminiConfig::default()
    };

    {
        let store = FileSessionStore::open(&session_path)?;
        let fetcher = ListingFetcher::new(
            GeminiClient::new(&config, Some("k".to_string()))?,
            store.clone(),
        );
        let session = SearchSession::restore(store, "real-estate-gems");
        session.search(&fetcher, "73301").await?;
        session.set_discount(DiscountLevel::Forty);

        let ids: Vec<String> = session.snapshot().visible.into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a"]);
    }

    let store = FileSessionStore::open(&session_path)?;
    let fetcher = ListingFetcher::new(GeminiClient::new(&config, Some("k".to_string()))?, store.clone());
    let session = SearchSession::restore(store, "real-estate-gems");

    assert_eq!(session.postal_code().as_deref(), Some("73301"));
    assert_eq!(session.discount(), DiscountLevel::Forty);
    assert!(session.resume(&fetcher).await?);
    api_mock.assert_hits(1);

    // The threshold survives the restart; a new search resets only the window.
    let snapshot = session.snapshot();
    assert_eq!(snapshot.discount, DiscountLevel::Forty);
    assert_eq!(snapshot.active_count, 2);
    assert_eq!(snapshot.filtered_count, 1);

    Ok(())
}
