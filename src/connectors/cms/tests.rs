use super::mock::{MockCmsConnector, MockOperation};
use super::CmsConnector;
use crate::connectors::errors::ConnectorError;
use crate::models::{Category, ProductFilter, RatingStats, Score};

fn score(v: u8) -> Score {
    Score::try_from(v).unwrap()
}

/// Test that the seeded catalog paginates like the CMS does
#[tokio::test]
async fn test_mock_list_products_paginates() {
    let connector = MockCmsConnector::seeded();

    let first = connector
        .list_products(None, &ProductFilter::default(), 1, 2)
        .await
        .unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.pagination.total, 5);
    assert_eq!(first.pagination.page_count, 3);
    assert!(first.has_more());

    let last = connector
        .list_products(None, &ProductFilter::default(), 3, 2)
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(!last.has_more());
}

/// Test that category and realness filters combine
#[tokio::test]
async fn test_mock_list_products_filters() {
    let connector = MockCmsConnector::seeded();
    let filter = ProductFilter {
        category: Some(Category::Workshop),
        is_real: Some(true),
    };

    let page = connector.list_products(None, &filter, 1, 8).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Precision Scissors");
}

/// Test that slug lookup returns None for unknown slugs
#[tokio::test]
async fn test_mock_get_product_by_slug() {
    let connector = MockCmsConnector::seeded();

    let found = connector
        .get_product_by_slug(None, "spiral-notebook")
        .await
        .unwrap();
    assert_eq!(found.unwrap().id, "1");

    let missing = connector.get_product_by_slug(None, "nope").await.unwrap();
    assert!(missing.is_none());
}

/// Test that login accepts username or email and rejects bad passwords
#[tokio::test]
async fn test_mock_login() {
    let connector = MockCmsConnector::seeded();

    let grant = connector.login("ned", "okilydokily").await.unwrap();
    assert_eq!(grant.user.username, "ned");
    assert_eq!(Some(grant.jwt), connector.token_for("ned"));

    assert!(connector.login("ned@leftorium.test", "okilydokily").await.is_ok());
    assert!(connector.login("ned", "wrong").await.is_err());
}

/// Test that mutations require a known token
#[tokio::test]
async fn test_mock_rejects_unknown_token() {
    let connector = MockCmsConnector::seeded();

    let err = connector
        .create_rating("forged", "1", "p1", score(5))
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::Unauthorized(_)));
}

/// Test that comments come back newest first
#[tokio::test]
async fn test_mock_comments_newest_first() {
    let connector = MockCmsConnector::seeded();
    connector.insert_comment("1", "maude", "first");
    connector.insert_comment("1", "rod", "second");
    connector.insert_comment("2", "todd", "elsewhere");

    let page = connector.list_comments(None, "1", 1, 5).await.unwrap();
    let contents: Vec<&str> = page.items.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["second", "first"]);
    assert_eq!(page.pagination.total, 2);
}

/// Test that created comments carry the profile's username
#[tokio::test]
async fn test_mock_create_comment_uses_profile() {
    let connector = MockCmsConnector::seeded();
    let token = connector.token_for("ned").unwrap();
    let user = connector.current_user(&token).await.unwrap();
    let profile = connector.find_profile(&token, &user.id).await.unwrap().unwrap();

    let comment = connector
        .create_comment(&token, "1", Some(&profile.id), "Hi-diddly-ho")
        .await
        .unwrap();
    assert_eq!(comment.author.username, "ned");

    let anonymous = connector
        .create_comment(&token, "1", None, "Who said that?")
        .await
        .unwrap();
    assert_eq!(anonymous.author.username, "Anonymous");
}

/// Test that ratings upsert by id and stats are stored verbatim
#[tokio::test]
async fn test_mock_rating_records_and_stats() {
    let connector = MockCmsConnector::seeded();
    let token = connector.token_for("ned").unwrap();

    assert!(connector.find_rating(&token, "1", "p9").await.unwrap().is_none());
    let created = connector.create_rating(&token, "1", "p9", score(2)).await.unwrap();
    let updated = connector
        .update_rating(&token, &created.id, score(4))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(connector.ratings_for("1").len(), 1);
    assert_eq!(connector.ratings_for("1")[0].score.value(), 4);

    connector
        .update_product_stats(&token, "1", RatingStats::new(4.0, 1))
        .await
        .unwrap();
    assert_eq!(connector.product("1").unwrap().rating, RatingStats::new(4.0, 1));
}

/// Test that injected failures fire until recovered and calls are counted
#[tokio::test]
async fn test_mock_failure_injection() {
    let connector = MockCmsConnector::seeded();
    connector.fail(MockOperation::ListComments);

    let err = connector.list_comments(None, "1", 1, 5).await.unwrap_err();
    assert!(err.is_transient());

    connector.recover(MockOperation::ListComments);
    assert!(connector.list_comments(None, "1", 1, 5).await.is_ok());
    assert_eq!(connector.calls(MockOperation::ListComments), 2);
}

/// Test that registration rejects duplicates and profile creation links the user
#[tokio::test]
async fn test_mock_register_and_profile() {
    let connector = MockCmsConnector::seeded();

    let grant = connector
        .register("rod", "rod@leftorium.test", "secret1")
        .await
        .unwrap();
    assert!(connector
        .find_profile(&grant.jwt, &grant.user.id)
        .await
        .unwrap()
        .is_none());

    let profile = connector.create_profile(&grant.jwt, &grant.user).await.unwrap();
    assert_eq!(profile.username.as_deref(), Some("rod"));

    let duplicate = connector.register("rod", "other@leftorium.test", "secret1").await;
    assert!(duplicate.is_err());
}
