use std::time::Duration;

use chirper_storage::{ChirpRepository, DatabaseConfig, NewChirp, PostgresRepository, SslMode, StorageError};
use chirper_test_infra::postgres::{PostgresConfig, PostgresServer};

struct Fixture {
    _postgres: PostgresServer,
    repo: PostgresRepository,
}

impl Fixture {
    async fn start() -> Self {
        let postgres = PostgresServer::new(PostgresConfig::builder().build())
            .await
            .expect("start postgres");
        let config = DatabaseConfig::builder()
            .host(postgres.host().await.expect("postgres host"))
            .port(postgres.port().await.expect("postgres port"))
            .username(postgres.username())
            .password(postgres.password())
            .database(postgres.database())
            .ssl_mode(SslMode::Disable)
            .build();
        let repo = connect_with_retry(&config).await;

        repo.ensure_schema().await.expect("create schema");

        Self {
            _postgres: postgres,
            repo,
        }
    }

    async fn count_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.repo.pool())
            .await
            .unwrap()
    }

    async fn backdate(&self, chirp_id: i32, created_at: &str) {
        sqlx::query("UPDATE chirps SET created_at = $1::timestamp WHERE id = $2")
            .bind(created_at)
            .bind(chirp_id)
            .execute(self.repo.pool())
            .await
            .unwrap();
    }
}

async fn connect_with_retry(config: &DatabaseConfig) -> PostgresRepository {
    let mut last_error = None;

    for _ in 0..20 {
        match PostgresRepository::connect(config).await {
            Ok(repo) => return repo,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect postgres: {last_error:?}");
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn sorted(mut tags: Vec<String>) -> Vec<String> {
    tags.sort();
    tags
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn create_then_get_returns_full_tag_set() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .create_chirp(NewChirp::new("test_message", "test_user", ["tag1", "tag2"]))
        .await
        .unwrap();

    let chirps = fixture.repo.get_chirps(&tags(&["tag1"])).await.unwrap();
    assert_eq!(chirps.len(), 1);
    assert_eq!(chirps[0].message, "test_message");
    assert_eq!(chirps[0].author, "test_user");
    assert_eq!(sorted(chirps[0].tags.clone()), tags(&["tag1", "tag2"]));
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn ensure_schema_is_idempotent() {
    let fixture = Fixture::start().await;

    fixture.repo.ensure_schema().await.unwrap();
    fixture.repo.ensure_schema().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn same_author_and_tag_reuse_existing_rows() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .create_chirp(NewChirp::new("first", "alice", ["shared"]))
        .await
        .unwrap();
    fixture
        .repo
        .create_chirp(NewChirp::new("second", "alice", ["shared"]))
        .await
        .unwrap();

    assert_eq!(fixture.count_rows("users").await, 1);
    assert_eq!(fixture.count_rows("tags").await, 1);
    assert_eq!(fixture.count_rows("chirps").await, 2);
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn duplicate_tags_in_one_chirp_produce_one_link() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .create_chirp(NewChirp::new("dup", "alice", ["x", "x"]))
        .await
        .unwrap();

    assert_eq!(fixture.count_rows("tags").await, 1);
    assert_eq!(fixture.count_rows("chirps_tags").await, 1);
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn failing_tag_rolls_back_the_whole_chirp() {
    let fixture = Fixture::start().await;
    let too_long = "t".repeat(66);

    let err = fixture
        .repo
        .create_chirp(NewChirp::new(
            "doomed",
            "new_user",
            ["tag1", "tag2", too_long.as_str()],
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Query(_)));
    assert_eq!(fixture.count_rows("users").await, 0);
    assert_eq!(fixture.count_rows("chirps").await, 0);
    assert_eq!(fixture.count_rows("tags").await, 0);
    assert_eq!(fixture.count_rows("chirps_tags").await, 0);
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn zero_tag_chirp_is_listed_only_without_filter() {
    let fixture = Fixture::start().await;

    fixture
        .repo
        .create_chirp(NewChirp::new("bare", "alice", Vec::<String>::new()))
        .await
        .unwrap();

    assert_eq!(fixture.count_rows("chirps_tags").await, 0);
    assert!(fixture
        .repo
        .get_chirps(&tags(&["tag1"]))
        .await
        .unwrap()
        .is_empty());

    let all = fixture.repo.get_chirps(&[]).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].tags.is_empty());
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn count_includes_start_and_excludes_end() {
    let fixture = Fixture::start().await;

    let id = fixture
        .repo
        .create_chirp(NewChirp::new("test_message", "test_user", ["tag1"]))
        .await
        .unwrap();
    fixture.backdate(id, "2016-01-01").await;

    let filter = tags(&["tag1"]);
    assert_eq!(
        fixture
            .repo
            .count_chirps("2016-01-01", "2016-01-02", &filter)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        fixture
            .repo
            .count_chirps("2016-01-02", "2016-01-03", &filter)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn count_counts_multi_tag_chirp_once() {
    let fixture = Fixture::start().await;

    let id = fixture
        .repo
        .create_chirp(NewChirp::new("both", "alice", ["tag1", "tag2"]))
        .await
        .unwrap();
    fixture.backdate(id, "2016-01-01 08:30:00").await;

    let count = fixture
        .repo
        .count_chirps("2016-01-01", "2016-01-02", &tags(&["tag1", "tag2"]))
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn count_with_malformed_date_is_an_execution_error() {
    let fixture = Fixture::start().await;

    let err = fixture
        .repo
        .count_chirps("not-a-date", "2016-01-02", &tags(&["tag1"]))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Query(_)));
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn count_without_tags_covers_every_chirp_in_range() {
    let fixture = Fixture::start().await;

    let bare = fixture
        .repo
        .create_chirp(NewChirp::new("bare", "alice", Vec::<String>::new()))
        .await
        .unwrap();
    let tagged = fixture
        .repo
        .create_chirp(NewChirp::new("tagged", "bob", ["tag1"]))
        .await
        .unwrap();
    let later = fixture
        .repo
        .create_chirp(NewChirp::new("later", "bob", ["tag1"]))
        .await
        .unwrap();
    fixture.backdate(bare, "2016-01-01 09:00:00").await;
    fixture.backdate(tagged, "2016-01-01 10:00:00").await;
    fixture.backdate(later, "2016-01-02").await;

    let count = fixture
        .repo
        .count_chirps("2016-01-01", "2016-01-02", &[])
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
#[ignore = "requires a docker daemon"]
async fn concurrent_creates_with_reversed_tag_order_all_succeed() {
    let fixture = Fixture::start().await;
    let mut tasks = tokio::task::JoinSet::new();

    for i in 0..40 {
        let repo = fixture.repo.clone();
        let order = if i % 2 == 0 { ["rust", "go"] } else { ["go", "rust"] };
        tasks.spawn(async move {
            let author = format!("user{}", i % 3);
            repo.create_chirp(NewChirp::new(format!("chirp {i}"), author, order))
                .await
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined.unwrap() {
            failures.push(err);
        }
    }

    assert!(failures.is_empty(), "failed creates: {failures:?}");
    assert_eq!(fixture.count_rows("chirps").await, 40);
    assert_eq!(fixture.count_rows("tags").await, 2);
    assert_eq!(fixture.count_rows("users").await, 3);
    assert_eq!(fixture.count_rows("chirps_tags").await, 80);
}
