use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dto::{Review, ReviewAuthor, ReviewView, SubmitReviewRequest, SubmittedReview};
use super::repo::ReviewLedgerRepo;
use super::retry::RetryPolicy;
use crate::auth::Identity;
use crate::error::AppError;
use crate::storage::StorageClient;
use crate::store::StoreError;

const IMAGE_URL_TTL_SECS: u64 = 30 * 60;
const MAX_COMMENT_CHARS: usize = 4000;

/// Validated review input.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub rating: u8,
    pub comment: String,
    pub image_ref: Option<String>,
}

impl NewReview {
    pub fn parse(recipe_id: Uuid, req: SubmitReviewRequest) -> Result<Self, AppError> {
        let rating = match req.rating {
            None => return Err(AppError::Validation("Please select a rating.".into())),
            Some(r @ 1..=5) => r as u8,
            Some(r) => {
                return Err(AppError::Validation(format!(
                    "rating must be between 1 and 5, got {r}"
                )))
            }
        };

        let comment = req.comment.trim().to_string();
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::Validation("comment is too long".into()));
        }

        let image_ref = req.image_ref.filter(|r| !r.trim().is_empty());
        if let Some(r) = &image_ref {
            if !r.starts_with(&image_prefix(recipe_id)) {
                return Err(AppError::Validation(
                    "image does not belong to this recipe".into(),
                ));
            }
        }

        Ok(Self {
            rating,
            comment,
            image_ref,
        })
    }
}

/// Appends a review and folds its rating into the recipe's aggregate as one
/// atomic unit.
///
/// The aggregate is read, recomputed and written back conditionally on the
/// version that was read. When another submission commits first the whole
/// read-modify-write starts over after a backoff, so concurrent reviews are
/// never lost. Gives up with [`AppError::RetriesExhausted`] after
/// `policy.max_attempts` tries.
pub async fn submit_review<L: ReviewLedgerRepo + ?Sized>(
    ledger: &L,
    policy: &RetryPolicy,
    recipe_id: Uuid,
    user: &Identity,
    input: NewReview,
) -> Result<SubmittedReview, AppError> {
    let author = ReviewAuthor {
        id: user.id,
        display_name: user
            .display_name
            .clone()
            .unwrap_or_else(|| "Anonymous".to_string()),
        photo_ref: user.photo_ref.clone(),
    };

    let mut attempt = 0;
    loop {
        attempt += 1;

        let snapshot = ledger
            .load_snapshot(recipe_id)
            .await?
            .ok_or(AppError::NotFound("Recipe"))?;

        let review = Review {
            id: Uuid::new_v4(),
            recipe_id,
            author: author.clone(),
            rating: input.rating,
            comment: input.comment.clone(),
            image_ref: input.image_ref.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        let next = snapshot.rating.with_rating(input.rating);

        match ledger.commit_review(&review, snapshot.version, next).await {
            Ok(()) => {
                info!(
                    %recipe_id,
                    review_id = %review.id,
                    count = next.count,
                    attempt,
                    "review committed"
                );
                return Ok(SubmittedReview {
                    review,
                    rating: next,
                });
            }
            Err(StoreError::Conflict) if attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                debug!(%recipe_id, attempt, ?delay, "ledger conflict, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(StoreError::Conflict) => {
                warn!(%recipe_id, attempt, "ledger retries exhausted");
                return Err(AppError::RetriesExhausted);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Reviews newest first, with image references turned into short-lived URLs.
pub async fn list_reviews<L: ReviewLedgerRepo + ?Sized>(
    ledger: &L,
    storage: &dyn StorageClient,
    recipe_id: Uuid,
) -> Result<Vec<ReviewView>, AppError> {
    if ledger.load_snapshot(recipe_id).await?.is_none() {
        return Err(AppError::NotFound("Recipe"));
    }

    let reviews = ledger.list_reviews(recipe_id).await?;
    let mut out = Vec::with_capacity(reviews.len());
    for review in reviews {
        let image_url = match &review.image_ref {
            Some(key) => match storage.presign_get(key, IMAGE_URL_TTL_SECS).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(error = %e, review_id = %review.id, "presign review image failed");
                    None
                }
            },
            None => None,
        };
        out.push(ReviewView { review, image_url });
    }
    Ok(out)
}

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
    pub file_name: Option<&'a str>,
}

/// Stores a review photo and returns the opaque reference to pass along with
/// the review.
pub async fn upload_review_image<L: ReviewLedgerRepo + ?Sized>(
    ledger: &L,
    storage: &dyn StorageClient,
    recipe_id: Uuid,
    user_id: Uuid,
    image: UploadItem<'_>,
) -> Result<String, AppError> {
    if image.body.is_empty() {
        return Err(AppError::Validation("image is empty".into()));
    }
    let ext = ext_from_mime(image.content_type)
        .ok_or_else(|| AppError::Validation(format!("unsupported image type {}", image.content_type)))?;

    if ledger.load_snapshot(recipe_id).await?.is_none() {
        return Err(AppError::NotFound("Recipe"));
    }

    let stamp = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let name = image
        .file_name
        .map(sanitize_file_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("image.{ext}"));
    let key = format!("{}{}-{}-{}", image_prefix(recipe_id), user_id, stamp, name);

    storage
        .put_object(&key, image.body, image.content_type)
        .await
        .with_context(|| format!("put_object {}", key))
        .map_err(AppError::ObjectStorage)?;

    info!(%recipe_id, %user_id, key = %key, "review image stored");
    Ok(key)
}

fn image_prefix(recipe_id: Uuid) -> String {
    format!("review-images/{}/", recipe_id)
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(80)
        .collect()
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::dto::{AggregateRating, RecipeDraft};
    use crate::recipes::repo::RecipeRepo;
    use crate::reviews::repo::LedgerSnapshot;
    use crate::storage::MemoryStorage;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::sync::Barrier;

    fn draft() -> RecipeDraft {
        RecipeDraft {
            title: "Shakshuka".into(),
            description: String::new(),
            prep_time: "10 mins".into(),
            cook_time: "20 mins".into(),
            ingredients: vec!["4 eggs".into(), "1 can tomatoes".into()],
            instructions: vec!["Simmer".into(), "Crack eggs".into()],
            nutrition: None,
            beverage_pairing: None,
        }
    }

    fn input(rating: u8) -> NewReview {
        NewReview {
            rating,
            comment: "tasty".into(),
            image_ref: None,
        }
    }

    async fn seeded() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let recipe = store.insert_recipe(Uuid::new_v4(), &draft()).await.unwrap();
        (store, recipe.id)
    }

    /// Holds the first `gate` snapshot reads until all of them have happened,
    /// so concurrent submissions are guaranteed to start from the same
    /// version and race on commit.
    struct Interleaved {
        inner: MemoryStore,
        barrier: Barrier,
        gate: u32,
        reads: AtomicU32,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl ReviewLedgerRepo for Interleaved {
        async fn load_snapshot(&self, recipe_id: Uuid) -> Result<Option<LedgerSnapshot>, StoreError> {
            let snapshot = self.inner.load_snapshot(recipe_id).await?;
            if self.reads.fetch_add(1, Ordering::SeqCst) < self.gate {
                self.barrier.wait().await;
            }
            Ok(snapshot)
        }

        async fn commit_review(
            &self,
            review: &Review,
            expected_version: i64,
            next: AggregateRating,
        ) -> Result<(), StoreError> {
            let res = self.inner.commit_review(review, expected_version, next).await;
            if matches!(res, Err(StoreError::Conflict)) {
                self.conflicts.fetch_add(1, Ordering::SeqCst);
            }
            res
        }

        async fn list_reviews(&self, recipe_id: Uuid) -> Result<Vec<Review>, StoreError> {
            self.inner.list_reviews(recipe_id).await
        }
    }

    /// Every commit loses, as if another writer always got there first.
    struct AlwaysConflicting(MemoryStore);

    #[async_trait]
    impl ReviewLedgerRepo for AlwaysConflicting {
        async fn load_snapshot(&self, recipe_id: Uuid) -> Result<Option<LedgerSnapshot>, StoreError> {
            self.0.load_snapshot(recipe_id).await
        }

        async fn commit_review(&self, _: &Review, _: i64, _: AggregateRating) -> Result<(), StoreError> {
            Err(StoreError::Conflict)
        }

        async fn list_reviews(&self, recipe_id: Uuid) -> Result<Vec<Review>, StoreError> {
            self.0.list_reviews(recipe_id).await
        }
    }

    #[tokio::test]
    async fn first_review_sets_the_aggregate() {
        let (store, recipe_id) = seeded().await;
        let user = Identity::anonymous(Uuid::new_v4());

        let out = submit_review(&store, &RetryPolicy::immediate(3), recipe_id, &user, input(4))
            .await
            .unwrap();
        assert_eq!(out.rating, AggregateRating { count: 1, average: Some(4.0) });
        assert_eq!(out.review.author.display_name, "Anonymous");

        let snap = store.load_snapshot(recipe_id).await.unwrap().unwrap();
        assert_eq!(snap.rating, out.rating);
        assert_eq!(store.list_reviews(recipe_id).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_reviews_are_both_counted() {
        let (store, recipe_id) = seeded().await;
        let ledger = Arc::new(Interleaved {
            inner: store,
            barrier: Barrier::new(2),
            gate: 2,
            reads: AtomicU32::new(0),
            conflicts: AtomicU32::new(0),
        });
        let policy = RetryPolicy::immediate(5);

        let a = {
            let (ledger, policy) = (ledger.clone(), policy.clone());
            tokio::spawn(async move {
                let user = Identity::anonymous(Uuid::new_v4());
                submit_review(ledger.as_ref(), &policy, recipe_id, &user, input(4)).await
            })
        };
        let b = {
            let (ledger, policy) = (ledger.clone(), policy.clone());
            tokio::spawn(async move {
                let user = Identity::anonymous(Uuid::new_v4());
                submit_review(ledger.as_ref(), &policy, recipe_id, &user, input(5)).await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let snap = ledger.inner.load_snapshot(recipe_id).await.unwrap().unwrap();
        assert_eq!(snap.rating.count, 2);
        assert_eq!(snap.rating.average, Some(4.5));
        assert_eq!(ledger.conflicts.load(Ordering::SeqCst), 1);

        let reviews = ledger.inner.list_reviews(recipe_id).await.unwrap();
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        assert_eq!(reviews.len(), 2);
        assert_eq!(f64::from(sum) / 2.0, 4.5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_concurrent_reviews_keep_the_average_exact() {
        let (store, recipe_id) = seeded().await;
        let store = Arc::new(store);
        let policy = RetryPolicy {
            max_attempts: 50,
            base_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(5),
        };

        let mut handles = Vec::new();
        for i in 0..20u8 {
            let (store, policy) = (store.clone(), policy.clone());
            handles.push(tokio::spawn(async move {
                let user = Identity::anonymous(Uuid::new_v4());
                submit_review(store.as_ref(), &policy, recipe_id, &user, input(i % 5 + 1)).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let snap = store.load_snapshot(recipe_id).await.unwrap().unwrap();
        let reviews = store.list_reviews(recipe_id).await.unwrap();
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
        assert_eq!(snap.rating.count, 20);
        assert_eq!(reviews.len(), 20);
        assert!((snap.rating.average.unwrap() - f64::from(sum) / 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn exhausted_retries_write_nothing() {
        let (store, recipe_id) = seeded().await;
        let ledger = AlwaysConflicting(store);
        let user = Identity::anonymous(Uuid::new_v4());

        let err = submit_review(&ledger, &RetryPolicy::immediate(3), recipe_id, &user, input(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RetriesExhausted));

        let snap = ledger.0.load_snapshot(recipe_id).await.unwrap().unwrap();
        assert_eq!(snap.rating.count, 0);
        assert!(ledger.0.list_reviews(recipe_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_recipe_is_not_found() {
        let store = MemoryStore::new();
        let user = Identity::anonymous(Uuid::new_v4());
        let err = submit_review(&store, &RetryPolicy::immediate(3), Uuid::new_v4(), &user, input(3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Recipe")));
    }

    #[test]
    fn input_validation() {
        let recipe_id = Uuid::new_v4();
        let req = |rating: Option<i64>, image_ref: Option<&str>| SubmitReviewRequest {
            rating,
            comment: "  nice  ".into(),
            image_ref: image_ref.map(str::to_string),
        };

        assert!(matches!(NewReview::parse(recipe_id, req(None, None)), Err(AppError::Validation(_))));
        assert!(matches!(NewReview::parse(recipe_id, req(Some(0), None)), Err(AppError::Validation(_))));
        assert!(matches!(NewReview::parse(recipe_id, req(Some(6), None)), Err(AppError::Validation(_))));
        assert!(matches!(
            NewReview::parse(recipe_id, req(Some(3), Some("review-images/someone-else/x.jpg"))),
            Err(AppError::Validation(_))
        ));

        let own = format!("review-images/{recipe_id}/u-1-x.jpg");
        let ok = NewReview::parse(recipe_id, req(Some(5), Some(&own))).unwrap();
        assert_eq!(ok.rating, 5);
        assert_eq!(ok.comment, "nice");
        assert_eq!(ok.image_ref.as_deref(), Some(own.as_str()));
    }

    #[tokio::test]
    async fn uploaded_images_are_listed_with_urls() {
        let (store, recipe_id) = seeded().await;
        let storage = MemoryStorage::default();
        let user = Identity::anonymous(Uuid::new_v4());

        let key = upload_review_image(
            &store,
            &storage,
            recipe_id,
            user.id,
            UploadItem {
                body: Bytes::from_static(b"\xff\xd8\xff"),
                content_type: "image/jpeg",
                file_name: Some("my photo!.jpg"),
            },
        )
        .await
        .unwrap();
        assert!(key.starts_with(&format!("review-images/{recipe_id}/{}-", user.id)));
        assert!(key.ends_with("-myphoto.jpg"));

        let input = NewReview::parse(
            recipe_id,
            SubmitReviewRequest {
                rating: Some(5),
                comment: String::new(),
                image_ref: Some(key.clone()),
            },
        )
        .unwrap();
        submit_review(&store, &RetryPolicy::immediate(1), recipe_id, &user, input)
            .await
            .unwrap();

        let views = list_reviews(&store, &storage, recipe_id).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].image_url.as_deref(), Some(format!("memory://{key}").as_str()));
    }

    #[tokio::test]
    async fn upload_rejects_non_images() {
        let (store, recipe_id) = seeded().await;
        let err = upload_review_image(
            &store,
            &MemoryStorage::default(),
            recipe_id,
            Uuid::new_v4(),
            UploadItem {
                body: Bytes::from_static(b"hello"),
                content_type: "text/plain",
                file_name: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }
}
