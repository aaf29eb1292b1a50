//! エンティティフィクスチャ
//!
//! A fixture creates one entity through the service before a scenario body
//! runs and deletes it afterwards. Teardown runs on every exit path:
//!
//! - [`with_fixture`] deletes after the body returns `Ok`, `Err`, or panics
//!   (the panic is resumed once the entity is gone);
//! - dropping an unreleased [`Fixture`] (e.g. a cancelled scenario) schedules
//!   a best-effort delete on the current Tokio runtime. The same holds while
//!   the create request or the final delete is still in flight.
//!
//! Setup failures surface as [`ContractError::FixtureSetup`], never as an
//! assertion failure of the scenario.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use rand::RngExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::PetstoreClient;
use crate::common::{ContractError, HarnessResult};
use crate::types::{Order, Pet, PetStatus};

/// Lowest identifier handed out to fixtures (keeps clear of small sentinels)
const FIXTURE_ID_BASE: i64 = 100_000;

/// Size of the fixture identifier range
const FIXTURE_ID_SPAN: i64 = 900_000_000;

/// Entity that can be created and deleted through the REST surface
pub trait FixtureEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind label used in logs and errors
    const KIND: &'static str;

    /// Identifier of this entity
    fn id(&self) -> i64;

    /// Collection path accepting `POST`
    fn create_path() -> &'static str;

    /// Path addressing one entity (`GET` / `DELETE`)
    fn resource_path(id: i64) -> String;
}

impl FixtureEntity for Pet {
    const KIND: &'static str = "pet";

    fn id(&self) -> i64 {
        self.id
    }

    fn create_path() -> &'static str {
        "/pet"
    }

    fn resource_path(id: i64) -> String {
        format!("/pet/{id}")
    }
}

impl FixtureEntity for Order {
    const KIND: &'static str = "order";

    fn id(&self) -> i64 {
        self.id
    }

    fn create_path() -> &'static str {
        "/store/order"
    }

    fn resource_path(id: i64) -> String {
        format!("/store/order/{id}")
    }
}

/// Fresh identifier for a fixture entity
///
/// Drawn from `100_000..900_100_000`, so it never equals the default
/// missing-id sentinel.
pub fn allocate_id() -> i64 {
    rand::rng().random_range(FIXTURE_ID_BASE..FIXTURE_ID_BASE + FIXTURE_ID_SPAN)
}

/// Fixed representative pet payload
pub fn representative_pet(id: i64) -> Pet {
    Pet::minimal(id, "Buddy", PetStatus::Available)
        .with_category(1, "Dogs")
        .with_photo_url("https://example.com/photos/buddy.jpg")
        .with_tag(1, "fixture")
}

/// Fixed representative order payload
pub fn representative_order(id: i64, pet_id: i64) -> Order {
    Order::placed(id, pet_id)
}

fn setup_error<E: FixtureEntity>(reason: impl Into<String>) -> ContractError {
    ContractError::FixtureSetup {
        kind: E::KIND,
        reason: reason.into(),
    }
}

/// Deletes an entity on drop unless disarmed
///
/// Armed before the create request is sent and disarmed only once the entity
/// is confirmed gone, so a cancelled setup or teardown still cleans up.
struct TeardownGuard {
    client: PetstoreClient,
    kind: &'static str,
    path: Option<String>,
}

impl TeardownGuard {
    fn armed(client: &PetstoreClient, kind: &'static str, path: String) -> Self {
        Self {
            client: client.clone(),
            kind,
            path: Some(path),
        }
    }

    fn is_armed(&self) -> bool {
        self.path.is_some()
    }

    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for TeardownGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let kind = self.kind;
        let client = self.client.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                match client.delete(&path).await {
                    Ok(response) => {
                        debug!(kind, path = %path, status = response.status, "Deferred fixture teardown finished")
                    }
                    Err(e) => {
                        warn!(kind, path = %path, error = %e, "Deferred fixture teardown failed")
                    }
                }
            });
        } else {
            warn!(kind, path = %path, "Fixture dropped outside a runtime, entity left behind");
        }
    }
}

/// Entity created for the duration of one scenario
pub struct Fixture<E: FixtureEntity> {
    entity: E,
    document: Value,
    guard: TeardownGuard,
}

impl<E: FixtureEntity> std::fmt::Debug for Fixture<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixture")
            .field("kind", &E::KIND)
            .field("id", &self.entity.id())
            .field("released", &!self.guard.is_armed())
            .finish()
    }
}

impl<E: FixtureEntity> Fixture<E> {
    /// Create `payload` through the service
    ///
    /// Any failure (transport, non-2xx status, unreadable body) is a
    /// [`ContractError::FixtureSetup`]. If the call is cancelled or fails in
    /// transport, the payload id is deleted in the background.
    pub async fn acquire(client: &PetstoreClient, payload: E) -> HarnessResult<Self> {
        let mut guard = TeardownGuard::armed(client, E::KIND, E::resource_path(payload.id()));

        let response = client
            .post(E::create_path(), &payload)
            .await
            .map_err(|e| setup_error::<E>(e.to_string()))?;

        if !response.is_success() {
            // 作成されていないので削除は不要
            guard.disarm();
            return Err(setup_error::<E>(format!(
                "{} returned status {}: {}",
                response.context(),
                response.status,
                response.text
            )));
        }

        let parsed = response
            .json_value()
            .map_err(|e| e.to_string())
            .and_then(|document| {
                serde_json::from_value::<E>(document.clone())
                    .map(|entity| (entity, document.clone()))
                    .map_err(|e| format!("created {} is unreadable: {e}", E::KIND))
            });

        let (entity, document) = match parsed {
            Ok(parsed) => parsed,
            Err(reason) => {
                // 作成自体は成功している可能性があるため送信したIDで削除を試みる
                let path = E::resource_path(payload.id());
                match client.delete(&path).await {
                    Ok(_) => guard.disarm(),
                    Err(e) => {
                        warn!(kind = E::KIND, path = %path, error = %e, "Cleanup after failed setup failed")
                    }
                }
                return Err(setup_error::<E>(reason));
            }
        };

        if entity.id() != payload.id() {
            // 送信したIDの削除は置き換えたガードのDropに任せる
            guard = TeardownGuard::armed(client, E::KIND, E::resource_path(entity.id()));
        }

        info!(kind = E::KIND, id = entity.id(), "Fixture created");
        Ok(Self {
            entity,
            document,
            guard,
        })
    }

    /// Typed created entity
    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// Created entity as the service returned it
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Identifier of the created entity
    pub fn id(&self) -> i64 {
        self.entity.id()
    }

    /// Delete the entity now
    ///
    /// A 404 means the scenario already deleted it and is not an error. When
    /// the delete fails or is cancelled, the fixture stays armed and one more
    /// attempt is scheduled on drop.
    pub async fn release(mut self) -> HarnessResult<()> {
        let path = E::resource_path(self.entity.id());
        let response = self.guard.client.delete(&path).await?;
        if response.is_success() || response.status == 404 {
            self.guard.disarm();
            debug!(kind = E::KIND, id = self.entity.id(), status = response.status, "Fixture released");
            Ok(())
        } else {
            Err(ContractError::unexpected_status(
                response.context(),
                200,
                response.status,
                &response.text,
            ))
        }
    }
}

/// Acquire a fixture, run `body` with it, and always delete it afterwards
///
/// `body` receives the typed entity and the raw created document. Its result
/// is returned unchanged; teardown problems are only logged.
pub async fn with_fixture<E, F, Fut, T>(
    client: &PetstoreClient,
    payload: E,
    body: F,
) -> HarnessResult<T>
where
    E: FixtureEntity,
    F: FnOnce(E, Value) -> Fut,
    Fut: Future<Output = HarnessResult<T>>,
{
    let fixture = Fixture::acquire(client, payload).await?;
    let outcome = AssertUnwindSafe(body(fixture.entity().clone(), fixture.document().clone()))
        .catch_unwind()
        .await;

    let id = fixture.id();
    if let Err(e) = fixture.release().await {
        warn!(kind = E::KIND, id, error = %e, "Fixture teardown failed");
    }

    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// [`with_fixture`] with the representative pet under a fresh id
pub async fn with_pet<F, Fut, T>(client: &PetstoreClient, body: F) -> HarnessResult<T>
where
    F: FnOnce(Pet, Value) -> Fut,
    Fut: Future<Output = HarnessResult<T>>,
{
    with_fixture(client, representative_pet(allocate_id()), body).await
}

/// [`with_fixture`] with the representative order under `order_id`
pub async fn with_order<F, Fut, T>(client: &PetstoreClient, order_id: i64, body: F) -> HarnessResult<T>
where
    F: FnOnce(Order, Value) -> Fut,
    Fut: Future<Output = HarnessResult<T>>,
{
    with_fixture(client, representative_order(order_id, 1), body).await
}
