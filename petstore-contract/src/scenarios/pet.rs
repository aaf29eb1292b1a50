//! Pet scenarios
//!
//! `/pet` CRUD contract: absent-entity behavior, create echoes, and the
//! fetch / update / delete lifecycle of a fixture pet.

use serde_json::{json, Value};
use tracing::warn;

use super::ScenarioContext;
use crate::client::PetstoreClient;
use crate::common::HarnessResult;
use crate::expect;
use crate::fixture::{allocate_id, with_pet};
use crate::types::{Pet, PetStatus};

/// Name sent when updating the fixture pet
pub const UPDATED_NAME: &str = "Buddy Updated";

/// Best-effort delete of a pet a scenario created outside a fixture
async fn discard_pet(client: &PetstoreClient, id: i64) {
    match client.delete_pet(id).await {
        Ok(response) if response.is_success() || response.status == 404 => {}
        Ok(response) => warn!(id, status = response.status, "Pet cleanup returned unexpected status"),
        Err(e) => warn!(id, error = %e, "Pet cleanup failed"),
    }
}

/// DELETE /pet/{missing} answers 200 with the literal text `Pet deleted`
pub async fn delete_absent_pet(ctx: &ScenarioContext) -> HarnessResult<()> {
    let steps = ctx.steps("delete_absent_pet");

    let response = steps
        .step(
            "send DELETE for a missing pet",
            ctx.client.delete_pet(ctx.config.missing_id),
        )
        .await?;
    steps.check("check status is 200", || expect::status(&response, 200))?;
    steps.check("check body text", || expect::text(&response, "Pet deleted"))?;
    Ok(())
}

/// PUT /pet for a missing id answers 404 with the literal text `Pet not found`
pub async fn update_absent_pet(ctx: &ScenarioContext) -> HarnessResult<()> {
    let steps = ctx.steps("update_absent_pet");

    let payload = Pet::minimal(ctx.config.missing_id, "Non-existent Pet", PetStatus::Available);
    let response = steps
        .step("send PUT for a missing pet", ctx.client.update_pet(&payload))
        .await?;
    steps.check("check status is 404", || expect::status(&response, 404))?;
    steps.check("check body text", || expect::text(&response, "Pet not found"))?;
    Ok(())
}

/// GET /pet/{missing} answers 404
pub async fn fetch_absent_pet(ctx: &ScenarioContext) -> HarnessResult<()> {
    let steps = ctx.steps("fetch_absent_pet");

    let response = steps
        .step("send GET for a missing pet", ctx.client.get_pet(ctx.config.missing_id))
        .await?;
    steps.check("check status is 404", || expect::status(&response, 404))?;
    Ok(())
}

/// POST /pet with `{id, name, status}` echoes the three fields and conforms
/// to the pet schema
pub async fn create_minimal_pet(ctx: &ScenarioContext) -> HarnessResult<()> {
    let steps = ctx.steps("create_minimal_pet");
    let payload = steps.check("prepare minimal payload", || {
        Ok(Pet::minimal(allocate_id(), "Buddy", PetStatus::Available))
    })?;

    let outcome = async {
        let response = steps
            .step("send create request", ctx.client.create_pet(&payload))
            .await?;
        steps.check("check status and schema", || {
            expect::status(&response, 200)?;
            ctx.schema.validate(response.json_value()?)
        })?;
        steps.check("check echoed fields", || {
            let document = response.json_value()?;
            expect::field(document, "id", &json!(payload.id))?;
            expect::field(document, "name", &json!(payload.name))?;
            expect::field(document, "status", &json!(payload.status))
        })
    }
    .await;

    discard_pet(&ctx.client, payload.id).await;
    outcome
}

/// POST /pet with every field echoes all of them verbatim, nested ones
/// included, and conforms to the pet schema
pub async fn create_full_pet(ctx: &ScenarioContext) -> HarnessResult<()> {
    let steps = ctx.steps("create_full_pet");
    let payload = steps.check("prepare full payload", || {
        Ok(Pet::minimal(allocate_id(), "doggie", PetStatus::Available)
            .with_category(1, "Dogs")
            .with_photo_url("string")
            .with_tag(0, "string"))
    })?;

    let outcome = async {
        let response = steps
            .step("send create request", ctx.client.create_pet(&payload))
            .await?;
        steps.check("check status and schema", || {
            expect::status(&response, 200)?;
            ctx.schema.validate(response.json_value()?)
        })?;
        steps.check("check echoed fields", || {
            expect::echoes(&payload, response.json_value()?)
        })
    }
    .await;

    discard_pet(&ctx.client, payload.id).await;
    outcome
}

/// GET /pet/{id} of a fixture pet answers 200 with the same id
pub async fn fetch_pet_by_id(ctx: &ScenarioContext) -> HarnessResult<()> {
    let steps = ctx.steps("fetch_pet_by_id");

    with_pet(&ctx.client, |pet, _created| async move {
        let response = steps
            .step("send GET for the fixture pet", ctx.client.get_pet(pet.id))
            .await?;
        steps.check("check status and id", || {
            expect::status(&response, 200)?;
            expect::field(response.json_value()?, "id", &json!(pet.id))
        })
    })
    .await
}

/// PUT /pet changes name and status of a fixture pet and leaves the id and
/// the fields it did not mention untouched
pub async fn update_pet(ctx: &ScenarioContext) -> HarnessResult<()> {
    let steps = ctx.steps("update_pet");

    with_pet(&ctx.client, |pet, created| async move {
        let response = steps
            .step("confirm fixture pet exists", ctx.client.get_pet(pet.id))
            .await?;
        steps.check("check fixture status is 200", || expect::status(&response, 200))?;

        let update = json!({"id": pet.id, "name": UPDATED_NAME, "status": PetStatus::Sold});
        let response = steps
            .step("send PUT with new name and status", ctx.client.update_pet(&update))
            .await?;
        steps.check("check status is 200", || expect::status(&response, 200))?;
        steps.check("check updated fields", || {
            let document = response.json_value()?;
            expect::field(document, "id", &json!(pet.id))?;
            expect::field(document, "name", &json!(UPDATED_NAME))?;
            expect::field(document, "status", &json!(PetStatus::Sold))
        })?;

        let response = steps
            .step("fetch pet after update", ctx.client.get_pet(pet.id))
            .await?;
        steps.check("check untouched fields persisted", || {
            expect::status(&response, 200)?;
            let document = response.json_value()?;
            for name in ["category", "photoUrls"] {
                let original = created.get(name).unwrap_or(&Value::Null);
                expect::field(document, name, original)?;
            }
            Ok(())
        })
    })
    .await
}

/// DELETE /pet/{id} of a fixture pet answers 200, after which GET answers 404
pub async fn delete_pet(ctx: &ScenarioContext) -> HarnessResult<()> {
    let steps = ctx.steps("delete_pet");

    with_pet(&ctx.client, |pet, _created| async move {
        let response = steps
            .step("confirm fixture pet exists", ctx.client.get_pet(pet.id))
            .await?;
        steps.check("check fixture status is 200", || expect::status(&response, 200))?;

        let response = steps
            .step("send DELETE for the fixture pet", ctx.client.delete_pet(pet.id))
            .await?;
        steps.check("check delete status is 200", || expect::status(&response, 200))?;

        let response = steps
            .step("fetch pet after delete", ctx.client.get_pet(pet.id))
            .await?;
        steps.check("check pet is gone (404)", || expect::status(&response, 404))
    })
    .await
}
