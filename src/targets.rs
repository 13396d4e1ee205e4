use serde::{Deserialize, Serialize};

use crate::structs::{IzError, Target, TargetType};
use crate::IzClient;

#[derive(Deserialize)]
struct TargetList {
    targets: Vec<Target>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTarget<'a> {
    name: &'a str,
    target_type: TargetType,
    reference_data_source: &'a str,
}

/// Lists every target in the account's library, in the order the API returns
/// them.
pub async fn list_targets(client: &IzClient) -> Result<Vec<Target>, IzError> {
    let value = client.get("/targets").await?;
    let list: TargetList = serde_json::from_value(value)?;
    Ok(list.targets)
}

/// Returns the first target whose name matches exactly, if any.
///
/// Name uniqueness is a caller convention; the API does not enforce it.
pub fn find_by_name<'a>(targets: &'a [Target], name: &str) -> Option<&'a Target> {
    targets.iter().find(|target| target.name == name)
}

/// Creates a target and returns it with its assigned id.
pub async fn create_target(
    client: &IzClient,
    name: &str,
    target_type: TargetType,
    reference_data_source: &str,
) -> Result<Target, IzError> {
    let value = client
        .post_json(
            "/targets",
            &CreateTarget {
                name,
                target_type,
                reference_data_source,
            },
        )
        .await?;
    Ok(serde_json::from_value(value)?)
}

/// Deletes a target by id.
pub async fn delete_target(client: &IzClient, id: &str) -> Result<(), IzError> {
    client.delete(&format!("/targets/{}", id)).await?;
    Ok(())
}
