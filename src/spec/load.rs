use super::types::{Api, Fixtures};
use anyhow::Context;
use std::path::Path;

/// Load an API description from a JSON or YAML file, chosen by extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not deserialize into
/// the supported OpenAPI subset.
pub fn load_api(path: &Path) -> anyhow::Result<Api> {
    read_document(path)
}

/// Load a fixtures document (`{"resources": {<name>: <sample object>}}`)
/// from a JSON or YAML file.
pub fn load_fixtures(path: &Path) -> anyhow::Result<Fixtures> {
    read_document(path)
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML_API: &str = r#"
paths:
  /v1/charges/{id}:
    get:
      operationId: retrieve_charge
      responses:
        "200":
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/charge'
components:
  schemas:
    charge:
      type: object
      x-resourceId: charge
      properties:
        id: { type: string }
"#;

    #[test]
    fn loads_yaml_and_json_alike() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(YAML_API.as_bytes()).unwrap();
        let from_yaml = load_api(yaml.path()).unwrap();

        let value: serde_json::Value = serde_yaml::from_str(YAML_API).unwrap();
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(serde_json::to_string(&value).unwrap().as_bytes())
            .unwrap();
        let from_json = load_api(json.path()).unwrap();

        for api in [&from_yaml, &from_json] {
            assert_eq!(api.paths.len(), 1);
            let item = &api.paths["/v1/charges/{id}"];
            let op = item.get.as_ref().unwrap();
            assert_eq!(op.operation_id.as_deref(), Some("retrieve_charge"));
            assert!(op.ok_response_schema().is_some());
            assert_eq!(
                api.components.schemas["charge"].resource_id.as_deref(),
                Some("charge")
            );
        }
    }

    #[test]
    fn fixtures_expose_resources_by_name() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"resources": {"charge": {"id": "ch_1"}}}"#)
            .unwrap();
        let fixtures = load_fixtures(file.path()).unwrap();
        assert_eq!(fixtures.get("charge").unwrap()["id"], "ch_1");
        assert!(fixtures.get("refund").is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_api(Path::new("/nonexistent/openapi.yaml")).is_err());
    }
}
