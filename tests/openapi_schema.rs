use serde_json::Value;

#[test]
fn openapi_documents_every_route_and_bearer_auth() -> anyhow::Result<()> {
    let doc = lawfirm::docs::build_openapi(8000);
    let v = serde_json::to_value(&doc)?;

    let paths = v.get("paths").and_then(Value::as_object).cloned().unwrap_or_default();
    for path in [
        "/api/health",
        "/auth/register",
        "/users/assignable",
        "/tasks/{id}",
        "/cases/{id}/documents",
        "/cases/by-number/{case_number}",
        "/documents/{id}/content",
        "/calendar/days/{date}",
        "/dashboard",
    ] {
        assert!(paths.contains_key(path), "OpenAPI is missing path '{}'", path);
    }

    assert!(
        v.pointer("/components/securitySchemes/bearerAuth").is_some(),
        "bearerAuth scheme must be registered"
    );
    assert_eq!(v.pointer("/servers/0/url").and_then(Value::as_str), Some("http://localhost:8000"));

    let task_props = v
        .pointer("/components/schemas/Task/properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for key in ["assignor_id", "assignee_id", "due_date", "status", "priority"] {
        assert!(task_props.contains_key(key), "Task schema missing '{}'", key);
    }

    for schema in ["CaseCreateForm", "DocumentUploadForm"] {
        assert!(
            v.pointer(&format!("/components/schemas/{schema}")).is_some(),
            "multipart form schema '{}' is not registered",
            schema
        );
    }
    assert!(
        v.pointer("/paths/~1cases/post/requestBody/content/multipart~1form-data").is_some(),
        "case creation must document its multipart body"
    );

    Ok(())
}
