//! Integration tests for editor crate

use mailforge_editor::{
    apply_records, diff, revert_records, ChangeOperation, ChangeRecord, ChangeStatus, ChangeType, DocumentStore,
    EditorError, EmailDocument, MemoryStore, PatchError, ReviewService, ReviewState,
};
use mailforge_model::{normalize_template, ElementProperties, Template};
use serde_json::{json, Value};

fn template(value: Value) -> Template {
    normalize_template(&value).unwrap()
}

fn newsletter() -> Value {
    json!({
        "id": "news",
        "name": "Monthly news",
        "sections": [
            {
                "id": "s1",
                "styles": { "padding": "24px" },
                "elements": [
                    { "id": "logo", "type": "logo", "properties": { "image": { "src": "https://x.com/logo.png" } } },
                    { "id": "h1", "type": "header", "content": "March update" }
                ]
            },
            {
                "id": "s2",
                "elements": [
                    { "id": "t1", "type": "text", "content": "Lots happened." },
                    { "id": "b1", "type": "button", "content": "Read more", "properties": { "href": "#" } },
                    { "id": "d1", "type": "divider" }
                ]
            },
            {
                "id": "s3",
                "elements": [
                    { "id": "f1", "type": "footer", "properties": { "companyName": "Acme" } }
                ]
            }
        ]
    })
}

fn rewritten() -> Value {
    json!({
        "id": "news",
        "name": "Monthly news",
        "sections": [
            {
                "id": "s1",
                "styles": { "padding": "24px" },
                "elements": [
                    { "id": "logo", "type": "logo", "properties": { "image": { "src": "https://x.com/logo.png" } } },
                    { "id": "h1", "type": "header", "content": "April update" },
                    { "id": "hero", "type": "hero", "properties": { "heading": "Spring sale" } }
                ]
            },
            {
                "id": "s2",
                "elements": [
                    { "id": "b1", "type": "button", "content": "Read more", "properties": { "href": "https://x.com" } },
                    { "id": "q1", "type": "quote", "content": "Best month yet" }
                ]
            },
            {
                "id": "s3",
                "elements": [
                    { "id": "f1", "type": "footer", "properties": { "companyName": "Acme" } },
                    { "id": "d1", "type": "divider" }
                ]
            }
        ]
    })
}

fn kinds(records: &[ChangeRecord]) -> Vec<(&str, ChangeType)> {
    records
        .iter()
        .map(|r| (r.element_id.as_str(), r.change_type()))
        .collect()
}

#[test]
fn test_first_draft_add_record() {
    let t = template(json!({
        "id": "t",
        "sections": [{ "id": "s1", "elements": [{ "id": "h1", "type": "header", "content": "Hi" }] }]
    }));

    let records = diff(None, &t);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].element_id, "h1");
    assert_eq!(records[0].change_type(), ChangeType::Add);
    assert!(records[0].change.old_content().is_none());
    assert_eq!(records[0].change.new_content().unwrap().target_section_id, "s1");

    let wire = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(wire["changeType"], "add");
    assert_eq!(wire["newContent"]["targetSectionId"], "s1");
}

#[test]
fn test_edit_record_carries_both_hrefs() {
    let old = template(json!({
        "id": "t",
        "sections": [{ "id": "s1", "elements": [{ "id": "b1", "type": "button", "properties": { "href": "#" } }] }]
    }));
    let new = template(json!({
        "id": "t",
        "sections": [{ "id": "s1", "elements": [{ "id": "b1", "type": "button", "properties": { "href": "https://x.com" } }] }]
    }));

    let records = diff(Some(&old), &new);
    assert_eq!(kinds(&records), vec![("b1", ChangeType::Edit)]);

    let href = |properties: &ElementProperties| match properties {
        ElementProperties::Button(props) => props.href.clone(),
        other => panic!("unexpected properties {:?}", other),
    };
    let old_content = records[0].change.old_content().unwrap();
    let new_content = records[0].change.new_content().unwrap();
    assert_eq!(href(&old_content.element.properties).as_deref(), Some("#"));
    assert_eq!(href(&new_content.element.properties).as_deref(), Some("https://x.com"));
}

#[test]
fn test_delete_record_names_original_section() {
    let old = template(json!({
        "id": "t",
        "sections": [
            { "id": "s1", "elements": [] },
            { "id": "s2", "elements": [{ "id": "t1", "type": "text", "content": "Bye" }] }
        ]
    }));
    let new = template(json!({
        "id": "t",
        "sections": [{ "id": "s1", "elements": [] }, { "id": "s2", "elements": [] }]
    }));

    let records = diff(Some(&old), &new);
    assert_eq!(kinds(&records), vec![("t1", ChangeType::Delete)]);
    let wire = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(wire["oldContent"]["originalSectionId"], "s2");
    assert!(wire["newContent"].is_null());
    assert!(wire.as_object().unwrap().contains_key("newContent"));
}

#[test]
fn test_diff_of_identical_templates_is_empty() {
    let a = template(newsletter());
    assert!(diff(Some(&a), &a).is_empty());

    // Explicit nulls and omitted keys normalize alike
    let mut raw = newsletter();
    raw["sections"][1]["elements"][0]["properties"] = json!({ "typography": null });
    let b = template(raw);
    assert!(diff(Some(&a), &b).is_empty());
}

#[test]
fn test_apply_diff_reconstructs_target() {
    let a = template(newsletter());
    let b = template(rewritten());

    let records = diff(Some(&a), &b);
    assert_eq!(
        kinds(&records),
        vec![
            ("h1", ChangeType::Edit),
            ("hero", ChangeType::Add),
            ("b1", ChangeType::Edit),
            ("q1", ChangeType::Add),
            ("d1", ChangeType::Edit),
            ("t1", ChangeType::Delete),
        ]
    );

    let mut patched = a.clone();
    let skipped = apply_records(&mut patched, &records);
    assert!(skipped.is_empty());
    assert_eq!(patched, b);
}

#[test]
fn test_apply_then_revert_restores_original() {
    let a = template(newsletter());
    let b = template(rewritten());
    let records = diff(Some(&a), &b);

    let mut patched = a.clone();
    apply_records(&mut patched, &records);
    let all: Vec<&ChangeRecord> = records.iter().collect();
    let skipped = revert_records(&mut patched, &all);

    assert!(skipped.is_empty());
    assert_eq!(patched, a);
    assert_eq!(serde_json::to_string(&patched).unwrap(), serde_json::to_string(&a).unwrap());
}

#[test]
fn test_revert_skips_records_whose_section_vanished() {
    let a = template(newsletter());
    let b = template(rewritten());
    let records = diff(Some(&a), &b);

    let mut patched = a.clone();
    apply_records(&mut patched, &records);
    patched.sections.retain(|s| s.id != "s2");

    let all: Vec<&ChangeRecord> = records.iter().collect();
    let skipped = revert_records(&mut patched, &all);

    let mut skipped_ids: Vec<&str> = skipped.iter().map(|s| s.element_id.as_str()).collect();
    skipped_ids.sort();
    assert_eq!(skipped_ids, vec!["b1", "d1", "q1", "t1"]);
    assert!(skipped
        .iter()
        .any(|s| s.element_id == "t1" && s.error == PatchError::SectionMissing("s2".to_string())));
    assert!(skipped
        .iter()
        .any(|s| s.element_id == "q1" && s.error == PatchError::ElementNotFound("q1".to_string())));

    // Unrelated records still reverted
    assert_eq!(patched.find_element("h1").unwrap().1.content, "March update");
    assert!(patched.find_element("hero").is_none());
    assert_eq!(patched.find_element("d1").unwrap().0, "s3");
}

/// Renamed, restyled, s1 restyled and s3 (with the footer) dropped
fn reframed() -> Value {
    let mut raw = newsletter();
    raw["name"] = json!("B");
    raw["styles"] = json!({ "backgroundColor": "#000000" });
    raw["sections"][0]["styles"] = json!({ "padding": "40px" });
    raw["sections"].as_array_mut().unwrap().pop();
    raw
}

#[test]
fn test_reject_restores_frame_and_dropped_section() -> anyhow::Result<()> {
    let a = template(newsletter());
    let mut doc = EmailDocument::new(a.clone());

    let proposed = doc.propose(&template(reframed()))?;
    let batch = proposed.batch.expect("batch");
    assert_eq!(kinds(&batch.records), vec![("f1", ChangeType::Delete)]);
    assert!(batch.frame.is_some());
    assert_eq!(doc.template().name, "B");
    assert!(doc.template().section("s3").expect("s3 kept while pending").elements.is_empty());

    let rejected = doc.reject_batch(&batch.id)?;
    assert!(rejected.skipped.is_empty());
    assert_eq!(rejected.frame, Some(ChangeStatus::Rejected));
    assert_eq!(doc.template(), &a);
    Ok(())
}

#[test]
fn test_accept_prunes_dropped_section() -> anyhow::Result<()> {
    let b = template(reframed());
    let mut doc = EmailDocument::new(template(newsletter()));

    let batch = doc.propose(&b)?.batch.expect("batch");
    doc.accept_batch(&batch.id)?;

    assert_eq!(doc.template(), &Template { version: 2, ..b });
    Ok(())
}

#[test]
fn test_rejected_delete_keeps_its_dropped_section() -> anyhow::Result<()> {
    let mut doc = EmailDocument::new(template(newsletter()));
    let batch = doc.propose(&template(reframed()))?.batch.expect("batch");

    let resolution = doc.reject_one(&batch.records[0].id)?;
    assert!(resolution.skipped.is_empty());
    // The frame change is still pending
    assert!(doc.pending_batch().is_some());

    doc.accept_batch(&batch.id)?;
    assert_eq!(doc.template().name, "B");
    assert_eq!(doc.template().find_element("f1").expect("f1").0, "s3");
    Ok(())
}

#[test]
fn test_frame_only_proposal_goes_through_review() -> anyhow::Result<()> {
    let a = template(newsletter());
    let mut candidate = a.clone();
    candidate.name = "Renamed".to_string();
    candidate.styles.content_width = 320;

    let mut doc = EmailDocument::new(a.clone());
    let batch = doc.propose(&candidate)?.batch.expect("batch");
    assert!(batch.records.is_empty());
    assert!(batch.is_open());

    doc.reject_batch(&batch.id)?;
    assert_eq!(doc.template(), &a);
    assert_eq!(doc.state(), &ReviewState::Clean);

    let batch = doc.propose(&candidate)?.batch.expect("batch");
    doc.accept_batch(&batch.id)?;
    assert_eq!(doc.version(), 2);
    assert_eq!(doc.template().name, "Renamed");
    assert_eq!(doc.template().styles.content_width, 320);
    Ok(())
}

#[test]
fn test_service_persists_frame_resolution() -> anyhow::Result<()> {
    let mut store = MemoryStore::new();
    store.add_template(template(newsletter()));
    let mut service = ReviewService::new(store);

    let batch = service.propose("news", &reframed())?.resolution.batch.expect("batch");
    assert_eq!(service.store().load_template("news")?.expect("template").name, "B");

    let rejected = service.execute("news", &ChangeOperation::RejectBatch(batch.id.clone()))?;
    assert_eq!(rejected.template, template(newsletter()));
    assert!(rejected.html.contains("Acme"));

    let stored = service.store().load_change_batch(&batch.id)?.expect("stored batch");
    assert_eq!(stored.frame.expect("frame").status, ChangeStatus::Rejected);
    assert!(service.store().load_pending_batch("news")?.is_none());
    Ok(())
}

#[test]
fn test_reject_undoes_only_its_own_batch() -> anyhow::Result<()> {
    let mut doc = EmailDocument::new(template(json!({
        "id": "t",
        "sections": [{ "id": "s1", "elements": [{ "id": "h1", "type": "header" }] }]
    })));

    let with_e1 = template(json!({
        "id": "t",
        "sections": [{ "id": "s1", "elements": [
            { "id": "h1", "type": "header" },
            { "id": "e1", "type": "text", "content": "Accepted" }
        ] }]
    }));
    let first = doc.propose(&with_e1)?.batch.expect("batch");
    doc.accept_batch(&first.id)?;

    let mut unrelated = with_e1.clone();
    unrelated.find_element_mut("h1").expect("h1").content = "Changed".to_string();
    let second = doc.propose(&unrelated)?.batch.expect("batch");
    doc.reject_batch(&second.id)?;

    assert!(doc.template().find_element("e1").is_some());
    assert_eq!(doc.template().find_element("h1").expect("h1").1.content, "");
    assert_eq!(doc.version(), 2);
    assert_eq!(doc.state(), &ReviewState::Clean);
    Ok(())
}

#[test]
fn test_versions_only_move_on_batch_accept() -> anyhow::Result<()> {
    let mut doc = EmailDocument::new(template(newsletter()));
    assert_eq!(doc.version(), 1);

    let batch = doc.propose(&template(rewritten()))?.batch.expect("batch");
    doc.accept_one(&batch.records[0].id)?;
    assert_eq!(doc.version(), 1);
    doc.accept_batch(&batch.id)?;
    assert_eq!(doc.version(), 2);
    assert!(doc.snapshot(2).is_some());

    let batch = doc.propose(&template(newsletter()))?.batch.expect("batch");
    doc.reject_batch(&batch.id)?;
    assert_eq!(doc.version(), 2);
    assert_eq!(doc.snapshots().len(), 1);
    Ok(())
}

#[test]
fn test_service_round_trip_through_store() -> anyhow::Result<()> {
    let mut service = ReviewService::new(MemoryStore::new());

    let drafted = service.propose("news", &newsletter())?;
    let draft_batch = drafted.resolution.batch.clone().expect("batch");
    assert!(draft_batch.records.iter().all(|r| r.change_type() == ChangeType::Add));
    assert!(service.store().preview("news").expect("preview").contains("March update"));

    // Only one pending batch per template
    let err = service.propose("news", &rewritten()).unwrap_err();
    assert!(matches!(err, EditorError::BatchPending { .. }));

    let accepted = service.execute("news", &ChangeOperation::AcceptBatch(draft_batch.id.clone()))?;
    assert_eq!(accepted.template.version, 2);
    assert!(service.store().snapshot("news", 2).is_some());
    assert!(service.store().load_pending_batch("news")?.is_none());

    let proposed = service.propose("news", &rewritten())?;
    let batch = proposed.resolution.batch.clone().expect("batch");
    assert!(service.store().preview("news").expect("preview").contains("April update"));

    let h1_record = batch
        .records
        .iter()
        .find(|r| r.element_id == "h1")
        .expect("h1 record")
        .id
        .clone();
    let rejected = service.execute("news", &ChangeOperation::RejectOne(h1_record.clone()))?;
    assert_eq!(rejected.template.find_element("h1").expect("h1").1.content, "March update");

    let stored = service.store().load_change_batch(&batch.id)?.expect("stored batch");
    assert_eq!(stored.record(&h1_record).expect("record").status, ChangeStatus::Rejected);

    let err = service
        .execute("news", &ChangeOperation::AcceptOne(h1_record))
        .unwrap_err();
    assert!(matches!(err, EditorError::RecordAlreadyResolved { .. }));

    let done = service.execute("news", &ChangeOperation::AcceptBatch(batch.id.clone()))?;
    assert_eq!(done.template.version, 3);
    assert!(done.html.contains("Spring sale"));
    assert!(!done.html.contains("April update"));
    Ok(())
}

#[test]
fn test_service_reports_unknown_ids() {
    let mut store = MemoryStore::new();
    store.add_template(template(newsletter()));
    let mut service = ReviewService::new(store);

    let err = service
        .execute("news", &ChangeOperation::AcceptBatch("missing".to_string()))
        .unwrap_err();
    assert!(matches!(err, EditorError::BatchNotFound(id) if id == "missing"));

    let err = service
        .execute("news", &ChangeOperation::RejectOne("missing-0".to_string()))
        .unwrap_err();
    assert!(matches!(err, EditorError::RecordNotFound(_)));

    let err = service
        .execute("other", &ChangeOperation::AcceptBatch("missing".to_string()))
        .unwrap_err();
    assert!(matches!(err, EditorError::TemplateNotFound(_)));

    // Nothing was written
    assert!(service.store().batches.is_empty());
    assert!(service.store().previews.is_empty());
}
