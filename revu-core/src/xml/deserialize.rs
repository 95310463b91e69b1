//! Two-pass review deserializer
//!
//! A review may say `extends="Other"` before `Other` has been parsed, and the
//! repository is typically empty at the start of a load. The prepare pass
//! therefore only registers name stubs; the resolve pass re-parses each
//! document fully and links `extends` through the repository. Callers must
//! prepare every document in a batch before resolving any of them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{
    parse_shared_flag, FileScope, HistoryRecord, Issue, IssueType, Priority, Referential, Review,
    ReviewStatus, SharedReview, User,
};
use crate::repository::ReviewRepository;
use crate::xml::ReviewChild;

type XmlReader<'a> = Reader<&'a [u8]>;

/// Which deserialization pass is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Register a name stub and an extends placeholder; skip everything else
    Prepare,
    /// Fully populate the review and resolve `extends` via the repository
    Resolve,
}

/// Run the prepare pass over one document
pub fn prepare(xml: &str, repo: &mut ReviewRepository) -> Result<SharedReview> {
    deserialize(xml, Pass::Prepare, repo)
}

/// Run the resolve pass over one document
pub fn resolve(xml: &str, repo: &mut ReviewRepository) -> Result<SharedReview> {
    deserialize(xml, Pass::Resolve, repo)
}

/// Deserialize one review document in the given pass
///
/// Failures are per review: a malformed document returns an error without
/// touching any sibling already in the repository.
pub fn deserialize(xml: &str, pass: Pass, repo: &mut ReviewRepository) -> Result<SharedReview> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().expand_empty_elements = true;

    let root = read_root(&mut reader)?;
    let attrs = collect_attributes(&root)?;
    let name = attrs.required("review", "name")?;
    let extends = attrs.get("extends");

    match pass {
        Pass::Prepare => {
            let review = repo.register_stub(name);
            // The placeholder is deliberately not registered; resolve swaps
            // it for the repository's real entry.
            review.borrow_mut().extended_review =
                extends.map(|parent| Review::stub(parent).into_shared());
            Ok(review)
        }
        Pass::Resolve => {
            let status = ReviewStatus::parse(attrs.required("review", "status")?)?;
            let shared = parse_shared_flag(attrs.required("review", "shared")?);

            let extended = match extends {
                None => None,
                Some(parent) => {
                    let target = repo
                        .lookup_by_name(parent)
                        .ok_or_else(|| Error::UnresolvedReference(parent.to_string()))?;
                    ensure_acyclic(name, &target)?;
                    Some(target)
                }
            };

            let mut goal = None;
            let mut history = Vec::new();
            let mut referential = Referential::default();
            let mut file_scope = FileScope::default();
            let mut issues = Vec::new();

            loop {
                match reader.read_event()? {
                    Event::Start(e) => match ReviewChild::from_name(e.name().as_ref()) {
                        Some(ReviewChild::History) => history = parse_history(&mut reader)?,
                        Some(ReviewChild::Goal) => {
                            goal = Some(read_text(&mut reader)?);
                        }
                        Some(ReviewChild::Referential) => {
                            referential = parse_referential(&mut reader)?;
                        }
                        Some(ReviewChild::FileScope) => {
                            file_scope = parse_filescope(&e)?;
                            reader.read_to_end(e.name())?;
                        }
                        Some(ReviewChild::Issues) => issues = parse_issues(&mut reader)?,
                        None => {
                            tracing::debug!(
                                element = %String::from_utf8_lossy(e.name().as_ref()),
                                review = name,
                                "ignoring unknown element"
                            );
                            reader.read_to_end(e.name())?;
                        }
                    },
                    Event::End(_) | Event::Eof => break,
                    _ => {}
                }
            }

            let review = repo.register_stub(name);
            {
                let mut r = review.borrow_mut();
                r.status = status;
                r.shared = shared;
                r.extended_review = extended;
                r.goal = goal;
                r.history = history;
                r.referential = referential;
                r.file_scope = file_scope;
                r.issues = issues;
                r.mark_resolved();
            }
            repo.register_resolved(&review);
            Ok(review)
        }
    }
}

/// Advance to the `<review>` root, skipping the declaration and any prolog
fn read_root<'a>(reader: &mut XmlReader<'a>) -> Result<BytesStart<'a>> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().as_ref() == b"review" {
                    return Ok(e);
                }
                return Err(Error::UnexpectedRoot(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ));
            }
            Event::Eof => return Err(Error::MissingRoot),
            _ => {}
        }
    }
}

/// Walk the would-be extends chain before linking it
///
/// Uses a visited-name set, so a cycle is reported after at most one lap and
/// the walk can never loop.
fn ensure_acyclic(name: &str, target: &SharedReview) -> Result<()> {
    let mut seen = vec![name.to_string()];
    let mut current = Some(target.clone());
    while let Some(handle) = current {
        let review = handle.borrow();
        if seen.iter().any(|n| n == &review.name) {
            seen.push(review.name.clone());
            return Err(Error::ExtendsCycle(seen.join(" -> ")));
        }
        seen.push(review.name.clone());
        current = review.extended_review.clone();
    }
    Ok(())
}

fn parse_history(reader: &mut XmlReader<'_>) -> Result<Vec<HistoryRecord>> {
    let mut records = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"record" => {
                let attrs = collect_attributes(&e)?;
                let author = attrs.required("record", "author")?.to_string();
                let raw = attrs.required("record", "timestamp")?;
                let timestamp = DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| Error::MalformedAttribute {
                        attribute: "timestamp",
                        value: raw.to_string(),
                    })?
                    .with_timezone(&Utc);
                let summary = attrs.get("summary").map(str::to_string);
                records.push(HistoryRecord {
                    author,
                    timestamp,
                    summary,
                });
                reader.read_to_end(e.name())?;
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }
    Ok(records)
}

fn parse_referential(reader: &mut XmlReader<'_>) -> Result<Referential> {
    let mut referential = Referential::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"users" => referential.users = parse_users(reader)?,
                b"priorities" => referential.priorities = parse_priorities(reader)?,
                b"types" => referential.types = parse_types(reader)?,
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }
    Ok(referential)
}

fn parse_users(reader: &mut XmlReader<'_>) -> Result<Vec<User>> {
    let mut users = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"user" => {
                let attrs = collect_attributes(&e)?;
                users.push(User {
                    login: attrs.required("user", "login")?.to_string(),
                    display_name: attrs.get("displayName").map(str::to_string),
                });
                reader.read_to_end(e.name())?;
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }
    Ok(users)
}

fn parse_priorities(reader: &mut XmlReader<'_>) -> Result<Vec<Priority>> {
    let mut priorities = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"priority" => {
                let attrs = collect_attributes(&e)?;
                priorities.push(Priority {
                    name: attrs.required("priority", "name")?.to_string(),
                    order: parse_u32(&attrs, "order")?.ok_or(Error::MissingAttribute {
                        element: "priority",
                        attribute: "order",
                    })?,
                });
                reader.read_to_end(e.name())?;
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }
    Ok(priorities)
}

fn parse_types(reader: &mut XmlReader<'_>) -> Result<Vec<IssueType>> {
    let mut types = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"type" => {
                let attrs = collect_attributes(&e)?;
                types.push(IssueType {
                    name: attrs.required("type", "name")?.to_string(),
                });
                reader.read_to_end(e.name())?;
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }
    Ok(types)
}

fn parse_filescope(element: &BytesStart<'_>) -> Result<FileScope> {
    let attrs = collect_attributes(element)?;
    Ok(FileScope {
        path_pattern: attrs.get("pathPattern").map(str::to_string),
        vcs_after_rev: attrs.get("vcsAfterRev").map(str::to_string),
        vcs_before_rev: attrs.get("vcsBeforeRev").map(str::to_string),
    })
}

fn parse_issues(reader: &mut XmlReader<'_>) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"issue" => {
                let attrs = collect_attributes(&e)?;
                let desc = read_text(reader)?;
                issues.push(Issue {
                    file_path: attrs.get("file").map(str::to_string),
                    line_start: parse_u32(&attrs, "lineStart")?,
                    line_end: parse_u32(&attrs, "lineEnd")?,
                    author: attrs.get("author").map(str::to_string),
                    priority: attrs.get("priority").map(str::to_string),
                    issue_type: attrs.get("type").map(str::to_string),
                    summary: attrs.required("issue", "summary")?.to_string(),
                    desc: if desc.trim().is_empty() { None } else { Some(desc) },
                });
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }
    Ok(issues)
}

/// Collect text content up to the enclosing closing tag, skipping any nested
/// elements whole
fn read_text(reader: &mut XmlReader<'_>) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t.into_inner())),
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}

struct ElementAttrs(HashMap<String, String>);

impl ElementAttrs {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn required(&self, element: &'static str, attribute: &'static str) -> Result<&str> {
        self.get(attribute)
            .ok_or(Error::MissingAttribute { element, attribute })
    }
}

fn collect_attributes(element: &BytesStart<'_>) -> Result<ElementAttrs> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(ElementAttrs(map))
}

fn parse_u32(attrs: &ElementAttrs, attribute: &'static str) -> Result<Option<u32>> {
    match attrs.get(attribute) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u32>()
            .map(Some)
            .map_err(|_| Error::MalformedAttribute {
                attribute,
                value: raw.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::serialize::serialize;
    use chrono::TimeZone;
    use std::rc::Rc;

    fn doc(name: &str, extends: Option<&str>, body: &str) -> String {
        let extends = extends
            .map(|e| format!(r#" extends="{e}""#))
            .unwrap_or_default();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<review xmlns="http://plugins.intellij.net/revu" name="{name}" status="draft" shared="false"{extends}>
{body}
</review>"#
        )
    }

    #[test]
    fn test_prepare_registers_stub_and_skips_body() {
        let mut repo = ReviewRepository::new();
        let xml = doc("A", None, r#"<goal>ignored</goal>"#);
        let review = prepare(&xml, &mut repo).unwrap();
        assert!(review.borrow().is_stub());
        assert_eq!(review.borrow().goal, None);
        assert!(repo.lookup_by_name("A").is_some());
    }

    #[test]
    fn test_prepare_attaches_unregistered_placeholder() {
        let mut repo = ReviewRepository::new();
        let xml = doc("B", Some("A"), "");
        let review = prepare(&xml, &mut repo).unwrap();
        let placeholder = review.borrow().extended_review.clone().unwrap();
        assert!(placeholder.borrow().is_stub());
        assert_eq!(placeholder.borrow().name, "A");
        // Placeholders never go through the repository.
        assert!(repo.lookup_by_name("A").is_none());
    }

    #[test]
    fn test_prepare_then_resolve_links_identity() {
        let mut repo = ReviewRepository::new();
        let doc_a = doc("A", None, "");
        let doc_b = doc("B", Some("A"), "");

        // Forward reference: B prepared before A.
        prepare(&doc_b, &mut repo).unwrap();
        prepare(&doc_a, &mut repo).unwrap();
        let b = resolve(&doc_b, &mut repo).unwrap();
        let a = resolve(&doc_a, &mut repo).unwrap();

        let linked = b.borrow().extended_review.clone().unwrap();
        assert!(Rc::ptr_eq(&linked, &a));
        assert!(!linked.borrow().is_stub());
    }

    #[test]
    fn test_resolve_unknown_extends_is_an_error() {
        let mut repo = ReviewRepository::new();
        let xml = doc("B", Some("Missing"), "");
        let err = resolve(&xml, &mut repo).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference(n) if n == "Missing"));
    }

    #[test]
    fn test_extends_cycle_is_rejected() {
        let mut repo = ReviewRepository::new();
        let doc_x = doc("X", Some("Y"), "");
        let doc_y = doc("Y", Some("X"), "");

        prepare(&doc_x, &mut repo).unwrap();
        prepare(&doc_y, &mut repo).unwrap();

        let err = resolve(&doc_x, &mut repo).unwrap_err();
        assert!(matches!(err, Error::ExtendsCycle(_)));
    }

    #[test]
    fn test_self_extends_is_rejected() {
        let mut repo = ReviewRepository::new();
        let xml = doc("X", Some("X"), "");
        prepare(&xml, &mut repo).unwrap();
        let err = resolve(&xml, &mut repo).unwrap_err();
        assert!(matches!(err, Error::ExtendsCycle(_)));
    }

    #[test]
    fn test_shared_maybe_is_false() {
        let mut repo = ReviewRepository::new();
        let xml = r#"<review name="L" status="draft" shared="maybe"/>"#;
        let review = resolve(xml, &mut repo).unwrap();
        assert!(!review.borrow().shared);
    }

    #[test]
    fn test_status_is_case_insensitive_on_read() {
        let mut repo = ReviewRepository::new();
        let xml = r#"<review name="S" status="FIXING" shared="true"/>"#;
        let review = resolve(xml, &mut repo).unwrap();
        assert_eq!(review.borrow().status, ReviewStatus::Fixing);
        assert!(review.borrow().shared);
    }

    #[test]
    fn test_malformed_status_is_fatal() {
        let mut repo = ReviewRepository::new();
        let xml = r#"<review name="S" status="paused" shared="false"/>"#;
        assert!(matches!(
            resolve(xml, &mut repo).unwrap_err(),
            Error::InvalidStatus(_)
        ));
    }

    #[test]
    fn test_missing_name_is_fatal() {
        let mut repo = ReviewRepository::new();
        let xml = r#"<review status="draft" shared="false"/>"#;
        assert!(matches!(
            prepare(xml, &mut repo).unwrap_err(),
            Error::MissingAttribute {
                attribute: "name",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_child_is_ignored() {
        let mut repo = ReviewRepository::new();
        let xml = doc(
            "F",
            None,
            r#"<foo/><bar attr="1"><nested/></bar><goal>kept</goal>"#,
        );
        let review = resolve(&xml, &mut repo).unwrap();
        assert_eq!(review.borrow().goal.as_deref(), Some("kept"));
    }

    #[test]
    fn test_wrong_root_element() {
        let mut repo = ReviewRepository::new();
        let err = resolve(r#"<reviews/>"#, &mut repo).unwrap_err();
        assert!(matches!(err, Error::UnexpectedRoot(n) if n == "reviews"));
    }

    #[test]
    fn test_empty_input_has_no_root() {
        let mut repo = ReviewRepository::new();
        assert!(matches!(
            resolve("  ", &mut repo).unwrap_err(),
            Error::MissingRoot
        ));
    }

    #[test]
    fn test_resolve_marks_review_resolved() {
        let mut repo = ReviewRepository::new();
        let xml = doc("R", None, "");
        prepare(&xml, &mut repo).unwrap();
        assert!(repo.lookup_by_name("R").unwrap().borrow().is_stub());
        resolve(&xml, &mut repo).unwrap();
        assert!(!repo.lookup_by_name("R").unwrap().borrow().is_stub());
    }

    #[test]
    fn test_full_document_parses() {
        let mut repo = ReviewRepository::new();
        let xml = doc(
            "Full",
            None,
            r#"<history>
    <record author="jdoe" timestamp="2026-08-29T10:00:00Z" summary="created"/>
    <record author="asmith" timestamp="2026-08-30T09:30:00Z"/>
  </history>
  <goal>ship it</goal>
  <referential>
    <users>
      <user login="jdoe" displayName="John Doe"/>
    </users>
    <priorities>
      <priority name="urgent" order="1"/>
    </priorities>
    <types>
      <type name="defect"/>
    </types>
  </referential>
  <filescope pathPattern="src/**/*.rs" vcsAfterRev="abc123"/>
  <issues>
    <issue file="src/main.rs" lineStart="3" lineEnd="5" author="jdoe" priority="urgent" type="defect" summary="leak">fd never closed</issue>
    <issue summary="general note"/>
  </issues>"#,
        );

        let review = resolve(&xml, &mut repo).unwrap();
        let review = review.borrow();
        assert_eq!(review.history.len(), 2);
        assert_eq!(review.history[0].author, "jdoe");
        assert_eq!(
            review.history[0].timestamp,
            Utc.with_ymd_and_hms(2026, 8, 29, 10, 0, 0).unwrap()
        );
        assert_eq!(review.history[1].summary, None);
        assert_eq!(review.goal.as_deref(), Some("ship it"));
        assert_eq!(review.referential.users[0].display_name.as_deref(), Some("John Doe"));
        assert_eq!(review.referential.priorities[0].order, 1);
        assert_eq!(review.referential.types[0].name, "defect");
        assert_eq!(review.file_scope.path_pattern.as_deref(), Some("src/**/*.rs"));
        assert_eq!(review.file_scope.vcs_after_rev.as_deref(), Some("abc123"));
        assert_eq!(review.issues.len(), 2);
        assert_eq!(review.issues[0].desc.as_deref(), Some("fd never closed"));
        assert_eq!(review.issues[1].file_path, None);
    }

    #[test]
    fn test_malformed_line_number_is_fatal() {
        let mut repo = ReviewRepository::new();
        let xml = doc(
            "Bad",
            None,
            r#"<issues><issue lineStart="forty" summary="x"/></issues>"#,
        );
        assert!(matches!(
            resolve(&xml, &mut repo).unwrap_err(),
            Error::MalformedAttribute {
                attribute: "lineStart",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        let mut repo = ReviewRepository::new();
        let xml = doc(
            "Bad",
            None,
            r#"<history><record author="j" timestamp="yesterday"/></history>"#,
        );
        assert!(matches!(
            resolve(&xml, &mut repo).unwrap_err(),
            Error::MalformedAttribute {
                attribute: "timestamp",
                ..
            }
        ));
    }

    #[test]
    fn test_round_trip_preserves_review() {
        let mut original = Review::new("Round");
        original.status = ReviewStatus::Fixed;
        original.shared = true;
        original.goal = Some("goal text".to_string());
        original.history.push(
            HistoryRecord::new("jdoe", Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap())
                .with_summary("created"),
        );
        original.referential.users.push(User::new("jdoe"));
        original.referential.priorities.push(Priority::new("low", 3));
        original.referential.types.push(IssueType::new("question"));
        original.file_scope.path_pattern = Some("**/*.rs".to_string());
        original
            .issues
            .push(Issue::new("i1").with_file("b.txt").with_lines(1, 2));
        original.issues.push(Issue::new("i2").with_file("a.txt"));
        original.issues.push(Issue::new("i3").with_desc("free floating"));

        let xml = serialize(&original).unwrap();
        let mut repo = ReviewRepository::new();
        let loaded = resolve(&xml, &mut repo).unwrap();
        let loaded = loaded.borrow();

        assert_eq!(loaded.name, original.name);
        assert_eq!(loaded.status, original.status);
        assert_eq!(loaded.shared, original.shared);
        assert_eq!(loaded.goal, original.goal);
        assert_eq!(loaded.history, original.history);
        assert_eq!(loaded.referential, original.referential);
        assert_eq!(loaded.file_scope, original.file_scope);

        // Grouping flattens to null-first, then lexicographic file order.
        let summaries: Vec<&str> = loaded.issues.iter().map(|i| i.summary.as_str()).collect();
        assert_eq!(summaries, vec!["i3", "i2", "i1"]);
        for issue in &loaded.issues {
            let original_issue = original
                .issues
                .iter()
                .find(|i| i.summary == issue.summary)
                .unwrap();
            assert_eq!(issue, original_issue);
        }
    }

    #[test]
    fn test_round_trip_is_stable_after_first_pass() {
        let mut original = Review::new("Stable");
        original.issues.push(Issue::new("i1").with_file("b.txt"));
        original.issues.push(Issue::new("i2").with_file("a.txt"));
        original.issues.push(Issue::new("i3"));

        let first_xml = serialize(&original).unwrap();
        let mut repo = ReviewRepository::new();
        let loaded = resolve(&first_xml, &mut repo).unwrap();
        let second_xml = serialize(&loaded.borrow()).unwrap();
        assert_eq!(first_xml, second_xml);
    }
}
