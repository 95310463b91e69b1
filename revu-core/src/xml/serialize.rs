//! Deterministic review serializer
//!
//! The output is canonical: fixed attribute layout, fixed child order, and a
//! total order over issue files. Serializing the same review twice yields
//! byte-identical documents.

use std::cmp::Ordering;

use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::model::{HistoryRecord, Issue, Referential, Review};
use crate::xml::{REVU_SCHEMA_ID, REVU_SCHEMA_LOCATION, XSI_NAMESPACE};

type XmlWriter = Writer<Vec<u8>>;

/// Total order over optional file paths, used to order issue groups.
///
/// A missing path sorts before any real path; two missing paths compare
/// equal. The original comparator returned -1 for two nulls, which violates
/// antisymmetry; only the observable null-first ordering is preserved here.
pub fn file_path_order(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

/// Serialize a review to its canonical XML document
///
/// Referentially transparent: no side effects, and the same review state
/// always produces the same bytes.
pub fn serialize(review: &Review) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let schema_location = format!("{REVU_SCHEMA_ID} {REVU_SCHEMA_LOCATION}");
    let mut root = BytesStart::new("review");
    root.push_attribute(("xmlns", REVU_SCHEMA_ID));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", schema_location.as_str()));
    root.push_attribute(("name", review.name.as_str()));
    root.push_attribute(("status", review.status.as_str()));
    root.push_attribute(("shared", if review.shared { "true" } else { "false" }));
    let extends = review.extends_name();
    if let Some(name) = &extends {
        root.push_attribute(("extends", name.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    write_history(&mut writer, &review.history)?;

    if let Some(goal) = &review.goal {
        writer.write_event(Event::Start(BytesStart::new("goal")))?;
        writer.write_event(Event::Text(BytesText::new(goal)))?;
        writer.write_event(Event::End(BytesEnd::new("goal")))?;
    }

    write_referential(&mut writer, &review.referential)?;
    write_filescope(&mut writer, review)?;
    write_issues(&mut writer, &review.issues)?;

    writer.write_event(Event::End(BytesEnd::new("review")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_history(writer: &mut XmlWriter, history: &[HistoryRecord]) -> Result<()> {
    if history.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("history")))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("history")))?;
    for record in history {
        let timestamp = record
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut element = BytesStart::new("record");
        element.push_attribute(("author", record.author.as_str()));
        element.push_attribute(("timestamp", timestamp.as_str()));
        if let Some(summary) = &record.summary {
            element.push_attribute(("summary", summary.as_str()));
        }
        writer.write_event(Event::Empty(element))?;
    }
    writer.write_event(Event::End(BytesEnd::new("history")))?;
    Ok(())
}

fn write_referential(writer: &mut XmlWriter, referential: &Referential) -> Result<()> {
    if referential.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("referential")))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("referential")))?;

    if !referential.users.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("users")))?;
        for user in &referential.users {
            let mut element = BytesStart::new("user");
            element.push_attribute(("login", user.login.as_str()));
            if let Some(name) = &user.display_name {
                element.push_attribute(("displayName", name.as_str()));
            }
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new("users")))?;
    }

    if !referential.priorities.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("priorities")))?;
        for priority in &referential.priorities {
            let order = priority.order.to_string();
            let mut element = BytesStart::new("priority");
            element.push_attribute(("name", priority.name.as_str()));
            element.push_attribute(("order", order.as_str()));
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new("priorities")))?;
    }

    if !referential.types.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("types")))?;
        for issue_type in &referential.types {
            let mut element = BytesStart::new("type");
            element.push_attribute(("name", issue_type.name.as_str()));
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new("types")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("referential")))?;
    Ok(())
}

fn write_filescope(writer: &mut XmlWriter, review: &Review) -> Result<()> {
    let scope = &review.file_scope;
    let mut element = BytesStart::new("filescope");
    if let Some(pattern) = &scope.path_pattern {
        element.push_attribute(("pathPattern", pattern.as_str()));
    }
    if let Some(rev) = &scope.vcs_after_rev {
        element.push_attribute(("vcsAfterRev", rev.as_str()));
    }
    if let Some(rev) = &scope.vcs_before_rev {
        element.push_attribute(("vcsBeforeRev", rev.as_str()));
    }
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn write_issues(writer: &mut XmlWriter, issues: &[Issue]) -> Result<()> {
    if issues.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("issues")))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("issues")))?;
    for group in grouped_by_file(issues) {
        for issue in group.1 {
            write_issue(writer, issue)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("issues")))?;
    Ok(())
}

fn write_issue(writer: &mut XmlWriter, issue: &Issue) -> Result<()> {
    let mut element = BytesStart::new("issue");
    if let Some(path) = &issue.file_path {
        element.push_attribute(("file", path.as_str()));
    }
    if let Some(line) = issue.line_start {
        let line = line.to_string();
        element.push_attribute(("lineStart", line.as_str()));
    }
    if let Some(line) = issue.line_end {
        let line = line.to_string();
        element.push_attribute(("lineEnd", line.as_str()));
    }
    if let Some(author) = &issue.author {
        element.push_attribute(("author", author.as_str()));
    }
    if let Some(priority) = &issue.priority {
        element.push_attribute(("priority", priority.as_str()));
    }
    if let Some(issue_type) = &issue.issue_type {
        element.push_attribute(("type", issue_type.as_str()));
    }
    element.push_attribute(("summary", issue.summary.as_str()));

    match &issue.desc {
        Some(desc) => {
            writer.write_event(Event::Start(element))?;
            writer.write_event(Event::Text(BytesText::new(desc)))?;
            writer.write_event(Event::End(BytesEnd::new("issue")))?;
        }
        None => writer.write_event(Event::Empty(element))?,
    }
    Ok(())
}

/// Group issues by owning file, keeping insertion order inside each group,
/// then order the groups null-first and lexicographically by path.
///
/// Group boundaries exist only here; the serialized output is a flat run of
/// `issue` elements.
fn grouped_by_file(issues: &[Issue]) -> Vec<(Option<&str>, Vec<&Issue>)> {
    let mut groups: Vec<(Option<&str>, Vec<&Issue>)> = Vec::new();
    for issue in issues {
        let key = issue.file_path.as_deref();
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(issue),
            None => groups.push((key, vec![issue])),
        }
    }
    groups.sort_by(|a, b| file_path_order(a.0, b.0));
    groups
}
