// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application form generation.
//!
//! The template is a `.docx` file whose `word/document.xml` contains
//! `{{placeholder}}` markers. Each marker is replaced by the XML-escaped
//! value of the same name; markers without a value are blanked.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};

use repatria_persistence::{Family, RepatriantData};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::storage::StorageError;

/// The archive entry holding the document body.
pub const DOCUMENT_ENTRY: &str = "word/document.xml";

/// MIME type of the generated document.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Collects the placeholder values for a repatriant.
#[must_use]
pub fn form_values(repatriant: &RepatriantData, family: &Family) -> BTreeMap<String, String> {
    let mut values: BTreeMap<String, String> = BTreeMap::new();
    let mut put = |key: &str, value: Option<&str>| {
        values.insert(key.to_string(), value.unwrap_or_default().to_string());
    };

    put("id", Some(&repatriant.repatriant_id.to_string()));
    put("full_name", Some(&repatriant.full_name()));
    put("file_code", repatriant.file_code.as_deref());
    put("surname", repatriant.surname.as_deref());
    put("given_name", repatriant.given_name.as_deref());
    put("patronymic", repatriant.patronymic.as_deref());
    put("birth_surname", repatriant.birth_surname.as_deref());
    put("birth_date", repatriant.birth_date.as_deref());
    put("birthplace", repatriant.birthplace.as_deref());
    put("sex", repatriant.sex.as_deref());
    put("nationality", repatriant.nationality.as_deref());
    put("family_status", repatriant.family_status.as_deref());
    put("country_of_residence", repatriant.country_of_residence.as_deref());
    put("arrived_from", repatriant.arrived_from.as_deref());
    put("identity_document", repatriant.identity_document.as_deref());
    put(
        "identity_document_number",
        repatriant.identity_document_number.as_deref(),
    );
    put("address", repatriant.address.as_deref());
    put("phone", repatriant.phone.as_deref());
    put("email", repatriant.email.as_deref());
    put("registered_on", repatriant.registered_on.as_deref());
    put("status_granted_on", repatriant.status_granted_on.as_deref());

    let children: Vec<String> = family
        .children
        .iter()
        .map(|child| {
            describe_dependent(
                child.relationship.as_deref(),
                child.full_name.as_deref(),
                child.birth_year.clone(),
            )
        })
        .collect();
    let members: Vec<String> = family
        .family_members
        .iter()
        .map(|member| {
            describe_dependent(
                member.relationship.as_deref(),
                member.full_name.as_deref(),
                member.birth_year.map(|year| year.to_string()),
            )
        })
        .collect();

    values.insert(String::from("children"), children.join("; "));
    values.insert(String::from("family_members"), members.join("; "));
    values
}

fn describe_dependent(
    relationship: Option<&str>,
    full_name: Option<&str>,
    birth_year: Option<String>,
) -> String {
    let mut text: String = full_name.unwrap_or_default().trim().to_string();
    if let Some(relationship) = relationship.filter(|r| !r.trim().is_empty()) {
        text = format!("{} {text}", relationship.trim());
    }
    if let Some(year) = birth_year.filter(|y| !y.trim().is_empty()) {
        text.push_str(&format!(" ({})", year.trim()));
    }
    text
}

/// Escapes the five XML special characters.
#[must_use]
pub fn xml_escape(value: &str) -> String {
    let mut escaped: String = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Replaces every `{{key}}` marker in `xml`.
#[must_use]
pub fn fill_placeholders(xml: &str, values: &BTreeMap<String, String>) -> String {
    let mut output: String = String::with_capacity(xml.len());
    let mut rest: &str = xml;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        output.push_str(&rest[..start]);
        let key: &str = rest[start + 2..start + 2 + len].trim();
        if let Some(value) = values.get(key) {
            output.push_str(&xml_escape(value));
        }
        rest = &rest[start + 2 + len + 2..];
    }

    output.push_str(rest);
    output
}

/// Fills a `.docx` template and returns the new document.
///
/// # Errors
///
/// Returns an error if the template is not a readable zip archive or has
/// no document body.
pub fn fill_template<R: Read + Seek>(
    template: R,
    values: &BTreeMap<String, String>,
) -> Result<Vec<u8>, StorageError> {
    let mut archive: ZipArchive<R> = ZipArchive::new(template).map_err(template_error)?;
    let mut writer: ZipWriter<Cursor<Vec<u8>>> = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut found_document: bool = false;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(template_error)?;
        let name: String = entry.name().to_string();

        if entry.is_dir() {
            writer.add_directory(name, options).map_err(template_error)?;
            continue;
        }

        let mut contents: Vec<u8> = Vec::new();
        entry.read_to_end(&mut contents)?;

        if name == DOCUMENT_ENTRY {
            found_document = true;
            let xml: String = String::from_utf8(contents)
                .map_err(|e| StorageError::Template(format!("{DOCUMENT_ENTRY}: {e}")))?;
            contents = fill_placeholders(&xml, values).into_bytes();
        }

        writer.start_file(name, options).map_err(template_error)?;
        writer.write_all(&contents)?;
    }

    if !found_document {
        return Err(StorageError::Template(format!(
            "template has no {DOCUMENT_ENTRY}"
        )));
    }

    Ok(writer.finish().map_err(template_error)?.into_inner())
}

#[allow(clippy::needless_pass_by_value)]
fn template_error(err: zip::result::ZipError) -> StorageError {
    StorageError::Template(err.to_string())
}
