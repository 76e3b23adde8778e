//! Multipart body for closing a service call
//!
//! Body form-data sent to `waitingForAccept`:
//!
//! - `files` (FILE), once per attachment, named by the file's base name
//! - `procCodeClose` (TEXT) = [`PROC_CODE_CLOSE`]
//! - `solution` (TEXT) = [`SOLUTION`]

use reqwest::blocking::multipart::{Form, Part};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::error::{FileAction, NaumenError};

/// Form field carrying each attachment
pub const FILES_FIELD: &str = "files";
/// Closure code catalog reference ("Resolved")
pub const PROC_CODE_CLOSE: &str = "catalogs$28411";
/// Resolution note recorded on the ticket
pub const SOLUTION: &str = "Запрос  исполнен, результат во вложении!";

const ATTACHMENT_MIME: &str = "application/octet-stream";

/// Attachment as it was placed into the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub file_name: String,
    pub size: u64,
}

/// Fully assembled closure form, ready to send
pub struct ClosureForm {
    form: Form,
    attachments: Vec<Attachment>,
}

impl ClosureForm {
    /// Read every attachment into the form, then append the fixed fields
    ///
    /// Files are opened one at a time and each handle is closed as soon as its
    /// content has been copied, whether or not the copy succeeded. The first
    /// failure aborts the whole form.
    pub fn build<P: AsRef<Path>>(paths: &[P]) -> Result<Self, NaumenError> {
        let mut form = Form::new();
        let mut attachments = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let (part, attachment) = read_attachment(path)?;
            debug!(file = %attachment.file_name, size = attachment.size, "attached file");
            form = form.part(FILES_FIELD, part);
            attachments.push(attachment);
        }

        let form = form
            .text("procCodeClose", PROC_CODE_CLOSE)
            .text("solution", SOLUTION);

        Ok(Self { form, attachments })
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Boundary the form will be sent with
    pub fn boundary(&self) -> &str {
        self.form.boundary()
    }

    pub(crate) fn into_parts(self) -> (Form, Vec<Attachment>) {
        (self.form, self.attachments)
    }
}

fn read_attachment(path: &Path) -> Result<(Part, Attachment), NaumenError> {
    let content = {
        let mut file = File::open(path)
            .map_err(|e| NaumenError::local_resource(path, FileAction::Open, e))?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| NaumenError::local_resource(path, FileAction::Read, e))?;
        content
    };

    let file_name = base_name(path);
    let attachment = Attachment {
        file_name: file_name.clone(),
        size: content.len() as u64,
    };

    let part = Part::bytes(content)
        .file_name(file_name)
        .mime_str(ATTACHMENT_MIME)
        .map_err(|e| NaumenError::FormPart {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok((part, attachment))
}

/// Last path component, falling back to the whole path when there is none
fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
