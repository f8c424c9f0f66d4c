//! ZIP enveloping for SUNAT submissions.
//!
//! The request envelope is a ZIP with exactly one entry, `<base>.xml`, plus
//! the hex SHA-256 and base64 of the raw ZIP bytes. The CDR comes back the
//! same way: a base64 ZIP whose first XML entry is the receipt.

use std::io::{Cursor, Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::DespatchError;

fn zip_err(e: zip::result::ZipError) -> DespatchError {
    DespatchError::Zip(e.to_string())
}

/// A packaged submission ready for the wire.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Base filename without extension, `<RUC>-09-<document_number>`.
    pub filename: String,
    pub zip_bytes: Vec<u8>,
    /// Hex SHA-256 of `zip_bytes`.
    pub zip_sha256_hex: String,
    /// Base64 of `zip_bytes`.
    pub zip_b64: String,
}

/// Package signed XML bytes into the SUNAT envelope.
///
/// The embedded entry is named `<base_filename>.xml`, matching the envelope
/// filename without extension.
pub fn package(xml: &[u8], base_filename: &str) -> Result<Envelope, DespatchError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer
        .start_file(format!("{base_filename}.xml"), options)
        .map_err(zip_err)?;
    writer
        .write_all(xml)
        .map_err(|e| DespatchError::Zip(format!("ZIP write error: {e}")))?;
    let cursor = writer.finish().map_err(zip_err)?;
    let zip_bytes = cursor.into_inner();

    let zip_sha256_hex = hex::encode(Sha256::digest(&zip_bytes));
    let zip_b64 = BASE64.encode(&zip_bytes);

    Ok(Envelope {
        filename: base_filename.to_string(),
        zip_bytes,
        zip_sha256_hex,
        zip_b64,
    })
}

/// Extract the first XML entry of a ZIP, or the first file entry when no
/// entry has an `.xml` extension. SUNAT CDR zips sometimes lead with a stray
/// folder entry, so directory entries are skipped.
pub fn unzip_first_xml(zip_bytes: &[u8]) -> Result<Vec<u8>, DespatchError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes)).map_err(zip_err)?;
    let names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    let chosen = names
        .iter()
        .find(|n| !n.ends_with('/') && n.to_ascii_lowercase().ends_with(".xml"))
        .or_else(|| names.iter().find(|n| !n.ends_with('/')))
        .ok_or_else(|| DespatchError::Zip("the archive contains no files".into()))?
        .clone();

    let mut entry = archive.by_name(&chosen).map_err(zip_err)?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| DespatchError::Zip(format!("ZIP read error: {e}")))?;
    Ok(bytes)
}

/// Decode a base64 ZIP and extract its first XML entry.
pub fn unzip_b64(zip_b64: &str) -> Result<Vec<u8>, DespatchError> {
    let zip_bytes = BASE64
        .decode(zip_b64.trim())
        .map_err(|e| DespatchError::Parse(format!("invalid base64 ZIP: {e}")))?;
    unzip_first_xml(&zip_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_round_trips_through_unzip() {
        let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><DespatchAdvice/>";
        let envelope = package(xml, "20123456789-09-T001-00000001").unwrap();

        assert_eq!(envelope.filename, "20123456789-09-T001-00000001");
        let extracted = unzip_first_xml(&envelope.zip_bytes).unwrap();
        assert_eq!(extracted, xml);
    }

    #[test]
    fn embedded_entry_name_matches_the_envelope_filename() {
        let envelope = package(b"<a/>", "20123456789-09-T001-00000002").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(envelope.zip_bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 1);
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "20123456789-09-T001-00000002.xml");
    }

    #[test]
    fn hash_and_base64_describe_the_zip_bytes() {
        let envelope = package(b"<a/>", "20123456789-09-T001-00000003").unwrap();
        assert_eq!(
            envelope.zip_sha256_hex,
            hex::encode(Sha256::digest(&envelope.zip_bytes))
        );
        assert_eq!(envelope.zip_b64, BASE64.encode(&envelope.zip_bytes));
        assert_eq!(envelope.zip_sha256_hex.len(), 64);
    }

    #[test]
    fn first_xml_entry_wins_over_leading_folder() {
        // Mirror the SUNAT quirk: a folder entry first, the CDR second.
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.add_directory("dummy/", options).unwrap();
        writer.start_file("R-20123456789-09-T001-1.xml", options).unwrap();
        writer.write_all(b"<cdr/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert_eq!(unzip_first_xml(&bytes).unwrap(), b"<cdr/>");
    }

    #[test]
    fn falls_back_to_first_file_without_xml_entries() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("readme.txt", options).unwrap();
        writer.write_all(b"not xml").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert_eq!(unzip_first_xml(&bytes).unwrap(), b"not xml");
    }

    #[test]
    fn unzip_b64_decodes_then_extracts() {
        let envelope = package(b"<cdr/>", "cdr-test").unwrap();
        assert_eq!(unzip_b64(&envelope.zip_b64).unwrap(), b"<cdr/>");
        assert!(unzip_b64("not-base64!!!").is_err());
    }
}
