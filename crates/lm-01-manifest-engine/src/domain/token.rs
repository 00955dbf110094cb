//! Scan token parsing and normalization
//!
//! Scanners and operators hand us anything: bare AWB numbers with stray
//! separators, lowercase ids, JSON label payloads, even manifest labels.
//! `parse_scan` turns that into a single canonical shipment token or a
//! rejection.

use serde::Deserialize;
use std::fmt;

/// Only label payload version currently printed.
pub const LABEL_PAYLOAD_VERSION: u64 = 1;

/// Canonical form of a scanned token.
///
/// Strips surrounding whitespace, drops interior whitespace, hyphens and
/// underscores, and uppercases. An 11-digit result is rendered in the
/// `XXX-XXXXXXXX` air waybill shape.
pub fn normalize(raw: &str) -> String {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if compact.len() == 11 && compact.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}", &compact[..3], &compact[3..])
    } else {
        compact
    }
}

/// Format check only: 3 digits, optional hyphen, 8 digits.
pub fn is_valid_awb_format(token: &str) -> bool {
    let bytes = token.as_bytes();
    let all_digits = |s: &[u8]| s.iter().all(u8::is_ascii_digit);
    match bytes.len() {
        11 => all_digits(bytes),
        12 => all_digits(&bytes[..3]) && bytes[3] == b'-' && all_digits(&bytes[4..]),
        _ => false,
    }
}

/// Manifest labels look like `MNF-2026-000042`; they never identify a shipment.
pub fn is_manifest_label(token: &str) -> bool {
    let upper = token.trim().to_ascii_uppercase();
    let mut parts = upper.split('-');
    let (Some(prefix), Some(year), Some(seq), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    prefix == "MNF"
        && year.len() == 4
        && year.bytes().all(|b| b.is_ascii_digit())
        && seq.len() == 6
        && seq.bytes().all(|b| b.is_ascii_digit())
}

/// Why a scan input could not produce a shipment token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRejection {
    Empty,
    MalformedPayload(String),
    UnsupportedVersion(u64),
    /// The label identifies something other than a shipment.
    NotAShipment(String),
    MissingAwb,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenRejection::Empty => write!(f, "Empty scan input"),
            TokenRejection::MalformedPayload(e) => write!(f, "Invalid JSON label payload: {e}"),
            TokenRejection::UnsupportedVersion(v) => {
                write!(f, "Unsupported scan payload version: {v}")
            }
            TokenRejection::NotAShipment(kind) => {
                write!(f, "Scanned a {kind} label, expected a shipment")
            }
            TokenRejection::MissingAwb => write!(f, "Label payload carries no AWB"),
        }
    }
}

/// A scan input reduced to its shipment token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanToken {
    pub raw: String,
    pub normalized: String,
    /// Whether the token was lifted out of a JSON label payload.
    pub from_payload: bool,
}

impl ScanToken {
    pub fn looks_like_awb(&self) -> bool {
        is_valid_awb_format(&self.normalized)
    }
}

#[derive(Debug, Deserialize)]
struct LabelPayload {
    v: Option<u64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    awb: Option<String>,
}

/// Reduce raw scanner input to a shipment token.
pub fn parse_scan(raw: &str) -> Result<ScanToken, TokenRejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TokenRejection::Empty);
    }

    if trimmed.starts_with('{') {
        let payload: LabelPayload = serde_json::from_str(trimmed)
            .map_err(|e| TokenRejection::MalformedPayload(e.to_string()))?;

        let version = payload.v.unwrap_or(LABEL_PAYLOAD_VERSION);
        if version != LABEL_PAYLOAD_VERSION {
            return Err(TokenRejection::UnsupportedVersion(version));
        }

        match payload.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("shipment") | Some("package") => {}
            Some(other) => return Err(TokenRejection::NotAShipment(other.to_string())),
        }

        let normalized = payload
            .awb
            .map(|awb| normalize(&awb))
            .filter(|awb| !awb.is_empty())
            .ok_or(TokenRejection::MissingAwb)?;

        return Ok(ScanToken {
            raw: raw.to_string(),
            normalized,
            from_payload: true,
        });
    }

    if is_manifest_label(trimmed) {
        return Err(TokenRejection::NotAShipment("manifest".to_string()));
    }

    // Separators alone carry no token
    let normalized = normalize(trimmed);
    if normalized.is_empty() {
        return Err(TokenRejection::Empty);
    }

    Ok(ScanToken {
        raw: raw.to_string(),
        normalized,
        from_payload: false,
    })
}
