//! Encode/decode/construct for the `sas://` FMRI grammar.

use tracing::debug;

use crate::error::FmriError;
use crate::nvl::{Authority, AuthorityKind, PathComponent, SasFmri};

/// The only FMRI scheme version this codec understands.
pub const SUPPORTED_VERSION: u8 = 0;

const SCHEME_PREFIX: &str = "sas://";

/// Rejects any version other than [`SUPPORTED_VERSION`]. Callers that accept
/// a version as an out-of-band parameter (the `topo_method` FMRI callback,
/// for instance) check this before looking at the rest of their arguments.
pub fn check_version(version: u8) -> Result<(), FmriError> {
    if version == SUPPORTED_VERSION {
        Ok(())
    } else {
        Err(FmriError::VersionUnsupported(version))
    }
}

/// Builds a single-path-component `pathnode` FMRI, the shape used when a
/// discovery source creates the FMRI for one vertex it just built (the
/// `sas_fmri_create` construction pattern).
#[must_use]
pub fn construct(name: &str, inst: u64, authority: Authority) -> SasFmri {
    SasFmri {
        version: SUPPORTED_VERSION,
        authority,
        path: vec![PathComponent::new(name, inst)],
    }
}

fn hex_len(mut v: u64) -> usize {
    if v == 0 {
        return 1;
    }
    let mut len = 0;
    while v > 0 {
        len += 1;
        v >>= 4;
    }
    len
}

/// PHY identifiers are the grammar's `u32` production, rendered decimal
/// (`%u`/`atoi` in the original), unlike the `hex64` SAS-address IDs.
fn decimal_len(mut v: u32) -> usize {
    if v == 0 {
        return 1;
    }
    let mut len = 0;
    while v > 0 {
        len += 1;
        v /= 10;
    }
    len
}

/// Computes the exact byte length [`encode`] will produce, without building
/// the string. This mirrors the original two-pass size-then-write codec
/// discipline and keeps [`encode`]'s length math independently testable.
#[must_use]
pub fn encoded_len(fmri: &SasFmri) -> usize {
    // "sas://type=" + kind
    let mut len = SCHEME_PREFIX.len() + "type=".len() + fmri.authority.kind.as_str().len();
    if let Some((start, end)) = fmri.authority.phy_range {
        // ":start-phy=" + decimal + ":end-phy=" + decimal
        len += ":start-phy=".len() + decimal_len(start);
        len += ":end-phy=".len() + decimal_len(end);
    }
    for component in &fmri.path {
        // "/" + name + "=" + hex
        len += 1 + component.name.len() + 1 + hex_len(component.id);
    }
    len
}

/// Encodes a decoded FMRI back to its canonical textual form.
pub fn encode(fmri: &SasFmri) -> Result<String, FmriError> {
    check_version(fmri.version)?;
    if fmri.path.is_empty() {
        return Err(FmriError::MalformedNvl("path has no components".into()));
    }

    let mut out = String::with_capacity(encoded_len(fmri));
    out.push_str(SCHEME_PREFIX);
    out.push_str("type=");
    out.push_str(fmri.authority.kind.as_str());
    if let Some((start, end)) = fmri.authority.phy_range {
        out.push_str(&format!(":start-phy={start}:end-phy={end}"));
    }
    for component in &fmri.path {
        out.push('/');
        out.push_str(&component.name);
        out.push('=');
        out.push_str(&format!("{:x}", component.id));
    }

    debug_assert_eq!(out.len(), encoded_len(fmri));
    Ok(out)
}

fn parse_hex64(s: &str) -> Result<u64, FmriError> {
    if s.is_empty() || s.len() > 16 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FmriError::MalformedFmri(format!(
            "'{s}' is not a valid hex64 value"
        )));
    }
    u64::from_str_radix(s, 16)
        .map_err(|_| FmriError::MalformedFmri(format!("'{s}' does not fit in 64 bits")))
}

/// Parses a PHY identifier: the grammar's `u32` production is decimal
/// (`atoi` in the original), not hex like the `hex64` SAS-address IDs.
fn parse_phy(s: &str) -> Result<u32, FmriError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FmriError::MalformedFmri(format!(
            "'{s}' is not a valid decimal phy value"
        )));
    }
    s.parse::<u32>()
        .map_err(|_| FmriError::MalformedFmri(format!("'{s}' does not fit in 32 bits")))
}

/// Parses a `sas://` FMRI string into its structured form.
pub fn decode(text: &str) -> Result<SasFmri, FmriError> {
    let rest = text
        .strip_prefix(SCHEME_PREFIX)
        .ok_or_else(|| FmriError::MalformedFmri(format!("missing '{SCHEME_PREFIX}' prefix")))?;

    // The authority ends at the first '/' that begins the path.
    let split_at = rest
        .find('/')
        .ok_or_else(|| FmriError::MalformedFmri("missing path after authority".into()))?;
    let (authority_str, path_str) = (&rest[..split_at], &rest[split_at + 1..]);

    let mut authority_parts = authority_str.split(':');
    let type_part = authority_parts
        .next()
        .ok_or_else(|| FmriError::MalformedFmri("empty authority".into()))?;
    let kind_str = type_part
        .strip_prefix("type=")
        .ok_or_else(|| FmriError::MalformedFmri("authority missing 'type=' field".into()))?;
    let kind = AuthorityKind::parse(kind_str)
        .ok_or_else(|| FmriError::MalformedFmri(format!("unknown authority type '{kind_str}'")))?;

    let phy_range = match (authority_parts.next(), authority_parts.next()) {
        (None, None) => None,
        (Some(start_field), Some(end_field)) => {
            let start = start_field
                .strip_prefix("start-phy=")
                .ok_or_else(|| FmriError::MalformedFmri("expected 'start-phy=' field".into()))?;
            let end = end_field
                .strip_prefix("end-phy=")
                .ok_or_else(|| FmriError::MalformedFmri("expected 'end-phy=' field".into()))?;
            Some((parse_phy(start)?, parse_phy(end)?))
        }
        _ => {
            return Err(FmriError::MalformedFmri(
                "start-phy and end-phy must be present together".into(),
            ));
        }
    };
    if authority_parts.next().is_some() {
        return Err(FmriError::MalformedFmri(
            "authority has unexpected trailing fields".into(),
        ));
    }

    let mut path = Vec::new();
    for component_str in path_str.split('/') {
        let (name, hex) = component_str.split_once('=').ok_or_else(|| {
            FmriError::MalformedFmri(format!("path component '{component_str}' missing '='"))
        })?;
        if name.is_empty() {
            return Err(FmriError::MalformedFmri(
                "path component name is empty".into(),
            ));
        }
        path.push(PathComponent::new(name, parse_hex64(hex)?));
    }
    if path.is_empty() {
        return Err(FmriError::MalformedFmri("path has no components".into()));
    }

    debug!(%text, components = path.len(), "decoded FMRI");
    Ok(SasFmri {
        version: SUPPORTED_VERSION,
        authority: Authority { kind, phy_range },
        path,
    })
}
