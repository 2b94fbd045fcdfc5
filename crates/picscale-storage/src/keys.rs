//! Shared key and URL derivation for derivatives.
//!
//! Derivative key format: `{dir}/{base}_{spec_name}{ext}`. The fan-out
//! coordinator and the notification builder both call [`variant_key`]; the
//! two must never diverge, since the notifier reports keys it did not itself
//! upload.

use picscale_core::constants::DEFAULT_REGION;

/// Derive the destination key for one derivative of `key`.
///
/// The original extension string is preserved verbatim, including for webp
/// sources that are re-encoded as JPEG bytes.
pub fn variant_key(key: &str, spec_name: &str) -> String {
    let (dir, file) = match key.rfind('/') {
        Some(i) => (&key[..i], &key[i + 1..]),
        None => ("", key),
    };
    let (base, ext) = match file.rfind('.') {
        Some(i) => (&file[..i], &file[i..]),
        None => (file, ""),
    };

    if dir.is_empty() {
        format!("{}_{}{}", base, spec_name, ext)
    } else {
        format!("{}/{}_{}{}", dir, base, spec_name, ext)
    }
}

/// Public URL for an object, in the standard S3 virtual-hosted format.
pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
    let region = if region.is_empty() {
        DEFAULT_REGION
    } else {
        region
    };
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}
